//! Speech capture seam
//!
//! Wraps the platform speech-to-text capability behind a trait so the
//! controller can be driven by a fake in tests. Implementations hold the
//! event channel sender from construction and report activity as
//! [`CaptureEvent`](crate::events::CaptureEvent)s:
//!
//! - `Interim(text)` fires zero or more times per utterance
//! - `Final(text)` fires exactly once per completed utterance
//! - `Error(detail)` fires at most once
//! - `Ended` always fires eventually, after success, error, or stop

use crate::error::AssistantError;

/// A speech-to-text session controlled by the interaction controller.
pub trait SpeechCapture {
    /// Begin recognising. Returns [`AssistantError::CaptureUnsupported`]
    /// when the platform has no recognition engine. Calling while already
    /// active is a no-op.
    fn start(&mut self) -> Result<(), AssistantError>;

    /// Stop recognising. Idempotent; stopping an inactive session does
    /// nothing and must never re-trigger a `Final` event.
    fn stop(&mut self);

    /// Whether a recognition session is currently active.
    fn is_active(&self) -> bool;
}
