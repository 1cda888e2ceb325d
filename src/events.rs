//! Event channel shared by all pipeline components
//!
//! Components never mutate the `Session`; they report what happened on a
//! single channel and the controller applies the state change. The host
//! pumps the receiver on one thread, so all Session mutation is serialised.

use crate::error::AssistantError;

/// Events reported by the speech capture session.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// A partial transcript; fires zero or more times per utterance
    Interim(String),
    /// The completed utterance; fires exactly once per successful pass
    Final(String),
    /// The engine failed mid-utterance; fires at most once
    Error(String),
    /// Recognition finished (after success, error, or explicit stop)
    Ended,
}

/// Events reported by the speech output session.
#[derive(Debug, Clone)]
pub enum OutputEvent {
    /// Synthesis began playing
    Started,
    /// Playback finished naturally
    Ended,
    /// Playback failed; treated like completion, logged only
    Failed(String),
}

/// All events the controller consumes, from every component.
#[derive(Debug, Clone)]
pub enum AssistantEvent {
    /// Normalised microphone loudness from the level monitor
    Level(f32),
    /// Speech capture activity
    Capture(CaptureEvent),
    /// A backend completion resolved, tagged with the cycle that issued it
    Backend {
        cycle: u64,
        result: Result<String, AssistantError>,
    },
    /// Speech output activity
    Output(OutputEvent),
}

/// Sending half of the shared event channel, handed to each component once
/// at construction.
pub type EventSender = crossbeam_channel::Sender<AssistantEvent>;

/// Receiving half, pumped by the host and fed to
/// [`Controller::handle_event`](crate::controller::Controller::handle_event).
pub type EventReceiver = crossbeam_channel::Receiver<AssistantEvent>;

/// Create the shared event channel.
pub fn channel() -> (EventSender, EventReceiver) {
    crossbeam_channel::unbounded()
}
