//! Error types for the voice interaction pipeline
//!
//! Every asynchronous path in the pipeline has a paired failure handler;
//! errors surface through `Session.error` rather than crossing an async
//! boundary uncaught.

use serde::{Deserialize, Serialize};

/// Errors produced by the capture, backend, and output subsystems.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssistantError {
    /// The platform exposes no speech-recognition capability
    #[error("Speech recognition is not supported on this platform")]
    CaptureUnsupported,

    /// The capture engine reported a failure mid-utterance
    #[error("Speech recognition error: {0}")]
    CaptureError(String),

    /// No API key configured; checked before any network call
    #[error("API key is required")]
    MissingCredential,

    /// A request precondition failed (e.g. empty transcript)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The completion service returned an error response
    #[error("Backend failure: {0}")]
    BackendFailure(String),

    /// The completion service could not be reached
    #[error("Network failure: {0}")]
    NetworkFailure(String),
}

/// Error classification stored on the `Session` for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CaptureUnsupported,
    CaptureError,
    MissingCredential,
    Validation,
    BackendFailure,
    NetworkFailure,
}

/// An error kind plus human-readable detail, as surfaced on the `Session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// What category of failure occurred
    pub kind: ErrorKind,
    /// Human-readable description for display
    pub detail: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl From<&AssistantError> for ErrorInfo {
    fn from(err: &AssistantError) -> Self {
        let kind = match err {
            AssistantError::CaptureUnsupported => ErrorKind::CaptureUnsupported,
            AssistantError::CaptureError(_) => ErrorKind::CaptureError,
            AssistantError::MissingCredential => ErrorKind::MissingCredential,
            AssistantError::Validation(_) => ErrorKind::Validation,
            AssistantError::BackendFailure(_) => ErrorKind::BackendFailure,
            AssistantError::NetworkFailure(_) => ErrorKind::NetworkFailure,
        };
        Self::new(kind, err.to_string())
    }
}
