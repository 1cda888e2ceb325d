//! Conversation session state
//!
//! A single `Session` is created when the controller initialises and lives
//! for the controller's lifetime. Each capture→transcribe→respond→speak
//! cycle mutates the same instance; components never touch it directly,
//! they report events upward and the controller applies the mutation.

use crate::error::ErrorInfo;
use serde::{Deserialize, Serialize};

/// Live conversation state the UI binds to.
///
/// Invariant: at most one of `listening`, `processing`, `speaking` is true
/// at any instant. `volume` is meaningful only while `listening` and is
/// reset to 0 otherwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Capture is active and interim transcripts may arrive
    pub listening: bool,
    /// A spoken response is playing
    pub speaking: bool,
    /// A backend completion request is in flight
    pub processing: bool,
    /// Normalised microphone loudness, 0.0-1.0
    pub volume: f32,
    /// Latest transcript (interim or final) for the current cycle
    pub transcript: String,
    /// Generated response text for the current cycle
    pub response: String,
    /// Terminal error of the current cycle, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-cycle fields at the start of a new capture cycle.
    pub fn begin_cycle(&mut self) {
        self.transcript.clear();
        self.response.clear();
        self.error = None;
    }

    /// Enter the listening phase.
    pub fn enter_listening(&mut self) {
        self.listening = true;
        self.processing = false;
        self.speaking = false;
    }

    /// Enter the processing phase; volume is no longer meaningful.
    pub fn enter_processing(&mut self) {
        self.listening = false;
        self.processing = true;
        self.speaking = false;
        self.volume = 0.0;
    }

    /// Enter the speaking phase.
    pub fn enter_speaking(&mut self) {
        self.listening = false;
        self.processing = false;
        self.speaking = true;
    }

    /// Return to idle, optionally recording a terminal error.
    pub fn enter_idle(&mut self, error: Option<ErrorInfo>) {
        self.listening = false;
        self.processing = false;
        self.speaking = false;
        self.volume = 0.0;
        if error.is_some() {
            self.error = error;
        }
    }

    /// Whether the phase flags honour their mutual-exclusion invariant.
    pub fn phases_exclusive(&self) -> bool {
        [self.listening, self.processing, self.speaking]
            .iter()
            .filter(|&&flag| flag)
            .count()
            <= 1
    }
}
