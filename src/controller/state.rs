//! Voice interaction state machine
//!
//! Defines the phases of a capture→respond→speak cycle and the legal
//! transitions between them. The machine is pure: side effects (starting
//! capture, submitting requests, speaking) are applied by the
//! [`Controller`](super::Controller) when a transition is returned. An
//! event that is not valid for the current phase produces no transition,
//! which is how late or stale component events are absorbed.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Phase of the voice interaction cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the user to start a cycle
    #[default]
    Idle,
    /// Capturing speech and publishing microphone levels
    Listening,
    /// Waiting on the completion backend
    Processing,
    /// Speaking the generated response
    Speaking,
}

impl Phase {
    /// Returns a human-readable description of the phase
    pub fn description(&self) -> &'static str {
        match self {
            Phase::Idle => "Waiting for activation",
            Phase::Listening => "Listening for speech",
            Phase::Processing => "Generating response",
            Phase::Speaking => "Speaking response",
        }
    }

    /// Returns whether microphone levels are meaningful in this phase
    pub fn is_listening(&self) -> bool {
        matches!(self, Phase::Listening)
    }
}

/// Events that can trigger phase transitions
#[derive(Debug, Clone)]
pub enum PhaseEvent {
    /// User activated capture
    Activate,
    /// User cancelled capture before a final transcript
    Cancel,
    /// The capture engine produced the completed utterance
    FinalTranscript {
        /// The transcribed text
        text: String,
    },
    /// The capture engine failed mid-utterance
    CaptureFailed {
        /// Error detail from the engine
        detail: String,
    },
    /// The capture engine ended without producing a final transcript
    CaptureEnded,
    /// The backend resolved with response text
    BackendSucceeded {
        /// The generated response
        text: String,
    },
    /// The backend resolved with an error
    BackendFailed {
        /// Error message
        error: String,
    },
    /// Speech output finished (naturally or after a playback failure)
    OutputFinished,
    /// User stopped playback early
    StopSpeaking,
}

/// Reason for entering a phase
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    /// User initiated activation
    UserActivation,
    /// User cancelled the cycle
    UserCancellation,
    /// A final transcript is ready for submission
    TranscriptReady,
    /// Capture ended without a transcript
    CaptureFinished,
    /// The backend produced a response
    ResponseReady,
    /// Playback reached its end
    PlaybackComplete,
    /// Error occurred during the cycle
    Error { message: String },
}

/// Result of a phase transition
#[derive(Debug, Clone)]
pub struct Transition {
    /// The new phase after the transition
    pub new_phase: Phase,
    /// Reason for the transition
    pub reason: TransitionReason,
}

/// Voice interaction state machine
///
/// Thread safety is handled externally; the controller owns the machine
/// and processes events on a single thread.
pub struct PhaseMachine {
    phase: Phase,
    phase_entered_at: Instant,
}

impl PhaseMachine {
    /// Creates a new machine in the Idle phase
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            phase_entered_at: Instant::now(),
        }
    }

    /// Returns the current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns how long the machine has been in the current phase
    pub fn time_in_phase(&self) -> std::time::Duration {
        self.phase_entered_at.elapsed()
    }

    /// Process an event and return the transition if one occurred
    ///
    /// Returns `None` if the event is not valid for the current phase.
    pub fn process_event(&mut self, event: PhaseEvent) -> Option<Transition> {
        let transition = match (&self.phase, event) {
            // IDLE phase transitions
            (Phase::Idle, PhaseEvent::Activate) => Some(Transition {
                new_phase: Phase::Listening,
                reason: TransitionReason::UserActivation,
            }),

            // LISTENING phase transitions
            (Phase::Listening, PhaseEvent::Cancel) => Some(Transition {
                new_phase: Phase::Idle,
                reason: TransitionReason::UserCancellation,
            }),
            (Phase::Listening, PhaseEvent::FinalTranscript { .. }) => Some(Transition {
                new_phase: Phase::Processing,
                reason: TransitionReason::TranscriptReady,
            }),
            (Phase::Listening, PhaseEvent::CaptureFailed { detail }) => Some(Transition {
                new_phase: Phase::Idle,
                reason: TransitionReason::Error { message: detail },
            }),
            // The engine gave up without a final transcript (e.g. no speech)
            (Phase::Listening, PhaseEvent::CaptureEnded) => Some(Transition {
                new_phase: Phase::Idle,
                reason: TransitionReason::CaptureFinished,
            }),

            // PROCESSING phase transitions
            (Phase::Processing, PhaseEvent::BackendSucceeded { .. }) => Some(Transition {
                new_phase: Phase::Speaking,
                reason: TransitionReason::ResponseReady,
            }),
            (Phase::Processing, PhaseEvent::BackendFailed { error }) => Some(Transition {
                new_phase: Phase::Idle,
                reason: TransitionReason::Error { message: error },
            }),

            // SPEAKING phase transitions
            (Phase::Speaking, PhaseEvent::OutputFinished) => Some(Transition {
                new_phase: Phase::Idle,
                reason: TransitionReason::PlaybackComplete,
            }),
            (Phase::Speaking, PhaseEvent::StopSpeaking) => Some(Transition {
                new_phase: Phase::Idle,
                reason: TransitionReason::UserCancellation,
            }),

            // Everything else is invalid for the current phase. This is the
            // guard that ignores a late CaptureEnded after a final
            // transcript already advanced the cycle, output events after a
            // manual stop, and activation while a cycle is in flight.
            _ => None,
        };

        if let Some(ref result) = transition {
            self.apply_transition(result);
        }

        transition
    }

    fn apply_transition(&mut self, result: &Transition) {
        let previous_phase = self.phase;
        self.phase = result.new_phase;
        self.phase_entered_at = Instant::now();

        tracing::info!(
            "Phase transition: {:?} -> {:?} (reason: {:?})",
            previous_phase,
            result.new_phase,
            result.reason
        );
    }

    /// Reset the machine to Idle
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.phase_entered_at = Instant::now();
        tracing::info!("Phase machine reset to Idle");
    }
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}
