//! Speech output seam
//!
//! Wraps speech synthesis behind a trait so the controller can be driven by
//! a fake in tests. The production implementation shells out to the platform
//! speech command (`say` on macOS, `espeak` elsewhere) in a background
//! thread and reports [`OutputEvent`](crate::events::OutputEvent)s on the
//! shared channel.

use crate::config::SpeechConfig;
use crate::events::{AssistantEvent, EventSender, OutputEvent};
use parking_lot::Mutex;
use std::process::{Child, Command};
use std::sync::Arc;
use std::time::Duration;

/// A speech synthesis session controlled by the interaction controller.
pub trait SpeechOutput {
    /// Speak the given text, preempting any utterance still playing.
    fn speak(&mut self, text: &str);

    /// Cancel the current utterance, if any. Idempotent.
    fn cancel(&mut self);
}

/// The current utterance's process, tagged with a generation so a stale
/// waiter thread never reports on a newer utterance.
struct Utterance {
    generation: u64,
    child: Child,
}

/// Speech output via the platform speech command.
pub struct SystemSpeechOutput {
    events: EventSender,
    speech: SpeechConfig,
    generation: u64,
    current: Arc<Mutex<Option<Utterance>>>,
}

/// Baseline speaking rate in words per minute, scaled by the config
/// multiplier.
const BASE_RATE_WPM: f32 = 175.0;

impl SystemSpeechOutput {
    pub fn new(events: EventSender, speech: SpeechConfig) -> Self {
        Self {
            events,
            speech,
            generation: 0,
            current: Arc::new(Mutex::new(None)),
        }
    }

    fn build_command(&self, text: &str) -> Command {
        let rate_wpm = (BASE_RATE_WPM * self.speech.rate).round() as u32;

        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("say");
            cmd.arg("-r").arg(rate_wpm.to_string()).arg(text);
            cmd
        }

        #[cfg(not(target_os = "macos"))]
        {
            // espeak amplitude range is 0-200
            let amplitude = (self.speech.volume.clamp(0.0, 1.0) * 200.0).round() as u32;
            let mut cmd = Command::new("espeak");
            cmd.arg("-s")
                .arg(rate_wpm.to_string())
                .arg("-a")
                .arg(amplitude.to_string())
                .arg(text);
            cmd
        }
    }
}

impl SpeechOutput for SystemSpeechOutput {
    fn speak(&mut self, text: &str) {
        self.cancel();

        self.generation += 1;
        let generation = self.generation;
        let mut cmd = self.build_command(text);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!("Failed to spawn speech command: {}", e);
                let _ = self
                    .events
                    .send(AssistantEvent::Output(OutputEvent::Failed(e.to_string())));
                return;
            }
        };

        *self.current.lock() = Some(Utterance { generation, child });
        let _ = self.events.send(AssistantEvent::Output(OutputEvent::Started));

        // Poll for completion in a separate thread to avoid blocking. The
        // thread exits silently when its utterance has been cancelled or
        // replaced.
        let events = self.events.clone();
        let current = self.current.clone();
        std::thread::spawn(move || loop {
            let finished = {
                let mut guard = current.lock();
                match guard.as_mut() {
                    Some(utterance) if utterance.generation == generation => {
                        match utterance.child.try_wait() {
                            Ok(Some(status)) => {
                                guard.take();
                                if status.success() {
                                    Some(OutputEvent::Ended)
                                } else {
                                    tracing::warn!("Speech command exited with {}", status);
                                    Some(OutputEvent::Failed(format!(
                                        "speech command exited with {}",
                                        status
                                    )))
                                }
                            }
                            Ok(None) => None,
                            Err(e) => {
                                guard.take();
                                tracing::warn!("Failed to wait on speech command: {}", e);
                                Some(OutputEvent::Failed(e.to_string()))
                            }
                        }
                    }
                    // Cancelled or replaced by a newer utterance
                    _ => {
                        return;
                    }
                }
            };

            match finished {
                Some(event) => {
                    let _ = events.send(AssistantEvent::Output(event));
                    return;
                }
                None => std::thread::sleep(Duration::from_millis(50)),
            }
        });
    }

    fn cancel(&mut self) {
        if let Some(mut utterance) = self.current.lock().take() {
            if let Err(e) = utterance.child.kill() {
                tracing::debug!("Failed to kill speech command: {}", e);
            }
            let _ = utterance.child.wait();
            tracing::debug!("Speech output cancelled");
        }
    }
}
