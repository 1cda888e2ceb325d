//! Voice interaction controller
//!
//! Owns the conversation [`Session`], the phase machine, and the injected
//! capability objects, and maps component events and public calls onto
//! phase transitions and side effects. All mutation happens on the thread
//! pumping [`handle_event`](Controller::handle_event), so the Session never
//! needs a lock.

pub mod state;

pub use state::{Phase, PhaseEvent, PhaseMachine, Transition, TransitionReason};

use crate::audio::LevelMonitor;
use crate::backend::{AssistantBackend, CompletionRequest};
use crate::capture::SpeechCapture;
use crate::config::Config;
use crate::error::ErrorInfo;
use crate::events::{AssistantEvent, CaptureEvent, EventSender, OutputEvent};
use crate::modes::ModeCatalog;
use crate::output::SpeechOutput;
use crate::session::Session;

/// Coordinates capture, level monitoring, backend requests, and speech
/// output across the interaction cycle.
pub struct Controller {
    machine: PhaseMachine,
    session: Session,
    /// Monotonic token identifying the current cycle. Backend results
    /// carrying an older token are discarded.
    cycle: u64,
    capture: Box<dyn SpeechCapture>,
    output: Box<dyn SpeechOutput>,
    backend: Box<dyn AssistantBackend>,
    monitor: LevelMonitor,
    modes: ModeCatalog,
    mode_id: String,
    api_key: String,
    events: EventSender,
}

impl Controller {
    /// Create a controller wired to the given capabilities. The sender must
    /// belong to the same channel the capabilities publish on.
    pub fn new(
        capture: Box<dyn SpeechCapture>,
        output: Box<dyn SpeechOutput>,
        backend: Box<dyn AssistantBackend>,
        events: EventSender,
        config: &Config,
        modes: ModeCatalog,
    ) -> Self {
        let monitor = LevelMonitor::new(events.clone(), config.audio.device_id.clone());
        Self {
            machine: PhaseMachine::new(),
            session: Session::new(),
            cycle: 0,
            capture,
            output,
            backend,
            monitor,
            modes,
            mode_id: config.assistant.mode_id.clone(),
            api_key: config.backend.api_key.clone(),
            events,
        }
    }

    /// Current conversation state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current interaction phase.
    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    /// Select the assistant mode for subsequent cycles.
    ///
    /// An id the catalog does not know is accepted; instruction resolution
    /// falls back to the general mode.
    pub fn set_mode(&mut self, mode_id: impl Into<String>) {
        let mode_id = mode_id.into();
        if self.modes.get(&mode_id).is_none() {
            tracing::warn!("Unknown mode '{}', will use general instruction", mode_id);
        }
        self.mode_id = mode_id;
    }

    /// Currently selected mode id.
    pub fn mode_id(&self) -> &str {
        &self.mode_id
    }

    /// Start capture from Idle, or cancel it from Listening. Inert while a
    /// request is in flight or a response is playing.
    pub fn toggle_capture(&mut self) {
        match self.machine.phase() {
            Phase::Idle => self.begin_cycle(),
            Phase::Listening => self.cancel_capture(),
            phase => {
                tracing::debug!("toggle_capture ignored in {:?}", phase);
            }
        }
    }

    fn begin_cycle(&mut self) {
        self.cycle += 1;
        self.session.begin_cycle();

        if let Err(e) = self.capture.start() {
            tracing::error!("Failed to start capture: {}", e);
            self.session.enter_idle(Some(ErrorInfo::from(&e)));
            return;
        }

        self.machine.process_event(PhaseEvent::Activate);
        self.session.enter_listening();

        // Level monitoring is cosmetic; capture proceeds without it
        if let Err(e) = self.monitor.start() {
            tracing::warn!("Level monitor unavailable: {}", e);
        }
    }

    fn cancel_capture(&mut self) {
        if self
            .machine
            .process_event(PhaseEvent::Cancel)
            .is_some()
        {
            self.capture.stop();
            self.monitor.stop();
            self.session.enter_idle(None);
        }
    }

    /// Stop playback of the current response. Valid only while Speaking.
    pub fn stop_speaking(&mut self) {
        if self
            .machine
            .process_event(PhaseEvent::StopSpeaking)
            .is_some()
        {
            self.output.cancel();
            self.session.enter_idle(None);
        } else {
            tracing::debug!("stop_speaking ignored in {:?}", self.machine.phase());
        }
    }

    /// Apply one component event to the session.
    pub fn handle_event(&mut self, event: AssistantEvent) {
        match event {
            AssistantEvent::Level(level) => {
                if self.machine.phase().is_listening() {
                    self.session.volume = level.clamp(0.0, 1.0);
                }
            }
            AssistantEvent::Capture(capture_event) => self.handle_capture(capture_event),
            AssistantEvent::Backend { cycle, result } => self.handle_backend(cycle, result),
            AssistantEvent::Output(output_event) => self.handle_output(output_event),
        }
    }

    fn handle_capture(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::Interim(text) => {
                if self.machine.phase().is_listening() {
                    self.session.transcript = text;
                }
            }
            CaptureEvent::Final(text) => {
                if self
                    .machine
                    .process_event(PhaseEvent::FinalTranscript { text: text.clone() })
                    .is_some()
                {
                    self.session.transcript = text.clone();
                    self.capture.stop();
                    self.monitor.stop();
                    self.session.enter_processing();

                    let request = CompletionRequest {
                        message: text,
                        mode: self.mode_id.clone(),
                        system_prompt: self.modes.instruction_for(&self.mode_id).to_string(),
                        api_key: self.api_key.clone(),
                    };
                    self.backend.submit(request, self.cycle, self.events.clone());
                }
            }
            CaptureEvent::Error(detail) => {
                if self
                    .machine
                    .process_event(PhaseEvent::CaptureFailed {
                        detail: detail.clone(),
                    })
                    .is_some()
                {
                    let err = crate::error::AssistantError::CaptureError(detail);
                    self.capture.stop();
                    self.monitor.stop();
                    self.session.enter_idle(Some(ErrorInfo::from(&err)));
                }
            }
            CaptureEvent::Ended => {
                // Valid only while still Listening; the machine absorbs the
                // Ended that trails a final transcript
                if self.machine.process_event(PhaseEvent::CaptureEnded).is_some() {
                    self.monitor.stop();
                    self.session.enter_idle(None);
                }
            }
        }
    }

    fn handle_backend(
        &mut self,
        cycle: u64,
        result: Result<String, crate::error::AssistantError>,
    ) {
        if cycle != self.cycle {
            tracing::info!(
                "Discarding backend result for stale cycle {} (current {})",
                cycle,
                self.cycle
            );
            return;
        }

        match result {
            Ok(text) => {
                if self
                    .machine
                    .process_event(PhaseEvent::BackendSucceeded { text: text.clone() })
                    .is_some()
                {
                    self.session.response = text.clone();
                    self.session.enter_speaking();
                    self.output.speak(&text);
                }
            }
            Err(e) => {
                if self
                    .machine
                    .process_event(PhaseEvent::BackendFailed {
                        error: e.to_string(),
                    })
                    .is_some()
                {
                    self.session.enter_idle(Some(ErrorInfo::from(&e)));
                }
            }
        }
    }

    fn handle_output(&mut self, event: OutputEvent) {
        match event {
            OutputEvent::Started => {
                tracing::debug!("Speech output started");
            }
            OutputEvent::Ended => {
                if self
                    .machine
                    .process_event(PhaseEvent::OutputFinished)
                    .is_some()
                {
                    self.session.enter_idle(None);
                }
            }
            OutputEvent::Failed(detail) => {
                // Playback failure is treated as completion; the response
                // text is already on the session
                tracing::warn!("Speech output failed: {}", detail);
                if self
                    .machine
                    .process_event(PhaseEvent::OutputFinished)
                    .is_some()
                {
                    self.session.enter_idle(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AssistantError, ErrorKind};
    use crate::events;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct StubCapture {
        active: bool,
        fail_start: bool,
    }

    impl SpeechCapture for StubCapture {
        fn start(&mut self) -> Result<(), AssistantError> {
            if self.fail_start {
                return Err(AssistantError::CaptureUnsupported);
            }
            self.active = true;
            Ok(())
        }

        fn stop(&mut self) {
            self.active = false;
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    struct StubOutput;

    impl SpeechOutput for StubOutput {
        fn speak(&mut self, _text: &str) {}
        fn cancel(&mut self) {}
    }

    struct StubBackend {
        submissions: Rc<RefCell<Vec<u64>>>,
    }

    impl AssistantBackend for StubBackend {
        fn submit(&self, _request: CompletionRequest, cycle: u64, _events: EventSender) {
            self.submissions.borrow_mut().push(cycle);
        }
    }

    fn controller(fail_start: bool) -> (Controller, Rc<RefCell<Vec<u64>>>) {
        let (tx, _rx) = events::channel();
        let submissions = Rc::new(RefCell::new(Vec::new()));
        let controller = Controller::new(
            Box::new(StubCapture {
                active: false,
                fail_start,
            }),
            Box::new(StubOutput),
            Box::new(StubBackend {
                submissions: submissions.clone(),
            }),
            tx,
            &Config::default(),
            ModeCatalog::builtin(),
        );
        (controller, submissions)
    }

    #[test]
    fn test_toggle_starts_listening() {
        let (mut c, _) = controller(false);
        c.toggle_capture();

        assert_eq!(c.phase(), Phase::Listening);
        assert!(c.session().listening);
        assert!(c.session().phases_exclusive());
    }

    #[test]
    fn test_unsupported_capture_stays_idle_with_error() {
        let (mut c, _) = controller(true);
        c.toggle_capture();

        assert_eq!(c.phase(), Phase::Idle);
        assert!(!c.session().listening);
        let error = c.session().error.as_ref().expect("error should be set");
        assert_eq!(error.kind, ErrorKind::CaptureUnsupported);
    }

    #[test]
    fn test_cancel_does_not_submit_partial_transcript() {
        let (mut c, submissions) = controller(false);
        c.toggle_capture();
        c.handle_event(AssistantEvent::Capture(CaptureEvent::Interim(
            "turn on".to_string(),
        )));
        c.toggle_capture();

        assert_eq!(c.phase(), Phase::Idle);
        assert!(submissions.borrow().is_empty());
        // The partial transcript stays visible after cancellation
        assert_eq!(c.session().transcript, "turn on");
    }

    #[test]
    fn test_final_transcript_submits_current_cycle() {
        let (mut c, submissions) = controller(false);
        c.toggle_capture();
        c.handle_event(AssistantEvent::Capture(CaptureEvent::Final(
            "turn on the lights".to_string(),
        )));

        assert_eq!(c.phase(), Phase::Processing);
        assert!(c.session().processing);
        assert_eq!(c.session().volume, 0.0);
        assert_eq!(submissions.borrow().as_slice(), &[1]);
    }

    #[test]
    fn test_level_only_applied_while_listening() {
        let (mut c, _) = controller(false);
        c.handle_event(AssistantEvent::Level(0.5));
        assert_eq!(c.session().volume, 0.0);

        c.toggle_capture();
        c.handle_event(AssistantEvent::Level(0.5));
        assert_eq!(c.session().volume, 0.5);
    }

    #[test]
    fn test_stale_backend_result_discarded() {
        let (mut c, _) = controller(false);
        c.toggle_capture();
        c.handle_event(AssistantEvent::Capture(CaptureEvent::Final(
            "first".to_string(),
        )));

        // Result tagged with a cycle that is no longer current
        c.handle_event(AssistantEvent::Backend {
            cycle: 0,
            result: Ok("stale".to_string()),
        });

        assert_eq!(c.phase(), Phase::Processing);
        assert!(c.session().response.is_empty());
    }

    #[test]
    fn test_set_mode_changes_submission_instruction() {
        let (mut c, _) = controller(false);
        c.set_mode("technical");
        assert_eq!(c.mode_id(), "technical");
    }
}
