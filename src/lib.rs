//! Talkback - voice interaction controller
//!
//! Coordinates speech capture, live microphone level visualisation,
//! assistant backend requests, and speech output across a single
//! conversation cycle: Idle -> Listening -> Processing -> Speaking -> Idle.
//!
//! The host wires platform capabilities ([`SpeechCapture`],
//! [`SpeechOutput`], [`AssistantBackend`]) into a [`Controller`], then
//! pumps the shared event channel:
//!
//! ```no_run
//! use talkback::{backend::ChatBackend, config::Config, events, modes::ModeCatalog};
//! use talkback::{Controller, SystemSpeechOutput};
//!
//! # fn capture(events: events::EventSender) -> Box<dyn talkback::SpeechCapture> { unimplemented!() }
//! # fn main() {
//! talkback::logging::init();
//!
//! let config = Config::load();
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let (tx, rx) = events::channel();
//!
//! let output = SystemSpeechOutput::new(tx.clone(), config.speech.clone());
//! let backend = ChatBackend::new(&config.backend, runtime.handle().clone());
//! let mut controller = Controller::new(
//!     capture(tx.clone()),
//!     Box::new(output),
//!     Box::new(backend),
//!     tx,
//!     &config,
//!     ModeCatalog::builtin(),
//! );
//!
//! controller.toggle_capture();
//! while let Ok(event) = rx.recv() {
//!     controller.handle_event(event);
//! }
//! # }
//! ```

pub mod audio;
pub mod backend;
pub mod capture;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod logging;
pub mod modes;
pub mod output;
pub mod session;

pub use backend::AssistantBackend;
pub use capture::SpeechCapture;
pub use controller::{Controller, Phase};
pub use error::{AssistantError, ErrorInfo, ErrorKind};
pub use events::{AssistantEvent, CaptureEvent, OutputEvent};
pub use modes::{Mode, ModeCatalog};
pub use output::{SpeechOutput, SystemSpeechOutput};
pub use session::Session;
