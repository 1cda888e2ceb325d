//! Audio subsystem
//!
//! Handles input device enumeration and microphone level monitoring for the
//! listening visualiser.

pub mod device;
pub mod metering;
pub mod monitor;

pub use device::{get_device_display_name, get_input_device, list_input_devices, AudioDevice};
pub use metering::AudioMeter;
pub use monitor::LevelMonitor;
