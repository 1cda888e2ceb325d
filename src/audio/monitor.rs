//! Microphone level monitoring
//!
//! Runs a cpal input stream while speech capture is active and publishes a
//! normalised loudness on the shared event channel at ~30Hz for the UI
//! visualiser. This is monitoring only; no audio is recorded.

use super::device::{get_device_display_name, get_input_device};
use super::metering::AudioMeter;
use crate::events::{AssistantEvent, EventSender};
use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Running monitor resources
struct MonitorState {
    stream: Option<cpal::Stream>,
    stop_flag: Arc<AtomicBool>,
    sampler_handle: Option<std::thread::JoinHandle<()>>,
}

/// Publishes microphone loudness while active.
///
/// `start()` opens the input stream and spawns the sampler thread; `stop()`
/// tears both down deterministically. No level event is delivered to the
/// channel after `stop()` returns.
pub struct LevelMonitor {
    events: EventSender,
    device_id: Option<String>,
    state: Mutex<Option<MonitorState>>,
}

impl LevelMonitor {
    pub fn new(events: EventSender, device_id: Option<String>) -> Self {
        Self {
            events,
            device_id,
            state: Mutex::new(None),
        }
    }

    /// Start monitoring. Replaces any monitor already running.
    pub fn start(&self) -> Result<()> {
        self.stop();

        let device = get_input_device(self.device_id.as_deref())
            .ok_or_else(|| anyhow!("No audio input device available"))?;

        let device_name = get_device_display_name(&device);
        tracing::info!("Starting level monitor on device: {}", device_name);

        let config = device
            .default_input_config()
            .context("Failed to get input config")?;
        let channels = config.channels() as usize;

        let stop_flag = Arc::new(AtomicBool::new(false));

        // Channel for audio data
        let (tx, rx) = crossbeam_channel::bounded::<Vec<f32>>(16);

        // Build the input stream
        let stream = device
            .build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Mix to mono and send to the sampler thread
                    let mono: Vec<f32> = data
                        .chunks(channels)
                        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                        .collect();
                    let _ = tx.try_send(mono);
                },
                |err| {
                    tracing::error!("Level monitor stream error: {}", err);
                },
                None,
            )
            .context("Failed to build input stream")?;

        stream.play().context("Failed to start input stream")?;

        // Spawn sampler thread to publish levels
        let sampler_stop_flag = stop_flag.clone();
        let events = self.events.clone();
        let sampler_handle = std::thread::spawn(move || {
            let mut meter = AudioMeter::new();
            while !sampler_stop_flag.load(Ordering::Relaxed) {
                while let Ok(samples) = rx.try_recv() {
                    let level = meter.process(&samples);
                    let _ = events.send(AssistantEvent::Level(level));
                }

                // Rate limit to ~30fps
                std::thread::sleep(std::time::Duration::from_millis(33));
            }
        });

        let mut state_guard = self.state.lock();
        *state_guard = Some(MonitorState {
            stream: Some(stream),
            stop_flag,
            sampler_handle: Some(sampler_handle),
        });

        tracing::info!("Level monitor started");
        Ok(())
    }

    /// Stop monitoring. Idempotent; safe to call when not running.
    pub fn stop(&self) {
        let mut state_guard = self.state.lock();

        if let Some(mut state) = state_guard.take() {
            // Signal stop
            state.stop_flag.store(true, Ordering::Relaxed);

            // Drop stream to stop the audio callback
            if let Some(stream) = state.stream.take() {
                drop(stream);
            }

            // Wait for the sampler thread
            if let Some(handle) = state.sampler_handle.take() {
                let _ = handle.join();
            }

            tracing::info!("Level monitor stopped");
        }
    }

    /// Whether the monitor is currently running.
    pub fn is_running(&self) -> bool {
        self.state.lock().is_some()
    }
}

impl Drop for LevelMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
