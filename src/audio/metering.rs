//! Audio metering for real-time level visualisation
//!
//! Reduces raw sample buffers to a single normalised loudness value with a
//! fast attack and a slow release, so the visualiser rises instantly on
//! speech and falls smoothly in pauses.

/// Real-time loudness meter
pub struct AudioMeter {
    smoothed: f32,
    decay_rate: f32,
}

impl Default for AudioMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioMeter {
    /// Create a new audio meter
    ///
    /// Default decay rate gives ~300ms release at 30Hz updates
    pub fn new() -> Self {
        Self {
            smoothed: 0.0,
            decay_rate: 0.9,
        }
    }

    /// Create a meter with custom decay rate
    ///
    /// `decay_rate` should be between 0.0 and 1.0
    /// Higher values = slower decay
    pub fn with_decay(decay_rate: f32) -> Self {
        Self {
            smoothed: 0.0,
            decay_rate: decay_rate.clamp(0.0, 0.999),
        }
    }

    /// Process a buffer of samples and return the normalised loudness, 0.0-1.0.
    ///
    /// Louder input takes effect immediately; quieter input decays the held
    /// level rather than dropping it.
    pub fn process(&mut self, samples: &[f32]) -> f32 {
        let rms = calculate_rms(samples);

        self.smoothed = if rms > self.smoothed {
            rms
        } else {
            self.smoothed * self.decay_rate
        };

        self.smoothed.min(1.0)
    }

    /// Current held level without processing new samples.
    pub fn level(&self) -> f32 {
        self.smoothed.min(1.0)
    }

    /// Reset the meter
    pub fn reset(&mut self) {
        self.smoothed = 0.0;
    }
}

/// Calculate RMS level for a buffer of samples
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak level for a buffer of samples
pub fn calculate_peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}
