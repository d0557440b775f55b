//! Ambient-noise calibration using frame RMS energy
//!
//! ## Algorithm
//!
//! 1. Split the clip into fixed-length frames and compute each frame's RMS.
//! 2. Take the noise floor as a low percentile of the frame energies.
//! 3. The speech threshold is the larger of `min_energy` and
//!    `noise_floor * noise_multiplier`.
//! 4. The clip holds speech only if its loudest frame reaches the threshold.
//!
//! Silence fails step 4 on `min_energy`; a constant hum fails it because its
//! loudest frame sits on its own noise floor.

use crate::types::PcmAudio;

/// Result of calibrating one clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyAssessment {
    /// Estimated ambient noise RMS
    pub noise_floor: f32,
    /// Calibrated speech threshold
    pub threshold: f32,
    /// RMS of the loudest frame
    pub peak: f32,
}

impl EnergyAssessment {
    /// Whether anything in the clip rises above the ambient noise
    #[must_use]
    pub fn has_speech(&self) -> bool {
        self.peak >= self.threshold
    }
}

/// Energy-based speech presence check
#[derive(Debug, Clone)]
pub struct EnergyCalibration {
    /// Frame length in milliseconds
    frame_ms: u32,
    /// Absolute minimum RMS (16-bit scale) a speech frame must reach
    min_energy: f32,
    /// Percentile (0.0 to 1.0) of frame energies used as the noise floor
    noise_percentile: f32,
    /// How far above the noise floor speech must rise
    noise_multiplier: f32,
}

impl EnergyCalibration {
    /// Create a calibration with the given minimum energy
    #[must_use]
    pub const fn new(min_energy: f32) -> Self {
        Self {
            frame_ms: 20,
            min_energy,
            noise_percentile: 0.2,
            noise_multiplier: 1.5,
        }
    }

    /// Compute the root-mean-square of a sample slice
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn rms(samples: &[i16]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
        (sum_sq / samples.len() as f64).sqrt() as f32
    }

    /// Calibrate against `audio`
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn assess(&self, audio: &PcmAudio) -> EnergyAssessment {
        let frame_len = ((audio.sample_rate() as usize * self.frame_ms as usize) / 1000).max(1);

        let mut energies: Vec<f32> = audio.samples().chunks(frame_len).map(Self::rms).collect();
        if energies.is_empty() {
            return EnergyAssessment {
                noise_floor: 0.0,
                threshold: self.min_energy,
                peak: 0.0,
            };
        }

        energies.sort_by(f32::total_cmp);
        let peak = energies[energies.len() - 1];
        let index = ((energies.len() - 1) as f32 * self.noise_percentile).round() as usize;
        let noise_floor = energies[index.min(energies.len() - 1)];
        let threshold = self.min_energy.max(noise_floor * self.noise_multiplier);

        EnergyAssessment {
            noise_floor,
            threshold,
            peak,
        }
    }
}

impl Default for EnergyCalibration {
    fn default() -> Self {
        Self::new(300.0)
    }
}
