//! Types for speech processing
//!
//! Encoded audio bytes as exchanged with providers, and decoded PCM as used
//! by calibration and recognition.

pub use domain::{ArtifactState, AudioArtifact, AudioFormat};

/// Container for encoded audio bytes
#[derive(Debug, Clone)]
pub struct AudioData {
    data: Vec<u8>,
    format: AudioFormat,
}

impl AudioData {
    /// Create new audio data
    #[must_use]
    pub const fn new(data: Vec<u8>, format: AudioFormat) -> Self {
        Self { data, format }
    }

    /// Get the raw audio bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the raw audio bytes
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Get the audio format
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    /// Get the size of the audio data in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if the audio data is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Mono 16-bit PCM samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmAudio {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl PcmAudio {
    /// Wrap decoded samples
    #[must_use]
    pub const fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// The samples
    #[must_use]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Samples per second
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Playback length in milliseconds
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / u64::from(self.sample_rate)
    }

    /// Raw little-endian `audio/l16` payload
    #[must_use]
    pub fn to_l16_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    /// Whether no samples were decoded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_data_accessors() {
        let audio = AudioData::new(vec![1, 2, 3], AudioFormat::Mp3);
        assert_eq!(audio.size_bytes(), 3);
        assert_eq!(audio.format(), AudioFormat::Mp3);
        assert!(!audio.is_empty());
        assert_eq!(audio.into_data(), vec![1, 2, 3]);
    }

    #[test]
    fn pcm_duration() {
        let pcm = PcmAudio::new(vec![0; 16_000], 16_000);
        assert_eq!(pcm.duration_ms(), 1000);
        assert_eq!(PcmAudio::new(vec![0; 10], 0).duration_ms(), 0);
    }

    #[test]
    fn l16_is_little_endian() {
        let pcm = PcmAudio::new(vec![0x0102, -1], 16_000);
        assert_eq!(pcm.to_l16_bytes(), vec![0x02, 0x01, 0xFF, 0xFF]);
    }
}
