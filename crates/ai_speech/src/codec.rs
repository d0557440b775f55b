//! Audio format conversion
//!
//! [`FfmpegCodec`] shells out to FFmpeg and handles every format.
//! [`WavCodec`] is pure Rust (via `hound`) and only reads and writes WAV.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::config::CodecKind;
use crate::error::SpeechError;
use crate::ports::AudioCodec;
use crate::types::{AudioFormat, PcmAudio};

/// Audio codec backed by an FFmpeg binary
#[derive(Debug, Clone, Default)]
pub struct FfmpegCodec {
    /// FFmpeg binary path (defaults to "ffmpeg" in PATH)
    ffmpeg_path: Option<String>,
}

impl FfmpegCodec {
    /// Create a codec using `ffmpeg` from PATH
    #[must_use]
    pub const fn new() -> Self {
        Self { ffmpeg_path: None }
    }

    /// Create a codec with a custom FFmpeg path
    #[must_use]
    pub fn with_ffmpeg_path(path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: Some(path.into()),
        }
    }

    /// Get the FFmpeg binary path
    fn ffmpeg_path(&self) -> &str {
        self.ffmpeg_path.as_deref().unwrap_or("ffmpeg")
    }

    /// Check if FFmpeg is available on the system
    #[instrument(skip(self))]
    pub async fn is_available(&self) -> bool {
        Command::new(self.ffmpeg_path())
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok_and(|status| status.success())
    }

    /// Get the FFmpeg muxer name for an audio format
    const fn format_to_ffmpeg(format: AudioFormat) -> &'static str {
        match format {
            AudioFormat::Opus => "opus",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Flac => "flac",
            AudioFormat::Webm => "webm",
            AudioFormat::M4a => "ipod",
        }
    }

    /// Encoder options for an output format
    const fn format_options(format: AudioFormat) -> &'static [&'static str] {
        match format {
            AudioFormat::Mp3 => &["-codec:a", "libmp3lame", "-q:a", "2"],
            AudioFormat::Opus => &["-codec:a", "libopus", "-application", "voip", "-b:a", "32k"],
            AudioFormat::Wav => &["-codec:a", "pcm_s16le"],
            AudioFormat::Flac => &["-codec:a", "flac", "-compression_level", "5"],
            AudioFormat::M4a => &["-codec:a", "aac", "-b:a", "128k"],
            AudioFormat::Ogg | AudioFormat::Webm => &["-codec:a", "libvorbis", "-q:a", "4"],
        }
    }

    /// Arguments turning `input` into mono 16-bit WAV at `output`
    fn decode_args(input: &Path, output: &Path, sample_rate: Option<u32>) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-ac".to_string(),
            "1".to_string(),
            "-sample_fmt".to_string(),
            "s16".to_string(),
        ];
        if let Some(rate) = sample_rate {
            args.push("-ar".to_string());
            args.push(rate.to_string());
        }
        args.extend(
            ["-codec:a", "pcm_s16le", "-f", "wav"]
                .iter()
                .map(ToString::to_string),
        );
        args.push(output.display().to_string());
        args
    }

    /// Arguments encoding `input` into `format` at `output`
    fn encode_args(input: &Path, output: &Path, format: AudioFormat) -> Vec<String> {
        let mut args: Vec<String> = ["-y", "-loglevel", "error", "-i"]
            .iter()
            .map(ToString::to_string)
            .collect();
        args.push(input.display().to_string());
        args.extend(Self::format_options(format).iter().map(ToString::to_string));
        args.push("-f".to_string());
        args.push(Self::format_to_ffmpeg(format).to_string());
        args.push(output.display().to_string());
        args
    }

    async fn run(&self, args: &[String]) -> Result<(), SpeechError> {
        let output = Command::new(self.ffmpeg_path())
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SpeechError::AudioProcessing(format!("Failed to spawn FFmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::AudioProcessing(format!(
                "FFmpeg conversion failed: {stderr}"
            )));
        }
        Ok(())
    }

    async fn ensure_output(output: &Path) -> Result<(), SpeechError> {
        let len = tokio::fs::metadata(output).await?.len();
        if len == 0 {
            return Err(SpeechError::AudioProcessing(
                "FFmpeg produced empty output".to_string(),
            ));
        }
        debug!(bytes = len, "Conversion successful");
        Ok(())
    }
}

#[async_trait]
impl AudioCodec for FfmpegCodec {
    #[instrument(skip(self), fields(input = %input.display()))]
    async fn decode_to_wav(
        &self,
        input: &Path,
        output: &Path,
        sample_rate: Option<u32>,
    ) -> Result<(), SpeechError> {
        self.run(&Self::decode_args(input, output, sample_rate)).await?;
        Self::ensure_output(output).await
    }

    #[instrument(skip(self), fields(input = %input.display(), %format))]
    async fn encode(&self, input: &Path, output: &Path, format: AudioFormat) -> Result<(), SpeechError> {
        self.run(&Self::encode_args(input, output, format)).await?;
        Self::ensure_output(output).await
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Pure-Rust WAV codec
#[derive(Debug, Clone, Copy, Default)]
pub struct WavCodec;

impl WavCodec {
    /// Create the codec
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioCodec for WavCodec {
    #[instrument(skip(self), fields(input = %input.display()))]
    async fn decode_to_wav(
        &self,
        input: &Path,
        output: &Path,
        sample_rate: Option<u32>,
    ) -> Result<(), SpeechError> {
        let (input, output) = (input.to_path_buf(), output.to_path_buf());
        blocking(move || {
            let pcm = read_pcm(&input)?;
            let pcm = match sample_rate {
                Some(rate) if rate != pcm.sample_rate() => resample(&pcm, rate),
                _ => pcm,
            };
            write_pcm(&output, &pcm)
        })
        .await
    }

    async fn encode(&self, input: &Path, output: &Path, format: AudioFormat) -> Result<(), SpeechError> {
        if format != AudioFormat::Wav {
            return Err(SpeechError::AudioProcessing(format!(
                "wav codec cannot encode {format}"
            )));
        }
        let (input, output) = (input.to_path_buf(), output.to_path_buf());
        blocking(move || write_pcm(&output, &read_pcm(&input)?)).await
    }

    fn name(&self) -> &str {
        "wav"
    }
}

async fn blocking<F>(f: F) -> Result<(), SpeechError>
where
    F: FnOnce() -> Result<(), SpeechError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SpeechError::AudioProcessing(format!("Audio task failed: {e}")))?
}

/// Read any PCM WAV file as mono 16-bit samples
///
/// Channels are averaged; narrower, wider and float samples are scaled to 16 bits.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn read_pcm(path: &Path) -> Result<PcmAudio, SpeechError> {
    let mut reader =
        hound::WavReader::open(path).map_err(|e| SpeechError::InvalidAudio(e.to_string()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<i32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i32))
            .collect::<Result<_, _>>(),
        hound::SampleFormat::Int if spec.bits_per_sample <= 16 => {
            let shift = u32::from(16 - spec.bits_per_sample);
            reader
                .samples::<i16>()
                .map(|s| s.map(|v| i32::from(v) << shift))
                .collect::<Result<_, _>>()
        },
        hound::SampleFormat::Int => {
            let shift = u32::from(spec.bits_per_sample.saturating_sub(16));
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v >> shift))
                .collect::<Result<_, _>>()
        },
    }
    .map_err(|e| SpeechError::InvalidAudio(e.to_string()))?;

    let samples = interleaved
        .chunks(channels)
        .map(|frame| {
            let sum: i64 = frame.iter().map(|&v| i64::from(v)).sum();
            (sum / frame.len() as i64).clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
        })
        .collect();

    Ok(PcmAudio::new(samples, spec.sample_rate))
}

/// Write mono 16-bit samples as a WAV file
pub fn write_pcm(path: &Path, audio: &PcmAudio) -> Result<(), SpeechError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let to_err = |e: hound::Error| SpeechError::AudioProcessing(e.to_string());

    let mut writer = hound::WavWriter::create(path, spec).map_err(to_err)?;
    for &sample in audio.samples() {
        writer.write_sample(sample).map_err(to_err)?;
    }
    writer.finalize().map_err(to_err)
}

/// Linear-interpolation resampling
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn resample(audio: &PcmAudio, target_rate: u32) -> PcmAudio {
    let samples = audio.samples();
    if samples.is_empty() || audio.sample_rate() == 0 || target_rate == 0 {
        return PcmAudio::new(Vec::new(), target_rate);
    }

    let ratio = f64::from(audio.sample_rate()) / f64::from(target_rate);
    let out_len = ((samples.len() as f64) / ratio).round().max(1.0) as usize;
    let last = samples.len() - 1;

    let out = (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = (pos.floor() as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = pos - idx as f64;
            let value = f64::from(samples[idx]) * (1.0 - frac) + f64::from(samples[next]) * frac;
            value.round() as i16
        })
        .collect();

    PcmAudio::new(out, target_rate)
}

/// Rewrite a WAV file with its frame rate scaled by `speed`
///
/// Samples are kept as-is, so playback is faster (or slower) and pitch
/// shifts with it.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn rescale_rate(input: &Path, output: &Path, speed: f32) -> Result<(), SpeechError> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(SpeechError::AudioProcessing(format!(
            "invalid speed factor {speed}"
        )));
    }
    let pcm = read_pcm(input)?;
    let rate = (f64::from(pcm.sample_rate()) * f64::from(speed)).round().max(1.0) as u32;
    debug!(from = pcm.sample_rate(), to = rate, "Rescaling frame rate");
    write_pcm(output, &PcmAudio::new(pcm.samples().to_vec(), rate))
}

/// Build the configured codec
#[must_use]
pub fn codec_for(kind: CodecKind, ffmpeg_path: Option<&str>) -> Arc<dyn AudioCodec> {
    match (kind, ffmpeg_path) {
        (CodecKind::Wav, _) => Arc::new(WavCodec::new()),
        (CodecKind::Ffmpeg, Some(path)) => Arc::new(FfmpegCodec::with_ffmpeg_path(path)),
        (CodecKind::Ffmpeg, None) => Arc::new(FfmpegCodec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_stereo_wav(path: &Path, rate: u32, frames: &[(i16, i16)]) {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &(l, r) in frames {
            writer.write_sample(l).unwrap();
            writer.write_sample(r).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn ffmpeg_path_default_and_custom() {
        assert_eq!(FfmpegCodec::new().ffmpeg_path(), "ffmpeg");
        assert_eq!(
            FfmpegCodec::with_ffmpeg_path("/custom/ffmpeg").ffmpeg_path(),
            "/custom/ffmpeg"
        );
    }

    #[test]
    fn format_to_ffmpeg_mapping() {
        assert_eq!(FfmpegCodec::format_to_ffmpeg(AudioFormat::Mp3), "mp3");
        assert_eq!(FfmpegCodec::format_to_ffmpeg(AudioFormat::Wav), "wav");
        assert_eq!(FfmpegCodec::format_to_ffmpeg(AudioFormat::M4a), "ipod");
    }

    #[test]
    fn decode_args_request_mono_s16_at_rate() {
        let args = FfmpegCodec::decode_args(Path::new("in.ogg"), Path::new("out.wav"), Some(16_000));
        let joined = args.join(" ");
        assert!(joined.contains("-i in.ogg"));
        assert!(joined.contains("-ac 1"));
        assert!(joined.contains("-sample_fmt s16"));
        assert!(joined.contains("-ar 16000"));
        assert!(joined.ends_with("out.wav"));

        let args = FfmpegCodec::decode_args(Path::new("in.mp3"), Path::new("out.wav"), None);
        assert!(!args.contains(&"-ar".to_string()));
    }

    #[test]
    fn encode_args_use_format_options() {
        let args = FfmpegCodec::encode_args(Path::new("in.wav"), Path::new("out.mp3"), AudioFormat::Mp3);
        let joined = args.join(" ");
        assert!(joined.contains("libmp3lame"));
        assert!(joined.contains("-f mp3"));
    }

    #[tokio::test]
    async fn ffmpeg_missing_binary_is_processing_error() {
        let dir = tempfile::tempdir().unwrap();
        let codec = FfmpegCodec::with_ffmpeg_path("/nonexistent/ffmpeg");
        let result = codec
            .decode_to_wav(&dir.path().join("a.ogg"), &dir.path().join("b.wav"), None)
            .await;
        assert!(matches!(result, Err(SpeechError::AudioProcessing(_))));
        assert!(!codec.is_available().await);
    }

    #[tokio::test]
    async fn wav_codec_downmixes_and_resamples() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");
        let frames: Vec<(i16, i16)> = (0..8_000).map(|_| (1_000, 3_000)).collect();
        write_stereo_wav(&input, 8_000, &frames);

        WavCodec::new()
            .decode_to_wav(&input, &output, Some(16_000))
            .await
            .unwrap();

        let reader = hound::WavReader::open(&output).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_rate, 16_000);

        let pcm = read_pcm(&output).unwrap();
        assert_eq!(pcm.samples().len(), 16_000);
        assert!(pcm.samples().iter().all(|&s| s == 2_000));
    }

    #[tokio::test]
    async fn wav_codec_rejects_non_wav_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp3");
        std::fs::write(&input, b"ID3 definitely not wav").unwrap();

        let result = WavCodec::new()
            .decode_to_wav(&input, &dir.path().join("out.wav"), None)
            .await;
        assert!(matches!(result, Err(SpeechError::InvalidAudio(_))));
    }

    #[tokio::test]
    async fn wav_codec_cannot_encode_mp3() {
        let dir = tempfile::tempdir().unwrap();
        let result = WavCodec::new()
            .encode(&dir.path().join("a.wav"), &dir.path().join("b.mp3"), AudioFormat::Mp3)
            .await;
        assert!(matches!(result, Err(SpeechError::AudioProcessing(_))));
    }

    #[test]
    fn eight_bit_input_is_scaled_to_sixteen_bits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("u8.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 8,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..16_000 {
            let amplitude: i8 = if i < 8_000 { 2 } else { 120 };
            writer.write_sample(if i % 2 == 0 { amplitude } else { -amplitude }).unwrap();
        }
        writer.finalize().unwrap();

        let pcm = read_pcm(&path).unwrap();
        assert_eq!(pcm.samples()[0], 2 << 8);
        assert_eq!(pcm.samples()[8_000], 120 << 8);
        assert_eq!(pcm.samples()[8_001], -120 << 8);

        let assessment = crate::calibration::EnergyCalibration::default().assess(&pcm);
        assert!(assessment.has_speech());
    }

    #[test]
    fn rescale_keeps_samples_and_scales_rate() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");
        write_pcm(&input, &PcmAudio::new(vec![1, 2, 3, 4], 24_000)).unwrap();

        rescale_rate(&input, &output, 1.25).unwrap();

        let pcm = read_pcm(&output).unwrap();
        assert_eq!(pcm.sample_rate(), 30_000);
        assert_eq!(pcm.samples(), &[1, 2, 3, 4]);
    }

    #[test]
    fn rescale_rejects_non_positive_speed() {
        let dir = tempfile::tempdir().unwrap();
        let result = rescale_rate(&dir.path().join("a.wav"), &dir.path().join("b.wav"), 0.0);
        assert!(result.is_err());
    }

    #[test]
    fn resample_halves_and_doubles_length() {
        let pcm = PcmAudio::new(vec![0, 100, 200, 300], 16_000);
        assert_eq!(resample(&pcm, 32_000).samples().len(), 8);
        assert_eq!(resample(&pcm, 8_000).samples().len(), 2);
        assert_eq!(resample(&pcm, 8_000).samples(), &[0, 200]);
    }
}
