use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::AudioConfig;

/// Boundary contract for narration synthesis.
///
/// Returns one duration (seconds) per segment, index-aligned: segment `i`
/// produces `media/audio/line_i.wav` and its duration fills the
/// `#DURATION_i#` placeholder in the animation source.
#[async_trait]
pub trait AudioSynthesizer: Send + Sync {
    async fn synthesize(&self, segments: &[String], voice: &str) -> Result<Vec<f64>>;
}

/// Synthesizes narration clips with the Coqui TTS CLI and measures each clip
/// with ffprobe.
pub struct CoquiSynthesizer {
    config: AudioConfig,
    audio_dir: PathBuf,
}

impl CoquiSynthesizer {
    /// `media_dir` is the render working directory; clips land in
    /// `media/audio/` beneath it so the generated scene's relative
    /// `add_sound` paths resolve.
    pub fn new(config: AudioConfig, media_dir: PathBuf) -> Self {
        let audio_dir = media_dir.join("media").join("audio");
        Self { config, audio_dir }
    }

    async fn synthesize_clip(&self, sentence: &str, voice: &str, path: &Path) -> Result<()> {
        let output = tokio::process::Command::new(&self.config.tts_command)
            .arg("--model_name")
            .arg(&self.config.model_name)
            .arg("--text")
            .arg(sentence)
            .arg("--speaker_idx")
            .arg(voice)
            .arg("--language_idx")
            .arg(&self.config.language)
            .arg("--out_path")
            .arg(path)
            .output()
            .await
            .map_err(|e| anyhow!("failed to launch '{}': {}", self.config.tts_command, e))?;

        if !output.status.success() {
            return Err(anyhow!(
                "speech synthesis failed for {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        Ok(())
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64> {
        let output = tokio::process::Command::new(&self.config.ffprobe_command)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| anyhow!("failed to launch '{}': {}", self.config.ffprobe_command, e))?;

        if !output.status.success() {
            return Err(anyhow!("ffprobe failed for {}", path.display()));
        }

        parse_duration_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse ffprobe's single-value duration output.
pub fn parse_duration_output(stdout: &str) -> Result<f64> {
    stdout
        .trim()
        .parse::<f64>()
        .map_err(|e| anyhow!("unparseable ffprobe duration {:?}: {}", stdout.trim(), e))
}

#[async_trait]
impl AudioSynthesizer for CoquiSynthesizer {
    async fn synthesize(&self, segments: &[String], voice: &str) -> Result<Vec<f64>> {
        tokio::fs::create_dir_all(&self.audio_dir).await?;

        info!(
            "🎙️ Synthesizing {} narration lines with voice '{}'",
            segments.len(),
            voice
        );

        let mut durations = Vec::with_capacity(segments.len());
        for (i, sentence) in segments.iter().enumerate() {
            let clip_path = self.audio_dir.join(format!("line_{}.wav", i));
            self.synthesize_clip(sentence, voice, &clip_path).await?;

            let duration = self.probe_duration(&clip_path).await?;
            debug!("line_{}.wav: {:.2}s", i, duration);
            durations.push(duration);
        }

        Ok(durations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_output() {
        assert_eq!(parse_duration_output("4.2215\n").unwrap(), 4.2215);
        assert_eq!(parse_duration_output("  0.5 ").unwrap(), 0.5);
        assert!(parse_duration_output("N/A").is_err());
        assert!(parse_duration_output("").is_err());
    }

    #[test]
    fn test_audio_dir_layout() {
        let synthesizer = CoquiSynthesizer::new(
            crate::config::Config::default().audio,
            PathBuf::from("/tmp/blackboard"),
        );
        assert_eq!(
            synthesizer.audio_dir,
            PathBuf::from("/tmp/blackboard/media/audio")
        );
    }

    #[tokio::test]
    async fn test_synthesize_with_missing_command_errors() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut config = crate::config::Config::default().audio;
        config.tts_command = "definitely-not-a-real-tts-binary".to_string();

        let synthesizer = CoquiSynthesizer::new(config, temp.path().to_path_buf());
        let result = synthesizer
            .synthesize(&["One sentence.".to_string()], "Claribel Dervla")
            .await;

        assert!(result.is_err());
    }
}
