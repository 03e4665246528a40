use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::llm::LlmProvider;

/// Configuration for the Blackboard generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Generation run settings (voice, quality, repair loop)
    pub generation: GenerationConfig,

    /// Manim renderer settings
    pub renderer: RendererConfig,

    /// Narration synthesis settings
    pub audio: AudioConfig,

    /// LLM service settings
    pub llm: LlmConfig,

    /// Creation library settings
    pub library: LibraryConfig,
}

/// Video quality presets, matching manim's quality flags and output layout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Quality {
    /// 480p at 15fps
    Low,
    /// 720p at 30fps
    Medium,
    /// 1080p at 60fps
    High,
    /// 2160p at 60fps
    UltraHd,
}

impl Quality {
    /// Flag character passed to `manim -q<flag>`
    pub fn flag(&self) -> char {
        match self {
            Quality::Low => 'l',
            Quality::Medium => 'm',
            Quality::High => 'h',
            Quality::UltraHd => 'k',
        }
    }

    /// Output directory component manim renders into for this preset
    pub fn dir_name(&self) -> &'static str {
        match self {
            Quality::Low => "480p15",
            Quality::Medium => "720p30",
            Quality::High => "1080p60",
            Quality::UltraHd => "2160p60",
        }
    }

    /// Parse a quality flag as given on the command line
    pub fn from_flag(flag: &str) -> Result<Self> {
        match flag {
            "l" => Ok(Quality::Low),
            "m" => Ok(Quality::Medium),
            "h" => Ok(Quality::High),
            "k" => Ok(Quality::UltraHd),
            other => Err(anyhow!("unknown quality flag '{}', expected l|m|h|k", other)),
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality::Medium
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Narrator voice identifier passed to the TTS engine
    pub voice: String,

    /// Render quality preset
    pub quality: Quality,

    /// Automatically repair failing animation code and retry
    pub use_repair_loop: bool,

    /// Total render attempts in repair-loop mode (first attempt + repairs)
    pub max_render_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Working directory for renders; audio and videos land under media/
    pub media_dir: PathBuf,

    /// Command used to invoke manim
    pub manim_command: String,

    /// Scene class name the generation prompt mandates
    pub scene_class: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Command used to invoke the Coqui TTS CLI
    pub tts_command: String,

    /// TTS model identifier
    pub model_name: String,

    /// Narration language code
    pub language: String,

    /// Command used to probe audio durations
    pub ffprobe_command: String,
}

/// LLM service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider to use
    pub provider: LlmProvider,

    /// API endpoint (for LM Studio and custom providers)
    pub endpoint: Option<String>,

    /// API key (for cloud providers)
    pub api_key: Option<String>,

    /// Model to use
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Video file extensions recognized as creations
    pub video_extensions: Vec<String>,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "blackboard.toml",
            "config/blackboard.toml",
            "~/.config/blackboard/config.toml",
            "/etc/blackboard/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(api_key) = std::env::var("BLACKBOARD_API_KEY") {
            config.llm.api_key = Some(api_key);
        }

        if let Ok(voice) = std::env::var("BLACKBOARD_VOICE") {
            config.generation.voice = voice;
        }

        if let Ok(quality) = std::env::var("BLACKBOARD_QUALITY") {
            config.generation.quality = Quality::from_flag(&quality)?;
        }

        if let Ok(media_dir) = std::env::var("BLACKBOARD_MEDIA_DIR") {
            config.renderer.media_dir = PathBuf::from(media_dir);
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.generation.max_render_attempts == 0 {
            return Err(anyhow!("max_render_attempts must be greater than 0"));
        }

        if self.generation.voice.trim().is_empty() {
            return Err(anyhow!("narrator voice must not be empty"));
        }

        if self.library.video_extensions.is_empty() {
            return Err(anyhow!("at least one video extension is required"));
        }

        match self.llm.provider {
            LlmProvider::OpenAi => {
                if self.llm.api_key.is_none() {
                    return Err(anyhow!("API key required for the OpenAI provider"));
                }
            }
            LlmProvider::LmStudio => {
                if self.llm.endpoint.is_none() {
                    return Err(anyhow!("endpoint required for the LM Studio provider"));
                }
            }
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Blackboard Configuration:\n\
            - Voice: {}\n\
            - Quality: {} ({})\n\
            - Repair Loop: {}\n\
            - Render Attempts: {}\n\
            - Media Directory: {}\n\
            - LLM Provider: {:?} ({})",
            self.generation.voice,
            self.generation.quality.flag(),
            self.generation.quality.dir_name(),
            self.generation.use_repair_loop,
            self.generation.max_render_attempts,
            self.renderer.media_dir.display(),
            self.llm.provider,
            self.llm.model,
        )
    }
}

/// Media directory the original app used: ~/Documents/Blackboard
fn default_media_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("Blackboard")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generation: GenerationConfig {
                voice: "Claribel Dervla".to_string(),
                quality: Quality::Medium,
                use_repair_loop: true,
                max_render_attempts: 3,
            },
            renderer: RendererConfig {
                media_dir: default_media_dir(),
                manim_command: "manim".to_string(),
                scene_class: "NarratedScene".to_string(),
            },
            audio: AudioConfig {
                tts_command: "tts".to_string(),
                model_name: "tts_models/multilingual/multi-dataset/xtts_v2".to_string(),
                language: "en".to_string(),
                ffprobe_command: "ffprobe".to_string(),
            },
            llm: LlmConfig {
                provider: LlmProvider::OpenAi,
                endpoint: None,
                api_key: None,
                model: "gpt-3.5-turbo".to_string(),
                max_tokens: 4096,
                temperature: 0.7,
                timeout_seconds: 120,
            },
            library: LibraryConfig {
                video_extensions: vec![
                    "mp4".to_string(),
                    "mov".to_string(),
                    "avi".to_string(),
                    "mkv".to_string(),
                    "m4v".to_string(),
                ],
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_voice(mut self, voice: String) -> Self {
        self.config.generation.voice = voice;
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.config.generation.quality = quality;
        self
    }

    pub fn with_repair_loop(mut self, enable: bool) -> Self {
        self.config.generation.use_repair_loop = enable;
        self
    }

    pub fn with_media_dir(mut self, dir: PathBuf) -> Self {
        self.config.renderer.media_dir = dir;
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.llm.api_key = Some(api_key);
        self
    }

    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        self.config.llm.provider = provider;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
