use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::{Quality, RendererConfig};

/// Outcome of one render attempt.
///
/// An empty diagnostic means success with a valid artifact path; a non-empty
/// diagnostic means failure, in which case the path is empty unless the
/// renderer left a partial artifact behind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderOutcome {
    pub artifact_path: String,
    pub diagnostic: String,
}

impl RenderOutcome {
    pub fn success(artifact_path: String) -> Self {
        Self {
            artifact_path,
            diagnostic: String::new(),
        }
    }

    pub fn failure(diagnostic: String) -> Self {
        Self {
            artifact_path: String::new(),
            diagnostic,
        }
    }

    pub fn is_success(&self) -> bool {
        self.diagnostic.is_empty()
    }
}

/// Boundary contract for the external rendering engine.
///
/// `durations` is index-aligned with the narration segments: duration `i`
/// replaces the `#DURATION_i#` placeholder in the animation source.
#[async_trait]
pub trait RenderInvoker: Send + Sync {
    async fn render(
        &self,
        source: &str,
        durations: &[f64],
        name: &str,
        quality: Quality,
    ) -> RenderOutcome;
}

/// Replace `#DURATION_i#` placeholders with measured audio durations.
/// Placeholders without a matching duration index are left untouched.
pub fn substitute_durations(source: &str, durations: &[f64]) -> String {
    let mut code = source.to_string();
    for (i, duration) in durations.iter().enumerate() {
        code = code.replace(&format!("#DURATION_{}#", i), &duration.to_string());
    }
    code
}

/// Renders scenes by shelling out to manim in the media directory.
pub struct ManimRenderer {
    config: RendererConfig,
}

impl ManimRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Path manim writes the finished video to for a given scene and quality.
    pub fn artifact_path(&self, name: &str, quality: Quality) -> PathBuf {
        self.config
            .media_dir
            .join("media")
            .join("videos")
            .join(name)
            .join(quality.dir_name())
            .join(format!("{}.mp4", self.config.scene_class))
    }

    async fn run_manim(&self, name: &str, quality: Quality) -> std::io::Result<std::process::Output> {
        tokio::process::Command::new(&self.config.manim_command)
            .arg(format!("-q{}", quality.flag()))
            .arg(format!("{}.py", name))
            .arg(&self.config.scene_class)
            .current_dir(&self.config.media_dir)
            .output()
            .await
    }
}

#[async_trait]
impl RenderInvoker for ManimRenderer {
    async fn render(
        &self,
        source: &str,
        durations: &[f64],
        name: &str,
        quality: Quality,
    ) -> RenderOutcome {
        let code = substitute_durations(source, durations);
        let scene_path = self.config.media_dir.join(format!("{}.py", name));

        info!("🎬 Rendering scene '{}' at {}", name, quality.dir_name());
        debug!("Writing scene file to {}", scene_path.display());

        if let Err(e) = tokio::fs::create_dir_all(&self.config.media_dir).await {
            return RenderOutcome::failure(format!("failed to create media directory: {}", e));
        }

        if let Err(e) = tokio::fs::write(&scene_path, &code).await {
            return RenderOutcome::failure(format!("failed to write scene file: {}", e));
        }

        let output = self.run_manim(name, quality).await;

        // The scene file is only input to manim; remove it regardless of the result.
        if let Err(e) = tokio::fs::remove_file(&scene_path).await {
            debug!("Could not remove scene file {}: {}", scene_path.display(), e);
        }

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                return RenderOutcome::failure(format!(
                    "failed to launch renderer '{}': {}",
                    self.config.manim_command, e
                ))
            }
        };

        let artifact = self.artifact_path(name, quality);

        if !output.status.success() {
            let mut stderr = String::from_utf8_lossy(&output.stderr).to_string();
            if stderr.trim().is_empty() {
                stderr = String::from_utf8_lossy(&output.stdout).to_string();
            }
            warn!("❌ Render failed for '{}' ({})", name, output.status);

            // A failing run can still leave a partial artifact; pass it along.
            let artifact_path = if artifact.exists() {
                artifact.to_string_lossy().to_string()
            } else {
                String::new()
            };
            return RenderOutcome {
                artifact_path,
                diagnostic: stderr,
            };
        }

        if !artifact.exists() {
            return RenderOutcome::failure(format!(
                "renderer reported success but no artifact at {}",
                artifact.display()
            ));
        }

        info!("✅ Rendered {}", artifact.display());
        RenderOutcome::success(artifact.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(media_dir: PathBuf) -> ManimRenderer {
        ManimRenderer::new(RendererConfig {
            media_dir,
            manim_command: "manim".to_string(),
            scene_class: "NarratedScene".to_string(),
        })
    }

    #[test]
    fn test_substitute_durations() {
        let source = "self.wait(#DURATION_0#)\nself.wait(#DURATION_1#)\nself.wait(#DURATION_2#)";
        let substituted = substitute_durations(source, &[1.5, 2.25]);

        assert!(substituted.contains("self.wait(1.5)"));
        assert!(substituted.contains("self.wait(2.25)"));
        // No third duration was measured; the placeholder stays.
        assert!(substituted.contains("#DURATION_2#"));
    }

    #[test]
    fn test_substitute_durations_empty() {
        assert_eq!(substitute_durations("self.wait(1)", &[]), "self.wait(1)");
    }

    #[test]
    fn test_artifact_path_layout() {
        let renderer = renderer(PathBuf::from("/home/user/Documents/Blackboard"));
        let path = renderer.artifact_path("PythagoreanTheorem", Quality::Medium);

        assert_eq!(
            path,
            PathBuf::from(
                "/home/user/Documents/Blackboard/media/videos/PythagoreanTheorem/720p30/NarratedScene.mp4"
            )
        );
    }

    #[tokio::test]
    async fn test_render_with_missing_command_reports_failure() {
        let temp = tempfile::TempDir::new().unwrap();
        let renderer = ManimRenderer::new(RendererConfig {
            media_dir: temp.path().to_path_buf(),
            manim_command: "definitely-not-a-real-manim-binary".to_string(),
            scene_class: "NarratedScene".to_string(),
        });
        let outcome = renderer
            .render("from manim import *", &[1.0], "Scene", Quality::Low)
            .await;

        assert!(!outcome.is_success());
        assert!(outcome.artifact_path.is_empty());
        assert!(outcome.diagnostic.contains("failed to launch renderer"));
    }
}
