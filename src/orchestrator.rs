use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::audio::AudioSynthesizer;
use crate::classifier::classify_error;
use crate::config::GenerationConfig;
use crate::llm::script::RepairClient;
use crate::parser;
use crate::render::RenderInvoker;

/// Input for one orchestration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Raw model response in the `-NARRATION-`/`-MANIM-` layout
    pub raw_response: String,

    /// Human-readable topic name; sanitized into the scene name
    pub display_name: String,

    /// Repair failing animation code automatically instead of giving up
    pub use_repair_loop: bool,
}

/// Terminal state of a generation run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GenerationStatus {
    Completed,
    Failed,
    Cancelled,
}

/// Externally visible result of one full run.
///
/// On `Completed` the artifact path is valid and the diagnostic empty. On
/// `Failed` the diagnostic is the classified error; the artifact path is
/// normally empty but carries the last render's partial artifact when the
/// repair loop exhausted its attempt budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub artifact_path: String,
    pub diagnostic: String,
    pub status: GenerationStatus,
    pub render_attempts: u32,
}

impl GenerationResult {
    fn completed(artifact_path: String, render_attempts: u32) -> Self {
        Self {
            artifact_path,
            diagnostic: String::new(),
            status: GenerationStatus::Completed,
            render_attempts,
        }
    }

    fn failed(diagnostic: String, render_attempts: u32) -> Self {
        Self {
            artifact_path: String::new(),
            diagnostic,
            status: GenerationStatus::Failed,
            render_attempts,
        }
    }

    fn cancelled(render_attempts: u32) -> Self {
        Self {
            artifact_path: String::new(),
            diagnostic: String::new(),
            status: GenerationStatus::Cancelled,
            render_attempts,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == GenerationStatus::Completed
    }
}

/// Cloneable cancellation flag checked between suspension points.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scene name derived from the display name: whitespace-delimited words
/// capitalized and concatenated, safe for filenames and Python identifiers.
pub fn sanitize_scene_name(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Drives one generation run: parse, segment, synthesize narration, render,
/// and repair-retry within the configured attempt budget.
///
/// Every lower-level failure is converted into a `GenerationResult`; `run`
/// never returns an error. Per-run state lives on the `run` stack, so a
/// cloned orchestrator can serve concurrent runs independently.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    renderer: Arc<dyn RenderInvoker>,
    repair_client: Arc<dyn RepairClient>,
    synthesizer: Arc<dyn AudioSynthesizer>,
    cancel: CancelToken,
}

impl GenerationOrchestrator {
    pub fn new(
        renderer: Arc<dyn RenderInvoker>,
        repair_client: Arc<dyn RepairClient>,
        synthesizer: Arc<dyn AudioSynthesizer>,
    ) -> Self {
        Self {
            renderer,
            repair_client,
            synthesizer,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token the host can use to stop the run at its next checkpoint.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub async fn run(
        &self,
        request: &GenerationRequest,
        settings: &GenerationConfig,
    ) -> GenerationResult {
        info!("🚀 Starting generation for '{}'", request.display_name);

        let parsed = match parser::extract_content(&request.raw_response) {
            Ok(parsed) => parsed,
            Err(e) => {
                // A malformed response cannot be fixed by the repair loop:
                // repair only ever resubmits animation source, not narration.
                warn!("Malformed model response (code {}): {}", e.code(), e);
                return GenerationResult::failed(e.to_string(), 0);
            }
        };

        let segments = parser::segment_narration(&parsed.narration);
        let scene_name = sanitize_scene_name(&request.display_name);
        debug!(
            "Scene '{}' with {} narration segments",
            scene_name,
            segments.len()
        );

        let durations = match self
            .synthesizer
            .synthesize(&segments, &settings.voice)
            .await
        {
            Ok(durations) => durations,
            Err(e) => {
                warn!("Narration synthesis failed: {}", e);
                return GenerationResult::failed(classify_error(&e.to_string()), 0);
            }
        };

        if self.cancel.is_cancelled() {
            info!("🛑 Generation cancelled before rendering");
            return GenerationResult::cancelled(0);
        }

        let mut source = parsed.animation_source;

        if !request.use_repair_loop {
            let outcome = self
                .renderer
                .render(&source, &durations, &scene_name, settings.quality)
                .await;
            return if outcome.is_success() {
                GenerationResult::completed(outcome.artifact_path, 1)
            } else {
                // Single-attempt mode discards any partial artifact.
                GenerationResult::failed(classify_error(&outcome.diagnostic), 1)
            };
        }

        let max_attempts = settings.max_render_attempts.max(1);
        let mut last_artifact = String::new();
        let mut last_diagnostic = String::new();

        for attempt in 1..=max_attempts {
            if self.cancel.is_cancelled() {
                info!("🛑 Generation cancelled before render attempt {}", attempt);
                return GenerationResult::cancelled(attempt - 1);
            }

            let outcome = self
                .renderer
                .render(&source, &durations, &scene_name, settings.quality)
                .await;
            if outcome.is_success() {
                info!("🎉 Render succeeded on attempt {}", attempt);
                return GenerationResult::completed(outcome.artifact_path, attempt);
            }

            last_diagnostic = classify_error(&outcome.diagnostic);
            last_artifact = outcome.artifact_path;
            warn!("Render attempt {}/{} failed", attempt, max_attempts);

            if attempt == max_attempts {
                break;
            }

            if self.cancel.is_cancelled() {
                info!("🛑 Generation cancelled before repair");
                return GenerationResult::cancelled(attempt);
            }

            match self.repair_client.repair(&source, &last_diagnostic).await {
                Ok(replacement) => {
                    source = parser::strip_code_fences(&replacement);
                }
                Err(e) => {
                    // The render diagnostic is what a human can act on; the
                    // repair-service error is logged and dropped.
                    warn!("Repair request failed, abandoning run: {}", e);
                    return GenerationResult::failed(last_diagnostic, attempt);
                }
            }
        }

        info!("❌ All {} render attempts failed", max_attempts);
        GenerationResult {
            // Pass a partial artifact through unmodified, if the renderer
            // produced one on the last attempt.
            artifact_path: last_artifact,
            diagnostic: last_diagnostic,
            status: GenerationStatus::Failed,
            render_attempts: max_attempts,
        }
    }
}
