/// Blackboard - narrated animation generator
///
/// Turns a topic into a narrated Manim video: an LLM writes the narration
/// script and scene code, a TTS engine voices each narration line, manim
/// renders the scene against the measured audio durations, and failing scene
/// code is repaired by the model and retried within a bounded attempt budget.

pub mod audio;
pub mod classifier;
pub mod config;
pub mod creations;
pub mod llm;
pub mod orchestrator;
pub mod parser;
pub mod render;

// Re-export main types for easy access
pub use crate::audio::{AudioSynthesizer, CoquiSynthesizer};
pub use crate::classifier::classify_error;
pub use crate::config::{Config, ConfigBuilder, LlmConfig, Quality};
pub use crate::creations::{CreationItem, CreationLibrary};
pub use crate::llm::script::{LlmRepairClient, RepairClient, ScriptGenerator};
pub use crate::llm::LlmProvider;
pub use crate::orchestrator::{
    CancelToken, GenerationOrchestrator, GenerationRequest, GenerationResult, GenerationStatus,
};
pub use crate::parser::{extract_content, segment_narration, strip_code_fences, ParsedContent};
pub use crate::render::{ManimRenderer, RenderInvoker, RenderOutcome};
