use anyhow::Result;
use clap::{Arg, Command};
use std::sync::Arc;
use tracing::{error, info, warn};

mod audio;
mod classifier;
mod config;
mod creations;
mod llm;
mod orchestrator;
mod parser;
mod render;

use crate::audio::CoquiSynthesizer;
use crate::config::{Config, Quality};
use crate::creations::CreationLibrary;
use crate::llm::prompts::GENERATION_SYSTEM_PROMPT;
use crate::llm::script::{LlmRepairClient, ScriptGenerator};
use crate::orchestrator::{GenerationOrchestrator, GenerationRequest, GenerationStatus};
use crate::render::ManimRenderer;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("blackboard=info,warn")
        .init();

    let matches = Command::new("Blackboard")
        .version("0.1.0")
        .about("Narrated animation generator: LLM scripting, TTS narration, and a Manim render/repair loop")
        .arg(
            Arg::new("topic")
                .short('t')
                .long("topic")
                .value_name("TOPIC")
                .help("Topic to generate an animation for")
        )
        .arg(
            Arg::new("response-file")
                .short('r')
                .long("response-file")
                .value_name("FILE")
                .help("Process a saved model response instead of calling the LLM")
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .value_name("NAME")
                .help("Display name for the creation (defaults to the topic)")
        )
        .arg(
            Arg::new("quality")
                .short('q')
                .long("quality")
                .value_name("l|m|h|k")
                .help("Render quality preset")
        )
        .arg(
            Arg::new("voice")
                .long("voice")
                .value_name("VOICE")
                .help("Narrator voice identifier")
        )
        .arg(
            Arg::new("no-repair")
                .long("no-repair")
                .help("Disable the automatic code repair loop")
                .action(clap::ArgAction::SetTrue)
        )
        .arg(
            Arg::new("print-prompt")
                .long("print-prompt")
                .help("Print the generation prompt for manual use and exit")
                .action(clap::ArgAction::SetTrue)
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("List finished creations in the media library")
                .action(clap::ArgAction::SetTrue)
        )
        .get_matches();

    // Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    if let Some(quality) = matches.get_one::<String>("quality") {
        config.generation.quality = Quality::from_flag(quality)?;
    }
    if let Some(voice) = matches.get_one::<String>("voice") {
        config.generation.voice = voice.clone();
    }
    if matches.get_flag("no-repair") {
        config.generation.use_repair_loop = false;
    }

    if matches.get_flag("print-prompt") {
        println!("{}", GENERATION_SYSTEM_PROMPT);
        if let Some(topic) = matches.get_one::<String>("topic") {
            println!("\nUser message:\n{}", topic);
        }
        return Ok(());
    }

    if matches.get_flag("list") {
        let library = CreationLibrary::new(&config.renderer.media_dir, &config.library);
        let creations = library.scan().await?;

        if creations.is_empty() {
            println!("No creations yet");
            return Ok(());
        }
        for creation in creations {
            println!(
                "{}  {} ({})  {}",
                creation.created.format("%Y-%m-%d %H:%M"),
                creation.topic,
                creation.quality,
                creation.video_path.display()
            );
        }
        return Ok(());
    }

    let topic = matches.get_one::<String>("topic");
    let response_file = matches.get_one::<String>("response-file");

    let (raw_response, display_name) = match (topic, response_file) {
        (_, Some(path)) => {
            let response = tokio::fs::read_to_string(path).await?;
            let name = matches
                .get_one::<String>("name")
                .cloned()
                .or_else(|| topic.cloned())
                .unwrap_or_else(|| "Creation".to_string());
            (response, name)
        }
        (Some(topic), None) => {
            config.validate()?;
            let generator = ScriptGenerator::new(&config.llm)?;
            let response = generator.generate(topic).await?;
            let name = matches
                .get_one::<String>("name")
                .cloned()
                .unwrap_or_else(|| topic.clone());
            (response, name)
        }
        (None, None) => {
            error!("Nothing to do: pass --topic or --response-file (see --help)");
            return Err(anyhow::anyhow!("no topic or response file given"));
        }
    };

    info!("🚀 Blackboard starting...");
    info!("🎯 Creation: {}", display_name);
    info!(
        "⚙️  Quality: {}, voice: {}, repair loop: {}",
        config.generation.quality.dir_name(),
        config.generation.voice,
        config.generation.use_repair_loop
    );

    let renderer = Arc::new(ManimRenderer::new(config.renderer.clone()));
    let repair_client = Arc::new(LlmRepairClient::new(&config.llm)?);
    let synthesizer = Arc::new(CoquiSynthesizer::new(
        config.audio.clone(),
        config.renderer.media_dir.clone(),
    ));

    let orchestrator = GenerationOrchestrator::new(renderer, repair_client, synthesizer);

    let request = GenerationRequest {
        raw_response,
        display_name,
        use_repair_loop: config.generation.use_repair_loop,
    };

    let result = orchestrator.run(&request, &config.generation).await;

    match result.status {
        GenerationStatus::Completed => {
            info!(
                "🎉 Animation generated in {} attempt(s): {}",
                result.render_attempts, result.artifact_path
            );
            println!("{}", result.artifact_path);
            Ok(())
        }
        GenerationStatus::Cancelled => {
            warn!("Generation cancelled");
            Err(anyhow::anyhow!("generation cancelled"))
        }
        GenerationStatus::Failed => {
            error!(
                "❌ Generation failed after {} render attempt(s)",
                result.render_attempts
            );
            eprintln!("{}", result.diagnostic);
            if !result.artifact_path.is_empty() {
                warn!("Partial artifact left at {}", result.artifact_path);
            }
            Err(anyhow::anyhow!("generation failed"))
        }
    }
}
