mod cli;

use std::env;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use cli::Cli;
use talaria_core::{
    LiveConfig, PermissionProbe, ScriptedBackend, SessionController, StaticProbe, ToolRegistry,
    Transcript,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    init_tracing();
    info!("Starting talaria");

    let cli = Cli::parse();
    debug!(config = ?cli.config, model = ?cli.model, deny_mic = cli.deny_mic, "CLI arguments parsed");

    let config_path = cli.config.as_deref().map(Path::new);
    let mut config = LiveConfig::load(config_path)?;
    if let Some(model) = cli.model.clone().or_else(|| env::var("TALARIA_MODEL").ok()) {
        config.model = model;
    }
    info!(model = %config.model, "Live configuration ready");

    let probe: Arc<dyn PermissionProbe> = if cli.deny_mic {
        Arc::new(StaticProbe::denied())
    } else {
        Arc::new(StaticProbe::granted())
    };

    let transcript = Transcript::new();
    let backend = ScriptedBackend::new();
    let controller = SessionController::new(
        backend.clone(),
        probe,
        Arc::new(ToolRegistry::builtin()),
        config,
        transcript.clone(),
    );

    println!("Press Enter to toggle the conversation, type to talk, 'quit' to exit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut printed = 0usize;

    loop {
        printed = drain_transcript(&transcript, printed);
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();

        if line == "quit" {
            break;
        }

        if line.is_empty() {
            let outcome = if controller.is_active().await {
                controller.stop().await
            } else {
                controller.start().await
            };
            if let Err(err) = outcome {
                println!("error: {}", err.user_message());
            }
            continue;
        }

        if controller.is_active().await {
            if let Some(session) = backend.session() {
                println!("model: {}", session.utter(&line));
            }
        } else {
            println!("(no active conversation; press Enter to start one)");
        }
    }

    if controller.is_active().await {
        if let Err(err) = controller.stop().await {
            println!("error: {}", err.user_message());
        }
    }
    drain_transcript(&transcript, printed);
    info!("talaria finished");
    Ok(())
}

fn drain_transcript(transcript: &Transcript, from: usize) -> usize {
    let entries = transcript.snapshot();
    for entry in &entries[from..] {
        println!("[{}] {}", entry.at.format("%H:%M:%S"), entry.text);
    }
    entries.len()
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
