use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "talaria",
    version,
    about = "Live voice-session demo with a one-plus-one tool call"
)]
pub struct Cli {
    /// Path to a live session TOML config.
    #[arg(long)]
    pub config: Option<String>,
    /// Override the configured live model id.
    #[arg(long)]
    pub model: Option<String>,
    /// Pretend the microphone permission was refused.
    #[arg(long)]
    pub deny_mic: bool,
}
