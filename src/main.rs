//! wavetap: live microphone monitor with sliding-window WAV export.
//!
//! Captures mono audio from an input device, keeps only the most recent few
//! seconds in a sliding window, draws the window as a real-time terminal
//! waveform, and writes it out as an uncompressed WAV file on demand.

mod capture;
mod commands;
mod config;
mod export;
mod logging;
mod ui;
mod wav;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wavetap",
    version,
    about = "Live microphone monitor with sliding-window WAV export"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor the microphone and export the window on demand (default)
    Record,
    /// List available audio input devices
    ListDevices,
    /// Open the configuration file in your preferred editor
    Config,
    /// Show recent log entries
    Logs,
}

fn main() -> anyhow::Result<()> {
    logging::init_logging()?;

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Record) {
        Commands::Record => commands::handle_record(),
        Commands::ListDevices => commands::handle_list_devices(),
        Commands::Config => commands::handle_config(),
        Commands::Logs => commands::handle_logs(),
    }
}
