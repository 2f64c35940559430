//! CLI argument definitions.

use crate::config::InferenceDevice;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Flower and insect recognition service with EXIF geolocation.
#[derive(Debug, Parser)]
#[command(name = "bugbloom")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only show warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the models and start the HTTP service.
    Serve(ServeArgs),
    /// Print the GPS position stored in image EXIF data.
    Locate {
        /// Image files to inspect.
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Emit a JSON envelope instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage models.
    Models {
        /// Models action to perform.
        #[command(subcommand)]
        action: ModelsAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Models subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ModelsAction {
    /// Verify model and label files exist.
    Check,
}

/// Overrides for the `serve` command.
#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Listen host (overrides config).
    #[arg(long, env = "BUGBLOOM_HOST")]
    pub host: Option<String>,

    /// Listen port (overrides config).
    #[arg(short, long, env = "BUGBLOOM_PORT")]
    pub port: Option<u16>,

    /// API key expected in the `x-api-key` header (overrides config).
    #[arg(long, env = "BUGBLOOM_API_KEY", hide_env_values = true, value_parser = parse_api_key)]
    pub api_key: Option<String>,

    /// Inference device (overrides config).
    #[arg(long, value_enum, env = "BUGBLOOM_DEVICE")]
    pub device: Option<InferenceDevice>,

    /// Skip GBIF taxonomy lookups.
    #[arg(long)]
    pub no_taxonomy: bool,
}

fn parse_api_key(s: &str) -> Result<String, String> {
    let key = s.trim();
    if key.is_empty() {
        return Err("API key must not be empty".to_string());
    }
    Ok(key.to_string())
}
