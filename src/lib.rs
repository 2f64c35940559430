//! Bugbloom - flower and insect recognition service.
//!
//! This crate extracts GPS positions from image EXIF data and serves ONNX
//! flower/insect predictions, enriched with GBIF taxonomy, over HTTP.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod inference;
pub mod output;
pub mod prediction;
pub mod reference;
pub mod server;
pub mod taxonomy;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, ModelsAction, ServeArgs};
use config::{
    Config, classifier_model, config_file_path, detector_model, load_default_config,
    save_default_config, validate_classifier_files, validate_config, validate_detector_files,
};
use geo::{ExifDictionary, extract_geolocation};
use output::{EventType, GeolocationPayload, JsonEnvelope, LocatedFile};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use error::{Error, Result};

/// Main entry point for bugbloom CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let config = load_default_config()?;

    match cli.command {
        Command::Serve(args) => handle_serve(&args, config),
        Command::Locate { images, json } => handle_locate(&images, json),
        Command::Config { action } => handle_config_command(action),
        Command::Models { action } => handle_models_command(action, &config),
    }
}

/// Initialize logging based on verbosity.
fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // ORT is noisy about CUDA fallback in auto mode; -v and up let it through.
    let filter_str = if quiet {
        "warn,ort=off".to_string()
    } else {
        match verbose {
            0 => "info,ort=off".to_string(),
            1 => "debug,ort=warn,hyper=info,reqwest=info".to_string(),
            2 => "trace,ort=info".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_serve_overrides(mut config: Config, args: &ServeArgs) -> Result<Config> {
    if let Some(host) = &args.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(key) = &args.api_key {
        config.server.api_key.clone_from(key);
    }
    if let Some(device) = args.device {
        config.inference.device = device;
    }
    if args.no_taxonomy {
        config.taxonomy.enabled = false;
    }

    validate_config(&config)?;
    Ok(config)
}

fn handle_serve(args: &ServeArgs, config: Config) -> Result<()> {
    let config = apply_serve_overrides(config, args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal {
            message: format!("Failed to create async runtime: {e}"),
        })?;

    runtime.block_on(server::serve(&config))
}

fn locate_file(path: &Path) -> LocatedFile {
    match std::fs::read(path) {
        Ok(bytes) => {
            let exif = ExifDictionary::from_bytes(&bytes);
            LocatedFile {
                file: path.to_path_buf(),
                location: extract_geolocation(&exif),
                error: None,
            }
        }
        Err(e) => {
            warn!("Failed to read {}: {e}", path.display());
            LocatedFile {
                file: path.to_path_buf(),
                location: None,
                error: Some(e.to_string()),
            }
        }
    }
}

fn handle_locate(images: &[PathBuf], json: bool) -> Result<()> {
    let located: Vec<LocatedFile> = images.iter().map(|path| locate_file(path)).collect();
    debug!("Located {} files", located.len());

    if json {
        let event = if located.iter().all(|f| f.error.is_some()) {
            EventType::Error
        } else {
            EventType::Result
        };
        return JsonEnvelope::new(event, GeolocationPayload::new(located))
            .write_line(std::io::stdout().lock());
    }

    let mut failed = 0;
    for file in &located {
        match (&file.location, &file.error) {
            (_, Some(e)) => {
                println!("{}: error: {e}", file.file.display());
                failed += 1;
            }
            (Some(point), None) => println!("{}: {point}", file.file.display()),
            (None, None) => println!("{}: no geolocation", file.file.display()),
        }
    }

    if failed > 0 {
        return Err(Error::ImageRead { count: failed });
    }
    Ok(())
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let saved_path = save_default_config(&Config::default())?;
                println!("Created configuration file: {}", saved_path.display());
                println!("\nNext steps:");
                println!("  Add [models.flower], [models.insect] and [models.detector] sections,");
                println!("  then run 'bugbloom models check'.");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            let text = toml::to_string_pretty(&config)
                .map_err(|e| Error::ConfigSerialize { source: e })?;
            println!("{text}");
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", config_file_path()?.display());
            Ok(())
        }
    }
}

fn handle_models_command(action: ModelsAction, config: &Config) -> Result<()> {
    match action {
        ModelsAction::Check => {
            validate_config(config)?;

            for role in ["flower", "insect"] {
                let model = classifier_model(config, role)?;
                validate_classifier_files(model)?;
                println!("  {role}: OK ({})", model.path.display());
            }

            let detector = detector_model(config)?;
            validate_detector_files(detector)?;
            println!("  detector: OK ({})", detector.path.display());

            info!("All models present");
            Ok(())
        }
    }
}
