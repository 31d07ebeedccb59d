// src/main.rs
//! World Recorder
//!
//! Hosts an event recorder and reads operator `record` commands from stdin.
//! The optional first argument is a TOML configuration file.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use world_recorder::console::RecordConsole;
use world_recorder::logging::JsonlLayer;
use world_recorder::observability::{init_metrics, init_tracing};
use world_recorder::recording::EventRecorder;
use world_recorder::utils::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration before tracing so the transform layer can be installed
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    let jsonl = if config.transform.enable {
        Some(JsonlLayer::from_config(&config.transform)?)
    } else {
        None
    };

    init_tracing(jsonl)?;
    init_metrics()?;

    info!("Starting World Recorder v{}", world_recorder::VERSION);
    info!("Configuration loaded: {:?}", config);

    let recorder = Arc::new(EventRecorder::new(config.event_recorder.clone()));
    let console = RecordConsole::new(Arc::clone(&recorder));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) if line.trim().is_empty() => continue,
                    Ok(Some(line)) => {
                        for reply in console.handle(&line, None) {
                            println!("{}", reply);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Failed to read command: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal, cleaning up...");
                break;
            }
        }
    }

    recorder.shutdown();
    info!("Recorder stopped");

    Ok(())
}
