//! skelfit CLI - embed a skeleton into a mesh and export the rig.
//!
//! Usage: skelfit <filename> [options]
//!
//! Writes `skeleton.out` and `attachment.out` into the output directory.
//! Set `RUST_LOG` (e.g. `RUST_LOG=skelfit=debug`) for diagnostics.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use skelfit::config::{RunConfiguration, UsageExitCode, USAGE};
use skelfit::error::ConfigError;
use skelfit::pipeline::Pipeline;

fn main() -> ExitCode {
    init_logging();

    let tokens: Vec<String> = std::env::args().collect();
    let config = match RunConfiguration::from_tokens(&tokens) {
        Ok(config) => config,
        Err(ConfigError::Usage(message)) => {
            println!("{}", message);
            println!("{}", USAGE);
            return ExitCode::from(UsageExitCode::from_env().0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for notice in &config.notices {
        println!("{}", notice);
    }

    match Pipeline::default().run(&config) {
        Ok(report) => {
            println!(
                "Export completed: {}, {}",
                report.paths.skeleton.display(),
                report.paths.attachment.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            if e.is_load_failure() {
                eprintln!("Error reading file. Aborting.");
            } else if e.is_embedding_failure() {
                eprintln!("Error embedding. Aborting.");
            }
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
