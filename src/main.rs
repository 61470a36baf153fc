//! depsync - keep manifest dependencies at their latest versions
//!
//! Supported manifests:
//! - pip (requirements.txt)
//! - gem (Gemfile)
//! - crate (Cargo.toml)
//! - npm (package.json)
//! - composer (composer.json)

use clap::Parser;
use depsync::cli::{CliArgs, RunConfig};
use depsync::engine::SyncEngine;
use depsync::manifest::create_adapter;
use depsync::output::create_reporter;
use depsync::progress::Progress;
use depsync::registry::{create_client, HttpClient};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

/// Exit status for configuration errors, matching clap's usage errors
const CONFIG_ERROR_EXIT: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config = match RunConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run 'depsync --help' for usage.");
            return ExitCode::from(CONFIG_ERROR_EXIT);
        }
    };

    if let Err(e) = depsync::logging::init(config.verbose) {
        eprintln!("Warning: failed to initialise logging: {}", e);
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(config: RunConfig) -> anyhow::Result<()> {
    let client = HttpClient::with_timeout(config.timeout)?;
    let adapter = create_adapter(config.dialect, config.manifest_options());
    let registry = create_client(config.dialect, client);
    let reporter = create_reporter(config.output, io::stdout().is_terminal());

    let mut engine = SyncEngine::new(adapter, registry, config.engine_config())
        .with_progress(Progress::new(config.progress));

    let records = engine.read()?;
    {
        let mut stdout = io::stdout().lock();
        reporter.announce(records.len(), &mut stdout)?;
        stdout.flush()?;
    }

    let outcome = engine.sync(records).await?;

    let mut stdout = io::stdout().lock();
    reporter.report(&outcome, &mut stdout)?;
    stdout.flush()?;

    Ok(())
}
