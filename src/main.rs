// ABOUTME: Entry point for the harbormaster CLI application.
// ABOUTME: Parses arguments, sets up logging, and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use harbormaster::config;
use harbormaster::deploy::DeployOptions;
use harbormaster::error::Result;
use harbormaster::output::Output;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut output = Output::new(cli.output_mode());
    output.start_timer();
    if let Err(e) = run(cli, &output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Init { application, force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, application.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::BackstopSnapshot { target, run } => {
            commands::backstop_snapshot(config, &target, run, output).await
        }
        Commands::BackstopCompare {
            target,
            reference,
            force_reference,
            run,
        } => {
            commands::backstop_compare(config, &target, &reference, force_reference, run, output)
                .await
        }
        Commands::Backup { target } => commands::backup(config, &target, output).await,
        Commands::LatestBackupUrl { target, kind } => {
            commands::latest_backup_url(config, &target, kind.as_deref(), output).await
        }
        Commands::Release {
            target,
            git_ref,
            ci_branch,
            flags,
        } => {
            commands::release(config, &target, &git_ref, ci_branch.as_deref(), &flags, output)
                .await
        }
        Commands::Deploy {
            target,
            git_ref,
            flags,
            cache_rebuild,
            force_unlock,
        } => {
            let options = DeployOptions {
                skip_maintenance: flags.skip_maintenance,
                refresh_db: flags.refresh_db,
                cache_rebuild,
                force_unlock,
            };
            commands::deploy(config, &target, &git_ref, options, output).await
        }
        Commands::PreviewRebuild { branch } => {
            commands::preview_rebuild(config, &branch, output).await
        }
    }
}
