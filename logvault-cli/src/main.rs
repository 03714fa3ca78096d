use std::path::Path;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use tracing::{info, warn};

use logvault_cli::cli::{Cli, Commands};
use logvault_cli::commands::{self, QueryContext};
use logvault_cli::error::CliError;
use logvault_cli::logging::init_tracing;
use logvault_cli::output::OutputWriter;
use logvault_cli::retry::RetryPolicy;
use logvault_client::{CancellationToken, Client};
use logvault_core::config::{GeneralConfig, LogvaultConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut general = logging_config(&cli.config).await;
    if let Some(level) = cli.log_level.clone() {
        general.log_level = level;
    }
    init_tracing(&general).map_err(|e| CliError::Config(e.to_string()))?;

    info!(config = %cli.config.display(), "logvault starting");
    let writer = OutputWriter::new(cli.output);

    let retry = RetryPolicy::new(cli.retries, Duration::from_millis(cli.retry_delay_ms));
    match cli.command {
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
        command => {
            let config = LogvaultConfig::load(&cli.config).await?;
            let client = Client::from_config(&config.client)?;
            let ctx = QueryContext::new(client, config.query)
                .with_retry(retry)
                .with_cancel(interrupt_token());
            dispatch(command, &ctx, &writer).await
        }
    }
}

async fn dispatch(
    command: Commands,
    ctx: &QueryContext,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match command {
        Commands::Logs(args) => commands::logs::execute(args, ctx, writer).await,
        Commands::Flows(args) => commands::flows::execute(args, ctx, writer).await,
        Commands::Audit(args) => commands::audit::execute(args, ctx, writer).await,
        Commands::Benchmarks(args) => commands::benchmarks::execute(args, ctx, writer).await,
        Commands::Reports(args) => commands::reports::execute(args, ctx, writer).await,
        Commands::Threatfeeds(args) => commands::threatfeeds::execute(args, ctx, writer).await,
        Commands::Config(_) => Err(CliError::Command(
            "config is handled before connecting".to_owned(),
        )),
    }
}

/// `[general]` section for logging. A missing or invalid file falls back to
/// defaults so that `config validate` can still report the problem.
async fn logging_config(path: &Path) -> GeneralConfig {
    match LogvaultConfig::load(path).await {
        Ok(config) => config.general,
        Err(_) => GeneralConfig::default(),
    }
}

/// Token cancelled on Ctrl-C; in-flight queries stop at their next page.
fn interrupt_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling query");
            token.cancel();
        }
    });
    cancel
}
