use anyhow::Result;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use api_ingress::{ApiIngress, ApiIngressConfig};
use runtime::{module_config_or_default, AppConfig, AppConfigProvider, CliArgs};
use submissions::Submissions;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Formlog Server - form submission intake backed by a document database
#[derive(Parser)]
#[command(name = "formlog-server")]
#[command(about = "Formlog Server - form submission intake backed by a document database")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Keep submissions in memory instead of the document database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Initialize logging
    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Formlog Server starting");

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Execute command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
    }
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let provider = AppConfigProvider::new(config.clone());
    let submissions = Submissions::init(&provider, args.mock)?;

    let ingress_cfg: ApiIngressConfig = module_config_or_default(&provider, ApiIngress::NAME)?;
    let ingress = ApiIngress::new(&config.server, ingress_cfg);
    let router = ingress.build_router(submissions.register_rest(axum::Router::new()));
    let listener = ingress.bind().await?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = runtime::shutdown::wait_for_shutdown().await {
            tracing::error!(error = %e, "signal handler failed; shutting down");
        }
        on_signal.cancel();
    });

    ApiIngress::serve(listener, router, cancel).await?;
    tracing::info!("Formlog Server stopped");
    Ok(())
}

fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    let provider = AppConfigProvider::new(config.clone());
    let _: ApiIngressConfig = module_config_or_default(&provider, ApiIngress::NAME)?;
    // Builds the sink too, so missing credentials fail here unless --mock is set
    Submissions::init(&provider, args.mock)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);

    Ok(())
}
