//! ProxySync entry point.

mod app;
mod config;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "proxysync",
    version,
    about = "Mirror the system proxy settings into user environment variables"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start ProxySync automatically at login.
    #[command(alias = "i")]
    Install,
    /// Remove the login auto-start entry.
    Uninstall,
    /// Print the current proxy settings and auto-start state.
    Status,
}

/// Log filter for the one-shot subcommands when `RUST_LOG` is unset.
const DEFAULT_LOG_LEVEL: &str = "info";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(config) = run_config(&cli)? {
        init_logging(&config.log_level);
        return cmd_run(config);
    }

    init_logging(DEFAULT_LOG_LEVEL);
    match cli.command {
        Some(Commands::Install) => cmd_install(),
        Some(Commands::Uninstall) => cmd_uninstall(),
        Some(Commands::Status) => cmd_status(),
        None => Ok(()),
    }
}

/// Loads the configuration for run mode, creating it with defaults when
/// missing. The one-shot subcommands never read or write the file.
fn run_config(cli: &Cli) -> anyhow::Result<Option<config::Config>> {
    if cli.command.is_some() {
        return Ok(None);
    }
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => config::default_path()?,
    };
    let config = config::Config::load_or_create(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(Some(config))
}

fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn cmd_run(config: config::Config) -> anyhow::Result<()> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting ProxySync");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(app::run(config))?;

    tracing::info!("ProxySync shut down cleanly");
    Ok(())
}

fn cmd_install() -> anyhow::Result<()> {
    let backend = proxysync_autostart::platform_backend()?;
    proxysync_autostart::install(backend.as_ref()).context("registering auto-start")?;
    println!("ProxySync will start at login ({}).", backend.name());
    Ok(())
}

fn cmd_uninstall() -> anyhow::Result<()> {
    let backend = proxysync_autostart::platform_backend()?;
    if proxysync_autostart::uninstall(backend.as_ref()).context("removing auto-start")? {
        println!("ProxySync will no longer start at login.");
    } else {
        println!("ProxySync was not registered to start at login.");
    }
    Ok(())
}

fn cmd_status() -> anyhow::Result<()> {
    let current = proxysync_settings::ConfigReader::platform().read();
    println!("{}", proxysync_tray::status_text(&current));

    let autostart = match proxysync_autostart::platform_backend() {
        Ok(backend) => match backend.is_enabled() {
            Ok(true) => "installed".to_string(),
            Ok(false) => "not installed".to_string(),
            Err(e) => format!("unknown ({e})"),
        },
        Err(e) => format!("unavailable ({e})"),
    };
    println!("Auto-start: {autostart}");
    Ok(())
}
