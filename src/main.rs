//! Memgate CLI - MCP stdio server for the Mem0 memory service

use clap::Parser;
use memgate::{Config, Mem0Client, ToolRouter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "memgate")]
#[command(version)]
#[command(about = "Memgate - MCP stdio bridge to the Mem0 memory service", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.memgate/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initialize a new config file with defaults
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config_path = expand_path(&args.config);

    // Handle --init flag (logging is not up yet, plain stderr is fine)
    if args.init {
        if config_path.exists() {
            eprintln!("Config file already exists: {}", config_path.display());
            return Ok(());
        }
        Config::create_default(&config_path)?;
        eprintln!("Created default config at: {}", config_path.display());
        return Ok(());
    }

    // Load configuration
    let config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        Config::from_env()
    };
    config.validate()?;

    // Keep the file-sink guard alive for the life of the process
    let _log_guard = init_logging(&config, args.verbose);

    if !config_path.exists() {
        tracing::warn!(
            "Config file not found at {}, using defaults",
            config_path.display()
        );
    }

    // Missing credential fails here, before any request is read
    let client = Mem0Client::new(&config.mem0)?;
    let router = ToolRouter::new(Arc::new(client), config.mem0.default_user_id.clone());

    memgate::mcp::run_mcp_server(router).await?;
    Ok(())
}

/// Initialize tracing. Diagnostics go to stderr so stdout stays clean for
/// protocol frames; the optional file sink is best-effort and the server
/// runs with stderr only when it cannot be opened.
fn init_logging(config: &Config, verbose: bool) -> Option<WorkerGuard> {
    let log_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("memgate={}", log_level).into());

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match open_file_sink(config) {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

fn open_file_sink(config: &Config) -> Option<(NonBlocking, WorkerGuard)> {
    let path = expand_path(config.log.file.as_ref()?);
    let dir = path.parent()?;
    let name = path.file_name()?.to_string_lossy().to_string();

    std::fs::create_dir_all(dir).ok()?;
    let appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
        .ok()?;

    Some(tracing_appender::non_blocking(appender))
}

/// Expand ~ to home directory
fn expand_path(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
