//! summchat — chat server entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Build the LLM provider
//!   6. `--check` / `--pull` maintenance modes exit here
//!   7. Probe registered models
//!   8. Spawn Ctrl-C → shutdown signal watcher
//!   9. Serve HTTP until shutdown

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use summchat::error::AppError;
use summchat::llm::{LlmProvider, ModelCatalog, providers};
use summchat::logger::LogTarget;
use summchat::{config, logger, server};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some(), &LogTarget::Stderr)?;

    info!(
        app_name = %config.app_name,
        work_dir = %config.work_dir.display(),
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        provider = %config.llm.provider,
        "config loaded"
    );

    let provider = providers::build(&config.llm).map_err(|e| AppError::Llm(e.to_string()))?;

    match args.mode {
        Mode::Check => return check_models(&provider, &config.llm).await,
        Mode::Pull => return pull_models(&provider, &config.llm).await,
        Mode::Serve => {}
    }

    let mut catalog = ModelCatalog::new(provider, &config.llm);
    catalog.initialize().await;
    if catalog.available().is_empty() {
        warn!("no models loaded — /generate will reject every request");
    }

    let shutdown = CancellationToken::new();

    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let state = server::AppState::new(&config.app_name, catalog);
    server::run(&config.server.bind, state, shutdown).await
}

/// List which registered models are already present on the backend.
async fn check_models(provider: &LlmProvider, llm: &config::LlmConfig) -> Result<(), AppError> {
    let local = provider
        .local_models()
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    println!("Local models:");
    for name in &local {
        println!("  {name}");
    }
    println!();
    println!("Registered models:");
    for entry in &llm.models {
        let mark = if local.iter().any(|m| m == &entry.name) { "✓" } else { "✗ (run --pull)" };
        println!("  {:<16} {:<20} {mark}", entry.key, entry.name);
    }
    Ok(())
}

/// Pull every registered model; fails if any pull fails.
async fn pull_models(provider: &LlmProvider, llm: &config::LlmConfig) -> Result<(), AppError> {
    let mut failed = Vec::new();
    for entry in &llm.models {
        println!("pulling {} ({})…", entry.key, entry.name);
        match provider.pull(&entry.name).await {
            Ok(()) => println!("  done"),
            Err(e) => {
                eprintln!("  failed: {e}");
                failed.push(entry.key.clone());
            }
        }
    }
    if failed.is_empty() {
        Ok(())
    } else {
        Err(AppError::Llm(format!("failed to pull: {}", failed.join(", "))))
    }
}

enum Mode {
    Serve,
    Check,
    Pull,
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
    mode: Mode,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;
    let mut mode = Mode::Serve;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: summchat [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                println!("      --check                List registered models and whether they are installed");
                println!("      --pull                 Download every registered model, then exit");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--check" => mode = Mode::Check,
            "--pull" => mode = Mode::Pull,
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    CliArgs { log_level: logger::level_for_verbosity(verbosity), config_path, mode }
}
