//! TuringJudge server - can the judge tell you from a machine?
//!
//! Serves the game API (and optionally the browser client) over HTTP.

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use turingjudge_core::{Config, GameHandler, ModelRole, ModelRouter, default_config};
use turingjudge_server::{AppState, init_tracing, router};

#[derive(Parser)]
#[command(
    name = "turingjudge",
    version,
    about = "Interview game where an AI judge guesses who is human",
    long_about = "Runs the TuringJudge HTTP server. An AI judge interviews the player and an AI respondent, then decides which one is human."
)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Optional TOML config file overriding the built-in defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory with the browser client, served for non-API paths
    #[arg(long, env = "STATIC_DIR", value_name = "DIR")]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => default_config(),
    };
    let config = base.with_env_overrides().context("applying environment overrides")?;

    let model_router = ModelRouter::from_config(&config).context("building model router")?;
    print_banner(&config);

    let state = AppState::new(GameHandler::new(config, model_router));
    let app = router(state, cli.static_dir);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cli.host, cli.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!("listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server shutdown complete");
    Ok(())
}

fn print_banner(config: &Config) {
    println!();
    println!("{}", "═".repeat(60).bright_blue());
    println!("{}", "  TuringJudge".bright_blue().bold());
    println!("{}", "═".repeat(60).bright_blue());
    println!("{} {}", "Rounds:".bold(), config.game.rounds);
    for role in ModelRole::all() {
        let settings = config.roles.get(role);
        println!(
            "  {} {} {}",
            format!("{:<11}", role.display_name()).bright_cyan(),
            settings.describe(),
            format!("(temperature {})", settings.temperature).dimmed()
        );
    }
    println!("{}", "─".repeat(60).dimmed());
    println!();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
