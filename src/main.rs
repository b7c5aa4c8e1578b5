use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use perch_gateway::api::ApiServer;
use perch_gateway::services::Services;
use perch_gateway::Config;

/// Perch - voice assistant backend for smart speakers
#[derive(Parser)]
#[command(name = "perch", version, about)]
struct Cli {
    /// Path to the TOML config file (defaults to ~/.config/perch/config.toml)
    #[arg(short, long, env = "PERCH_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Load and print the resolved configuration
    CheckConfig,
    /// Send a wake-on-lan packet to the configured machine
    TestWake,
    /// Query the music catalog and print the resulting playlist
    TestPlaylist {
        /// Search query; omit for a random playlist
        query: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,perch_gateway=info",
        1 => "info,perch_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_ref())?;

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::CheckConfig => check_config(&config),
            Command::TestWake => test_wake(&config).await,
            Command::TestPlaylist { query } => test_playlist(&config, query.as_deref()).await,
        };
    }

    tracing::info!(
        port = config.server.port,
        music = config.nextcloud.is_some(),
        email = config.email.is_some(),
        news = config.news.is_some(),
        wake_on_lan = config.wake_on_lan.is_some(),
        "starting perch gateway"
    );

    ApiServer::new(&config).run().await?;

    Ok(())
}

/// Print which services the resolved configuration enables
#[allow(clippy::unnecessary_wraps)]
fn check_config(config: &Config) -> anyhow::Result<()> {
    println!("port: {}", config.server.port);
    println!(
        "skill id verification: {}",
        if config.server.application_id.is_some() {
            "on"
        } else {
            "off"
        }
    );
    for (name, enabled) in [
        ("nextcloud (calendar/notes/tasks/music)", config.nextcloud.is_some()),
        ("email", config.email.is_some()),
        ("news", config.news.is_some()),
        ("wake-on-lan", config.wake_on_lan.is_some()),
    ] {
        println!("{name}: {}", if enabled { "configured" } else { "not configured" });
    }
    Ok(())
}

/// Send a wake packet to the configured machine
async fn test_wake(config: &Config) -> anyhow::Result<()> {
    let services = Services::from_config(config);
    let wol = services
        .wol
        .ok_or_else(|| anyhow::anyhow!("wake-on-lan is not configured"))?;
    wol.wake().await?;
    println!("Wake packet sent.");
    Ok(())
}

/// Resolve a playlist the way the intent handlers would and print it
async fn test_playlist(config: &Config, query: Option<&str>) -> anyhow::Result<()> {
    let services = Services::from_config(config);
    let music = services
        .music
        .ok_or_else(|| anyhow::anyhow!("music catalog is not configured"))?;

    let tracks = match query {
        Some(q) => music.search_playlist(q).await?,
        None => music.random_playlist().await?,
    };

    if tracks.is_empty() {
        println!("No tracks found.");
        return Ok(());
    }
    for track in tracks {
        println!("{}  {}", track.title, track.uri);
    }
    Ok(())
}
