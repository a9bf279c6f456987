use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::{Parser, Subcommand};
use vibes_agents::{build_agent_from_env, DEFAULT_MAPPER_PATH};
use vibes_core::{LatLng, VibeRequest, DEFAULT_RADIUS_M};
use vibes_observability::{init_tracing, AppMetrics};

#[derive(Debug, Parser)]
#[command(name = "vibes")]
#[command(about = "Find nearby places that match a vibe")]
struct Cli {
    #[arg(long, env = "VIBES_MAPPER_PATH", default_value = DEFAULT_MAPPER_PATH)]
    mapper: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List configured intents with their keywords and place categories.
    Intents,
    /// Resolve the intent behind a free-text query.
    Intent { query: String },
    /// Look up nearby candidates for an intent.
    Search {
        #[arg(long)]
        intent: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, default_value_t = DEFAULT_RADIUS_M)]
        radius: u32,
    },
    /// Full pipeline: intent, nearby search, ranking.
    Recommend {
        query: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, default_value_t = DEFAULT_RADIUS_M)]
        radius: u32,
        #[arg(long, value_delimiter = ',')]
        scene: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("vibes_cli");
    let cli = Cli::parse();

    let agent = build_agent_from_env(&cli.mapper, AppMetrics::shared())?;

    match cli.command {
        Command::Intents => {
            let intents = agent.catalog().iter().collect::<Vec<_>>();
            println!("{}", serde_json::to_string_pretty(&intents)?);
        }
        Command::Intent { query } => {
            let resolved = agent.resolve_intent(&query).await;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        Command::Search {
            intent,
            lat,
            lng,
            radius,
        } => {
            let location = checked_location(lat, lng)?;
            let candidates = agent.search(&intent, location, radius).await;
            println!("{}", serde_json::to_string_pretty(&candidates)?);
        }
        Command::Recommend {
            query,
            lat,
            lng,
            radius,
            scene,
        } => {
            let location = checked_location(lat, lng)?;
            let response = agent
                .recommend(VibeRequest {
                    query,
                    location,
                    radius_m: Some(radius),
                    scene_tags: scene,
                })
                .await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn checked_location(lat: f64, lng: f64) -> Result<LatLng> {
    let location = LatLng::new(lat, lng);
    ensure!(
        location.is_valid(),
        "--lat must be within [-90, 90] and --lng within [-180, 180]"
    );
    Ok(location)
}
