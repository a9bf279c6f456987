use std::env;

use anyhow::Result;
use vibes_agents::mapper_path_from_env;
use vibes_api::build_app;
use vibes_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("vibes_api");

    let mapper_path = mapper_path_from_env();
    let bind = env::var("VIBES_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let app = build_app(&mapper_path)?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, mapper_path = %mapper_path, "vibes api started");

    axum::serve(listener, app).await?;
    Ok(())
}
