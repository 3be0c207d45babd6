//! Fund Allocation Service: entry point.
//!
//! Hosts a single fund solver behind an Axum REST API. Campaigns can be
//! seeded from the environment at startup; funders are added and removed
//! over HTTP, and each change re-optimizes every campaign before the
//! response is sent.

mod api;
mod config;
mod errors;

use fund_solver::FundSolver;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut solver = FundSolver::new(config.solver_config());
    for seed in &config.seed_campaigns {
        solver.add_campaign(seed.campaign_id, seed.target_amount, seed.interest_rate)?;
    }
    info!(
        campaigns = config.seed_campaigns.len(),
        max_pool_size = config.max_pool_size,
        mode = %config.allocation_mode,
        "Solver ready"
    );

    let app = api::router(api::ApiState::new(solver))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
