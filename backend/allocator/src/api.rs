//! Axum REST API handlers.
//!
//! Every handler goes through [`with_solver`], which takes the single solver
//! lock on a blocking thread. A pool mutation and the re-optimization pass it
//! triggers therefore run as one atomic step.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use fund_solver::{
    CampaignAllocation, CampaignId, FundSolver, Funder, FunderId, PassSummary, ReassignmentEntry,
    SolverError,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::{AllocatorError, Result};

#[derive(Clone)]
pub struct ApiState {
    pub solver: Arc<Mutex<FundSolver>>,
}

impl ApiState {
    pub fn new(solver: FundSolver) -> Self {
        ApiState {
            solver: Arc::new(Mutex::new(solver)),
        }
    }
}

/// Build the service router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/campaigns", get(get_campaigns).post(create_campaign))
        .route(
            "/funders",
            get(get_funders).post(add_funder).delete(remove_funder),
        )
        .route("/funders/:id", delete(remove_funder_by_id))
        .route("/history", get(get_history))
        .route("/reoptimize", post(reoptimize))
        .with_state(Arc::new(state))
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCampaignRequest {
    pub campaign_id: u64,
    pub target_amount: i128,
    pub interest_rate: f64,
}

#[derive(Deserialize)]
pub struct FunderAmountRequest {
    pub amount: i128,
}

#[derive(Serialize)]
pub struct CampaignsResponse {
    pub count: usize,
    pub campaigns: Vec<CampaignAllocation>,
}

impl From<Vec<CampaignAllocation>> for CampaignsResponse {
    fn from(campaigns: Vec<CampaignAllocation>) -> Self {
        CampaignsResponse {
            count: campaigns.len(),
            campaigns,
        }
    }
}

#[derive(Serialize)]
pub struct FunderAddedResponse {
    pub funder_id: FunderId,
    pub campaigns: Vec<CampaignAllocation>,
}

#[derive(Serialize)]
pub struct FunderRemovedResponse {
    pub removed: Funder,
    pub campaigns: Vec<CampaignAllocation>,
}

#[derive(Serialize)]
pub struct FundersResponse {
    pub count: usize,
    pub funders: Vec<Funder>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub entries: Vec<ReassignmentEntry>,
}

#[derive(Serialize)]
pub struct ReoptimizeResponse {
    pub summary: PassSummary,
    pub campaigns: Vec<CampaignAllocation>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AllocatorError {
    fn into_response(self) -> Response {
        let status = match &self {
            AllocatorError::Solver(SolverError::FunderNotFound(_)) => StatusCode::NOT_FOUND,
            AllocatorError::Solver(
                SolverError::InvalidAmount(_)
                | SolverError::AmountOverflow(_)
                | SolverError::InvalidTarget(_)
                | SolverError::InvalidInterestRate(_),
            ) => StatusCode::BAD_REQUEST,
            AllocatorError::Solver(
                SolverError::DuplicateCampaign(_) | SolverError::PoolFull { .. },
            ) => StatusCode::CONFLICT,
            AllocatorError::Config(_) | AllocatorError::LockPoisoned | AllocatorError::Join(_) => {
                error!("Request failed: {self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Run `f` against the solver while holding its lock, off the async runtime.
async fn with_solver<T, F>(state: &ApiState, f: F) -> Result<T>
where
    F: FnOnce(&mut FundSolver) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let solver = Arc::clone(&state.solver);
    tokio::task::spawn_blocking(move || {
        let mut guard = solver.lock().map_err(|_| AllocatorError::LockPoisoned)?;
        f(&mut guard)
    })
    .await?
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /campaigns`
///
/// Registers a campaign at the end of the processing order and runs a pass
/// so the new campaign is allocated against the current pool.
pub async fn create_campaign(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<impl IntoResponse> {
    let campaigns = with_solver(&state, move |solver| {
        solver.add_campaign(
            CampaignId(req.campaign_id),
            req.target_amount,
            req.interest_rate,
        )?;
        solver.reoptimize_all();
        Ok(solver.get_campaign_allocations())
    })
    .await?;
    Ok((StatusCode::CREATED, Json(CampaignsResponse::from(campaigns))))
}

/// `GET /campaigns`
pub async fn get_campaigns(State(state): State<Arc<ApiState>>) -> Result<impl IntoResponse> {
    let campaigns = with_solver(&state, |solver| Ok(solver.get_campaign_allocations())).await?;
    Ok(Json(CampaignsResponse::from(campaigns)))
}

/// `POST /funders`
pub async fn add_funder(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<FunderAmountRequest>,
) -> Result<impl IntoResponse> {
    let response = with_solver(&state, move |solver| {
        let funder_id = solver.add_funder(req.amount)?;
        Ok(FunderAddedResponse {
            funder_id,
            campaigns: solver.get_campaign_allocations(),
        })
    })
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /funders`
pub async fn get_funders(State(state): State<Arc<ApiState>>) -> Result<impl IntoResponse> {
    let funders = with_solver(&state, |solver| Ok(solver.funders().to_vec())).await?;
    Ok(Json(FundersResponse {
        count: funders.len(),
        funders,
    }))
}

/// `DELETE /funders`
///
/// Removes the first funder contributing the given amount.
pub async fn remove_funder(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<FunderAmountRequest>,
) -> Result<impl IntoResponse> {
    let response = with_solver(&state, move |solver| {
        let removed = solver.remove_funder(req.amount)?;
        Ok(FunderRemovedResponse {
            removed,
            campaigns: solver.get_campaign_allocations(),
        })
    })
    .await?;
    Ok(Json(response))
}

/// `DELETE /funders/:id`
pub async fn remove_funder_by_id(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse> {
    let response = with_solver(&state, move |solver| {
        let removed = solver.remove_funder_by_id(FunderId(id))?;
        Ok(FunderRemovedResponse {
            removed,
            campaigns: solver.get_campaign_allocations(),
        })
    })
    .await?;
    Ok(Json(response))
}

/// `GET /history`
pub async fn get_history(State(state): State<Arc<ApiState>>) -> Result<impl IntoResponse> {
    let entries =
        with_solver(&state, |solver| Ok(solver.get_allocation_history().to_vec())).await?;
    Ok(Json(HistoryResponse {
        count: entries.len(),
        entries,
    }))
}

/// `POST /reoptimize`
///
/// Runs a pass without changing the pool.
pub async fn reoptimize(State(state): State<Arc<ApiState>>) -> Result<impl IntoResponse> {
    let response = with_solver(&state, |solver| {
        let summary = solver.reoptimize_all();
        Ok(ReoptimizeResponse {
            summary,
            campaigns: solver.get_campaign_allocations(),
        })
    })
    .await?;
    Ok(Json(response))
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
