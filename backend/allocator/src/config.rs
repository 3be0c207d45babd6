//! Application configuration loaded from environment variables.

use fund_solver::{AllocationMode, CampaignId, SolverConfig, DEFAULT_MAX_POOL_SIZE};

use crate::errors::{AllocatorError, Result};

/// Largest accepted `MAX_POOL_SIZE`. Each pool mutation searches up to
/// 2^n subsets per campaign under the solver lock.
pub const MAX_POOL_SIZE_CEILING: usize = 25;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the REST API server
    pub api_port: u16,
    /// Largest funder pool the exhaustive search will accept
    pub max_pool_size: usize,
    /// `shared` (every campaign searches the full pool) or `exclusive`
    pub allocation_mode: AllocationMode,
    /// Campaigns registered at startup, in processing order
    pub seed_campaigns: Vec<CampaignSeed>,
}

/// One `id:target:rate` entry from `SEED_CAMPAIGNS`.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignSeed {
    pub campaign_id: CampaignId,
    pub target_amount: i128,
    pub interest_rate: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| AllocatorError::Config("Invalid API_PORT".to_string()))?,
            max_pool_size: parse_pool_size(
                &env_var("MAX_POOL_SIZE").unwrap_or_else(|_| DEFAULT_MAX_POOL_SIZE.to_string()),
            )?,
            allocation_mode: parse_mode(
                &env_var("ALLOCATION_MODE").unwrap_or_else(|_| "shared".to_string()),
            )?,
            seed_campaigns: parse_seeds(&env_var("SEED_CAMPAIGNS").unwrap_or_default())?,
        })
    }

    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            max_pool_size: self.max_pool_size,
            mode: self.allocation_mode,
        }
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| AllocatorError::Config(format!("Missing env var: {key}")))
}

fn parse_pool_size(raw: &str) -> Result<usize> {
    let size: usize = raw
        .trim()
        .parse()
        .map_err(|_| AllocatorError::Config(format!("Invalid MAX_POOL_SIZE: {raw}")))?;
    if size > MAX_POOL_SIZE_CEILING {
        return Err(AllocatorError::Config(format!(
            "MAX_POOL_SIZE {size} exceeds the ceiling of {MAX_POOL_SIZE_CEILING}"
        )));
    }
    Ok(size)
}

fn parse_mode(raw: &str) -> Result<AllocationMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "shared" => Ok(AllocationMode::Shared),
        "exclusive" => Ok(AllocationMode::Exclusive),
        other => Err(AllocatorError::Config(format!(
            "Invalid ALLOCATION_MODE: {other} (expected shared or exclusive)"
        ))),
    }
}

/// Parse `id:target:rate[,id:target:rate...]`. Blank input yields no seeds.
fn parse_seeds(raw: &str) -> Result<Vec<CampaignSeed>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let invalid = || AllocatorError::Config(format!("Invalid SEED_CAMPAIGNS entry: {entry}"));
            let mut parts = entry.split(':').map(str::trim);
            let (Some(id), Some(target), Some(rate), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                return Err(invalid());
            };
            Ok(CampaignSeed {
                campaign_id: CampaignId(id.parse().map_err(|_| invalid())?),
                target_amount: target.parse().map_err(|_| invalid())?,
                interest_rate: rate.parse().map_err(|_| invalid())?,
            })
        })
        .collect()
}
