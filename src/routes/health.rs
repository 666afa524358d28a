//! Liveness probe
//!
//! Answers 200 whenever the process is serving; the seed reconciler has
//! already completed by the time any request is accepted.

use serde::Serialize;

use crate::db::store::DocumentStore;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Git commit the binary was built from
    pub commit: &'static str,
    pub build_time: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    pub timestamp: String,
    pub seed_policy: String,
}

pub fn health_check<S: DocumentStore>(state: &AppState<S>) -> HealthResponse {
    HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        seed_policy: state.args.seed_policy.to_string(),
    }
}
