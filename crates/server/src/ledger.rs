//! Health probe and ledger verification.

use axum::{Json, extract::State};
use engine::LedgerReport;
use serde::Serialize;

use crate::{ServerError, server::ServerState};

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
}

pub async fn health(State(state): State<ServerState>) -> Result<Json<Health>, ServerError> {
    state.engine.ping().await?;
    Ok(Json(Health { status: "ok" }))
}

/// Replay both ledgers against the cached balances.
pub async fn verify(State(state): State<ServerState>) -> Result<Json<LedgerReport>, ServerError> {
    Ok(Json(state.engine.verify_ledgers().await?))
}
