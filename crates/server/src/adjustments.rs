//! Stock adjustment requests and their resolution.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    AdjustmentAction, AdjustmentRequestCmd, AdjustmentStatus, AdjustmentType,
    ResolveAdjustmentCmd, StockAdjustment,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

#[derive(Deserialize)]
pub struct AdjustmentNew {
    pub stock_item_id: Uuid,
    pub adjustment_type: AdjustmentType,
    pub quantity: Decimal,
    pub reason: String,
    pub requested_by: String,
}

pub async fn request(
    State(state): State<ServerState>,
    Json(payload): Json<AdjustmentNew>,
) -> Result<(StatusCode, Json<StockAdjustment>), ServerError> {
    let adjustment = state
        .engine
        .request_stock_adjustment(AdjustmentRequestCmd::new(
            payload.stock_item_id,
            payload.adjustment_type,
            payload.quantity,
            payload.reason,
            payload.requested_by,
        ))
        .await?;
    Ok((StatusCode::CREATED, Json(adjustment)))
}

#[derive(Deserialize)]
pub struct AdjustmentFilter {
    pub status: Option<AdjustmentStatus>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<AdjustmentFilter>,
) -> Result<Json<Vec<StockAdjustment>>, ServerError> {
    Ok(Json(state.engine.list_stock_adjustments(filter.status).await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StockAdjustment>, ServerError> {
    Ok(Json(state.engine.stock_adjustment(id).await?))
}

#[derive(Deserialize)]
pub struct AdjustmentResolve {
    pub action: AdjustmentAction,
    pub resolved_by: String,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn resolve(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustmentResolve>,
) -> Result<Json<StockAdjustment>, ServerError> {
    let cmd = ResolveAdjustmentCmd {
        adjustment_id: id,
        action: payload.action,
        resolved_by: payload.resolved_by,
        notes: payload.notes,
    };
    Ok(Json(state.engine.resolve_stock_adjustment(cmd).await?))
}
