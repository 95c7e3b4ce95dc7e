//! Production order endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{ExtraIngredient, ProductionOrder, ProductionStatus, UpdateProductionOrderCmd};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

#[derive(Deserialize)]
pub struct OrderNew {
    pub product_id: Uuid,
    pub quantity_to_produce: Decimal,
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderNew>,
) -> Result<(StatusCode, Json<ProductionOrder>), ServerError> {
    let order = state
        .engine
        .create_production_order(payload.product_id, payload.quantity_to_produce)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Deserialize)]
pub struct OrderFilter {
    pub status: Option<ProductionStatus>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<ProductionOrder>>, ServerError> {
    Ok(Json(state.engine.list_production_orders(filter.status).await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductionOrder>, ServerError> {
    Ok(Json(state.engine.production_order(id).await?))
}

#[derive(Deserialize)]
pub struct ExtraLine {
    pub stock_item_id: Uuid,
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_id: Option<Uuid>,
}

/// Patch body. Every field is optional.
#[derive(Default, Deserialize)]
pub struct OrderUpdate {
    pub quantity_produced: Option<Decimal>,
    pub status: Option<ProductionStatus>,
    pub reason: Option<String>,
    #[serde(default)]
    pub start: bool,
    #[serde(default)]
    pub extra_ingredients: Vec<ExtraLine>,
}

impl OrderUpdate {
    fn into_cmd(self, order_id: Uuid) -> UpdateProductionOrderCmd {
        UpdateProductionOrderCmd {
            order_id,
            quantity_produced: self.quantity_produced,
            status: self.status,
            reason: self.reason,
            start: self.start,
            extras: self
                .extra_ingredients
                .into_iter()
                .map(|line| ExtraIngredient {
                    stock_item_id: line.stock_item_id,
                    quantity: line.quantity,
                    unit_id: line.unit_id,
                })
                .collect(),
        }
    }
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<OrderUpdate>,
) -> Result<Json<ProductionOrder>, ServerError> {
    let order = state
        .engine
        .update_production_order(payload.into_cmd(id))
        .await?;
    Ok(Json(order))
}
