//! Units, stock items and the stock ledger.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{
    Expense, NewStockItemCmd, StockEntryCmd, StockItem, StockItemSettingsCmd, StockTransaction,
    Unit, UnitConversion,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

#[derive(Deserialize)]
pub struct UnitNew {
    pub name: String,
    pub symbol: String,
}

pub async fn unit_new(
    State(state): State<ServerState>,
    Json(payload): Json<UnitNew>,
) -> Result<(StatusCode, Json<Unit>), ServerError> {
    let unit = state
        .engine
        .create_unit(&payload.name, &payload.symbol)
        .await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

pub async fn unit_list(State(state): State<ServerState>) -> Result<Json<Vec<Unit>>, ServerError> {
    Ok(Json(state.engine.units().await?))
}

#[derive(Deserialize)]
pub struct StockItemNew {
    pub name: String,
    pub base_unit_id: Uuid,
    pub unit_cost: Decimal,
    #[serde(default)]
    pub initial_quantity: Option<Decimal>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub allow_extra_production: bool,
    /// `0` or absent means no cap.
    #[serde(default)]
    pub extra_production_limit: Option<Decimal>,
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<StockItemNew>,
) -> Result<(StatusCode, Json<StockItem>), ServerError> {
    let mut cmd = NewStockItemCmd::new(payload.name, payload.base_unit_id, payload.unit_cost);
    if let Some(quantity) = payload.initial_quantity {
        cmd = cmd.initial_quantity(quantity);
    }
    if let Some(supplier) = payload.supplier {
        cmd = cmd.supplier(supplier);
    }
    if payload.allow_extra_production {
        cmd = cmd.allow_extra(payload.extra_production_limit.unwrap_or_default());
    }
    let item = state.engine.create_stock_item(cmd).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<StockItem>>, ServerError> {
    Ok(Json(state.engine.list_stock_items().await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StockItem>, ServerError> {
    Ok(Json(state.engine.stock_item(id).await?))
}

#[derive(Deserialize)]
pub struct StockItemSettings {
    pub unit_cost: Option<Decimal>,
    pub supplier: Option<String>,
    pub allow_extra_production: Option<bool>,
    pub extra_production_limit: Option<Decimal>,
}

pub async fn update_settings(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockItemSettings>,
) -> Result<Json<StockItem>, ServerError> {
    let cmd = StockItemSettingsCmd {
        unit_cost: payload.unit_cost,
        supplier: payload.supplier,
        allow_extra_production: payload.allow_extra_production,
        extra_production_limit: payload.extra_production_limit,
    };
    Ok(Json(state.engine.update_stock_item_settings(id, cmd).await?))
}

pub async fn transactions(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StockTransaction>>, ServerError> {
    Ok(Json(state.engine.stock_transactions(id).await?))
}

/// Body shared by receive, count and damage. `note` carries the damage
/// reason.
#[derive(Deserialize)]
pub struct StockEntry {
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_id: Option<Uuid>,
    #[serde(default, alias = "reason")]
    pub note: Option<String>,
}

impl StockEntry {
    fn into_cmd(self, stock_item_id: Uuid) -> StockEntryCmd {
        StockEntryCmd {
            stock_item_id,
            quantity: self.quantity,
            unit_id: self.unit_id,
            note: self.note,
        }
    }
}

pub async fn receive(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockEntry>,
) -> Result<(StatusCode, Json<StockTransaction>), ServerError> {
    let tx = state.engine.receive_stock(payload.into_cmd(id)).await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

#[derive(Serialize)]
pub struct CountResult {
    pub stock_item: StockItem,
    /// `None` when the count matched the balance.
    pub transaction: Option<StockTransaction>,
}

pub async fn set_quantity(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockEntry>,
) -> Result<Json<CountResult>, ServerError> {
    let transaction = state.engine.set_stock_quantity(payload.into_cmd(id)).await?;
    let stock_item = state.engine.stock_item(id).await?;
    Ok(Json(CountResult {
        stock_item,
        transaction,
    }))
}

#[derive(Serialize)]
pub struct DamageResult {
    pub transaction: StockTransaction,
    pub expense: Option<Expense>,
}

pub async fn damage(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockEntry>,
) -> Result<(StatusCode, Json<DamageResult>), ServerError> {
    let (transaction, expense) = state.engine.record_stock_damage(payload.into_cmd(id)).await?;
    Ok((
        StatusCode::CREATED,
        Json(DamageResult {
            transaction,
            expense,
        }),
    ))
}

#[derive(Deserialize)]
pub struct ConversionNew {
    pub unit_id: Uuid,
    pub factor: Decimal,
}

pub async fn conversion_new(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConversionNew>,
) -> Result<(StatusCode, Json<UnitConversion>), ServerError> {
    let conversion = state
        .engine
        .add_unit_conversion(id, payload.unit_id, payload.factor)
        .await?;
    Ok((StatusCode::CREATED, Json(conversion)))
}

pub async fn conversion_list(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<UnitConversion>>, ServerError> {
    Ok(Json(state.engine.unit_conversions(id).await?))
}
