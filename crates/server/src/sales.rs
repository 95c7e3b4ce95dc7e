//! Sales and the expense register.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use engine::{Expense, ExpenseCategory, Sale, SaleCmd};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

#[derive(Deserialize)]
pub struct SaleNew {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub damaged_quantity: Option<Decimal>,
    #[serde(default)]
    pub damage_reason: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Defaults to now.
    #[serde(default)]
    pub sale_date: Option<DateTime<Utc>>,
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SaleNew>,
) -> Result<(StatusCode, Json<Sale>), ServerError> {
    let cmd = SaleCmd {
        product_id: payload.product_id,
        quantity: payload.quantity,
        unit_price: payload.unit_price,
        damaged_quantity: payload.damaged_quantity.unwrap_or_default(),
        damage_reason: payload.damage_reason,
        customer_name: payload.customer_name,
        notes: payload.notes,
        sale_date: payload.sale_date.unwrap_or_else(Utc::now),
    };
    let sale = state.engine.record_sale(cmd).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Sale>>, ServerError> {
    Ok(Json(state.engine.list_sales().await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Sale>, ServerError> {
    Ok(Json(state.engine.sale(id).await?))
}

#[derive(Deserialize)]
pub struct ExpenseFilter {
    pub category: Option<ExpenseCategory>,
}

pub async fn expenses(
    State(state): State<ServerState>,
    Query(filter): Query<ExpenseFilter>,
) -> Result<Json<Vec<Expense>>, ServerError> {
    Ok(Json(state.engine.list_expenses(filter.category).await?))
}
