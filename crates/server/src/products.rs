//! Products, recipes and the product ledger.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Expense, Product, ProductTransaction, RecipeLine, ResolvedRecipe};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

#[derive(Deserialize)]
pub struct ProductNew {
    pub name: String,
    pub selling_price: Decimal,
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductNew>,
) -> Result<(StatusCode, Json<Product>), ServerError> {
    let product = state
        .engine
        .create_product(&payload.name, payload.selling_price)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Product>>, ServerError> {
    Ok(Json(state.engine.list_products().await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ServerError> {
    Ok(Json(state.engine.product(id).await?))
}

#[derive(Deserialize)]
pub struct RecipeLineSet {
    pub stock_item_id: Uuid,
    pub quantity_per_unit: Decimal,
}

/// Insert or replace one ingredient line of the recipe.
pub async fn recipe_line_set(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipeLineSet>,
) -> Result<Json<RecipeLine>, ServerError> {
    let line = state
        .engine
        .set_recipe_line(id, payload.stock_item_id, payload.quantity_per_unit)
        .await?;
    Ok(Json(line))
}

pub async fn recipe_line_remove(
    State(state): State<ServerState>,
    Path((id, stock_item_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state.engine.remove_recipe_line(id, stock_item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn recipe(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RecipeLine>>, ServerError> {
    Ok(Json(state.engine.recipe(id).await?))
}

#[derive(Deserialize)]
pub struct RequirementsQuery {
    pub quantity: Decimal,
}

/// What producing `quantity` units takes, without touching stock.
pub async fn requirements(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<RequirementsQuery>,
) -> Result<Json<ResolvedRecipe>, ServerError> {
    Ok(Json(state.engine.resolve_recipe(id, query.quantity).await?))
}

pub async fn transactions(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ProductTransaction>>, ServerError> {
    Ok(Json(state.engine.product_transactions(id).await?))
}

#[derive(Deserialize)]
pub struct ProductDamage {
    pub quantity: Decimal,
    pub reason: String,
}

#[derive(Serialize)]
pub struct ProductDamageResult {
    pub transaction: ProductTransaction,
    pub expense: Expense,
}

pub async fn damage(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductDamage>,
) -> Result<(StatusCode, Json<ProductDamageResult>), ServerError> {
    let (transaction, expense) = state
        .engine
        .record_product_damage(id, payload.quantity, &payload.reason)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductDamageResult {
            transaction,
            expense,
        }),
    ))
}
