#![allow(dead_code)]

use std::str::FromStr;

use engine::{Engine, NewStockItemCmd, Product, ProductionOrder, StockItem, Unit};
use migration::MigratorTrait;
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub async fn kilogram(engine: &Engine) -> Unit {
    engine.create_unit("kilogram", "kg").await.unwrap()
}

pub async fn stock_item(
    engine: &Engine,
    unit: &Unit,
    name: &str,
    unit_cost: &str,
    quantity: &str,
) -> StockItem {
    engine
        .create_stock_item(
            NewStockItemCmd::new(name, unit.id, dec(unit_cost)).initial_quantity(dec(quantity)),
        )
        .await
        .unwrap()
}

/// A product with a single-ingredient recipe.
pub async fn product_using(
    engine: &Engine,
    name: &str,
    selling_price: &str,
    ingredient: &StockItem,
    per_unit: &str,
) -> Product {
    let product = engine.create_product(name, dec(selling_price)).await.unwrap();
    engine
        .set_recipe_line(product.id, ingredient.id, dec(per_unit))
        .await
        .unwrap();
    product
}

pub async fn order(engine: &Engine, product: &Product, quantity: &str) -> ProductionOrder {
    engine
        .create_production_order(product.id, dec(quantity))
        .await
        .unwrap()
}
