use axum::{
    Router,
    routing::{delete, get, post, put},
};

use std::sync::Arc;

use crate::{adjustments, ledger, production, products, sales, stock_items};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

impl ServerState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(ledger::health))
        .route("/ledger/verify", get(ledger::verify))
        .route("/units", post(stock_items::unit_new).get(stock_items::unit_list))
        .route(
            "/stock-items",
            post(stock_items::create).get(stock_items::list),
        )
        .route(
            "/stock-items/{id}",
            get(stock_items::get).patch(stock_items::update_settings),
        )
        .route(
            "/stock-items/{id}/transactions",
            get(stock_items::transactions),
        )
        .route("/stock-items/{id}/receive", post(stock_items::receive))
        .route("/stock-items/{id}/quantity", put(stock_items::set_quantity))
        .route("/stock-items/{id}/damage", post(stock_items::damage))
        .route(
            "/stock-items/{id}/conversions",
            post(stock_items::conversion_new).get(stock_items::conversion_list),
        )
        .route("/products", post(products::create).get(products::list))
        .route("/products/{id}", get(products::get))
        .route(
            "/products/{id}/recipe",
            put(products::recipe_line_set).get(products::recipe),
        )
        .route(
            "/products/{id}/recipe/{stock_item_id}",
            delete(products::recipe_line_remove),
        )
        .route("/products/{id}/requirements", get(products::requirements))
        .route("/products/{id}/transactions", get(products::transactions))
        .route("/products/{id}/damage", post(products::damage))
        .route(
            "/production-orders",
            post(production::create).get(production::list),
        )
        .route(
            "/production-orders/{id}",
            get(production::get).patch(production::update),
        )
        .route("/sales", post(sales::create).get(sales::list))
        .route("/sales/{id}", get(sales::get))
        .route("/expenses", get(sales::expenses))
        .route(
            "/stock-adjustments",
            post(adjustments::request).get(adjustments::list),
        )
        .route("/stock-adjustments/{id}", get(adjustments::get))
        .route("/stock-adjustments/{id}/resolve", post(adjustments::resolve))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState::new(engine))).await
}
