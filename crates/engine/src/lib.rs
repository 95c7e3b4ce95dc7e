//! Inventory ledger and production-fulfillment engine.
//!
//! The [`Engine`] owns every write to stock and product balances. Each
//! operation runs in one database transaction and appends ledger rows for
//! every balance change, so a balance always equals the sum of its ledger.
//!
//! ```rust,no_run
//! use engine::{Engine, NewStockItemCmd};
//! use rust_decimal::Decimal;
//! use sea_orm::Database;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("sqlite::memory:").await?;
//! let engine = Engine::builder().database(db).build().await?;
//! let kg = engine.create_unit("kilogram", "kg").await?;
//! let flour = engine
//!     .create_stock_item(
//!         NewStockItemCmd::new("Flour", kg.id, Decimal::new(15, 1))
//!             .initial_quantity(Decimal::new(100, 0)),
//!     )
//!     .await?;
//! assert_eq!(flour.current_quantity, Decimal::new(100, 0));
//! # Ok(())
//! # }
//! ```

pub use commands::{
    AdjustmentRequestCmd, ExtraIngredient, NewStockItemCmd, ResolveAdjustmentCmd, SaleCmd,
    StockEntryCmd, StockItemSettingsCmd, UpdateProductionOrderCmd,
};
pub use error::EngineError;
pub use expenses::{Expense, ExpenseCategory};
pub use metadata::LedgerMetadata;
pub use ops::{Engine, EngineBuilder, LedgerReport};
pub use product_transactions::{ProductReason, ProductTransaction, ProductTransactionKind};
pub use production_orders::{ProductionOrder, ProductionStatus};
pub use products::Product;
pub use recipes::{RecipeLine, Requirement, ResolvedRecipe};
pub use sales::Sale;
pub use stock_adjustments::{AdjustmentAction, AdjustmentStatus, AdjustmentType, StockAdjustment};
pub use stock_items::StockItem;
pub use stock_transactions::{StockReason, StockTransaction, StockTransactionKind};
pub use unit_conversions::UnitConversion;
pub use units::Unit;

mod commands;
mod error;
mod expenses;
mod metadata;
pub mod numeric;
mod ops;
mod product_transactions;
mod production_orders;
mod products;
mod recipes;
mod sales;
mod stock_adjustments;
mod stock_items;
mod stock_transactions;
mod unit_conversions;
mod units;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
