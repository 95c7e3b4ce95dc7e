//! Units, stock items and products: the records the ledgers hang off.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::{Expr, Func}};
use uuid::Uuid;

use crate::{
    EngineError, NewStockItemCmd, Product, ResultEngine, StockItem, StockItemSettingsCmd,
    StockReason, StockTransaction, Unit, UnitConversion,
    numeric::{require_non_negative, require_positive, to_minor},
    products, stock_items, unit_conversions, units,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, conversion::require_stock_item, ledger::post_stock, lock_set::LockSet, with_tx};

impl Engine {
    /// Register a unit of measure. Names are unique, case-insensitively.
    pub async fn create_unit(&self, name: &str, symbol: &str) -> ResultEngine<Unit> {
        let name = normalize_required_text(name, "unit name")?;
        let symbol = normalize_required_text(symbol, "unit symbol")?;
        with_tx!(self, |db_tx| {
            let exists = units::Entity::find()
                .filter(Expr::expr(Func::lower(Expr::col(units::Column::Name))).eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!("unit '{name}' already exists")));
            }

            let unit = Unit::new(name, symbol);
            units::ActiveModel::from(&unit).insert(&db_tx).await?;
            Ok(unit)
        })
    }

    pub async fn units(&self) -> ResultEngine<Vec<Unit>> {
        with_tx!(self, |db_tx| {
            let models = units::Entity::find()
                .order_by_asc(units::Column::Name)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(Unit::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Create a stock item with its base conversion.
    ///
    /// A positive `initial_quantity` is booked as an `initial_stock` increase
    /// so the balance starts out backed by the ledger.
    pub async fn create_stock_item(&self, cmd: NewStockItemCmd) -> ResultEngine<StockItem> {
        let name = normalize_required_text(&cmd.name, "stock item name")?;
        let unit_cost = require_non_negative(cmd.unit_cost, "unit_cost")?;
        let initial_quantity = require_non_negative(cmd.initial_quantity, "initial_quantity")?;
        let extra_limit = require_non_negative(cmd.extra_production_limit, "extra_production_limit")?;
        with_tx!(self, |db_tx| {
            require_unit(&db_tx, cmd.base_unit_id).await?;

            let mut item = StockItem::new(name, cmd.base_unit_id, unit_cost);
            item.supplier = normalize_optional_text(cmd.supplier.as_deref());
            item.allow_extra_production = cmd.allow_extra_production;
            item.extra_production_limit = extra_limit;
            stock_items::ActiveModel::try_from(&item)?
                .insert(&db_tx)
                .await?;

            let base = UnitConversion::base(item.id, item.base_unit_id);
            unit_conversions::ActiveModel::try_from(&base)?
                .insert(&db_tx)
                .await?;

            if initial_quantity > Decimal::ZERO {
                let tx = StockTransaction::increase(item.id, initial_quantity, StockReason::InitialStock)?;
                post_stock(&db_tx, &mut item, tx).await?;
            }

            tracing::info!(stock_item_id = %item.id, name = %item.name, "stock item created");
            Ok(item)
        })
    }

    /// Declare how many base units one `unit_id` is worth for a stock item.
    pub async fn add_unit_conversion(
        &self,
        stock_item_id: Uuid,
        unit_id: Uuid,
        factor: Decimal,
    ) -> ResultEngine<UnitConversion> {
        let factor = require_positive(factor, "conversion factor")?;
        with_tx!(self, |db_tx| {
            require_stock_item(&db_tx, stock_item_id).await?;
            require_unit(&db_tx, unit_id).await?;

            let exists = unit_conversions::Entity::find_by_id((stock_item_id.to_string(), unit_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!(
                    "unit {unit_id} already has a conversion for stock item {stock_item_id}"
                )));
            }

            let conversion = UnitConversion {
                stock_item_id,
                unit_id,
                factor,
                is_base: false,
            };
            unit_conversions::ActiveModel::try_from(&conversion)?
                .insert(&db_tx)
                .await?;
            Ok(conversion)
        })
    }

    /// Change cost, supplier and extra-usage policy of a stock item. The
    /// balance is left alone.
    pub async fn update_stock_item_settings(
        &self,
        stock_item_id: Uuid,
        cmd: StockItemSettingsCmd,
    ) -> ResultEngine<StockItem> {
        let unit_cost = cmd
            .unit_cost
            .map(|cost| require_non_negative(cost, "unit_cost"))
            .transpose()?;
        let extra_limit = cmd
            .extra_production_limit
            .map(|limit| require_non_negative(limit, "extra_production_limit"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let mut item = LockSet::new()
                .stock_item(stock_item_id)
                .acquire(&db_tx)
                .await?
                .take_stock_item(stock_item_id)?;

            if let Some(cost) = unit_cost {
                item.unit_cost = cost;
            }
            if let Some(supplier) = cmd.supplier.as_deref() {
                item.supplier = normalize_optional_text(Some(supplier));
            }
            if let Some(allow) = cmd.allow_extra_production {
                item.allow_extra_production = allow;
            }
            if let Some(limit) = extra_limit {
                item.extra_production_limit = limit;
            }
            item.updated_at = Utc::now();

            stock_items::ActiveModel {
                id: ActiveValue::Set(item.id.to_string()),
                unit_cost_minor: ActiveValue::Set(to_minor(item.unit_cost)?),
                supplier: ActiveValue::Set(item.supplier.clone()),
                allow_extra_production: ActiveValue::Set(item.allow_extra_production),
                extra_production_limit_minor: ActiveValue::Set(to_minor(item.extra_production_limit)?),
                updated_at: ActiveValue::Set(item.updated_at),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(item)
        })
    }

    /// Return a stock item snapshot from DB.
    pub async fn stock_item(&self, stock_item_id: Uuid) -> ResultEngine<StockItem> {
        with_tx!(self, |db_tx| require_stock_item(&db_tx, stock_item_id).await)
    }

    pub async fn list_stock_items(&self) -> ResultEngine<Vec<StockItem>> {
        with_tx!(self, |db_tx| {
            let models = stock_items::Entity::find()
                .order_by_asc(stock_items::Column::Name)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(StockItem::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn create_product(&self, name: &str, selling_price: Decimal) -> ResultEngine<Product> {
        let name = normalize_required_text(name, "product name")?;
        let selling_price = require_positive(selling_price, "selling_price")?;
        with_tx!(self, |db_tx| {
            let product = Product::new(name, selling_price);
            products::ActiveModel::try_from(&product)?
                .insert(&db_tx)
                .await?;
            tracing::info!(product_id = %product.id, name = %product.name, "product created");
            Ok(product)
        })
    }

    /// Return a product snapshot from DB.
    pub async fn product(&self, product_id: Uuid) -> ResultEngine<Product> {
        with_tx!(self, |db_tx| require_product(&db_tx, product_id).await)
    }

    pub async fn list_products(&self) -> ResultEngine<Vec<Product>> {
        with_tx!(self, |db_tx| {
            let models = products::Entity::find()
                .order_by_asc(products::Column::Name)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(Product::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}

async fn require_unit(db_tx: &sea_orm::DatabaseTransaction, unit_id: Uuid) -> ResultEngine<Unit> {
    let model = units::Entity::find_by_id(unit_id.to_string())
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("unit {unit_id}")))?;
    Unit::try_from(model)
}

/// Unlocked read of a product.
pub(super) async fn require_product(
    db_tx: &sea_orm::DatabaseTransaction,
    product_id: Uuid,
) -> ResultEngine<Product> {
    let model = products::Entity::find_by_id(product_id.to_string())
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("product {product_id}")))?;
    Product::try_from(model)
}
