use rust_decimal::Decimal;
use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, StockItem, UnitConversion, numeric::ensure_scale, stock_items,
    unit_conversions,
};

use super::{Engine, with_tx};

/// Load the conversion of `unit_id` for a stock item.
pub(super) async fn conversion_for(
    db_tx: &DatabaseTransaction,
    stock_item_id: Uuid,
    unit_id: Uuid,
) -> ResultEngine<UnitConversion> {
    let model = unit_conversions::Entity::find_by_id((stock_item_id.to_string(), unit_id.to_string()))
        .one(db_tx)
        .await?
        .ok_or_else(|| {
            EngineError::InvalidUnit(format!(
                "unit {unit_id} has no conversion for stock item {stock_item_id}"
            ))
        })?;
    UnitConversion::try_from(model)
}

/// Express `quantity` (entered in `unit_id`, or already in base units when
/// `None`) in base units of `item`.
pub(super) async fn to_base(
    db_tx: &DatabaseTransaction,
    item: &StockItem,
    quantity: Decimal,
    unit_id: Option<Uuid>,
) -> ResultEngine<Decimal> {
    match unit_id {
        None => Ok(quantity),
        Some(unit_id) => conversion_for(db_tx, item.id, unit_id)
            .await?
            .to_base(quantity),
    }
}

pub(super) async fn from_base(
    db_tx: &DatabaseTransaction,
    item: &StockItem,
    quantity: Decimal,
    unit_id: Option<Uuid>,
) -> ResultEngine<Decimal> {
    match unit_id {
        None => Ok(quantity),
        Some(unit_id) => conversion_for(db_tx, item.id, unit_id)
            .await?
            .from_base(quantity),
    }
}

impl Engine {
    /// Convert a base-unit quantity of a stock item into `unit_id` for display.
    pub async fn convert_quantity(
        &self,
        stock_item_id: Uuid,
        base_quantity: Decimal,
        unit_id: Option<Uuid>,
    ) -> ResultEngine<Decimal> {
        let base_quantity = ensure_scale(base_quantity, "quantity")?;
        with_tx!(self, |db_tx| {
            let item = require_stock_item(&db_tx, stock_item_id).await?;
            from_base(&db_tx, &item, base_quantity, unit_id).await
        })
    }

    /// Convert a quantity entered in `unit_id` into base units of the stock item.
    pub async fn to_base_quantity(
        &self,
        stock_item_id: Uuid,
        quantity: Decimal,
        unit_id: Option<Uuid>,
    ) -> ResultEngine<Decimal> {
        let quantity = ensure_scale(quantity, "quantity")?;
        with_tx!(self, |db_tx| {
            let item = require_stock_item(&db_tx, stock_item_id).await?;
            to_base(&db_tx, &item, quantity, unit_id).await
        })
    }

    /// Every unit a stock item can be entered in, base unit included.
    pub async fn unit_conversions(&self, stock_item_id: Uuid) -> ResultEngine<Vec<UnitConversion>> {
        with_tx!(self, |db_tx| {
            require_stock_item(&db_tx, stock_item_id).await?;
            let models = unit_conversions::Entity::find()
                .filter(unit_conversions::Column::StockItemId.eq(stock_item_id.to_string()))
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(UnitConversion::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}

/// Unlocked read of a stock item.
pub(super) async fn require_stock_item(
    db_tx: &DatabaseTransaction,
    stock_item_id: Uuid,
) -> ResultEngine<StockItem> {
    let model = stock_items::Entity::find_by_id(stock_item_id.to_string())
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("stock item {stock_item_id}")))?;
    StockItem::try_from(model)
}
