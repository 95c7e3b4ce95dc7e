//! Off-recipe ingredient usage reported with a production update.
//!
//! Unlike recipe consumption, extras are checked as a batch: every line is
//! validated against policy, cap and balance before the first one is posted.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ExtraIngredient, LedgerMetadata, ProductionOrder, ResultEngine, StockReason,
    StockTransaction,
    numeric::{add, from_minor, mul, round},
    stock_transactions,
};

use super::{
    conversion::to_base,
    ledger::{insufficient, post_stock},
    lock_set::Locked,
};

/// Extra usage already booked for `stock_item_id` on this order.
pub(super) async fn prior_extra_usage(
    db_tx: &DatabaseTransaction,
    order_id: Uuid,
    stock_item_id: Uuid,
) -> ResultEngine<Decimal> {
    let models = stock_transactions::Entity::find()
        .filter(stock_transactions::Column::StockItemId.eq(stock_item_id.to_string()))
        .filter(stock_transactions::Column::OrderId.eq(order_id.to_string()))
        .filter(stock_transactions::Column::Reason.eq(StockReason::ProductionExtra.as_str()))
        .all(db_tx)
        .await?;
    Ok(models
        .iter()
        .map(|model| from_minor(model.quantity_minor))
        .sum())
}

/// Validate and post `extras` against stock items already held in `locked`.
/// Returns the cost of the extras.
pub(super) async fn apply_extras(
    db_tx: &DatabaseTransaction,
    order: &ProductionOrder,
    extras: &[ExtraIngredient],
    locked: &mut Locked,
) -> ResultEngine<Decimal> {
    // Duplicates are summed after conversion so the cap sees the whole request.
    let mut requested: BTreeMap<Uuid, Decimal> = BTreeMap::new();
    for extra in extras {
        let item = locked.stock_item_mut(extra.stock_item_id)?;
        let base = to_base(db_tx, item, extra.quantity, extra.unit_id).await?;
        if base <= Decimal::ZERO {
            return Err(EngineError::Validation(format!(
                "extra quantity of {} is too small for the base unit",
                item.name
            )));
        }
        let total = requested.entry(extra.stock_item_id).or_default();
        *total = add(*total, base)?;
    }

    for (&stock_item_id, &quantity) in &requested {
        let item = locked.stock_item_mut(stock_item_id)?;
        if !item.allow_extra_production {
            return Err(EngineError::ExtraNotAllowed(item.name.clone()));
        }
        if item.has_extra_limit() {
            let prior = prior_extra_usage(db_tx, order.id, stock_item_id).await?;
            if prior + quantity > item.extra_production_limit {
                return Err(EngineError::ExtraLimitExceeded(format!(
                    "{}: already used {prior}, requested {quantity}, limit {}",
                    item.name, item.extra_production_limit
                )));
            }
        }
        if quantity > item.current_quantity {
            return Err(insufficient(&item.name, quantity, item.current_quantity));
        }
    }

    let mut cost = Decimal::ZERO;
    for (stock_item_id, quantity) in requested {
        let item = locked.stock_item_mut(stock_item_id)?;
        let tx = StockTransaction::decrease(stock_item_id, quantity, StockReason::ProductionExtra)?
            .metadata(LedgerMetadata::for_order(order.id, order.product_id));
        post_stock(db_tx, item, tx).await?;
        cost = add(cost, round(mul(item.unit_cost, quantity)?))?;
        tracing::info!(
            order_id = %order.id,
            %stock_item_id,
            %quantity,
            "extra ingredient used"
        );
    }
    Ok(cost)
}
