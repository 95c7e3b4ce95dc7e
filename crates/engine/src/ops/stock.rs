use rust_decimal::Decimal;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseCategory, LedgerMetadata, ResultEngine, StockEntryCmd, StockItem, StockReason,
    StockTransaction,
    numeric::{mul, require_non_negative, require_positive, round},
    stock_transactions,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{
    Engine,
    conversion::{require_stock_item, to_base},
    ledger::{insert_expense, post_stock},
    lock_set::LockSet,
    with_tx,
};

impl Engine {
    /// Book a delivery. The entered unit and quantity are kept on the row.
    pub async fn receive_stock(&self, cmd: StockEntryCmd) -> ResultEngine<StockTransaction> {
        let entered = require_positive(cmd.quantity, "quantity")?;
        let note = normalize_optional_text(cmd.note.as_deref());
        with_tx!(self, |db_tx| {
            let mut item = lock_item(&db_tx, cmd.stock_item_id).await?;
            let quantity = positive_base(to_base(&db_tx, &item, entered, cmd.unit_id).await?)?;

            let tx = StockTransaction::increase(item.id, quantity, StockReason::Purchase)?
                .entered(cmd.unit_id, entered)
                .note(note);
            let tx = post_stock(&db_tx, &mut item, tx).await?;
            tracing::info!(stock_item_id = %item.id, %quantity, "stock received");
            Ok(tx)
        })
    }

    /// Replace the on-hand quantity with a physical count.
    ///
    /// Writes one `adjustment` row with the signed difference; a count equal
    /// to the current balance writes nothing and returns `None`.
    pub async fn set_stock_quantity(
        &self,
        cmd: StockEntryCmd,
    ) -> ResultEngine<Option<StockTransaction>> {
        let entered = require_non_negative(cmd.quantity, "quantity")?;
        let note = normalize_optional_text(cmd.note.as_deref());
        with_tx!(self, |db_tx| {
            let mut item = lock_item(&db_tx, cmd.stock_item_id).await?;
            let counted = to_base(&db_tx, &item, entered, cmd.unit_id).await?;
            let delta = counted - item.current_quantity;
            if delta.is_zero() {
                return Ok(None);
            }

            let tx = StockTransaction::adjustment(item.id, delta, StockReason::StockCount)?
                .entered(cmd.unit_id, entered)
                .note(note);
            let tx = post_stock(&db_tx, &mut item, tx).await?;
            tracing::info!(stock_item_id = %item.id, %delta, "stock counted");
            Ok(Some(tx))
        })
    }

    /// Write off damaged stock and book its value as a `stock_damage` expense.
    /// Items without a unit cost are written off without an expense.
    pub async fn record_stock_damage(
        &self,
        cmd: StockEntryCmd,
    ) -> ResultEngine<(StockTransaction, Option<Expense>)> {
        let entered = require_positive(cmd.quantity, "quantity")?;
        let reason = normalize_required_text(cmd.note.as_deref().unwrap_or_default(), "damage reason")?;
        with_tx!(self, |db_tx| {
            let mut item = lock_item(&db_tx, cmd.stock_item_id).await?;
            let quantity = positive_base(to_base(&db_tx, &item, entered, cmd.unit_id).await?)?;
            let amount = round(mul(item.unit_cost, quantity)?);

            let expense = if amount > Decimal::ZERO {
                let expense = Expense::new(
                    ExpenseCategory::StockDamage,
                    format!("Damaged stock: {} x {}", quantity, item.name),
                    amount,
                )?
                .notes(Some(reason.clone()))
                .stock_item(item.id);
                Some(expense)
            } else {
                None
            };

            let metadata = LedgerMetadata {
                expense_id: expense.as_ref().map(|e| e.id),
                ..LedgerMetadata::default()
            };
            let tx = StockTransaction::decrease(item.id, quantity, StockReason::Damage)?
                .entered(cmd.unit_id, entered)
                .note(Some(reason))
                .metadata(metadata);
            let tx = post_stock(&db_tx, &mut item, tx).await?;
            if let Some(expense) = &expense {
                insert_expense(&db_tx, expense).await?;
            }
            tracing::info!(stock_item_id = %item.id, %quantity, %amount, "stock damage recorded");
            Ok((tx, expense))
        })
    }

    /// Ledger rows of a stock item, oldest first.
    pub async fn stock_transactions(&self, stock_item_id: Uuid) -> ResultEngine<Vec<StockTransaction>> {
        with_tx!(self, |db_tx| {
            require_stock_item(&db_tx, stock_item_id).await?;
            let models = stock_transactions::Entity::find()
                .filter(stock_transactions::Column::StockItemId.eq(stock_item_id.to_string()))
                .order_by_asc(stock_transactions::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(StockTransaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}

async fn lock_item(
    db_tx: &sea_orm::DatabaseTransaction,
    stock_item_id: Uuid,
) -> ResultEngine<StockItem> {
    LockSet::new()
        .stock_item(stock_item_id)
        .acquire(db_tx)
        .await?
        .take_stock_item(stock_item_id)
}

/// A positive entered quantity can still round to zero base units.
fn positive_base(quantity: Decimal) -> ResultEngine<Decimal> {
    if quantity <= Decimal::ZERO {
        return Err(EngineError::Validation(
            "quantity is too small for the base unit".to_string(),
        ));
    }
    Ok(quantity)
}
