//! Ledger replay.
//!
//! Cached balances are a projection of the ledgers. `verify_ledgers` replays
//! every row and compares; a disagreement or a negative running balance is an
//! integrity failure, never silently repaired.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{DatabaseTransaction, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Product, ProductTransaction, ResultEngine, StockItem, StockTransaction,
    product_transactions, products, stock_items, stock_transactions,
};

use super::{Engine, with_tx};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReport {
    pub stock_items: usize,
    pub stock_transactions: usize,
    pub products: usize,
    pub product_transactions: usize,
}

/// Fold signed deltas in order, failing on the first negative running total.
fn replay<'a>(
    label: &str,
    id: Uuid,
    deltas: impl IntoIterator<Item = &'a Decimal>,
) -> ResultEngine<Decimal> {
    let mut balance = Decimal::ZERO;
    for delta in deltas {
        balance += *delta;
        if balance < Decimal::ZERO {
            return Err(EngineError::Integrity(format!(
                "{label} {id} ledger goes negative"
            )));
        }
    }
    Ok(balance)
}

fn compare(label: &str, id: Uuid, cached: Decimal, replayed: Decimal) -> ResultEngine<()> {
    if cached != replayed {
        return Err(EngineError::Integrity(format!(
            "{label} {id} balance {cached} disagrees with ledger sum {replayed}"
        )));
    }
    Ok(())
}

async fn verify_stock(db_tx: &DatabaseTransaction, report: &mut LedgerReport) -> ResultEngine<()> {
    let items = stock_items::Entity::find()
        .all(db_tx)
        .await?
        .into_iter()
        .map(StockItem::try_from)
        .collect::<ResultEngine<Vec<_>>>()?;
    let rows = stock_transactions::Entity::find()
        .order_by_asc(stock_transactions::Column::CreatedAt)
        .all(db_tx)
        .await?
        .into_iter()
        .map(StockTransaction::try_from)
        .collect::<ResultEngine<Vec<_>>>()?;
    report.stock_items = items.len();
    report.stock_transactions = rows.len();

    let mut deltas: HashMap<Uuid, Vec<Decimal>> = HashMap::new();
    for row in rows {
        deltas.entry(row.stock_item_id).or_default().push(row.delta);
    }
    for item in &items {
        let replayed = replay(
            "stock item",
            item.id,
            deltas.remove(&item.id).unwrap_or_default().iter(),
        )?;
        compare("stock item", item.id, item.current_quantity, replayed)?;
    }
    if let Some(orphan) = deltas.keys().next() {
        return Err(EngineError::Integrity(format!(
            "stock ledger references unknown stock item {orphan}"
        )));
    }
    Ok(())
}

async fn verify_products(
    db_tx: &DatabaseTransaction,
    report: &mut LedgerReport,
) -> ResultEngine<()> {
    let products = products::Entity::find()
        .all(db_tx)
        .await?
        .into_iter()
        .map(Product::try_from)
        .collect::<ResultEngine<Vec<_>>>()?;
    let rows = product_transactions::Entity::find()
        .order_by_asc(product_transactions::Column::CreatedAt)
        .all(db_tx)
        .await?
        .into_iter()
        .map(ProductTransaction::try_from)
        .collect::<ResultEngine<Vec<_>>>()?;
    report.products = products.len();
    report.product_transactions = rows.len();

    let mut deltas: HashMap<Uuid, Vec<Decimal>> = HashMap::new();
    for row in rows {
        deltas.entry(row.product_id).or_default().push(row.delta);
    }
    for product in &products {
        let replayed = replay(
            "product",
            product.id,
            deltas.remove(&product.id).unwrap_or_default().iter(),
        )?;
        compare("product", product.id, product.current_stock, replayed)?;
    }
    if let Some(orphan) = deltas.keys().next() {
        return Err(EngineError::Integrity(format!(
            "product ledger references unknown product {orphan}"
        )));
    }
    Ok(())
}

impl Engine {
    /// Replay both ledgers against the cached balances.
    pub async fn verify_ledgers(&self) -> ResultEngine<LedgerReport> {
        with_tx!(self, |db_tx| {
            let mut report = LedgerReport::default();
            verify_stock(&db_tx, &mut report).await?;
            verify_products(&db_tx, &mut report).await?;
            tracing::debug!(?report, "ledgers verified");
            Ok(report)
        })
    }
}
