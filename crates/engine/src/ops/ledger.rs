//! Posting ledger rows.
//!
//! These are the only functions that change a cached balance. Each one
//! applies the row's delta to the locked entity, refuses to go below zero,
//! writes the new balance and appends the row in the same transaction.

use rust_decimal::Decimal;
use sea_orm::{ActiveValue, DatabaseTransaction, prelude::*};

use crate::{
    EngineError, Expense, Product, ProductTransaction, ResultEngine, StockItem, StockTransaction,
    expenses, numeric::to_minor, product_transactions, products, stock_items, stock_transactions,
};

pub(super) fn insufficient(name: &str, required: Decimal, available: Decimal) -> EngineError {
    EngineError::InsufficientStock(format!(
        "{name}: requires {required}, available {available}"
    ))
}

pub(super) async fn post_stock(
    db_tx: &DatabaseTransaction,
    item: &mut StockItem,
    tx: StockTransaction,
) -> ResultEngine<StockTransaction> {
    if tx.stock_item_id != item.id {
        return Err(EngineError::Integrity(format!(
            "stock transaction {} posted to the wrong item",
            tx.id
        )));
    }
    let next = item.current_quantity + tx.delta;
    if next < Decimal::ZERO {
        return Err(insufficient(&item.name, tx.quantity, item.current_quantity));
    }

    stock_items::ActiveModel {
        id: ActiveValue::Set(item.id.to_string()),
        current_quantity_minor: ActiveValue::Set(to_minor(next)?),
        updated_at: ActiveValue::Set(tx.created_at),
        ..Default::default()
    }
    .update(db_tx)
    .await?;
    stock_transactions::ActiveModel::try_from(&tx)?
        .insert(db_tx)
        .await?;

    item.current_quantity = next;
    item.updated_at = tx.created_at;
    Ok(tx)
}

pub(super) async fn post_product(
    db_tx: &DatabaseTransaction,
    product: &mut Product,
    tx: ProductTransaction,
) -> ResultEngine<ProductTransaction> {
    if tx.product_id != product.id {
        return Err(EngineError::Integrity(format!(
            "product transaction {} posted to the wrong product",
            tx.id
        )));
    }
    let next = product.current_stock + tx.delta;
    if next < Decimal::ZERO {
        return Err(insufficient(&product.name, tx.quantity, product.current_stock));
    }

    if !tx.delta.is_zero() {
        products::ActiveModel {
            id: ActiveValue::Set(product.id.to_string()),
            current_stock_minor: ActiveValue::Set(to_minor(next)?),
            updated_at: ActiveValue::Set(tx.created_at),
            ..Default::default()
        }
        .update(db_tx)
        .await?;
    }
    product_transactions::ActiveModel::try_from(&tx)?
        .insert(db_tx)
        .await?;

    product.current_stock = next;
    product.updated_at = tx.created_at;
    Ok(tx)
}

pub(super) async fn insert_expense(
    db_tx: &DatabaseTransaction,
    expense: &Expense,
) -> ResultEngine<()> {
    expenses::ActiveModel::try_from(expense)?
        .insert(db_tx)
        .await?;
    Ok(())
}
