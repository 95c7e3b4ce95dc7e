//! Row locks taken before an operation reads anything it decides on.
//!
//! Rows are locked per table in a fixed order (production orders, stock
//! adjustments, products, stock items) and by primary key ascending within a
//! table, so two operations touching overlapping rows always queue in the same
//! order. A `LockSet` may be acquired in several steps as long as each step
//! only adds tables that come later in that order.
//!
//! On SQLite the `FOR UPDATE` clause is omitted by sea-orm. Transactions are
//! deferred, so the reads here only take a shared lock; a second writer on a
//! file database fails with `SQLITE_BUSY` (an `EngineError::Database`)
//! instead of waiting. Nothing is applied twice; the caller may retry.

use std::collections::{BTreeMap, BTreeSet};

use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Product, ProductionOrder, ResultEngine, StockAdjustment, StockItem,
    production_orders, products, stock_adjustments, stock_items,
};

#[derive(Debug, Default)]
pub(super) struct LockSet {
    orders: BTreeSet<Uuid>,
    adjustments: BTreeSet<Uuid>,
    products: BTreeSet<Uuid>,
    stock_items: BTreeSet<Uuid>,
}

impl LockSet {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn order(mut self, id: Uuid) -> Self {
        self.orders.insert(id);
        self
    }

    pub(super) fn adjustment(mut self, id: Uuid) -> Self {
        self.adjustments.insert(id);
        self
    }

    pub(super) fn product(mut self, id: Uuid) -> Self {
        self.products.insert(id);
        self
    }

    pub(super) fn stock_item(mut self, id: Uuid) -> Self {
        self.stock_items.insert(id);
        self
    }

    pub(super) fn stock_items(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.stock_items.extend(ids);
        self
    }

    /// Lock every requested row and load it. A missing row is `NotFound`.
    pub(super) async fn acquire(self, db_tx: &DatabaseTransaction) -> ResultEngine<Locked> {
        let mut locked = Locked::default();

        if !self.orders.is_empty() {
            let models = production_orders::Entity::find()
                .filter(production_orders::Column::Id.is_in(as_keys(&self.orders)))
                .order_by_asc(production_orders::Column::Id)
                .lock_exclusive()
                .all(db_tx)
                .await?;
            for model in models {
                let order = ProductionOrder::try_from(model)?;
                locked.orders.insert(order.id, order);
            }
            ensure_all(&self.orders, &locked.orders, "production order")?;
        }

        if !self.adjustments.is_empty() {
            let models = stock_adjustments::Entity::find()
                .filter(stock_adjustments::Column::Id.is_in(as_keys(&self.adjustments)))
                .order_by_asc(stock_adjustments::Column::Id)
                .lock_exclusive()
                .all(db_tx)
                .await?;
            for model in models {
                let adjustment = StockAdjustment::try_from(model)?;
                locked.adjustments.insert(adjustment.id, adjustment);
            }
            ensure_all(&self.adjustments, &locked.adjustments, "stock adjustment")?;
        }

        if !self.products.is_empty() {
            let models = products::Entity::find()
                .filter(products::Column::Id.is_in(as_keys(&self.products)))
                .order_by_asc(products::Column::Id)
                .lock_exclusive()
                .all(db_tx)
                .await?;
            for model in models {
                let product = Product::try_from(model)?;
                locked.products.insert(product.id, product);
            }
            ensure_all(&self.products, &locked.products, "product")?;
        }

        if !self.stock_items.is_empty() {
            let models = stock_items::Entity::find()
                .filter(stock_items::Column::Id.is_in(as_keys(&self.stock_items)))
                .order_by_asc(stock_items::Column::Id)
                .lock_exclusive()
                .all(db_tx)
                .await?;
            for model in models {
                let item = StockItem::try_from(model)?;
                locked.stock_items.insert(item.id, item);
            }
            ensure_all(&self.stock_items, &locked.stock_items, "stock item")?;
        }

        Ok(locked)
    }
}

/// Rows held under lock for the rest of the transaction.
#[derive(Debug, Default)]
pub(super) struct Locked {
    pub(super) orders: BTreeMap<Uuid, ProductionOrder>,
    pub(super) adjustments: BTreeMap<Uuid, StockAdjustment>,
    pub(super) products: BTreeMap<Uuid, Product>,
    pub(super) stock_items: BTreeMap<Uuid, StockItem>,
}

impl Locked {
    pub(super) fn take_order(&mut self, id: Uuid) -> ResultEngine<ProductionOrder> {
        self.orders
            .remove(&id)
            .ok_or_else(|| not_locked("production order", id))
    }

    pub(super) fn take_adjustment(&mut self, id: Uuid) -> ResultEngine<StockAdjustment> {
        self.adjustments
            .remove(&id)
            .ok_or_else(|| not_locked("stock adjustment", id))
    }

    pub(super) fn take_product(&mut self, id: Uuid) -> ResultEngine<Product> {
        self.products
            .remove(&id)
            .ok_or_else(|| not_locked("product", id))
    }

    pub(super) fn take_stock_item(&mut self, id: Uuid) -> ResultEngine<StockItem> {
        self.stock_items
            .remove(&id)
            .ok_or_else(|| not_locked("stock item", id))
    }

    pub(super) fn stock_item_mut(&mut self, id: Uuid) -> ResultEngine<&mut StockItem> {
        self.stock_items
            .get_mut(&id)
            .ok_or_else(|| not_locked("stock item", id))
    }
}

fn as_keys(ids: &BTreeSet<Uuid>) -> Vec<String> {
    ids.iter().map(Uuid::to_string).collect()
}

fn ensure_all<T>(
    requested: &BTreeSet<Uuid>,
    loaded: &BTreeMap<Uuid, T>,
    label: &str,
) -> ResultEngine<()> {
    match requested.iter().find(|id| !loaded.contains_key(id)) {
        Some(missing) => Err(EngineError::NotFound(format!("{label} {missing}"))),
        None => Ok(()),
    }
}

fn not_locked(label: &str, id: Uuid) -> EngineError {
    EngineError::Integrity(format!("{label} {id} was not locked"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_collapse_and_sort() {
        let a = Uuid::from_u128(2);
        let b = Uuid::from_u128(1);
        let set = LockSet::new().stock_items([a, b, a]);
        assert_eq!(set.stock_items.into_iter().collect::<Vec<_>>(), vec![b, a]);
    }

    #[test]
    fn uuid_order_matches_text_order() {
        let low = Uuid::from_u128(0x0fff_ffff_ffff_ffff_ffff_ffff_ffff_ffff);
        let high = Uuid::from_u128(0x1000_0000_0000_0000_0000_0000_0000_0000);
        let keys = as_keys(&BTreeSet::from([high, low]));
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn missing_row_is_not_found() {
        let requested = BTreeSet::from([Uuid::from_u128(7)]);
        let loaded: BTreeMap<Uuid, ()> = BTreeMap::new();
        assert!(matches!(
            ensure_all(&requested, &loaded, "product"),
            Err(EngineError::NotFound(_))
        ));
    }
}
