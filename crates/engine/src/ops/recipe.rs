//! Recipe maintenance and resolution.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, RecipeLine, Requirement, ResolvedRecipe, ResultEngine, StockItem,
    numeric::{add, ensure_scale, mul, require_positive, round, to_minor},
    recipes, stock_items,
};

use super::{Engine, catalog::require_product, conversion::require_stock_item, with_tx};

/// Recipe rows of a product, ordered by stock item id.
pub(super) async fn recipe_lines(
    db_tx: &DatabaseTransaction,
    product_id: Uuid,
) -> ResultEngine<Vec<RecipeLine>> {
    let models = recipes::Entity::find()
        .filter(recipes::Column::ProductId.eq(product_id.to_string()))
        .order_by_asc(recipes::Column::StockItemId)
        .all(db_tx)
        .await?;
    models
        .into_iter()
        .map(RecipeLine::try_from)
        .collect::<ResultEngine<Vec<_>>>()
}

/// Price and scale `lines` against the given stock items.
pub(super) fn resolve_with(
    product_id: Uuid,
    lines: &[RecipeLine],
    items: &BTreeMap<Uuid, StockItem>,
    target_quantity: Decimal,
) -> ResultEngine<ResolvedRecipe> {
    if lines.is_empty() {
        tracing::warn!(%product_id, "product has no recipe, production consumes nothing");
    }

    let mut requirements = Vec::with_capacity(lines.len());
    let mut cost_per_unit = Decimal::ZERO;
    for line in lines {
        let item = items.get(&line.stock_item_id).ok_or_else(|| {
            EngineError::Integrity(format!(
                "recipe of product {product_id} references missing stock item {}",
                line.stock_item_id
            ))
        })?;
        cost_per_unit = add(cost_per_unit, mul(line.quantity_per_unit, item.unit_cost)?)?;
        requirements.push(Requirement {
            stock_item_id: item.id,
            stock_item_name: item.name.clone(),
            quantity_per_unit: line.quantity_per_unit,
            quantity: round(mul(line.quantity_per_unit, target_quantity)?),
            unit_cost: item.unit_cost,
        });
    }

    Ok(ResolvedRecipe {
        product_id,
        requirements,
        cost_per_unit: round(cost_per_unit),
    })
}

/// Unlocked resolution, for estimates and reads.
pub(super) async fn resolve(
    db_tx: &DatabaseTransaction,
    product_id: Uuid,
    target_quantity: Decimal,
) -> ResultEngine<ResolvedRecipe> {
    let lines = recipe_lines(db_tx, product_id).await?;
    let mut items = BTreeMap::new();
    if !lines.is_empty() {
        let ids: Vec<String> = lines.iter().map(|l| l.stock_item_id.to_string()).collect();
        let models = stock_items::Entity::find()
            .filter(stock_items::Column::Id.is_in(ids))
            .all(db_tx)
            .await?;
        for model in models {
            let item = StockItem::try_from(model)?;
            items.insert(item.id, item);
        }
    }
    resolve_with(product_id, &lines, &items, target_quantity)
}

impl Engine {
    /// Insert or replace how much of a stock item one unit of a product needs.
    pub async fn set_recipe_line(
        &self,
        product_id: Uuid,
        stock_item_id: Uuid,
        quantity_per_unit: Decimal,
    ) -> ResultEngine<RecipeLine> {
        let quantity_per_unit = require_positive(quantity_per_unit, "quantity_per_unit")?;
        with_tx!(self, |db_tx| {
            require_product(&db_tx, product_id).await?;
            require_stock_item(&db_tx, stock_item_id).await?;

            let line = RecipeLine {
                product_id,
                stock_item_id,
                quantity_per_unit,
            };
            let existing = recipes::Entity::find_by_id((product_id.to_string(), stock_item_id.to_string()))
                .one(&db_tx)
                .await?;
            match existing {
                Some(_) => {
                    recipes::ActiveModel {
                        product_id: ActiveValue::Set(product_id.to_string()),
                        stock_item_id: ActiveValue::Set(stock_item_id.to_string()),
                        quantity_per_unit_minor: ActiveValue::Set(to_minor(quantity_per_unit)?),
                    }
                    .update(&db_tx)
                    .await?;
                }
                None => {
                    recipes::ActiveModel::try_from(&line)?
                        .insert(&db_tx)
                        .await?;
                }
            }
            Ok(line)
        })
    }

    pub async fn remove_recipe_line(&self, product_id: Uuid, stock_item_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let result = recipes::Entity::delete_by_id((product_id.to_string(), stock_item_id.to_string()))
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::NotFound(format!(
                    "recipe line {product_id}/{stock_item_id}"
                )));
            }
            Ok(())
        })
    }

    pub async fn recipe(&self, product_id: Uuid) -> ResultEngine<Vec<RecipeLine>> {
        with_tx!(self, |db_tx| {
            require_product(&db_tx, product_id).await?;
            recipe_lines(&db_tx, product_id).await
        })
    }

    /// Ingredient requirements and unit cost for producing `target_quantity`.
    pub async fn resolve_recipe(
        &self,
        product_id: Uuid,
        target_quantity: Decimal,
    ) -> ResultEngine<ResolvedRecipe> {
        let target_quantity = ensure_scale(target_quantity, "target quantity")?;
        with_tx!(self, |db_tx| {
            require_product(&db_tx, product_id).await?;
            resolve(&db_tx, product_id, target_quantity).await
        })
    }
}
