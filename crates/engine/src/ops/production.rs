//! Production order lifecycle.
//!
//! `update_production_order` is the only mutator of an order. One call locks
//! the order, then its product and every stock item it may touch, decides
//! everything against the locked rows and only then posts consumption,
//! extras and output.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseCategory, LedgerMetadata, ProductReason, ProductTransaction,
    ProductionOrder, ProductionStatus, ResolvedRecipe, ResultEngine, StockReason, StockTransaction,
    UpdateProductionOrderCmd,
    numeric::{add, require_non_negative, require_positive},
    production_orders,
    util::normalize_optional_text,
};

use super::{
    Engine,
    catalog::require_product,
    extras::apply_extras,
    ledger::{insert_expense, insufficient, post_product, post_stock},
    lock_set::{LockSet, Locked},
    recipe::{recipe_lines, resolve, resolve_with},
    with_tx,
};

/// Outcome of validating a patch against the current order.
#[derive(Debug, PartialEq, Eq)]
struct UpdatePlan {
    quantity_produced: Decimal,
    delta: Decimal,
    status: ProductionStatus,
    status_reason: Option<String>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    /// Consumption, extras and output run in this update.
    runs_production: bool,
}

fn plan_update(
    order: &ProductionOrder,
    cmd: &UpdateProductionOrderCmd,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> ResultEngine<UpdatePlan> {
    if order.status.is_terminal() {
        return Err(EngineError::InvalidTransition(format!(
            "order {} is {} and can no longer change",
            order.id, order.status
        )));
    }

    let quantity_produced = match cmd.quantity_produced {
        Some(quantity) => require_non_negative(quantity, "quantity_produced")?,
        None => order.quantity_produced,
    };
    let delta = quantity_produced - order.quantity_produced;
    let requested = cmd.status.unwrap_or(order.status);
    if delta < Decimal::ZERO && requested != ProductionStatus::Cancelled {
        return Err(EngineError::Validation(format!(
            "quantity_produced cannot decrease from {} to {quantity_produced}",
            order.quantity_produced
        )));
    }

    let completing = quantity_produced > Decimal::ZERO && order.is_completing(quantity_produced);
    let status = if requested == ProductionStatus::InProgress && completing {
        ProductionStatus::Completed
    } else {
        requested
    };
    order.status.check_transition(status, completing)?;

    if delta > Decimal::ZERO && status.requires_reason() {
        return Err(EngineError::Validation(format!(
            "a {status} order cannot record new output"
        )));
    }
    if status.requires_reason() && reason.is_none() {
        return Err(EngineError::Validation(format!(
            "a reason is required to mark an order {status}"
        )));
    }
    if status == ProductionStatus::Completed && quantity_produced <= Decimal::ZERO {
        return Err(EngineError::Validation(
            "completing an order requires quantity_produced > 0".to_string(),
        ));
    }

    let starts = cmd.start
        || matches!(
            status,
            ProductionStatus::InProgress | ProductionStatus::Completed
        );
    let started_at = match order.started_at {
        Some(at) => Some(at),
        None if starts => Some(now),
        None => None,
    };
    let completed_at = if status == ProductionStatus::Completed {
        order.completed_at.or(Some(now))
    } else {
        order.completed_at
    };

    let runs_production = delta > Decimal::ZERO || status == ProductionStatus::Completed;
    if !cmd.extras.is_empty() && !runs_production {
        return Err(EngineError::Validation(
            "extra ingredients need produced quantity or completion in the same update".to_string(),
        ));
    }

    Ok(UpdatePlan {
        quantity_produced,
        delta,
        status,
        status_reason: reason.or_else(|| order.status_reason.clone()),
        started_at,
        completed_at,
        runs_production,
    })
}

/// Post recipe consumption for `delta` produced units. Every ingredient is
/// checked before the first row is written.
async fn consume(
    db_tx: &DatabaseTransaction,
    order: &ProductionOrder,
    recipe: &ResolvedRecipe,
    delta: Decimal,
    locked: &mut Locked,
) -> ResultEngine<()> {
    let usage = recipe.usage_for(delta)?;
    for (stock_item_id, quantity) in &usage {
        let item = locked.stock_item_mut(*stock_item_id)?;
        if *quantity > item.current_quantity {
            return Err(insufficient(&item.name, *quantity, item.current_quantity));
        }
    }

    for (stock_item_id, quantity) in usage {
        if quantity.is_zero() {
            continue;
        }
        let item = locked.stock_item_mut(stock_item_id)?;
        let tx = StockTransaction::decrease(stock_item_id, quantity, StockReason::ProductionConsumption)?
            .metadata(LedgerMetadata::for_order(order.id, order.product_id));
        post_stock(db_tx, item, tx).await?;
    }
    Ok(())
}

/// Book the cost of a failed order as a loss. Runs in a savepoint: a failed
/// write is logged and the order update goes on without it.
async fn record_failure_expense(db_tx: &DatabaseTransaction, order: &ProductionOrder) {
    if order.production_cost <= Decimal::ZERO {
        tracing::info!(order_id = %order.id, "failed order has no cost to expense");
        return;
    }
    match write_failure_expense(db_tx, order).await {
        Ok(expense) => tracing::info!(
            order_id = %order.id,
            expense_id = %expense.id,
            amount = %expense.amount,
            "production failure expensed"
        ),
        Err(err) => tracing::error!(
            order_id = %order.id,
            error = %err,
            "could not record production failure expense"
        ),
    }
}

async fn write_failure_expense(
    db_tx: &DatabaseTransaction,
    order: &ProductionOrder,
) -> ResultEngine<Expense> {
    let expense = Expense::new(
        ExpenseCategory::ProductionFailure,
        format!("Failed production order {}", order.id),
        order.production_cost,
    )?
    .notes(order.status_reason.clone())
    .order(order.id, order.product_id);

    let savepoint = db_tx.begin().await?;
    insert_expense(&savepoint, &expense).await?;
    savepoint.commit().await?;
    Ok(expense)
}

impl Engine {
    /// Plan a production run. The stored cost is an estimate at current
    /// ingredient prices until production is reported.
    pub async fn create_production_order(
        &self,
        product_id: Uuid,
        quantity_to_produce: Decimal,
    ) -> ResultEngine<ProductionOrder> {
        let quantity = require_positive(quantity_to_produce, "quantity_to_produce")?;
        with_tx!(self, |db_tx| {
            require_product(&db_tx, product_id).await?;
            let recipe = resolve(&db_tx, product_id, quantity).await?;

            let order = ProductionOrder::new(product_id, quantity, recipe.cost_for(quantity)?);
            production_orders::ActiveModel::try_from(&order)?
                .insert(&db_tx)
                .await?;
            tracing::info!(
                order_id = %order.id,
                %product_id,
                %quantity,
                estimated_cost = %order.production_cost,
                "production order planned"
            );
            Ok(order)
        })
    }

    /// Apply a patch to a production order: report output, change status,
    /// report extra ingredients. All of it commits or none of it does.
    pub async fn update_production_order(
        &self,
        cmd: UpdateProductionOrderCmd,
    ) -> ResultEngine<ProductionOrder> {
        let reason = normalize_optional_text(cmd.reason.as_deref());
        for extra in &cmd.extras {
            require_positive(extra.quantity, "extra quantity")?;
        }
        with_tx!(self, |db_tx| {
            let now = Utc::now();
            let mut order = LockSet::new()
                .order(cmd.order_id)
                .acquire(&db_tx)
                .await?
                .take_order(cmd.order_id)?;
            let plan = plan_update(&order, &cmd, reason, now)?;

            let needs_recipe = plan.runs_production || plan.status == ProductionStatus::Failed;
            let lines = if needs_recipe {
                recipe_lines(&db_tx, order.product_id).await?
            } else {
                Vec::new()
            };
            let mut locked = LockSet::new()
                .product(order.product_id)
                .stock_items(lines.iter().map(|line| line.stock_item_id))
                .stock_items(cmd.extras.iter().map(|extra| extra.stock_item_id))
                .acquire(&db_tx)
                .await?;
            let mut product = locked.take_product(order.product_id)?;

            if needs_recipe {
                let recipe = resolve_with(
                    order.product_id,
                    &lines,
                    &locked.stock_items,
                    plan.quantity_produced,
                )?;
                if plan.runs_production {
                    consume(&db_tx, &order, &recipe, plan.delta, &mut locked).await?;
                    if !cmd.extras.is_empty() {
                        let extra_cost = apply_extras(&db_tx, &order, &cmd.extras, &mut locked).await?;
                        order.extra_cost = add(order.extra_cost, extra_cost)?;
                    }
                    if plan.delta > Decimal::ZERO {
                        let tx = ProductTransaction::increase(
                            product.id,
                            plan.delta,
                            ProductReason::ProductionOutput,
                        )?
                        .metadata(LedgerMetadata::for_order(order.id, product.id));
                        post_product(&db_tx, &mut product, tx).await?;
                    }
                }
                order.production_cost = add(recipe.cost_for(plan.quantity_produced)?, order.extra_cost)?;
            }

            let previous = order.status;
            order.quantity_produced = plan.quantity_produced;
            order.status = plan.status;
            order.status_reason = plan.status_reason;
            order.started_at = plan.started_at;
            order.completed_at = plan.completed_at;
            order.updated_at = now;

            if order.status == ProductionStatus::Failed {
                record_failure_expense(&db_tx, &order).await;
            }

            production_orders::ActiveModel::try_from(&order)?
                .update(&db_tx)
                .await?;
            if previous != order.status {
                tracing::info!(
                    order_id = %order.id,
                    from = %previous,
                    to = %order.status,
                    "production order transitioned"
                );
            }
            Ok(order)
        })
    }

    /// Return a production order snapshot from DB.
    pub async fn production_order(&self, order_id: Uuid) -> ResultEngine<ProductionOrder> {
        with_tx!(self, |db_tx| {
            let model = production_orders::Entity::find_by_id(order_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("production order {order_id}")))?;
            ProductionOrder::try_from(model)
        })
    }

    /// Production orders, newest first, optionally filtered by status.
    pub async fn list_production_orders(
        &self,
        status: Option<ProductionStatus>,
    ) -> ResultEngine<Vec<ProductionOrder>> {
        with_tx!(self, |db_tx| {
            let mut query = production_orders::Entity::find()
                .order_by_desc(production_orders::Column::CreatedAt);
            if let Some(status) = status {
                query = query.filter(production_orders::Column::Status.eq(status.as_str()));
            }
            let models = query.all(&db_tx).await?;
            models
                .into_iter()
                .map(ProductionOrder::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtraIngredient;

    fn order(status: ProductionStatus, produced: i64) -> ProductionOrder {
        let mut order = ProductionOrder::new(Uuid::new_v4(), Decimal::new(40, 0), Decimal::ZERO);
        order.status = status;
        order.quantity_produced = Decimal::new(produced, 0);
        if status != ProductionStatus::Planned {
            order.started_at = Some(Utc::now());
        }
        order
    }

    fn plan(
        order: &ProductionOrder,
        cmd: UpdateProductionOrderCmd,
        reason: Option<&str>,
    ) -> ResultEngine<UpdatePlan> {
        plan_update(order, &cmd, reason.map(ToString::to_string), Utc::now())
    }

    #[test]
    fn completing_quantity_completes_in_progress_order() {
        let current = order(ProductionStatus::InProgress, 10);
        let cmd = UpdateProductionOrderCmd::new(current.id).quantity_produced(Decimal::new(40, 0));
        let plan = plan(&current, cmd, None).unwrap();
        assert_eq!(plan.status, ProductionStatus::Completed);
        assert_eq!(plan.delta, Decimal::new(30, 0));
        assert!(plan.runs_production);
        assert!(plan.completed_at.is_some());
        assert_eq!(plan.started_at, current.started_at);
    }

    #[test]
    fn partial_quantity_keeps_order_in_progress() {
        let current = order(ProductionStatus::InProgress, 10);
        let cmd = UpdateProductionOrderCmd::new(current.id).quantity_produced(Decimal::new(25, 0));
        let plan = plan(&current, cmd, None).unwrap();
        assert_eq!(plan.status, ProductionStatus::InProgress);
        assert!(plan.completed_at.is_none());
    }

    #[test]
    fn decreasing_quantity_is_rejected_unless_cancelling() {
        let current = order(ProductionStatus::InProgress, 10);
        let cmd = UpdateProductionOrderCmd::new(current.id).quantity_produced(Decimal::new(5, 0));
        assert!(matches!(
            plan(&current, cmd, None),
            Err(EngineError::Validation(_))
        ));

        let planned = order(ProductionStatus::Planned, 10);
        let cmd = UpdateProductionOrderCmd::new(planned.id)
            .quantity_produced(Decimal::new(5, 0))
            .status(ProductionStatus::Cancelled);
        let plan = plan(&planned, cmd, Some("wrong count")).unwrap();
        assert_eq!(plan.status, ProductionStatus::Cancelled);
        assert!(!plan.runs_production);
    }

    #[test]
    fn cancelling_needs_a_reason() {
        let current = order(ProductionStatus::Planned, 0);
        let cmd = UpdateProductionOrderCmd::new(current.id).status(ProductionStatus::Cancelled);
        assert!(matches!(
            plan(&current, cmd, None),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn start_flag_stamps_started_at_once() {
        let current = order(ProductionStatus::Planned, 0);
        let cmd = UpdateProductionOrderCmd::new(current.id).start();
        let first = plan(&current, cmd, None).unwrap();
        assert_eq!(first.status, ProductionStatus::Planned);
        assert!(first.started_at.is_some());

        let mut started = current.clone();
        started.started_at = first.started_at;
        let cmd = UpdateProductionOrderCmd::new(started.id).status(ProductionStatus::InProgress);
        let second = plan(&started, cmd, None).unwrap();
        assert_eq!(second.started_at, first.started_at);
    }

    #[test]
    fn completion_requires_output() {
        let current = order(ProductionStatus::Planned, 0);
        let cmd = UpdateProductionOrderCmd::new(current.id).status(ProductionStatus::Completed);
        assert!(matches!(
            plan(&current, cmd, None),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn extras_without_production_are_rejected() {
        let current = order(ProductionStatus::InProgress, 10);
        let cmd = UpdateProductionOrderCmd::new(current.id)
            .extra(ExtraIngredient::new(Uuid::new_v4(), Decimal::ONE));
        assert!(matches!(
            plan(&current, cmd, None),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn failing_order_cannot_add_output() {
        let current = order(ProductionStatus::Planned, 0);
        let cmd = UpdateProductionOrderCmd::new(current.id)
            .status(ProductionStatus::Failed)
            .quantity_produced(Decimal::new(5, 0));
        assert!(matches!(
            plan(&current, cmd, Some("oven broke")),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn terminal_order_rejects_any_patch() {
        for status in [
            ProductionStatus::Completed,
            ProductionStatus::Cancelled,
            ProductionStatus::Failed,
        ] {
            let current = order(status, 40);
            let cmd = UpdateProductionOrderCmd::new(current.id);
            assert!(matches!(
                plan(&current, cmd, None),
                Err(EngineError::InvalidTransition(_))
            ));
        }
    }
}
