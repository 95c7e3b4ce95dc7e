//! Two-party stock corrections: one user requests, another approves or
//! rejects. Stock only moves on approval.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    AdjustmentAction, AdjustmentRequestCmd, AdjustmentStatus, AdjustmentType, EngineError,
    LedgerMetadata, ResolveAdjustmentCmd, ResultEngine, StockAdjustment, StockReason,
    StockTransaction,
    numeric::require_positive,
    stock_adjustments,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{
    Engine,
    conversion::require_stock_item,
    ledger::{insufficient, post_stock},
    lock_set::LockSet,
    with_tx,
};

impl Engine {
    /// File a pending adjustment. Nothing moves until it is approved.
    pub async fn request_stock_adjustment(
        &self,
        cmd: AdjustmentRequestCmd,
    ) -> ResultEngine<StockAdjustment> {
        let quantity = require_positive(cmd.quantity, "quantity")?;
        let reason = normalize_required_text(&cmd.reason, "adjustment reason")?;
        let requested_by = normalize_required_text(&cmd.requested_by, "requested_by")?;
        with_tx!(self, |db_tx| {
            require_stock_item(&db_tx, cmd.stock_item_id).await?;

            let adjustment = StockAdjustment::new(
                cmd.stock_item_id,
                requested_by,
                cmd.adjustment_type,
                quantity,
                reason,
            );
            stock_adjustments::ActiveModel::try_from(&adjustment)?
                .insert(&db_tx)
                .await?;
            tracing::info!(
                adjustment_id = %adjustment.id,
                stock_item_id = %adjustment.stock_item_id,
                kind = adjustment.adjustment_type.as_str(),
                %quantity,
                "stock adjustment requested"
            );
            Ok(adjustment)
        })
    }

    /// Approve or reject a pending adjustment, exactly once.
    ///
    /// A second resolution fails with `Conflict` and changes nothing. An
    /// approved decrease the stock cannot cover fails with
    /// `InsufficientStock` and leaves the adjustment pending.
    pub async fn resolve_stock_adjustment(
        &self,
        cmd: ResolveAdjustmentCmd,
    ) -> ResultEngine<StockAdjustment> {
        let resolver = normalize_required_text(&cmd.resolved_by, "resolved_by")?;
        let notes = normalize_optional_text(cmd.notes.as_deref());
        with_tx!(self, |db_tx| {
            let mut adjustment = LockSet::new()
                .adjustment(cmd.adjustment_id)
                .acquire(&db_tx)
                .await?
                .take_adjustment(cmd.adjustment_id)?;
            if adjustment.status != AdjustmentStatus::Pending {
                return Err(EngineError::Conflict(format!(
                    "stock adjustment {} is already {}",
                    adjustment.id,
                    adjustment.status.as_str()
                )));
            }
            if adjustment.requested_by == resolver {
                return Err(EngineError::Validation(
                    "an adjustment must be resolved by someone other than its requester"
                        .to_string(),
                ));
            }

            let status = match cmd.action {
                AdjustmentAction::Reject => AdjustmentStatus::Rejected,
                AdjustmentAction::Approve => {
                    let mut item = LockSet::new()
                        .stock_item(adjustment.stock_item_id)
                        .acquire(&db_tx)
                        .await?
                        .take_stock_item(adjustment.stock_item_id)?;
                    if adjustment.adjustment_type == AdjustmentType::Decrease
                        && item.current_quantity < adjustment.quantity
                    {
                        return Err(insufficient(
                            &item.name,
                            adjustment.quantity,
                            item.current_quantity,
                        ));
                    }
                    let delta = adjustment.adjustment_type.signed(adjustment.quantity);
                    let tx = StockTransaction::adjustment(item.id, delta, StockReason::ManualAdjustment)?
                        .note(Some(adjustment.reason.clone()))
                        .metadata(LedgerMetadata::for_adjustment(adjustment.id, resolver.clone()));
                    post_stock(&db_tx, &mut item, tx).await?;
                    AdjustmentStatus::Approved
                }
            };

            adjustment.status = status;
            adjustment.resolved_by = Some(resolver);
            adjustment.resolution_notes = notes;
            adjustment.resolved_at = Some(Utc::now());
            stock_adjustments::ActiveModel {
                id: ActiveValue::Set(adjustment.id.to_string()),
                status: ActiveValue::Set(adjustment.status.as_str().to_string()),
                resolved_by: ActiveValue::Set(adjustment.resolved_by.clone()),
                resolution_notes: ActiveValue::Set(adjustment.resolution_notes.clone()),
                resolved_at: ActiveValue::Set(adjustment.resolved_at),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            tracing::info!(
                adjustment_id = %adjustment.id,
                status = adjustment.status.as_str(),
                "stock adjustment resolved"
            );
            Ok(adjustment)
        })
    }

    /// Return a stock adjustment snapshot from DB.
    pub async fn stock_adjustment(&self, adjustment_id: Uuid) -> ResultEngine<StockAdjustment> {
        with_tx!(self, |db_tx| {
            let model = stock_adjustments::Entity::find_by_id(adjustment_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("stock adjustment {adjustment_id}")))?;
            StockAdjustment::try_from(model)
        })
    }

    /// Adjustments, newest first, optionally filtered by status.
    pub async fn list_stock_adjustments(
        &self,
        status: Option<AdjustmentStatus>,
    ) -> ResultEngine<Vec<StockAdjustment>> {
        with_tx!(self, |db_tx| {
            let mut query = stock_adjustments::Entity::find()
                .order_by_desc(stock_adjustments::Column::CreatedAt);
            if let Some(status) = status {
                query = query.filter(stock_adjustments::Column::Status.eq(status.as_str()));
            }
            let models = query.all(&db_tx).await?;
            models
                .into_iter()
                .map(StockAdjustment::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}
