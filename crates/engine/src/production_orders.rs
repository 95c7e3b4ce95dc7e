//! Production orders and their lifecycle rules.
//!
//! ```text
//! planned ──► in_progress ──► completed
//!    │                            ▲
//!    ├────────────────────────────┘
//!    ├──► cancelled
//!    └──► failed
//! ```
//!
//! A planned order may move to any status. Once it has left `planned` the only
//! permitted change is `in_progress → completed`, reached by reporting a
//! completing quantity. Terminal orders accept no further updates.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    numeric::{from_minor, to_minor},
    util::parse_uuid,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
    Failed,
}

impl ProductionStatus {
    pub const ALL: [Self; 5] = [
        Self::Planned,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
        Self::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    /// Statuses that must carry a reason.
    #[must_use]
    pub fn requires_reason(self) -> bool {
        matches!(self, Self::Cancelled | Self::Failed)
    }

    /// Check a status change. `completing` tells whether the update reports a
    /// quantity that reaches the target.
    pub(crate) fn check_transition(self, next: Self, completing: bool) -> ResultEngine<()> {
        if self.is_terminal() {
            return Err(EngineError::InvalidTransition(format!(
                "order is {self} and can no longer change"
            )));
        }
        match (self, next) {
            (Self::Planned, _) | (Self::InProgress, Self::InProgress) => Ok(()),
            (Self::InProgress, Self::Completed) if completing => Ok(()),
            (from, to) => Err(EngineError::InvalidTransition(format!(
                "cannot move order from {from} to {to}"
            ))),
        }
    }
}

impl fmt::Display for ProductionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProductionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "planned" => Ok(Self::Planned),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            other => Err(EngineError::Validation(format!(
                "invalid production status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity_to_produce: Decimal,
    pub quantity_produced: Decimal,
    pub status: ProductionStatus,
    pub status_reason: Option<String>,
    /// Planning estimate until production runs, actual cost afterwards.
    pub production_cost: Decimal,
    /// Accumulated cost of extra ingredients.
    pub extra_cost: Decimal,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductionOrder {
    pub fn new(product_id: Uuid, quantity_to_produce: Decimal, estimated_cost: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            product_id,
            quantity_to_produce,
            quantity_produced: Decimal::ZERO,
            status: ProductionStatus::Planned,
            status_reason: None,
            production_cost: estimated_cost,
            extra_cost: Decimal::ZERO,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// `true` when `quantity` reaches the target of the order.
    #[must_use]
    pub fn is_completing(&self, quantity: Decimal) -> bool {
        quantity >= self.quantity_to_produce
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "production_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub product_id: String,
    pub quantity_to_produce_minor: i64,
    pub quantity_produced_minor: i64,
    pub status: String,
    pub status_reason: Option<String>,
    pub production_cost_minor: i64,
    pub extra_cost_minor: i64,
    pub started_at: Option<DateTimeUtc>,
    pub completed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id"
    )]
    Product,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&ProductionOrder> for ActiveModel {
    type Error = EngineError;

    fn try_from(order: &ProductionOrder) -> ResultEngine<Self> {
        Ok(Self {
            id: ActiveValue::Set(order.id.to_string()),
            product_id: ActiveValue::Set(order.product_id.to_string()),
            quantity_to_produce_minor: ActiveValue::Set(to_minor(order.quantity_to_produce)?),
            quantity_produced_minor: ActiveValue::Set(to_minor(order.quantity_produced)?),
            status: ActiveValue::Set(order.status.as_str().to_string()),
            status_reason: ActiveValue::Set(order.status_reason.clone()),
            production_cost_minor: ActiveValue::Set(to_minor(order.production_cost)?),
            extra_cost_minor: ActiveValue::Set(to_minor(order.extra_cost)?),
            started_at: ActiveValue::Set(order.started_at),
            completed_at: ActiveValue::Set(order.completed_at),
            created_at: ActiveValue::Set(order.created_at),
            updated_at: ActiveValue::Set(order.updated_at),
        })
    }
}

impl TryFrom<Model> for ProductionOrder {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status = ProductionStatus::try_from(model.status.as_str())
            .map_err(|_| EngineError::Integrity(format!("invalid status on order {}", model.id)))?;
        if model.quantity_produced_minor < 0 || model.quantity_to_produce_minor <= 0 {
            return Err(EngineError::Integrity(format!(
                "order {} has invalid quantities",
                model.id
            )));
        }
        Ok(Self {
            id: parse_uuid(&model.id, "production order")?,
            product_id: parse_uuid(&model.product_id, "product")?,
            quantity_to_produce: from_minor(model.quantity_to_produce_minor),
            quantity_produced: from_minor(model.quantity_produced_minor),
            status,
            status_reason: model.status_reason,
            production_cost: from_minor(model.production_cost_minor),
            extra_cost: from_minor(model.extra_cost_minor),
            started_at: model.started_at,
            completed_at: model.completed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planned_can_move_anywhere() {
        for next in ProductionStatus::ALL {
            assert!(ProductionStatus::Planned.check_transition(next, false).is_ok());
        }
    }

    #[test]
    fn in_progress_only_completes_with_completing_quantity() {
        let current = ProductionStatus::InProgress;
        assert!(current.check_transition(ProductionStatus::InProgress, false).is_ok());
        assert!(current.check_transition(ProductionStatus::Completed, true).is_ok());
        for next in [
            ProductionStatus::Planned,
            ProductionStatus::Completed,
            ProductionStatus::Cancelled,
            ProductionStatus::Failed,
        ] {
            assert!(matches!(
                current.check_transition(next, false),
                Err(EngineError::InvalidTransition(_))
            ));
        }
    }

    #[test]
    fn terminal_statuses_reject_everything() {
        for current in [
            ProductionStatus::Completed,
            ProductionStatus::Cancelled,
            ProductionStatus::Failed,
        ] {
            for next in ProductionStatus::ALL {
                assert!(matches!(
                    current.check_transition(next, true),
                    Err(EngineError::InvalidTransition(_))
                ));
            }
        }
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        assert!(matches!(
            ProductionStatus::try_from("paused"),
            Err(EngineError::Validation(_))
        ));
        assert_eq!(
            ProductionStatus::try_from("in_progress").unwrap(),
            ProductionStatus::InProgress
        );
    }
}
