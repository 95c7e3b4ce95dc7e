//! Manual stock corrections awaiting a second person's approval.

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
pub enum AdjustmentType {
    Increase,
    Decrease,
}

impl AdjustmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        }
    }

    /// Signed effect of `quantity` on the stock balance.
    #[must_use]
    pub fn signed(self, quantity: Decimal) -> Decimal {
        match self {
            Self::Increase => quantity,
            Self::Decrease => -quantity,
        }
    }
}

impl TryFrom<&str> for AdjustmentType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "increase" => Ok(Self::Increase),
            "decrease" => Ok(Self::Decrease),
            other => Err(EngineError::Integrity(format!(
                "invalid adjustment type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl AdjustmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for AdjustmentStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::Integrity(format!(
                "invalid adjustment status: {other}"
            ))),
        }
    }
}

/// Decision taken on a pending adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentAction {
    Approve,
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub id: Uuid,
    pub stock_item_id: Uuid,
    pub requested_by: String,
    pub adjustment_type: AdjustmentType,
    pub quantity: Decimal,
    pub reason: String,
    pub status: AdjustmentStatus,
    pub resolved_by: Option<String>,
    pub resolution_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl StockAdjustment {
    pub fn new(
        stock_item_id: Uuid,
        requested_by: String,
        adjustment_type: AdjustmentType,
        quantity: Decimal,
        reason: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            stock_item_id,
            requested_by,
            adjustment_type,
            quantity,
            reason,
            status: AdjustmentStatus::Pending,
            resolved_by: None,
            resolution_notes: None,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stock_adjustments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub stock_item_id: String,
    pub requested_by: String,
    pub adjustment_type: String,
    pub quantity_minor: i64,
    pub reason: String,
    pub status: String,
    pub resolved_by: Option<String>,
    pub resolution_notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub resolved_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_items::Entity",
        from = "Column::StockItemId",
        to = "super::stock_items::Column::Id"
    )]
    StockItem,
}

impl Related<super::stock_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&StockAdjustment> for ActiveModel {
    type Error = EngineError;

    fn try_from(adjustment: &StockAdjustment) -> ResultEngine<Self> {
        Ok(Self {
            id: ActiveValue::Set(adjustment.id.to_string()),
            stock_item_id: ActiveValue::Set(adjustment.stock_item_id.to_string()),
            requested_by: ActiveValue::Set(adjustment.requested_by.clone()),
            adjustment_type: ActiveValue::Set(adjustment.adjustment_type.as_str().to_string()),
            quantity_minor: ActiveValue::Set(to_minor(adjustment.quantity)?),
            reason: ActiveValue::Set(adjustment.reason.clone()),
            status: ActiveValue::Set(adjustment.status.as_str().to_string()),
            resolved_by: ActiveValue::Set(adjustment.resolved_by.clone()),
            resolution_notes: ActiveValue::Set(adjustment.resolution_notes.clone()),
            created_at: ActiveValue::Set(adjustment.created_at),
            resolved_at: ActiveValue::Set(adjustment.resolved_at),
        })
    }
}

impl TryFrom<Model> for StockAdjustment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "stock adjustment")?,
            stock_item_id: parse_uuid(&model.stock_item_id, "stock item")?,
            requested_by: model.requested_by,
            adjustment_type: AdjustmentType::try_from(model.adjustment_type.as_str())?,
            quantity: from_minor(model.quantity_minor),
            reason: model.reason,
            status: AdjustmentStatus::try_from(model.status.as_str())?,
            resolved_by: model.resolved_by,
            resolution_notes: model.resolution_notes,
            created_at: model.created_at,
            resolved_at: model.resolved_at,
        })
    }
}
