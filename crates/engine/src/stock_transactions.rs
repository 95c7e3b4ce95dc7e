//! Stock ledger rows.
//!
//! Rows are append-only. `quantity` is always the positive magnitude of the
//! movement and `delta` its signed effect on the item balance, so the balance
//! of an item is the plain sum of its deltas.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    metadata::{LedgerMetadata, MetadataColumns},
    numeric::{from_minor, to_minor},
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockTransactionKind {
    Increase,
    Decrease,
    Adjustment,
}

impl StockTransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
            Self::Adjustment => "adjustment",
        }
    }
}

impl TryFrom<&str> for StockTransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "increase" => Ok(Self::Increase),
            "decrease" => Ok(Self::Decrease),
            "adjustment" => Ok(Self::Adjustment),
            other => Err(EngineError::Integrity(format!(
                "invalid stock transaction kind: {other}"
            ))),
        }
    }
}

/// Why stock moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockReason {
    InitialStock,
    Purchase,
    StockCount,
    Damage,
    ProductionConsumption,
    ProductionExtra,
    ManualAdjustment,
}

impl StockReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitialStock => "initial_stock",
            Self::Purchase => "purchase",
            Self::StockCount => "stock_count",
            Self::Damage => "damage",
            Self::ProductionConsumption => "production_consumption",
            Self::ProductionExtra => "production_extra",
            Self::ManualAdjustment => "manual_adjustment",
        }
    }
}

impl TryFrom<&str> for StockReason {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "initial_stock" => Ok(Self::InitialStock),
            "purchase" => Ok(Self::Purchase),
            "stock_count" => Ok(Self::StockCount),
            "damage" => Ok(Self::Damage),
            "production_consumption" => Ok(Self::ProductionConsumption),
            "production_extra" => Ok(Self::ProductionExtra),
            "manual_adjustment" => Ok(Self::ManualAdjustment),
            other => Err(EngineError::Integrity(format!(
                "invalid stock transaction reason: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockTransaction {
    pub id: Uuid,
    pub stock_item_id: Uuid,
    pub kind: StockTransactionKind,
    pub quantity: Decimal,
    pub delta: Decimal,
    /// Unit the caller entered the quantity in, when not the base unit.
    pub unit_id: Option<Uuid>,
    pub entered_quantity: Option<Decimal>,
    pub reason: StockReason,
    pub note: Option<String>,
    #[serde(flatten)]
    pub metadata: LedgerMetadata,
    pub created_at: DateTime<Utc>,
}

impl StockTransaction {
    fn new(
        stock_item_id: Uuid,
        kind: StockTransactionKind,
        quantity: Decimal,
        delta: Decimal,
        reason: StockReason,
    ) -> ResultEngine<Self> {
        if quantity <= Decimal::ZERO {
            return Err(EngineError::Validation(
                "stock movement quantity must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            stock_item_id,
            kind,
            quantity,
            delta,
            unit_id: None,
            entered_quantity: None,
            reason,
            note: None,
            metadata: LedgerMetadata::default(),
            created_at: Utc::now(),
        })
    }

    pub fn increase(stock_item_id: Uuid, quantity: Decimal, reason: StockReason) -> ResultEngine<Self> {
        Self::new(
            stock_item_id,
            StockTransactionKind::Increase,
            quantity,
            quantity,
            reason,
        )
    }

    pub fn decrease(stock_item_id: Uuid, quantity: Decimal, reason: StockReason) -> ResultEngine<Self> {
        Self::new(
            stock_item_id,
            StockTransactionKind::Decrease,
            quantity,
            -quantity,
            reason,
        )
    }

    /// An adjustment carries the signed difference; its magnitude becomes
    /// `quantity`.
    pub fn adjustment(stock_item_id: Uuid, delta: Decimal, reason: StockReason) -> ResultEngine<Self> {
        Self::new(
            stock_item_id,
            StockTransactionKind::Adjustment,
            delta.abs(),
            delta,
            reason,
        )
    }

    #[must_use]
    pub fn entered(mut self, unit_id: Option<Uuid>, entered_quantity: Decimal) -> Self {
        if unit_id.is_some() {
            self.unit_id = unit_id;
            self.entered_quantity = Some(entered_quantity);
        }
        self
    }

    #[must_use]
    pub fn note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    #[must_use]
    pub fn metadata(mut self, metadata: LedgerMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stock_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub stock_item_id: String,
    pub kind: String,
    pub quantity_minor: i64,
    pub delta_minor: i64,
    pub unit_id: Option<String>,
    pub entered_quantity_minor: Option<i64>,
    pub reason: String,
    pub note: Option<String>,
    pub order_id: Option<String>,
    pub product_id: Option<String>,
    pub sale_id: Option<String>,
    pub expense_id: Option<String>,
    pub adjustment_id: Option<String>,
    pub actor: Option<String>,
    pub created_at: DateTimeUtc,
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

impl TryFrom<&StockTransaction> for ActiveModel {
    type Error = EngineError;

    fn try_from(tx: &StockTransaction) -> ResultEngine<Self> {
        let meta = tx.metadata.columns();
        Ok(Self {
            id: ActiveValue::Set(tx.id.to_string()),
            stock_item_id: ActiveValue::Set(tx.stock_item_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            quantity_minor: ActiveValue::Set(to_minor(tx.quantity)?),
            delta_minor: ActiveValue::Set(to_minor(tx.delta)?),
            unit_id: ActiveValue::Set(tx.unit_id.map(|id| id.to_string())),
            entered_quantity_minor: ActiveValue::Set(
                tx.entered_quantity.map(to_minor).transpose()?,
            ),
            reason: ActiveValue::Set(tx.reason.as_str().to_string()),
            note: ActiveValue::Set(tx.note.clone()),
            order_id: ActiveValue::Set(meta.order_id),
            product_id: ActiveValue::Set(meta.product_id),
            sale_id: ActiveValue::Set(meta.sale_id),
            expense_id: ActiveValue::Set(meta.expense_id),
            adjustment_id: ActiveValue::Set(meta.adjustment_id),
            actor: ActiveValue::Set(meta.actor),
            created_at: ActiveValue::Set(tx.created_at),
        })
    }
}

impl TryFrom<Model> for StockTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind = StockTransactionKind::try_from(model.kind.as_str())?;
        let quantity = from_minor(model.quantity_minor);
        let delta = from_minor(model.delta_minor);
        let consistent = match kind {
            StockTransactionKind::Increase => delta == quantity,
            StockTransactionKind::Decrease => delta == -quantity,
            StockTransactionKind::Adjustment => delta.abs() == quantity,
        };
        if quantity <= Decimal::ZERO || !consistent {
            return Err(EngineError::Integrity(format!(
                "stock transaction {} has inconsistent quantity and delta",
                model.id
            )));
        }
        Ok(Self {
            id: parse_uuid(&model.id, "stock transaction")?,
            stock_item_id: parse_uuid(&model.stock_item_id, "stock item")?,
            kind,
            quantity,
            delta,
            unit_id: parse_optional_uuid(model.unit_id.as_deref(), "unit")?,
            entered_quantity: model.entered_quantity_minor.map(from_minor),
            reason: StockReason::try_from(model.reason.as_str())?,
            note: model.note,
            metadata: LedgerMetadata::from_columns(MetadataColumns {
                order_id: model.order_id,
                product_id: model.product_id,
                sale_id: model.sale_id,
                expense_id: model.expense_id,
                adjustment_id: model.adjustment_id,
                actor: model.actor,
            })?,
            created_at: model.created_at,
        })
    }
}
