//! Product ledger rows, the finished-goods mirror of
//! [`StockTransaction`](crate::StockTransaction).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    metadata::{LedgerMetadata, MetadataColumns},
    numeric::{from_minor, to_minor},
    util::parse_uuid,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductTransactionKind {
    Increase,
    Decrease,
    Damage,
}

impl ProductTransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
            Self::Damage => "damage",
        }
    }
}

impl TryFrom<&str> for ProductTransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "increase" => Ok(Self::Increase),
            "decrease" => Ok(Self::Decrease),
            "damage" => Ok(Self::Damage),
            other => Err(EngineError::Integrity(format!(
                "invalid product transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductReason {
    ProductionOutput,
    Sale,
    Damage,
}

impl ProductReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProductionOutput => "production_output",
            Self::Sale => "sale",
            Self::Damage => "damage",
        }
    }
}

impl TryFrom<&str> for ProductReason {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "production_output" => Ok(Self::ProductionOutput),
            "sale" => Ok(Self::Sale),
            "damage" => Ok(Self::Damage),
            other => Err(EngineError::Integrity(format!(
                "invalid product transaction reason: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTransaction {
    pub id: Uuid,
    pub product_id: Uuid,
    pub kind: ProductTransactionKind,
    pub quantity: Decimal,
    pub delta: Decimal,
    pub reason: ProductReason,
    pub note: Option<String>,
    #[serde(flatten)]
    pub metadata: LedgerMetadata,
    pub created_at: DateTime<Utc>,
}

impl ProductTransaction {
    fn new(
        product_id: Uuid,
        kind: ProductTransactionKind,
        quantity: Decimal,
        delta: Decimal,
        reason: ProductReason,
    ) -> ResultEngine<Self> {
        if quantity <= Decimal::ZERO {
            return Err(EngineError::Validation(
                "product movement quantity must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            product_id,
            kind,
            quantity,
            delta,
            reason,
            note: None,
            metadata: LedgerMetadata::default(),
            created_at: Utc::now(),
        })
    }

    pub fn increase(product_id: Uuid, quantity: Decimal, reason: ProductReason) -> ResultEngine<Self> {
        Self::new(
            product_id,
            ProductTransactionKind::Increase,
            quantity,
            quantity,
            reason,
        )
    }

    pub fn decrease(product_id: Uuid, quantity: Decimal, reason: ProductReason) -> ResultEngine<Self> {
        Self::new(
            product_id,
            ProductTransactionKind::Decrease,
            quantity,
            -quantity,
            reason,
        )
    }

    /// Damage already taken out of stock by another row (a sale).
    pub fn damage_recorded(product_id: Uuid, quantity: Decimal) -> ResultEngine<Self> {
        Self::new(
            product_id,
            ProductTransactionKind::Damage,
            quantity,
            Decimal::ZERO,
            ProductReason::Damage,
        )
    }

    /// Damage of units still on hand.
    pub fn damage(product_id: Uuid, quantity: Decimal) -> ResultEngine<Self> {
        Self::new(
            product_id,
            ProductTransactionKind::Damage,
            quantity,
            -quantity,
            ProductReason::Damage,
        )
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
#[sea_orm(table_name = "product_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub product_id: String,
    pub kind: String,
    pub quantity_minor: i64,
    pub delta_minor: i64,
    pub reason: String,
    pub note: Option<String>,
    pub order_id: Option<String>,
    pub sale_id: Option<String>,
    pub expense_id: Option<String>,
    pub actor: Option<String>,
    pub created_at: DateTimeUtc,
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

impl TryFrom<&ProductTransaction> for ActiveModel {
    type Error = EngineError;

    fn try_from(tx: &ProductTransaction) -> ResultEngine<Self> {
        let meta = tx.metadata.columns();
        Ok(Self {
            id: ActiveValue::Set(tx.id.to_string()),
            product_id: ActiveValue::Set(tx.product_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            quantity_minor: ActiveValue::Set(to_minor(tx.quantity)?),
            delta_minor: ActiveValue::Set(to_minor(tx.delta)?),
            reason: ActiveValue::Set(tx.reason.as_str().to_string()),
            note: ActiveValue::Set(tx.note.clone()),
            order_id: ActiveValue::Set(meta.order_id),
            sale_id: ActiveValue::Set(meta.sale_id),
            expense_id: ActiveValue::Set(meta.expense_id),
            actor: ActiveValue::Set(meta.actor),
            created_at: ActiveValue::Set(tx.created_at),
        })
    }
}

impl TryFrom<Model> for ProductTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind = ProductTransactionKind::try_from(model.kind.as_str())?;
        let quantity = from_minor(model.quantity_minor);
        let delta = from_minor(model.delta_minor);
        let consistent = match kind {
            ProductTransactionKind::Increase => delta == quantity,
            ProductTransactionKind::Decrease => delta == -quantity,
            ProductTransactionKind::Damage => delta.is_zero() || delta == -quantity,
        };
        if quantity <= Decimal::ZERO || !consistent {
            return Err(EngineError::Integrity(format!(
                "product transaction {} has inconsistent quantity and delta",
                model.id
            )));
        }
        let product_id = parse_uuid(&model.product_id, "product")?;
        let mut metadata = LedgerMetadata::from_columns(MetadataColumns {
            order_id: model.order_id,
            product_id: None,
            sale_id: model.sale_id,
            expense_id: model.expense_id,
            adjustment_id: None,
            actor: model.actor,
        })?;
        metadata.product_id = Some(product_id);
        Ok(Self {
            id: parse_uuid(&model.id, "product transaction")?,
            product_id,
            kind,
            quantity,
            delta,
            reason: ProductReason::try_from(model.reason.as_str())?,
            note: model.note,
            metadata,
            created_at: model.created_at,
        })
    }
}
