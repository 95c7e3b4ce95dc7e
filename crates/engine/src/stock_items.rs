//! Raw materials held in stock.
//!
//! A `StockItem` carries its on-hand quantity in base units. The quantity is
//! a cached balance of the stock ledger and changes only through ledger
//! operations, never through a direct write.

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

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: Uuid,
    pub name: String,
    pub base_unit_id: Uuid,
    /// Currency per base unit.
    pub unit_cost: Decimal,
    pub current_quantity: Decimal,
    pub supplier: Option<String>,
    pub allow_extra_production: bool,
    /// Cap on extra usage per production order, in base units. Zero means
    /// unlimited.
    pub extra_production_limit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    pub fn new(name: String, base_unit_id: Uuid, unit_cost: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            base_unit_id,
            unit_cost,
            current_quantity: Decimal::ZERO,
            supplier: None,
            allow_extra_production: false,
            extra_production_limit: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// `true` when the per-order extra usage is capped.
    #[must_use]
    pub fn has_extra_limit(&self) -> bool {
        self.extra_production_limit > Decimal::ZERO
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stock_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub base_unit_id: String,
    pub unit_cost_minor: i64,
    pub current_quantity_minor: i64,
    pub supplier: Option<String>,
    pub allow_extra_production: bool,
    pub extra_production_limit_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_transactions::Entity")]
    StockTransactions,
}

impl Related<super::stock_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&StockItem> for ActiveModel {
    type Error = EngineError;

    fn try_from(item: &StockItem) -> ResultEngine<Self> {
        Ok(Self {
            id: ActiveValue::Set(item.id.to_string()),
            name: ActiveValue::Set(item.name.clone()),
            base_unit_id: ActiveValue::Set(item.base_unit_id.to_string()),
            unit_cost_minor: ActiveValue::Set(to_minor(item.unit_cost)?),
            current_quantity_minor: ActiveValue::Set(to_minor(item.current_quantity)?),
            supplier: ActiveValue::Set(item.supplier.clone()),
            allow_extra_production: ActiveValue::Set(item.allow_extra_production),
            extra_production_limit_minor: ActiveValue::Set(to_minor(item.extra_production_limit)?),
            created_at: ActiveValue::Set(item.created_at),
            updated_at: ActiveValue::Set(item.updated_at),
        })
    }
}

impl TryFrom<Model> for StockItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        if model.current_quantity_minor < 0 {
            return Err(EngineError::Integrity(format!(
                "stock item {} has a negative balance",
                model.id
            )));
        }
        Ok(Self {
            id: parse_uuid(&model.id, "stock item")?,
            name: model.name,
            base_unit_id: parse_uuid(&model.base_unit_id, "unit")?,
            unit_cost: from_minor(model.unit_cost_minor),
            current_quantity: from_minor(model.current_quantity_minor),
            supplier: model.supplier,
            allow_extra_production: model.allow_extra_production,
            extra_production_limit: from_minor(model.extra_production_limit_minor),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
