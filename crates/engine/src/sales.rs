//! Sales of finished goods.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    numeric::{from_minor, to_minor},
    util::{parse_optional_uuid, parse_uuid},
};

/// A recorded sale. `total_amount` is always billed on the full quantity,
/// damaged units included.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub damaged_quantity: Decimal,
    pub damage_reason: Option<String>,
    /// Expense booked for the damaged units, if any.
    pub damage_expense_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub sale_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub product_id: String,
    pub quantity_minor: i64,
    pub unit_price_minor: i64,
    pub total_amount_minor: i64,
    pub damaged_quantity_minor: i64,
    pub damage_reason: Option<String>,
    pub damage_expense_id: Option<String>,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub sale_date: DateTimeUtc,
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

impl TryFrom<&Sale> for ActiveModel {
    type Error = EngineError;

    fn try_from(sale: &Sale) -> ResultEngine<Self> {
        Ok(Self {
            id: ActiveValue::Set(sale.id.to_string()),
            product_id: ActiveValue::Set(sale.product_id.to_string()),
            quantity_minor: ActiveValue::Set(to_minor(sale.quantity)?),
            unit_price_minor: ActiveValue::Set(to_minor(sale.unit_price)?),
            total_amount_minor: ActiveValue::Set(to_minor(sale.total_amount)?),
            damaged_quantity_minor: ActiveValue::Set(to_minor(sale.damaged_quantity)?),
            damage_reason: ActiveValue::Set(sale.damage_reason.clone()),
            damage_expense_id: ActiveValue::Set(sale.damage_expense_id.map(|id| id.to_string())),
            customer_name: ActiveValue::Set(sale.customer_name.clone()),
            notes: ActiveValue::Set(sale.notes.clone()),
            sale_date: ActiveValue::Set(sale.sale_date),
            created_at: ActiveValue::Set(sale.created_at),
        })
    }
}

impl TryFrom<Model> for Sale {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "sale")?,
            product_id: parse_uuid(&model.product_id, "product")?,
            quantity: from_minor(model.quantity_minor),
            unit_price: from_minor(model.unit_price_minor),
            total_amount: from_minor(model.total_amount_minor),
            damaged_quantity: from_minor(model.damaged_quantity_minor),
            damage_reason: model.damage_reason,
            damage_expense_id: parse_optional_uuid(model.damage_expense_id.as_deref(), "expense")?,
            customer_name: model.customer_name,
            notes: model.notes,
            sale_date: model.sale_date,
            created_at: model.created_at,
        })
    }
}
