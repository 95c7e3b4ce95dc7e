//! Finished goods.

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

/// A product made from stock items. `current_stock` is the cached balance of
/// the product ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub selling_price: Decimal,
    pub current_stock: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: String, selling_price: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            selling_price,
            current_stock: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub selling_price_minor: i64,
    pub current_stock_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_transactions::Entity")]
    ProductTransactions,
}

impl Related<super::product_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Product> for ActiveModel {
    type Error = EngineError;

    fn try_from(product: &Product) -> ResultEngine<Self> {
        Ok(Self {
            id: ActiveValue::Set(product.id.to_string()),
            name: ActiveValue::Set(product.name.clone()),
            selling_price_minor: ActiveValue::Set(to_minor(product.selling_price)?),
            current_stock_minor: ActiveValue::Set(to_minor(product.current_stock)?),
            created_at: ActiveValue::Set(product.created_at),
            updated_at: ActiveValue::Set(product.updated_at),
        })
    }
}

impl TryFrom<Model> for Product {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        if model.current_stock_minor < 0 {
            return Err(EngineError::Integrity(format!(
                "product {} has a negative stock",
                model.id
            )));
        }
        Ok(Self {
            id: parse_uuid(&model.id, "product")?,
            name: model.name,
            selling_price: from_minor(model.selling_price_minor),
            current_stock: from_minor(model.current_stock_minor),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
