//! Units of measure.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// A named unit (`kg`, `g`, `bag`). How a unit relates to a stock item's base
/// unit lives in [`UnitConversion`](crate::UnitConversion).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: Uuid,
    pub name: String,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
}

impl Unit {
    pub fn new(name: String, symbol: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            symbol,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "units")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub name: String,
    pub symbol: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Unit> for ActiveModel {
    fn from(unit: &Unit) -> Self {
        Self {
            id: ActiveValue::Set(unit.id.to_string()),
            name: ActiveValue::Set(unit.name.clone()),
            symbol: ActiveValue::Set(unit.symbol.clone()),
            created_at: ActiveValue::Set(unit.created_at),
        }
    }
}

impl TryFrom<Model> for Unit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "unit")?,
            name: model.name,
            symbol: model.symbol,
            created_at: model.created_at,
        })
    }
}
