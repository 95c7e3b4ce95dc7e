//! Product recipes: fixed per-unit ingredient requirements.

use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    numeric::{from_minor, mul, round, to_minor},
    util::parse_uuid,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub product_id: Uuid,
    pub stock_item_id: Uuid,
    /// Base units of the stock item consumed per produced unit.
    pub quantity_per_unit: Decimal,
}

/// What producing a given quantity of a product takes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecipe {
    pub product_id: Uuid,
    pub requirements: Vec<Requirement>,
    /// Ingredient cost of one produced unit.
    pub cost_per_unit: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub stock_item_id: Uuid,
    pub stock_item_name: String,
    pub quantity_per_unit: Decimal,
    /// `quantity_per_unit × target quantity`, in base units.
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

impl ResolvedRecipe {
    /// Scale the per-unit requirements to `quantity` produced units.
    pub fn usage_for(&self, quantity: Decimal) -> ResultEngine<Vec<(Uuid, Decimal)>> {
        self.requirements
            .iter()
            .map(|req| Ok((req.stock_item_id, round(mul(req.quantity_per_unit, quantity)?))))
            .collect()
    }

    pub fn cost_for(&self, quantity: Decimal) -> ResultEngine<Decimal> {
        Ok(round(mul(self.cost_per_unit, quantity)?))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "product_recipes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub stock_item_id: String,
    pub quantity_per_unit_minor: i64,
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

impl TryFrom<&RecipeLine> for ActiveModel {
    type Error = EngineError;

    fn try_from(line: &RecipeLine) -> ResultEngine<Self> {
        Ok(Self {
            product_id: ActiveValue::Set(line.product_id.to_string()),
            stock_item_id: ActiveValue::Set(line.stock_item_id.to_string()),
            quantity_per_unit_minor: ActiveValue::Set(to_minor(line.quantity_per_unit)?),
        })
    }
}

impl TryFrom<Model> for RecipeLine {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        if model.quantity_per_unit_minor <= 0 {
            return Err(EngineError::Integrity(format!(
                "recipe line {}/{} has a non-positive quantity",
                model.product_id, model.stock_item_id
            )));
        }
        Ok(Self {
            product_id: parse_uuid(&model.product_id, "product")?,
            stock_item_id: parse_uuid(&model.stock_item_id, "stock item")?,
            quantity_per_unit: from_minor(model.quantity_per_unit_minor),
        })
    }
}
