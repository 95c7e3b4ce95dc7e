//! Per stock item unit conversions.
//!
//! A conversion says how many **base units** one entered unit is worth for a
//! given stock item (`factor`). Every stock item owns exactly one base
//! conversion with factor 1, created together with the item.

use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    numeric::{div, from_minor, mul, round, to_minor},
    util::parse_uuid,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitConversion {
    pub stock_item_id: Uuid,
    pub unit_id: Uuid,
    pub factor: Decimal,
    pub is_base: bool,
}

impl UnitConversion {
    pub(crate) fn base(stock_item_id: Uuid, unit_id: Uuid) -> Self {
        Self {
            stock_item_id,
            unit_id,
            factor: Decimal::ONE,
            is_base: true,
        }
    }

    /// Quantity expressed in this unit → base units.
    pub fn to_base(&self, quantity: Decimal) -> ResultEngine<Decimal> {
        Ok(round(mul(quantity, self.factor)?))
    }

    /// Base units → quantity expressed in this unit.
    pub fn from_base(&self, quantity: Decimal) -> ResultEngine<Decimal> {
        Ok(round(div(quantity, self.factor)?))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "unit_conversions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub stock_item_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub unit_id: String,
    pub factor_minor: i64,
    pub is_base: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&UnitConversion> for ActiveModel {
    type Error = EngineError;

    fn try_from(conversion: &UnitConversion) -> ResultEngine<Self> {
        Ok(Self {
            stock_item_id: ActiveValue::Set(conversion.stock_item_id.to_string()),
            unit_id: ActiveValue::Set(conversion.unit_id.to_string()),
            factor_minor: ActiveValue::Set(to_minor(conversion.factor)?),
            is_base: ActiveValue::Set(conversion.is_base),
        })
    }
}

impl TryFrom<Model> for UnitConversion {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        if model.factor_minor <= 0 {
            return Err(EngineError::Integrity(format!(
                "non-positive conversion factor for unit {} of stock item {}",
                model.unit_id, model.stock_item_id
            )));
        }
        Ok(Self {
            stock_item_id: parse_uuid(&model.stock_item_id, "stock item")?,
            unit_id: parse_uuid(&model.unit_id, "unit")?,
            factor: from_minor(model.factor_minor),
            is_base: model.is_base,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn grams() -> UnitConversion {
        UnitConversion {
            stock_item_id: Uuid::new_v4(),
            unit_id: Uuid::new_v4(),
            factor: dec("0.001"),
            is_base: false,
        }
    }

    #[test]
    fn converts_to_and_from_base() {
        let g = grams();
        assert_eq!(g.to_base(dec("2500")).unwrap(), dec("2.5"));
        assert_eq!(g.from_base(dec("2.5")).unwrap(), dec("2500"));
    }

    #[test]
    fn base_conversion_is_identity() {
        let base = UnitConversion::base(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(base.to_base(dec("12.75")).unwrap(), dec("12.75"));
        assert_eq!(base.from_base(dec("12.75")).unwrap(), dec("12.75"));
    }

    #[test]
    fn stored_non_positive_factor_is_integrity_error() {
        let model = Model {
            stock_item_id: Uuid::new_v4().to_string(),
            unit_id: Uuid::new_v4().to_string(),
            factor_minor: 0,
            is_base: false,
        };
        assert!(matches!(
            UnitConversion::try_from(model),
            Err(EngineError::Integrity(_))
        ));
    }
}
