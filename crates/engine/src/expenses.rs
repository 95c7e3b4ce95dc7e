//! Expenses written by the engine as a side effect of losses.

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

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    ProductionFailure,
    ProductDamage,
    StockDamage,
    Other,
}

impl ExpenseCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProductionFailure => "production_failure",
            Self::ProductDamage => "product_damage",
            Self::StockDamage => "stock_damage",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for ExpenseCategory {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "production_failure" => Ok(Self::ProductionFailure),
            "product_damage" => Ok(Self::ProductDamage),
            "stock_damage" => Ok(Self::StockDamage),
            "other" => Ok(Self::Other),
            other => Err(EngineError::Integrity(format!(
                "invalid expense category: {other}"
            ))),
        }
    }
}

/// A realized loss. Never mutated after insert.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Decimal,
    pub notes: Option<String>,
    pub expense_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_item_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(category: ExpenseCategory, description: String, amount: Decimal) -> ResultEngine<Self> {
        if amount <= Decimal::ZERO {
            return Err(EngineError::Validation(
                "expense amount must be > 0".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            category,
            description,
            amount,
            notes: None,
            expense_date: now,
            order_id: None,
            product_id: None,
            sale_id: None,
            stock_item_id: None,
            created_at: now,
        })
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    #[must_use]
    pub fn order(mut self, order_id: Uuid, product_id: Uuid) -> Self {
        self.order_id = Some(order_id);
        self.product_id = Some(product_id);
        self
    }

    #[must_use]
    pub fn sale(mut self, sale_id: Uuid, product_id: Uuid) -> Self {
        self.sale_id = Some(sale_id);
        self.product_id = Some(product_id);
        self
    }

    #[must_use]
    pub fn product(mut self, product_id: Uuid) -> Self {
        self.product_id = Some(product_id);
        self
    }

    #[must_use]
    pub fn stock_item(mut self, stock_item_id: Uuid) -> Self {
        self.stock_item_id = Some(stock_item_id);
        self
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub category: String,
    pub description: String,
    pub amount_minor: i64,
    pub notes: Option<String>,
    pub expense_date: DateTimeUtc,
    pub order_id: Option<String>,
    pub product_id: Option<String>,
    pub sale_id: Option<String>,
    pub stock_item_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Expense> for ActiveModel {
    type Error = EngineError;

    fn try_from(expense: &Expense) -> ResultEngine<Self> {
        Ok(Self {
            id: ActiveValue::Set(expense.id.to_string()),
            category: ActiveValue::Set(expense.category.as_str().to_string()),
            description: ActiveValue::Set(expense.description.clone()),
            amount_minor: ActiveValue::Set(to_minor(expense.amount)?),
            notes: ActiveValue::Set(expense.notes.clone()),
            expense_date: ActiveValue::Set(expense.expense_date),
            order_id: ActiveValue::Set(expense.order_id.map(|id| id.to_string())),
            product_id: ActiveValue::Set(expense.product_id.map(|id| id.to_string())),
            sale_id: ActiveValue::Set(expense.sale_id.map(|id| id.to_string())),
            stock_item_id: ActiveValue::Set(expense.stock_item_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(expense.created_at),
        })
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            category: ExpenseCategory::try_from(model.category.as_str())?,
            description: model.description,
            amount: from_minor(model.amount_minor),
            notes: model.notes,
            expense_date: model.expense_date,
            order_id: parse_optional_uuid(model.order_id.as_deref(), "order")?,
            product_id: parse_optional_uuid(model.product_id.as_deref(), "product")?,
            sale_id: parse_optional_uuid(model.sale_id.as_deref(), "sale")?,
            stock_item_id: parse_optional_uuid(model.stock_item_id.as_deref(), "stock item")?,
            created_at: model.created_at,
        })
    }
}
