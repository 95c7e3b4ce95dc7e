use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Expense, ExpenseCategory, ResultEngine, expenses};

use super::{Engine, with_tx};

impl Engine {
    /// Return an expense snapshot from DB.
    pub async fn expense(&self, expense_id: Uuid) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let model = expenses::Entity::find_by_id(expense_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("expense {expense_id}")))?;
            Expense::try_from(model)
        })
    }

    /// Expenses, newest first, optionally filtered by category.
    pub async fn list_expenses(
        &self,
        category: Option<ExpenseCategory>,
    ) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            let mut query = expenses::Entity::find()
                .order_by_desc(expenses::Column::ExpenseDate)
                .order_by_desc(expenses::Column::CreatedAt);
            if let Some(category) = category {
                query = query.filter(expenses::Column::Category.eq(category.as_str()));
            }
            let models = query.all(&db_tx).await?;
            models
                .into_iter()
                .map(Expense::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}
