use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseCategory, LedgerMetadata, ProductReason, ProductTransaction,
    ResultEngine, Sale, SaleCmd,
    numeric::{mul, require_non_negative, require_positive, round},
    product_transactions, sales,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{
    Engine,
    catalog::require_product,
    ledger::{insert_expense, insufficient, post_product},
    lock_set::LockSet,
    with_tx,
};

impl Engine {
    /// Record a sale.
    ///
    /// The full quantity leaves product stock through one `sale` row and is
    /// billed in full. Damaged units among them are valued at the selling
    /// price, booked as a `product_damage` expense and noted with a
    /// zero-delta `damage` row.
    pub async fn record_sale(&self, cmd: SaleCmd) -> ResultEngine<Sale> {
        let quantity = require_positive(cmd.quantity, "quantity")?;
        let unit_price = require_positive(cmd.unit_price, "unit_price")?;
        let damaged = require_non_negative(cmd.damaged_quantity, "damaged_quantity")?;
        if damaged > quantity {
            return Err(EngineError::Validation(format!(
                "damaged_quantity {damaged} exceeds sold quantity {quantity}"
            )));
        }
        let damage_reason = normalize_optional_text(cmd.damage_reason.as_deref());
        with_tx!(self, |db_tx| {
            let mut product = LockSet::new()
                .product(cmd.product_id)
                .acquire(&db_tx)
                .await?
                .take_product(cmd.product_id)?;
            if product.current_stock < quantity {
                return Err(insufficient(&product.name, quantity, product.current_stock));
            }

            let mut sale = Sale {
                id: Uuid::new_v4(),
                product_id: product.id,
                quantity,
                unit_price,
                total_amount: round(mul(quantity, unit_price)?),
                damaged_quantity: damaged,
                damage_reason: damage_reason.clone(),
                damage_expense_id: None,
                customer_name: normalize_optional_text(cmd.customer_name.as_deref()),
                notes: normalize_optional_text(cmd.notes.as_deref()),
                sale_date: cmd.sale_date,
                created_at: Utc::now(),
            };

            let damage_expense = if damaged > Decimal::ZERO {
                let expense = Expense::new(
                    ExpenseCategory::ProductDamage,
                    format!("Damaged on sale: {} x {}", damaged, product.name),
                    round(mul(damaged, product.selling_price)?),
                )?
                .notes(damage_reason.clone())
                .sale(sale.id, product.id);
                sale.damage_expense_id = Some(expense.id);
                Some(expense)
            } else {
                None
            };

            sales::ActiveModel::try_from(&sale)?
                .insert(&db_tx)
                .await?;

            let tx = ProductTransaction::decrease(product.id, quantity, ProductReason::Sale)?
                .metadata(LedgerMetadata::for_sale(sale.id, product.id));
            post_product(&db_tx, &mut product, tx).await?;

            if let Some(expense) = &damage_expense {
                insert_expense(&db_tx, expense).await?;
                let tx = ProductTransaction::damage_recorded(product.id, damaged)?
                    .note(damage_reason)
                    .metadata(LedgerMetadata::for_sale(sale.id, product.id).expense(expense.id));
                post_product(&db_tx, &mut product, tx).await?;
            }

            tracing::info!(
                sale_id = %sale.id,
                product_id = %product.id,
                %quantity,
                %damaged,
                "sale recorded"
            );
            Ok(sale)
        })
    }

    /// Write off damaged units still in stock, valued at the selling price.
    pub async fn record_product_damage(
        &self,
        product_id: Uuid,
        quantity: Decimal,
        reason: &str,
    ) -> ResultEngine<(ProductTransaction, Expense)> {
        let quantity = require_positive(quantity, "quantity")?;
        let reason = normalize_required_text(reason, "damage reason")?;
        with_tx!(self, |db_tx| {
            let mut product = LockSet::new()
                .product(product_id)
                .acquire(&db_tx)
                .await?
                .take_product(product_id)?;

            let expense = Expense::new(
                ExpenseCategory::ProductDamage,
                format!("Damaged stock: {} x {}", quantity, product.name),
                round(mul(quantity, product.selling_price)?),
            )?
            .notes(Some(reason.clone()))
            .product(product.id);

            let metadata = LedgerMetadata {
                product_id: Some(product.id),
                ..LedgerMetadata::default()
            }
            .expense(expense.id);
            let tx = ProductTransaction::damage(product.id, quantity)?
                .note(Some(reason))
                .metadata(metadata);
            let tx = post_product(&db_tx, &mut product, tx).await?;
            insert_expense(&db_tx, &expense).await?;

            tracing::info!(%product_id, %quantity, "product damage recorded");
            Ok((tx, expense))
        })
    }

    /// Return a sale snapshot from DB.
    pub async fn sale(&self, sale_id: Uuid) -> ResultEngine<Sale> {
        with_tx!(self, |db_tx| {
            let model = sales::Entity::find_by_id(sale_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("sale {sale_id}")))?;
            Sale::try_from(model)
        })
    }

    pub async fn list_sales(&self) -> ResultEngine<Vec<Sale>> {
        with_tx!(self, |db_tx| {
            let models = sales::Entity::find()
                .order_by_desc(sales::Column::SaleDate)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(Sale::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Ledger rows of a product, oldest first.
    pub async fn product_transactions(
        &self,
        product_id: Uuid,
    ) -> ResultEngine<Vec<ProductTransaction>> {
        with_tx!(self, |db_tx| {
            require_product(&db_tx, product_id).await?;
            let models = product_transactions::Entity::find()
                .filter(product_transactions::Column::ProductId.eq(product_id.to_string()))
                .order_by_asc(product_transactions::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(ProductTransaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}
