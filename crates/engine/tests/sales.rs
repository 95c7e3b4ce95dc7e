mod common;

use chrono::Utc;
use common::{dec, engine_with_db};
use engine::{
    Engine, EngineError, ExpenseCategory, Product, ProductReason, ProductTransactionKind,
    ProductionStatus, SaleCmd, UpdateProductionOrderCmd,
};

/// A product with `stock` units on hand, produced through a completed order.
async fn stocked_product(engine: &Engine, selling_price: &str, stock: &str) -> Product {
    let product = engine.create_product("Cake", dec(selling_price)).await.unwrap();
    let order = engine
        .create_production_order(product.id, dec(stock))
        .await
        .unwrap();
    engine
        .update_production_order(
            UpdateProductionOrderCmd::new(order.id)
                .quantity_produced(dec(stock))
                .status(ProductionStatus::Completed),
        )
        .await
        .unwrap();
    engine.product(product.id).await.unwrap()
}

#[tokio::test]
async fn damaged_units_are_billed_and_expensed() {
    let (engine, _db) = engine_with_db().await;
    let cake = stocked_product(&engine, "2", "10").await;
    assert_eq!(cake.current_stock, dec("10"));

    let sale = engine
        .record_sale(
            SaleCmd::new(cake.id, dec("10"), dec("2.5"), Utc::now())
                .damaged(dec("3"), "dropped in transit")
                .customer_name("Corner Cafe"),
        )
        .await
        .unwrap();
    assert_eq!(sale.total_amount, dec("25"));
    assert_eq!(sale.damaged_quantity, dec("3"));
    assert_eq!(sale.customer_name.as_deref(), Some("Corner Cafe"));

    let expense_id = sale.damage_expense_id.unwrap();
    let expense = engine.expense(expense_id).await.unwrap();
    assert_eq!(expense.category, ExpenseCategory::ProductDamage);
    assert_eq!(expense.amount, dec("6"));
    assert_eq!(expense.sale_id, Some(sale.id));

    assert_eq!(engine.product(cake.id).await.unwrap().current_stock, dec("0"));

    let rows = engine.product_transactions(cake.id).await.unwrap();
    let sold: Vec<_> = rows
        .iter()
        .filter(|row| row.reason == ProductReason::Sale)
        .collect();
    assert_eq!(sold.len(), 1);
    assert_eq!(sold[0].delta, dec("-10"));
    assert_eq!(sold[0].metadata.sale_id, Some(sale.id));

    let damage: Vec<_> = rows
        .iter()
        .filter(|row| row.kind == ProductTransactionKind::Damage)
        .collect();
    assert_eq!(damage.len(), 1);
    assert_eq!(damage[0].quantity, dec("3"));
    assert_eq!(damage[0].delta, dec("0"));
    assert_eq!(damage[0].metadata.expense_id, Some(expense_id));
    assert_eq!(damage[0].metadata.sale_id, Some(sale.id));

    assert_eq!(engine.sale(sale.id).await.unwrap().total_amount, dec("25"));
    assert_eq!(engine.list_sales().await.unwrap().len(), 1);
}

#[tokio::test]
async fn clean_sale_writes_no_expense() {
    let (engine, _db) = engine_with_db().await;
    let cake = stocked_product(&engine, "2", "5").await;

    let sale = engine
        .record_sale(SaleCmd::new(cake.id, dec("2"), dec("3"), Utc::now()))
        .await
        .unwrap();
    assert_eq!(sale.damage_expense_id, None);
    assert_eq!(sale.total_amount, dec("6"));
    assert!(engine.list_expenses(None).await.unwrap().is_empty());
    assert_eq!(engine.product(cake.id).await.unwrap().current_stock, dec("3"));
}

#[tokio::test]
async fn sale_cannot_exceed_product_stock() {
    let (engine, _db) = engine_with_db().await;
    let cake = stocked_product(&engine, "2", "5").await;

    let err = engine
        .record_sale(SaleCmd::new(cake.id, dec("6"), dec("2"), Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock(_)));
    assert!(engine.list_sales().await.unwrap().is_empty());
    assert_eq!(engine.product(cake.id).await.unwrap().current_stock, dec("5"));
}

#[tokio::test]
async fn sale_input_is_validated() {
    let (engine, _db) = engine_with_db().await;
    let cake = stocked_product(&engine, "2", "5").await;

    let cases = [
        SaleCmd::new(cake.id, dec("0"), dec("2"), Utc::now()),
        SaleCmd::new(cake.id, dec("1"), dec("0"), Utc::now()),
        SaleCmd::new(cake.id, dec("1"), dec("2"), Utc::now()).damaged(dec("2"), "crushed"),
        SaleCmd::new(cake.id, dec("1"), dec("2"), Utc::now()).damaged(dec("-1"), "crushed"),
    ];
    for cmd in cases {
        let err = engine.record_sale(cmd).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)), "{err:?}");
    }

    let err = engine
        .record_sale(SaleCmd::new(uuid::Uuid::new_v4(), dec("1"), dec("2"), Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn standalone_damage_reduces_stock() {
    let (engine, _db) = engine_with_db().await;
    let cake = stocked_product(&engine, "2.5", "5").await;

    let (row, expense) = engine
        .record_product_damage(cake.id, dec("2"), "fridge failure")
        .await
        .unwrap();
    assert_eq!(row.kind, ProductTransactionKind::Damage);
    assert_eq!(row.reason, ProductReason::Damage);
    assert_eq!(row.delta, dec("-2"));
    assert_eq!(row.metadata.expense_id, Some(expense.id));
    assert_eq!(expense.amount, dec("5"));
    assert_eq!(expense.product_id, Some(cake.id));
    assert_eq!(engine.product(cake.id).await.unwrap().current_stock, dec("3"));

    let err = engine
        .record_product_damage(cake.id, dec("4"), "fridge failure")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock(_)));
    assert_eq!(
        engine
            .list_expenses(Some(ExpenseCategory::ProductDamage))
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn oversized_amounts_are_rejected_without_side_effects() {
    let (engine, _db) = engine_with_db().await;
    let cake = stocked_product(&engine, "2", "10").await;

    let err = engine
        .record_sale(SaleCmd::new(cake.id, dec("2"), rust_decimal::Decimal::MAX, Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Each input fits storage, the total does not.
    let err = engine
        .record_sale(SaleCmd::new(cake.id, dec("10"), dec("9000000000000"), Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    assert!(engine.list_sales().await.unwrap().is_empty());
    assert_eq!(engine.product(cake.id).await.unwrap().current_stock, dec("10"));
}
