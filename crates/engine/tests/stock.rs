mod common;

use common::{dec, engine_with_db, kilogram, stock_item};
use engine::{
    EngineError, ExpenseCategory, NewStockItemCmd, StockEntryCmd, StockItemSettingsCmd,
    StockReason, StockTransactionKind,
};

#[tokio::test]
async fn unit_names_are_unique_ignoring_case() {
    let (engine, _db) = engine_with_db().await;
    kilogram(&engine).await;

    let err = engine.create_unit("Kilogram", "KG").await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
    assert_eq!(engine.units().await.unwrap().len(), 1);
}

#[tokio::test]
async fn initial_quantity_is_backed_by_the_ledger() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let flour = engine
        .create_stock_item(
            NewStockItemCmd::new(" Flour ", kg.id, dec("1.25"))
                .initial_quantity(dec("12.5"))
                .supplier("Mill & Co"),
        )
        .await
        .unwrap();
    assert_eq!(flour.name, "Flour");
    assert_eq!(flour.current_quantity, dec("12.5"));

    let rows = engine.stock_transactions(flour.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, StockTransactionKind::Increase);
    assert_eq!(rows[0].reason, StockReason::InitialStock);
    assert_eq!(rows[0].delta, dec("12.5"));

    let conversions = engine.unit_conversions(flour.id).await.unwrap();
    assert_eq!(conversions.len(), 1);
    assert!(conversions[0].is_base);
    assert_eq!(conversions[0].factor, dec("1"));
}

#[tokio::test]
async fn empty_stock_item_has_no_ledger_rows() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let yeast = stock_item(&engine, &kg, "Yeast", "9", "0").await;
    assert!(engine.stock_transactions(yeast.id).await.unwrap().is_empty());
    assert_eq!(engine.list_stock_items().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_base_unit_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .create_stock_item(NewStockItemCmd::new("Flour", uuid::Uuid::new_v4(), dec("1")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn too_many_decimal_places_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let flour = stock_item(&engine, &kg, "Flour", "1", "10").await;

    let err = engine
        .receive_stock(StockEntryCmd::new(flour.id, dec("0.0000001")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn receiving_in_another_unit_keeps_the_entered_quantity() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let sack = engine.create_unit("sack", "sack").await.unwrap();
    let flour = stock_item(&engine, &kg, "Flour", "1", "10").await;
    engine
        .add_unit_conversion(flour.id, sack.id, dec("25"))
        .await
        .unwrap();

    let row = engine
        .receive_stock(
            StockEntryCmd::new(flour.id, dec("2"))
                .unit(sack.id)
                .note("weekly delivery"),
        )
        .await
        .unwrap();
    assert_eq!(row.reason, StockReason::Purchase);
    assert_eq!(row.quantity, dec("50"));
    assert_eq!(row.unit_id, Some(sack.id));
    assert_eq!(row.entered_quantity, Some(dec("2")));
    assert_eq!(row.note.as_deref(), Some("weekly delivery"));

    let item = engine.stock_item(flour.id).await.unwrap();
    assert_eq!(item.current_quantity, dec("60"));
    assert_eq!(
        engine
            .convert_quantity(flour.id, item.current_quantity, Some(sack.id))
            .await
            .unwrap(),
        dec("2.4")
    );
    assert_eq!(
        engine
            .to_base_quantity(flour.id, dec("0.5"), Some(sack.id))
            .await
            .unwrap(),
        dec("12.5")
    );
}

#[tokio::test]
async fn unit_without_conversion_is_invalid() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let litre = engine.create_unit("litre", "l").await.unwrap();
    let flour = stock_item(&engine, &kg, "Flour", "1", "10").await;

    let err = engine
        .receive_stock(StockEntryCmd::new(flour.id, dec("1")).unit(litre.id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidUnit(_)));
    assert_eq!(engine.stock_item(flour.id).await.unwrap().current_quantity, dec("10"));
}

#[tokio::test]
async fn conversions_are_unique_and_positive() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let gram = engine.create_unit("gram", "g").await.unwrap();
    let flour = stock_item(&engine, &kg, "Flour", "1", "10").await;

    let err = engine
        .add_unit_conversion(flour.id, gram.id, dec("0"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    let err = engine
        .add_unit_conversion(flour.id, gram.id, rust_decimal::Decimal::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    engine
        .add_unit_conversion(flour.id, gram.id, dec("0.001"))
        .await
        .unwrap();
    let err = engine
        .add_unit_conversion(flour.id, gram.id, dec("0.002"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let err = engine
        .add_unit_conversion(flour.id, kg.id, dec("2"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn counting_stock_writes_the_difference() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let flour = stock_item(&engine, &kg, "Flour", "1", "10").await;

    let row = engine
        .set_stock_quantity(StockEntryCmd::new(flour.id, dec("7.5")).note("monthly count"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.kind, StockTransactionKind::Adjustment);
    assert_eq!(row.reason, StockReason::StockCount);
    assert_eq!(row.delta, dec("-2.5"));
    assert_eq!(row.quantity, dec("2.5"));

    let row = engine
        .set_stock_quantity(StockEntryCmd::new(flour.id, dec("9")))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.delta, dec("1.5"));

    let unchanged = engine
        .set_stock_quantity(StockEntryCmd::new(flour.id, dec("9")))
        .await
        .unwrap();
    assert!(unchanged.is_none());
    assert_eq!(engine.stock_transactions(flour.id).await.unwrap().len(), 3);
    assert_eq!(engine.stock_item(flour.id).await.unwrap().current_quantity, dec("9"));
}

#[tokio::test]
async fn stock_damage_books_an_expense_at_unit_cost() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let flour = stock_item(&engine, &kg, "Flour", "1.5", "10").await;

    let (row, expense) = engine
        .record_stock_damage(StockEntryCmd::new(flour.id, dec("4")).note("water leak"))
        .await
        .unwrap();
    let expense = expense.unwrap();
    assert_eq!(row.reason, StockReason::Damage);
    assert_eq!(row.delta, dec("-4"));
    assert_eq!(row.metadata.expense_id, Some(expense.id));
    assert_eq!(expense.category, ExpenseCategory::StockDamage);
    assert_eq!(expense.amount, dec("6"));
    assert_eq!(expense.stock_item_id, Some(flour.id));
    assert_eq!(engine.expense(expense.id).await.unwrap().amount, dec("6"));
    assert_eq!(engine.stock_item(flour.id).await.unwrap().current_quantity, dec("6"));
}

#[tokio::test]
async fn stock_damage_needs_a_reason_and_enough_stock() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let flour = stock_item(&engine, &kg, "Flour", "1.5", "10").await;

    let err = engine
        .record_stock_damage(StockEntryCmd::new(flour.id, dec("1")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .record_stock_damage(StockEntryCmd::new(flour.id, dec("11")).note("spilled"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock(_)));
    assert!(engine.list_expenses(None).await.unwrap().is_empty());
    assert_eq!(engine.stock_item(flour.id).await.unwrap().current_quantity, dec("10"));
}

#[tokio::test]
async fn free_stock_damage_writes_no_expense() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let water = stock_item(&engine, &kg, "Water", "0", "10").await;

    let (_, expense) = engine
        .record_stock_damage(StockEntryCmd::new(water.id, dec("1")).note("spilled"))
        .await
        .unwrap();
    assert!(expense.is_none());
    assert_eq!(engine.stock_item(water.id).await.unwrap().current_quantity, dec("9"));
}

#[tokio::test]
async fn settings_leave_the_balance_alone() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let flour = engine
        .create_stock_item(
            NewStockItemCmd::new("Flour", kg.id, dec("1"))
                .initial_quantity(dec("10"))
                .supplier("Mill"),
        )
        .await
        .unwrap();

    let updated = engine
        .update_stock_item_settings(
            flour.id,
            StockItemSettingsCmd::default()
                .unit_cost(dec("1.75"))
                .supplier("")
                .allow_extra_production(true)
                .extra_production_limit(dec("3")),
        )
        .await
        .unwrap();
    assert_eq!(updated.unit_cost, dec("1.75"));
    assert_eq!(updated.supplier, None);
    assert!(updated.allow_extra_production);
    assert_eq!(updated.extra_production_limit, dec("3"));
    assert_eq!(updated.current_quantity, dec("10"));

    let reread = engine.stock_item(flour.id).await.unwrap();
    assert_eq!(reread.unit_cost, dec("1.75"));
    assert_eq!(reread.supplier, None);
    assert_eq!(engine.stock_transactions(flour.id).await.unwrap().len(), 1);
}
