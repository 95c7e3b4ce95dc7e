mod common;

use std::sync::Arc;

use chrono::Utc;
use common::{dec, engine_with_db, kilogram, order, product_using};
use engine::{
    AdjustmentRequestCmd, AdjustmentType, EngineError, ExtraIngredient, NewStockItemCmd,
    ProductionStatus, ResolveAdjustmentCmd, SaleCmd, StockEntryCmd, UpdateProductionOrderCmd,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

#[tokio::test]
async fn verify_reports_both_ledgers() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let flour = engine
        .create_stock_item(NewStockItemCmd::new("Flour", kg.id, dec("1")).initial_quantity(dec("100")))
        .await
        .unwrap();
    let bread = product_using(&engine, "Bread", "4", &flour, "2").await;
    let planned = order(&engine, &bread, "10").await;
    engine
        .update_production_order(
            UpdateProductionOrderCmd::new(planned.id)
                .quantity_produced(dec("10"))
                .status(ProductionStatus::Completed),
        )
        .await
        .unwrap();
    engine
        .record_sale(SaleCmd::new(bread.id, dec("4"), dec("4"), Utc::now()).damaged(dec("1"), "torn"))
        .await
        .unwrap();
    engine
        .receive_stock(StockEntryCmd::new(flour.id, dec("5")))
        .await
        .unwrap();

    let report = engine.verify_ledgers().await.unwrap();
    assert_eq!(report.stock_items, 1);
    // initial stock, consumption, purchase
    assert_eq!(report.stock_transactions, 3);
    assert_eq!(report.products, 1);
    // output, sale, damage note
    assert_eq!(report.product_transactions, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_completions_never_overdraw() {
    let (engine, _db) = engine_with_db().await;
    let engine = Arc::new(engine);
    let kg = kilogram(&engine).await;
    let flour = engine
        .create_stock_item(NewStockItemCmd::new("Flour", kg.id, dec("1")).initial_quantity(dec("100")))
        .await
        .unwrap();
    let bread = product_using(&engine, "Bread", "4", &flour, "2").await;

    let mut orders = Vec::new();
    for _ in 0..8 {
        orders.push(order(&engine, &bread, "10").await);
    }

    let mut handles = Vec::new();
    for planned in orders {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .update_production_order(
                    UpdateProductionOrderCmd::new(planned.id)
                        .quantity_produced(dec("10"))
                        .status(ProductionStatus::Completed),
                )
                .await
        }));
    }

    let mut completed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(order) => {
                assert_eq!(order.status, ProductionStatus::Completed);
                completed += 1;
            }
            Err(err) => assert!(matches!(err, EngineError::InsufficientStock(_)), "{err:?}"),
        }
    }
    assert_eq!(completed, 5);
    assert_eq!(engine.stock_item(flour.id).await.unwrap().current_quantity, dec("0"));
    assert_eq!(engine.product(bread.id).await.unwrap().current_stock, dec("50"));
    engine.verify_ledgers().await.unwrap();
}

#[derive(Clone, Copy, Debug)]
enum Op {
    Produce(u32),
    ProduceWithExtra(u32, u32),
    Adjust(bool, u32),
    Receive(u32),
    Damage(u32),
    Sell(u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u32..15).prop_map(Op::Produce),
        (1u32..10, 1u32..20).prop_map(|(units, extra)| Op::ProduceWithExtra(units, extra)),
        (any::<bool>(), 1u32..40).prop_map(|(up, quantity)| Op::Adjust(up, quantity)),
        (1u32..30).prop_map(Op::Receive),
        (1u32..30).prop_map(Op::Damage),
        (1u32..10).prop_map(Op::Sell),
    ]
}

/// Run `ops` against a fresh database and a plain in-memory model of the
/// balances. Every outcome must match the model and no balance may go
/// negative.
async fn run_ops(ops: Vec<Op>) {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let flour = engine
        .create_stock_item(
            NewStockItemCmd::new("Flour", kg.id, dec("1"))
                .initial_quantity(dec("50"))
                .allow_extra(Decimal::ZERO),
        )
        .await
        .unwrap();
    let bread = product_using(&engine, "Bread", "4", &flour, "2").await;
    let planned = order(&engine, &bread, "1000000").await;
    engine
        .update_production_order(
            UpdateProductionOrderCmd::new(planned.id).status(ProductionStatus::InProgress),
        )
        .await
        .unwrap();

    let mut flour_left = Decimal::from(50);
    let mut bread_left = Decimal::ZERO;
    let mut produced = Decimal::ZERO;

    for op in ops {
        let expect_ok = match op {
            Op::Produce(units) => {
                let units = Decimal::from(units);
                let ok = units * Decimal::TWO <= flour_left;
                let result = engine
                    .update_production_order(
                        UpdateProductionOrderCmd::new(planned.id).quantity_produced(produced + units),
                    )
                    .await;
                assert_eq!(result.is_ok(), ok, "{op:?}: {result:?}");
                if ok {
                    produced += units;
                    flour_left -= units * Decimal::TWO;
                    bread_left += units;
                }
                ok
            }
            Op::ProduceWithExtra(units, extra) => {
                let units = Decimal::from(units);
                let extra = Decimal::from(extra);
                let ok = units * Decimal::TWO + extra <= flour_left;
                let result = engine
                    .update_production_order(
                        UpdateProductionOrderCmd::new(planned.id)
                            .quantity_produced(produced + units)
                            .extra(ExtraIngredient::new(flour.id, extra)),
                    )
                    .await;
                assert_eq!(result.is_ok(), ok, "{op:?}: {result:?}");
                if ok {
                    produced += units;
                    flour_left -= units * Decimal::TWO + extra;
                    bread_left += units;
                }
                ok
            }
            Op::Adjust(up, quantity) => {
                let quantity = Decimal::from(quantity);
                let kind = if up {
                    AdjustmentType::Increase
                } else {
                    AdjustmentType::Decrease
                };
                let request = engine
                    .request_stock_adjustment(AdjustmentRequestCmd::new(
                        flour.id, kind, quantity, "recount", "alice",
                    ))
                    .await
                    .unwrap();
                let ok = up || quantity <= flour_left;
                let result = engine
                    .resolve_stock_adjustment(ResolveAdjustmentCmd::approve(request.id, "bob"))
                    .await;
                assert_eq!(result.is_ok(), ok, "{op:?}: {result:?}");
                if ok {
                    flour_left += kind.signed(quantity);
                }
                ok
            }
            Op::Receive(quantity) => {
                let quantity = Decimal::from(quantity);
                engine
                    .receive_stock(StockEntryCmd::new(flour.id, quantity))
                    .await
                    .unwrap();
                flour_left += quantity;
                true
            }
            Op::Damage(quantity) => {
                let quantity = Decimal::from(quantity);
                let ok = quantity <= flour_left;
                let result = engine
                    .record_stock_damage(StockEntryCmd::new(flour.id, quantity).note("spilled"))
                    .await;
                assert_eq!(result.is_ok(), ok, "{op:?}: {result:?}");
                if ok {
                    flour_left -= quantity;
                }
                ok
            }
            Op::Sell(quantity) => {
                let quantity = Decimal::from(quantity);
                let ok = quantity <= bread_left;
                let result = engine
                    .record_sale(SaleCmd::new(bread.id, quantity, dec("4"), Utc::now()))
                    .await;
                assert_eq!(result.is_ok(), ok, "{op:?}: {result:?}");
                if ok {
                    bread_left -= quantity;
                }
                ok
            }
        };

        let item = engine.stock_item(flour.id).await.unwrap();
        let product = engine.product(bread.id).await.unwrap();
        assert!(item.current_quantity >= Decimal::ZERO);
        assert!(product.current_stock >= Decimal::ZERO);
        assert_eq!(item.current_quantity, flour_left, "after {op:?} (ok: {expect_ok})");
        assert_eq!(product.current_stock, bread_left, "after {op:?} (ok: {expect_ok})");
    }

    engine.verify_ledgers().await.unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Balances follow the ledger and never go negative, whatever order
    /// consumption, extras, adjustments, damage and sales arrive in.
    #[test]
    fn balances_never_go_negative(ops in prop::collection::vec(op_strategy(), 1..25)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(run_ops(ops));
    }
}
