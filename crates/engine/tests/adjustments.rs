mod common;

use common::{dec, engine_with_db, kilogram, stock_item};
use engine::{
    AdjustmentRequestCmd, AdjustmentStatus, AdjustmentType, EngineError, ResolveAdjustmentCmd,
    StockReason,
};

#[tokio::test]
async fn approving_an_uncovered_decrease_keeps_it_pending() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let flour = stock_item(&engine, &kg, "Flour", "1", "30").await;

    let request = engine
        .request_stock_adjustment(AdjustmentRequestCmd::new(
            flour.id,
            AdjustmentType::Decrease,
            dec("50"),
            "found spoiled sacks",
            "alice",
        ))
        .await
        .unwrap();
    assert_eq!(request.status, AdjustmentStatus::Pending);

    let err = engine
        .resolve_stock_adjustment(ResolveAdjustmentCmd::approve(request.id, "bob"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock(_)));

    let reread = engine.stock_adjustment(request.id).await.unwrap();
    assert_eq!(reread.status, AdjustmentStatus::Pending);
    assert_eq!(reread.resolved_by, None);
    assert_eq!(engine.stock_item(flour.id).await.unwrap().current_quantity, dec("30"));
}

#[tokio::test]
async fn approval_posts_one_adjustment_row() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let flour = stock_item(&engine, &kg, "Flour", "1", "30").await;

    let request = engine
        .request_stock_adjustment(AdjustmentRequestCmd::new(
            flour.id,
            AdjustmentType::Decrease,
            dec("12.5"),
            "recount",
            "alice",
        ))
        .await
        .unwrap();
    let resolved = engine
        .resolve_stock_adjustment(ResolveAdjustmentCmd::approve(request.id, "bob").notes("checked"))
        .await
        .unwrap();
    assert_eq!(resolved.status, AdjustmentStatus::Approved);
    assert_eq!(resolved.resolved_by.as_deref(), Some("bob"));
    assert_eq!(resolved.resolution_notes.as_deref(), Some("checked"));
    assert!(resolved.resolved_at.is_some());

    assert_eq!(engine.stock_item(flour.id).await.unwrap().current_quantity, dec("17.5"));
    let rows = engine.stock_transactions(flour.id).await.unwrap();
    let manual: Vec<_> = rows
        .iter()
        .filter(|row| row.reason == StockReason::ManualAdjustment)
        .collect();
    assert_eq!(manual.len(), 1);
    assert_eq!(manual[0].delta, dec("-12.5"));
    assert_eq!(manual[0].metadata.adjustment_id, Some(request.id));
    assert_eq!(manual[0].metadata.actor.as_deref(), Some("bob"));
}

#[tokio::test]
async fn rejection_moves_no_stock() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let flour = stock_item(&engine, &kg, "Flour", "1", "30").await;

    let request = engine
        .request_stock_adjustment(AdjustmentRequestCmd::new(
            flour.id,
            AdjustmentType::Increase,
            dec("5"),
            "supplier bonus",
            "alice",
        ))
        .await
        .unwrap();
    let resolved = engine
        .resolve_stock_adjustment(ResolveAdjustmentCmd::reject(request.id, "bob"))
        .await
        .unwrap();
    assert_eq!(resolved.status, AdjustmentStatus::Rejected);
    assert_eq!(engine.stock_item(flour.id).await.unwrap().current_quantity, dec("30"));
    assert_eq!(engine.stock_transactions(flour.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn second_resolution_conflicts_without_side_effects() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let flour = stock_item(&engine, &kg, "Flour", "1", "30").await;

    let request = engine
        .request_stock_adjustment(AdjustmentRequestCmd::new(
            flour.id,
            AdjustmentType::Increase,
            dec("5"),
            "found a sack",
            "alice",
        ))
        .await
        .unwrap();
    engine
        .resolve_stock_adjustment(ResolveAdjustmentCmd::approve(request.id, "bob"))
        .await
        .unwrap();

    for again in [
        ResolveAdjustmentCmd::approve(request.id, "carol"),
        ResolveAdjustmentCmd::reject(request.id, "carol"),
    ] {
        let err = engine.resolve_stock_adjustment(again).await.unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    let reread = engine.stock_adjustment(request.id).await.unwrap();
    assert_eq!(reread.status, AdjustmentStatus::Approved);
    assert_eq!(reread.resolved_by.as_deref(), Some("bob"));
    assert_eq!(engine.stock_item(flour.id).await.unwrap().current_quantity, dec("35"));
    assert_eq!(engine.stock_transactions(flour.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn requester_cannot_resolve_own_adjustment() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let flour = stock_item(&engine, &kg, "Flour", "1", "30").await;

    let request = engine
        .request_stock_adjustment(AdjustmentRequestCmd::new(
            flour.id,
            AdjustmentType::Increase,
            dec("5"),
            "found a sack",
            "alice",
        ))
        .await
        .unwrap();
    let err = engine
        .resolve_stock_adjustment(ResolveAdjustmentCmd::approve(request.id, " alice "))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(
        engine.stock_adjustment(request.id).await.unwrap().status,
        AdjustmentStatus::Pending
    );
}

#[tokio::test]
async fn requests_are_validated_and_listed() {
    let (engine, _db) = engine_with_db().await;
    let kg = kilogram(&engine).await;
    let flour = stock_item(&engine, &kg, "Flour", "1", "30").await;

    let err = engine
        .request_stock_adjustment(AdjustmentRequestCmd::new(
            flour.id,
            AdjustmentType::Increase,
            dec("0"),
            "nothing",
            "alice",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .request_stock_adjustment(AdjustmentRequestCmd::new(
            uuid::Uuid::new_v4(),
            AdjustmentType::Increase,
            dec("1"),
            "ghost",
            "alice",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let first = engine
        .request_stock_adjustment(AdjustmentRequestCmd::new(
            flour.id,
            AdjustmentType::Increase,
            dec("1"),
            "found",
            "alice",
        ))
        .await
        .unwrap();
    engine
        .request_stock_adjustment(AdjustmentRequestCmd::new(
            flour.id,
            AdjustmentType::Decrease,
            dec("1"),
            "lost",
            "alice",
        ))
        .await
        .unwrap();
    engine
        .resolve_stock_adjustment(ResolveAdjustmentCmd::reject(first.id, "bob"))
        .await
        .unwrap();

    assert_eq!(engine.list_stock_adjustments(None).await.unwrap().len(), 2);
    let pending = engine
        .list_stock_adjustments(Some(AdjustmentStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].reason, "lost");
}
