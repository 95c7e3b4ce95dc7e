//! Initial schema migration - creates all tables from scratch.
//!
//! - `units`: units of measure
//! - `stock_items`: raw materials with their cached on-hand balance
//! - `unit_conversions`: per stock item factors to the base unit
//! - `stock_transactions`: append-only stock ledger
//! - `products`: finished goods with their cached stock
//! - `product_transactions`: append-only product ledger
//! - `product_recipes`: per-unit ingredient requirements
//! - `production_orders`: production runs and their lifecycle
//! - `sales`: sold products
//! - `expenses`: losses booked by the engine
//! - `stock_adjustments`: two-party manual corrections
//!
//! Quantities and money are stored as `*_minor` integers with six fractional
//! digits.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Units {
    Table,
    Id,
    Name,
    Symbol,
    CreatedAt,
}

#[derive(Iden)]
enum StockItems {
    Table,
    Id,
    Name,
    BaseUnitId,
    UnitCostMinor,
    CurrentQuantityMinor,
    Supplier,
    AllowExtraProduction,
    ExtraProductionLimitMinor,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UnitConversions {
    Table,
    StockItemId,
    UnitId,
    FactorMinor,
    IsBase,
}

#[derive(Iden)]
enum StockTransactions {
    Table,
    Id,
    StockItemId,
    Kind,
    QuantityMinor,
    DeltaMinor,
    UnitId,
    EnteredQuantityMinor,
    Reason,
    Note,
    OrderId,
    ProductId,
    SaleId,
    ExpenseId,
    AdjustmentId,
    Actor,
    CreatedAt,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    SellingPriceMinor,
    CurrentStockMinor,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProductTransactions {
    Table,
    Id,
    ProductId,
    Kind,
    QuantityMinor,
    DeltaMinor,
    Reason,
    Note,
    OrderId,
    SaleId,
    ExpenseId,
    Actor,
    CreatedAt,
}

#[derive(Iden)]
enum ProductRecipes {
    Table,
    ProductId,
    StockItemId,
    QuantityPerUnitMinor,
}

#[derive(Iden)]
enum ProductionOrders {
    Table,
    Id,
    ProductId,
    QuantityToProduceMinor,
    QuantityProducedMinor,
    Status,
    StatusReason,
    ProductionCostMinor,
    ExtraCostMinor,
    StartedAt,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Sales {
    Table,
    Id,
    ProductId,
    QuantityMinor,
    UnitPriceMinor,
    TotalAmountMinor,
    DamagedQuantityMinor,
    DamageReason,
    DamageExpenseId,
    CustomerName,
    Notes,
    SaleDate,
    CreatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    Category,
    Description,
    AmountMinor,
    Notes,
    ExpenseDate,
    OrderId,
    ProductId,
    SaleId,
    StockItemId,
    CreatedAt,
}

#[derive(Iden)]
enum StockAdjustments {
    Table,
    Id,
    StockItemId,
    RequestedBy,
    AdjustmentType,
    QuantityMinor,
    Reason,
    Status,
    ResolvedBy,
    ResolutionNotes,
    CreatedAt,
    ResolvedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Units
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Units::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Units::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Units::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Units::Symbol).string().not_null())
                    .col(
                        ColumnDef::new(Units::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Stock items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(StockItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StockItems::Name).string().not_null())
                    .col(ColumnDef::new(StockItems::BaseUnitId).string().not_null())
                    .col(
                        ColumnDef::new(StockItems::UnitCostMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockItems::CurrentQuantityMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockItems::Supplier).string())
                    .col(
                        ColumnDef::new(StockItems::AllowExtraProduction)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(StockItems::ExtraProductionLimitMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(StockItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-stock_items-base_unit_id")
                            .from(StockItems::Table, StockItems::BaseUnitId)
                            .to(Units::Table, Units::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Unit conversions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UnitConversions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UnitConversions::StockItemId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UnitConversions::UnitId).string().not_null())
                    .col(
                        ColumnDef::new(UnitConversions::FactorMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UnitConversions::IsBase)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(UnitConversions::StockItemId)
                            .col(UnitConversions::UnitId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-unit_conversions-stock_item_id")
                            .from(UnitConversions::Table, UnitConversions::StockItemId)
                            .to(StockItems::Table, StockItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-unit_conversions-unit_id")
                            .from(UnitConversions::Table, UnitConversions::UnitId)
                            .to(Units::Table, Units::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Stock ledger
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(StockTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StockTransactions::StockItemId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockTransactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(StockTransactions::QuantityMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockTransactions::DeltaMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockTransactions::UnitId).string())
                    .col(ColumnDef::new(StockTransactions::EnteredQuantityMinor).big_integer())
                    .col(ColumnDef::new(StockTransactions::Reason).string().not_null())
                    .col(ColumnDef::new(StockTransactions::Note).string())
                    .col(ColumnDef::new(StockTransactions::OrderId).string())
                    .col(ColumnDef::new(StockTransactions::ProductId).string())
                    .col(ColumnDef::new(StockTransactions::SaleId).string())
                    .col(ColumnDef::new(StockTransactions::ExpenseId).string())
                    .col(ColumnDef::new(StockTransactions::AdjustmentId).string())
                    .col(ColumnDef::new(StockTransactions::Actor).string())
                    .col(
                        ColumnDef::new(StockTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-stock_transactions-stock_item_id")
                            .from(StockTransactions::Table, StockTransactions::StockItemId)
                            .to(StockItems::Table, StockItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-stock_transactions-stock_item_id-created_at")
                    .table(StockTransactions::Table)
                    .col(StockTransactions::StockItemId)
                    .col(StockTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-stock_transactions-order_id-reason")
                    .table(StockTransactions::Table)
                    .col(StockTransactions::OrderId)
                    .col(StockTransactions::Reason)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Products
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(
                        ColumnDef::new(Products::SellingPriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::CurrentStockMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Product ledger
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ProductTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProductTransactions::ProductId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProductTransactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(ProductTransactions::QuantityMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductTransactions::DeltaMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductTransactions::Reason)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProductTransactions::Note).string())
                    .col(ColumnDef::new(ProductTransactions::OrderId).string())
                    .col(ColumnDef::new(ProductTransactions::SaleId).string())
                    .col(ColumnDef::new(ProductTransactions::ExpenseId).string())
                    .col(ColumnDef::new(ProductTransactions::Actor).string())
                    .col(
                        ColumnDef::new(ProductTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-product_transactions-product_id")
                            .from(ProductTransactions::Table, ProductTransactions::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-product_transactions-product_id-created_at")
                    .table(ProductTransactions::Table)
                    .col(ProductTransactions::ProductId)
                    .col(ProductTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Recipes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ProductRecipes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductRecipes::ProductId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductRecipes::StockItemId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductRecipes::QuantityPerUnitMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ProductRecipes::ProductId)
                            .col(ProductRecipes::StockItemId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-product_recipes-product_id")
                            .from(ProductRecipes::Table, ProductRecipes::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-product_recipes-stock_item_id")
                            .from(ProductRecipes::Table, ProductRecipes::StockItemId)
                            .to(StockItems::Table, StockItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Production orders
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ProductionOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductionOrders::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProductionOrders::ProductId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductionOrders::QuantityToProduceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductionOrders::QuantityProducedMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProductionOrders::Status).string().not_null())
                    .col(ColumnDef::new(ProductionOrders::StatusReason).string())
                    .col(
                        ColumnDef::new(ProductionOrders::ProductionCostMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductionOrders::ExtraCostMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ProductionOrders::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ProductionOrders::CompletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ProductionOrders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProductionOrders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-production_orders-product_id")
                            .from(ProductionOrders::Table, ProductionOrders::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-production_orders-status")
                    .table(ProductionOrders::Table)
                    .col(ProductionOrders::Status)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 9. Sales
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sales::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Sales::ProductId).string().not_null())
                    .col(ColumnDef::new(Sales::QuantityMinor).big_integer().not_null())
                    .col(ColumnDef::new(Sales::UnitPriceMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Sales::TotalAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sales::DamagedQuantityMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Sales::DamageReason).string())
                    .col(ColumnDef::new(Sales::DamageExpenseId).string())
                    .col(ColumnDef::new(Sales::CustomerName).string())
                    .col(ColumnDef::new(Sales::Notes).string())
                    .col(
                        ColumnDef::new(Sales::SaleDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sales::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sales-product_id")
                            .from(Sales::Table, Sales::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 10. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Expenses::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::Notes).string())
                    .col(
                        ColumnDef::new(Expenses::ExpenseDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::OrderId).string())
                    .col(ColumnDef::new(Expenses::ProductId).string())
                    .col(ColumnDef::new(Expenses::SaleId).string())
                    .col(ColumnDef::new(Expenses::StockItemId).string())
                    .col(
                        ColumnDef::new(Expenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-category-expense_date")
                    .table(Expenses::Table)
                    .col(Expenses::Category)
                    .col(Expenses::ExpenseDate)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 11. Stock adjustments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(StockAdjustments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockAdjustments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StockAdjustments::StockItemId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockAdjustments::RequestedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockAdjustments::AdjustmentType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockAdjustments::QuantityMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockAdjustments::Reason).string().not_null())
                    .col(ColumnDef::new(StockAdjustments::Status).string().not_null())
                    .col(ColumnDef::new(StockAdjustments::ResolvedBy).string())
                    .col(ColumnDef::new(StockAdjustments::ResolutionNotes).string())
                    .col(
                        ColumnDef::new(StockAdjustments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockAdjustments::ResolvedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-stock_adjustments-stock_item_id")
                            .from(StockAdjustments::Table, StockAdjustments::StockItemId)
                            .to(StockItems::Table, StockItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-stock_adjustments-status")
                    .table(StockAdjustments::Table)
                    .col(StockAdjustments::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(StockAdjustments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sales::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductionOrders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductRecipes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StockTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UnitConversions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StockItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Units::Table).to_owned())
            .await?;
        Ok(())
    }
}
