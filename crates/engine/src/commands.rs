//! Command structs for engine operations.
//!
//! These types group parameters for write operations (stock entries,
//! production updates, sales, adjustments), keeping call sites readable and
//! avoiding long argument lists.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{AdjustmentAction, AdjustmentType, ProductionStatus};

/// Create a stock item together with its base unit conversion.
#[derive(Clone, Debug)]
pub struct NewStockItemCmd {
    pub name: String,
    pub base_unit_id: Uuid,
    pub unit_cost: Decimal,
    pub initial_quantity: Decimal,
    pub supplier: Option<String>,
    pub allow_extra_production: bool,
    pub extra_production_limit: Decimal,
}

impl NewStockItemCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, base_unit_id: Uuid, unit_cost: Decimal) -> Self {
        Self {
            name: name.into(),
            base_unit_id,
            unit_cost,
            initial_quantity: Decimal::ZERO,
            supplier: None,
            allow_extra_production: false,
            extra_production_limit: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn initial_quantity(mut self, quantity: Decimal) -> Self {
        self.initial_quantity = quantity;
        self
    }

    #[must_use]
    pub fn supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    /// Allow extra usage in production, capped per order (`0` = unlimited).
    #[must_use]
    pub fn allow_extra(mut self, limit: Decimal) -> Self {
        self.allow_extra_production = true;
        self.extra_production_limit = limit;
        self
    }
}

/// Change the non-balance fields of a stock item. `None` keeps the value.
#[derive(Clone, Debug, Default)]
pub struct StockItemSettingsCmd {
    pub unit_cost: Option<Decimal>,
    /// `Some("")` clears the supplier.
    pub supplier: Option<String>,
    pub allow_extra_production: Option<bool>,
    pub extra_production_limit: Option<Decimal>,
}

impl StockItemSettingsCmd {
    #[must_use]
    pub fn unit_cost(mut self, unit_cost: Decimal) -> Self {
        self.unit_cost = Some(unit_cost);
        self
    }

    #[must_use]
    pub fn supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    #[must_use]
    pub fn allow_extra_production(mut self, allow: bool) -> Self {
        self.allow_extra_production = Some(allow);
        self
    }

    #[must_use]
    pub fn extra_production_limit(mut self, limit: Decimal) -> Self {
        self.extra_production_limit = Some(limit);
        self
    }
}

/// A quantity entered against one stock item, optionally in a non-base unit.
#[derive(Clone, Debug)]
pub struct StockEntryCmd {
    pub stock_item_id: Uuid,
    pub quantity: Decimal,
    pub unit_id: Option<Uuid>,
    pub note: Option<String>,
}

impl StockEntryCmd {
    #[must_use]
    pub fn new(stock_item_id: Uuid, quantity: Decimal) -> Self {
        Self {
            stock_item_id,
            quantity,
            unit_id: None,
            note: None,
        }
    }

    #[must_use]
    pub fn unit(mut self, unit_id: Uuid) -> Self {
        self.unit_id = Some(unit_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Off-recipe ingredient usage reported with a production update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtraIngredient {
    pub stock_item_id: Uuid,
    pub quantity: Decimal,
    pub unit_id: Option<Uuid>,
}

impl ExtraIngredient {
    #[must_use]
    pub fn new(stock_item_id: Uuid, quantity: Decimal) -> Self {
        Self {
            stock_item_id,
            quantity,
            unit_id: None,
        }
    }

    #[must_use]
    pub fn unit(mut self, unit_id: Uuid) -> Self {
        self.unit_id = Some(unit_id);
        self
    }
}

/// Patch applied to a production order. Every field is optional.
#[derive(Clone, Debug)]
pub struct UpdateProductionOrderCmd {
    pub order_id: Uuid,
    pub quantity_produced: Option<Decimal>,
    pub status: Option<ProductionStatus>,
    pub reason: Option<String>,
    /// Stamp `started_at` without changing the status.
    pub start: bool,
    pub extras: Vec<ExtraIngredient>,
}

impl UpdateProductionOrderCmd {
    #[must_use]
    pub fn new(order_id: Uuid) -> Self {
        Self {
            order_id,
            quantity_produced: None,
            status: None,
            reason: None,
            start: false,
            extras: Vec::new(),
        }
    }

    #[must_use]
    pub fn quantity_produced(mut self, quantity: Decimal) -> Self {
        self.quantity_produced = Some(quantity);
        self
    }

    #[must_use]
    pub fn status(mut self, status: ProductionStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn start(mut self) -> Self {
        self.start = true;
        self
    }

    #[must_use]
    pub fn extra(mut self, extra: ExtraIngredient) -> Self {
        self.extras.push(extra);
        self
    }
}

/// Record a sale, optionally with damaged units.
#[derive(Clone, Debug)]
pub struct SaleCmd {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub damaged_quantity: Decimal,
    pub damage_reason: Option<String>,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub sale_date: DateTime<Utc>,
}

impl SaleCmd {
    #[must_use]
    pub fn new(
        product_id: Uuid,
        quantity: Decimal,
        unit_price: Decimal,
        sale_date: DateTime<Utc>,
    ) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
            damaged_quantity: Decimal::ZERO,
            damage_reason: None,
            customer_name: None,
            notes: None,
            sale_date,
        }
    }

    #[must_use]
    pub fn damaged(mut self, quantity: Decimal, reason: impl Into<String>) -> Self {
        self.damaged_quantity = quantity;
        self.damage_reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Ask for a manual stock correction.
#[derive(Clone, Debug)]
pub struct AdjustmentRequestCmd {
    pub stock_item_id: Uuid,
    pub adjustment_type: AdjustmentType,
    pub quantity: Decimal,
    pub reason: String,
    pub requested_by: String,
}

impl AdjustmentRequestCmd {
    #[must_use]
    pub fn new(
        stock_item_id: Uuid,
        adjustment_type: AdjustmentType,
        quantity: Decimal,
        reason: impl Into<String>,
        requested_by: impl Into<String>,
    ) -> Self {
        Self {
            stock_item_id,
            adjustment_type,
            quantity,
            reason: reason.into(),
            requested_by: requested_by.into(),
        }
    }
}

/// Approve or reject a pending adjustment.
#[derive(Clone, Debug)]
pub struct ResolveAdjustmentCmd {
    pub adjustment_id: Uuid,
    pub action: AdjustmentAction,
    pub resolved_by: String,
    pub notes: Option<String>,
}

impl ResolveAdjustmentCmd {
    #[must_use]
    pub fn approve(adjustment_id: Uuid, resolved_by: impl Into<String>) -> Self {
        Self {
            adjustment_id,
            action: AdjustmentAction::Approve,
            resolved_by: resolved_by.into(),
            notes: None,
        }
    }

    #[must_use]
    pub fn reject(adjustment_id: Uuid, resolved_by: impl Into<String>) -> Self {
        Self {
            adjustment_id,
            action: AdjustmentAction::Reject,
            resolved_by: resolved_by.into(),
            notes: None,
        }
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
