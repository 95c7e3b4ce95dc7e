//! Correlation metadata attached to ledger rows.
//!
//! Each ledger row records which business event caused it, so reporting can
//! reconstruct causality (which order consumed which flour, which sale
//! produced which damage expense). The fields map one-to-one onto nullable
//! columns of the ledger tables.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ResultEngine, util::parse_optional_uuid};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment_id: Option<Uuid>,
    /// User that caused the movement (e.g. the adjustment approver).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl LedgerMetadata {
    #[must_use]
    pub fn for_order(order_id: Uuid, product_id: Uuid) -> Self {
        Self {
            order_id: Some(order_id),
            product_id: Some(product_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_sale(sale_id: Uuid, product_id: Uuid) -> Self {
        Self {
            sale_id: Some(sale_id),
            product_id: Some(product_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_adjustment(adjustment_id: Uuid, actor: impl Into<String>) -> Self {
        Self {
            adjustment_id: Some(adjustment_id),
            actor: Some(actor.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn expense(mut self, expense_id: Uuid) -> Self {
        self.expense_id = Some(expense_id);
        self
    }

    pub(crate) fn columns(&self) -> MetadataColumns {
        MetadataColumns {
            order_id: self.order_id.map(|id| id.to_string()),
            product_id: self.product_id.map(|id| id.to_string()),
            sale_id: self.sale_id.map(|id| id.to_string()),
            expense_id: self.expense_id.map(|id| id.to_string()),
            adjustment_id: self.adjustment_id.map(|id| id.to_string()),
            actor: self.actor.clone(),
        }
    }

    pub(crate) fn from_columns(columns: MetadataColumns) -> ResultEngine<Self> {
        Ok(Self {
            order_id: parse_optional_uuid(columns.order_id.as_deref(), "order")?,
            product_id: parse_optional_uuid(columns.product_id.as_deref(), "product")?,
            sale_id: parse_optional_uuid(columns.sale_id.as_deref(), "sale")?,
            expense_id: parse_optional_uuid(columns.expense_id.as_deref(), "expense")?,
            adjustment_id: parse_optional_uuid(columns.adjustment_id.as_deref(), "adjustment")?,
            actor: columns.actor,
        })
    }
}

/// Storage shape of [`LedgerMetadata`].
pub(crate) struct MetadataColumns {
    pub order_id: Option<String>,
    pub product_id: Option<String>,
    pub sale_id: Option<String>,
    pub expense_id: Option<String>,
    pub adjustment_id: Option<String>,
    pub actor: Option<String>,
}
