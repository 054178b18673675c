use serde::{Deserialize, Serialize};

use stockalloc_core::ValueObject;

/// A request to ship `qty` units of `sku` for `order_id`.
///
/// Immutable once constructed; two lines are equal when all three fields are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderLine {
    order_id: String,
    sku: String,
    qty: u32,
}

impl OrderLine {
    pub fn new(order_id: impl Into<String>, sku: impl Into<String>, qty: u32) -> Self {
        Self {
            order_id: order_id.into(),
            sku: sku.into(),
            qty,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn qty(&self) -> u32 {
        self.qty
    }
}

impl ValueObject for OrderLine {}
