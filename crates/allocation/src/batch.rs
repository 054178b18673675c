use core::cmp::Ordering;

use chrono::NaiveDate;

use stockalloc_core::Entity;

use crate::order_line::OrderLine;

/// A purchased lot of one SKU, either in the warehouse (`eta == None`) or on
/// its way (`eta == Some(arrival)`).
///
/// Identity is the `reference`: two batches are equal iff their references are,
/// regardless of quantities or allocations.
#[derive(Debug, Clone)]
pub struct Batch {
    reference: String,
    sku: String,
    purchased_quantity: u32,
    eta: Option<NaiveDate>,
    allocations: Vec<OrderLine>,
}

impl Batch {
    pub fn new(
        reference: impl Into<String>,
        sku: impl Into<String>,
        purchased_quantity: u32,
        eta: Option<NaiveDate>,
    ) -> Self {
        Self {
            reference: reference.into(),
            sku: sku.into(),
            purchased_quantity,
            eta,
            allocations: Vec::new(),
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn purchased_quantity(&self) -> u32 {
        self.purchased_quantity
    }

    pub fn eta(&self) -> Option<NaiveDate> {
        self.eta
    }

    /// Lines currently reserved against this batch, oldest first.
    pub fn allocations(&self) -> &[OrderLine] {
        &self.allocations
    }

    pub fn is_allocated(&self, line: &OrderLine) -> bool {
        self.allocations.contains(line)
    }

    pub fn allocated_quantity(&self) -> u64 {
        self.allocations.iter().map(|line| u64::from(line.qty())).sum()
    }

    /// Purchased minus allocated. Negative after the purchased quantity has been
    /// cut below what is already allocated.
    pub fn available_quantity(&self) -> i64 {
        i64::from(self.purchased_quantity) - self.allocated_quantity() as i64
    }

    pub fn can_allocate(&self, line: &OrderLine) -> bool {
        self.sku == line.sku() && self.available_quantity() >= i64::from(line.qty())
    }

    /// Reserve `line` against this batch.
    ///
    /// No-op when the line does not fit or is already allocated here.
    pub fn allocate(&mut self, line: OrderLine) {
        if !self.can_allocate(&line) || self.is_allocated(&line) {
            return;
        }
        self.allocations.push(line);
    }

    /// Release `line`. No-op when it is not allocated here.
    pub fn deallocate(&mut self, line: &OrderLine) {
        self.allocations.retain(|allocated| allocated != line);
    }

    /// Release one allocated line and return it, or `None` if nothing is
    /// allocated.
    ///
    /// Which line is released is unspecified; callers may only rely on exactly
    /// one line leaving the batch.
    pub fn deallocate_one(&mut self) -> Option<OrderLine> {
        self.allocations.pop()
    }

    pub(crate) fn set_purchased_quantity(&mut self, qty: u32) {
        self.purchased_quantity = qty;
    }

    /// Allocation priority: warehouse stock first, then shipments by earliest
    /// eta.
    pub fn allocation_order(a: &Batch, b: &Batch) -> Ordering {
        match (a.eta, b.eta) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.cmp(&y),
        }
    }
}

impl Entity for Batch {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.reference
    }
}

impl PartialEq for Batch {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other)
    }
}

impl Eq for Batch {}

impl core::hash::Hash for Batch {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
    }
}
