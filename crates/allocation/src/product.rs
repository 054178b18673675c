use stockalloc_core::{AggregateRoot, DomainError, DomainResult};

use crate::batch::Batch;
use crate::messages::Message;
use crate::order_line::OrderLine;

/// Aggregate root: Product.
///
/// Owns every batch of one SKU. All allocation decisions go through here, and
/// their outcomes are appended to `messages` for the message bus to dispatch.
#[derive(Debug, Clone)]
pub struct Product {
    sku: String,
    version_number: u64,
    batches: Vec<Batch>,
    /// Transient: never persisted, drained by the caller after each use case.
    messages: Vec<Message>,
}

impl Product {
    /// Create a product at version 0.
    ///
    /// Fails if any batch belongs to a different SKU or repeats a reference.
    pub fn new(sku: impl Into<String>, batches: Vec<Batch>) -> DomainResult<Self> {
        Self::with_version(sku, 0, batches)
    }

    /// Rehydrate a loaded product at a known version.
    ///
    /// Fails on a foreign SKU or when two batches share a reference.
    pub fn with_version(
        sku: impl Into<String>,
        version_number: u64,
        batches: Vec<Batch>,
    ) -> DomainResult<Self> {
        let sku = sku.into();
        if let Some(foreign) = batches.iter().find(|b| b.sku() != sku) {
            return Err(DomainError::invariant(format!(
                "batch {} has sku {}, expected {sku}",
                foreign.reference(),
                foreign.sku()
            )));
        }
        for (i, batch) in batches.iter().enumerate() {
            if batches[..i].iter().any(|earlier| earlier == batch) {
                return Err(DomainError::conflict(format!(
                    "batch {} already exists",
                    batch.reference()
                )));
            }
        }
        Ok(Self {
            sku,
            version_number,
            batches,
            messages: Vec::new(),
        })
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn version_number(&self) -> u64 {
        self.version_number
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn batch(&self, reference: &str) -> Option<&Batch> {
        self.batches.iter().find(|b| b.reference() == reference)
    }

    /// Total stock still free across all batches.
    pub fn available_quantity(&self) -> i64 {
        self.batches.iter().map(Batch::available_quantity).sum()
    }

    /// Messages recorded since construction or the last `take_messages`.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Drain the message log in the order messages were recorded.
    pub fn take_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    /// Add a newly purchased batch.
    pub fn add_batch(&mut self, batch: Batch) -> DomainResult<()> {
        if batch.sku() != self.sku {
            return Err(DomainError::invariant(format!(
                "batch {} has sku {}, expected {}",
                batch.reference(),
                batch.sku(),
                self.sku
            )));
        }
        if self.batch(batch.reference()).is_some() {
            return Err(DomainError::conflict(format!(
                "batch {} already exists",
                batch.reference()
            )));
        }
        self.batches.push(batch);
        Ok(())
    }

    /// Reserve `line` against the best batch that can take it.
    ///
    /// Warehouse stock wins over shipments, and earlier shipments over later
    /// ones. Returns the chosen batch reference, or `None` after recording
    /// `OutOfStock` when nothing fits.
    pub fn allocate(&mut self, line: OrderLine) -> Option<String> {
        let mut order: Vec<usize> = (0..self.batches.len()).collect();
        // Stable: batches with equal eta keep their insertion order.
        order.sort_by(|&a, &b| Batch::allocation_order(&self.batches[a], &self.batches[b]));

        let Some(idx) = order.into_iter().find(|&i| self.batches[i].can_allocate(&line)) else {
            self.messages.push(Message::out_of_stock(line.sku()));
            return None;
        };

        let batch = &mut self.batches[idx];
        let batch_ref = batch.reference().to_string();
        self.messages.push(Message::allocated(&line, batch_ref.clone()));
        batch.allocate(line);
        self.version_number += 1;

        Some(batch_ref)
    }

    /// Set a batch's purchased quantity, releasing allocations until it is no
    /// longer over-allocated.
    ///
    /// Each released line is recorded as an `Allocate` command so the message
    /// bus can place it elsewhere. Does not change `version_number`.
    pub fn change_batch_quantity(&mut self, reference: &str, qty: u32) -> DomainResult<()> {
        let batch = self
            .batches
            .iter_mut()
            .find(|b| b.reference() == reference)
            .ok_or_else(|| DomainError::batch_not_found(reference))?;

        batch.set_purchased_quantity(qty);

        while batch.available_quantity() < 0 {
            let Some(line) = batch.deallocate_one() else {
                break;
            };
            self.messages.push(Message::allocate(line));
        }

        Ok(())
    }
}

impl AggregateRoot for Product {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.sku
    }

    fn version(&self) -> u64 {
        self.version_number
    }
}
