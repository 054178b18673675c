//! Use-case handlers.
//!
//! Each handler loads one product aggregate, invokes exactly one mutating
//! method on it, saves it and hands back the messages it recorded. No handler
//! retries or checks versions; that belongs to the persistence layer.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, instrument};

use stockalloc_allocation::{Batch, Message, OrderLine, Product};
use stockalloc_core::DomainError;

use crate::repository::{ProductRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Publication failed after the aggregate was saved.
    #[error("publish failed: {0}")]
    Publish(String),
}

/// Result of the allocate use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationOutcome {
    /// Chosen batch, or `None` when the product is out of stock.
    pub batch_ref: Option<String>,
    pub messages: Vec<Message>,
}

/// Register a newly purchased batch, creating the product on its first batch.
#[instrument(skip(repo))]
pub fn add_batch<R>(
    repo: &R,
    reference: &str,
    sku: &str,
    qty: u32,
    eta: Option<NaiveDate>,
) -> Result<(), HandlerError>
where
    R: ProductRepository + ?Sized,
{
    let batch = Batch::new(reference, sku, qty, eta);

    match repo.get(sku)? {
        Some(mut product) => {
            product.add_batch(batch)?;
            repo.save(product)?;
        }
        None => {
            debug!(sku, "creating product for first batch");
            repo.add(Product::new(sku, vec![batch])?)?;
        }
    }

    info!(reference, sku, qty, "batch added");
    Ok(())
}

/// Allocate an order line against its product.
///
/// Out of stock is a normal outcome (`batch_ref == None` plus an `OutOfStock`
/// event); an unknown SKU is an error.
#[instrument(
    skip(repo, line),
    fields(order_id = line.order_id(), sku = line.sku(), qty = line.qty())
)]
pub fn allocate<R>(repo: &R, line: OrderLine) -> Result<AllocationOutcome, HandlerError>
where
    R: ProductRepository + ?Sized,
{
    let sku = line.sku().to_string();
    let mut product = repo
        .get(&sku)?
        .ok_or_else(|| DomainError::product_not_found(&sku))?;

    let batch_ref = product.allocate(line);
    let messages = product.take_messages();
    repo.save(product)?;

    match &batch_ref {
        Some(batch_ref) => info!(batch_ref = %batch_ref, "order line allocated"),
        None => info!("out of stock"),
    }

    Ok(AllocationOutcome {
        batch_ref,
        messages,
    })
}

/// Change a batch's purchased quantity; lines that no longer fit come back as
/// `Allocate` commands.
#[instrument(skip(repo))]
pub fn change_batch_quantity<R>(
    repo: &R,
    reference: &str,
    qty: u32,
) -> Result<Vec<Message>, HandlerError>
where
    R: ProductRepository + ?Sized,
{
    let mut product = repo
        .get_by_batch_ref(reference)?
        .ok_or_else(|| DomainError::batch_not_found(reference))?;

    product.change_batch_quantity(reference, qty)?;
    let messages = product.take_messages();
    repo.save(product)?;

    if !messages.is_empty() {
        info!(released = messages.len(), "batch quantity cut below allocations");
    }

    Ok(messages)
}
