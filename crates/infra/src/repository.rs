//! Product repository abstraction (load/save whole aggregates by SKU).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use stockalloc_allocation::Product;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A product with this SKU is already stored.
    #[error("product already exists: {0}")]
    AlreadyExists(String),

    /// Internal lock poisoned by a panicking writer.
    #[error("repository lock poisoned")]
    Poisoned,
}

/// Loads and stores `Product` aggregates.
///
/// Implementations hand out fully-populated aggregates (all batches and their
/// allocations) with an empty message log.
pub trait ProductRepository: Send + Sync {
    fn get(&self, sku: &str) -> Result<Option<Product>, RepositoryError>;

    /// Find the product owning the batch with this reference.
    fn get_by_batch_ref(&self, reference: &str) -> Result<Option<Product>, RepositoryError>;

    /// Store a product that is not stored yet.
    fn add(&self, product: Product) -> Result<(), RepositoryError>;

    /// Store the current state of a product, replacing any previous state.
    fn save(&self, product: Product) -> Result<(), RepositoryError>;
}

impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository + ?Sized,
{
    fn get(&self, sku: &str) -> Result<Option<Product>, RepositoryError> {
        (**self).get(sku)
    }

    fn get_by_batch_ref(&self, reference: &str) -> Result<Option<Product>, RepositoryError> {
        (**self).get_by_batch_ref(reference)
    }

    fn add(&self, product: Product) -> Result<(), RepositoryError> {
        (**self).add(product)
    }

    fn save(&self, product: Product) -> Result<(), RepositoryError> {
        (**self).save(product)
    }
}

/// In-memory product repository.
///
/// Intended for tests/dev. Stores clones keyed by SKU; messages are dropped on
/// the way in since they are never part of stored state.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<String, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.products.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn get(&self, sku: &str) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(products.get(sku).cloned())
    }

    fn get_by_batch_ref(&self, reference: &str) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(products
            .values()
            .find(|p| p.batch(reference).is_some())
            .cloned())
    }

    fn add(&self, mut product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().map_err(|_| RepositoryError::Poisoned)?;
        if products.contains_key(product.sku()) {
            return Err(RepositoryError::AlreadyExists(product.sku().to_string()));
        }
        product.take_messages();
        products.insert(product.sku().to_string(), product);
        Ok(())
    }

    fn save(&self, mut product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().map_err(|_| RepositoryError::Poisoned)?;
        product.take_messages();
        products.insert(product.sku().to_string(), product);
        Ok(())
    }
}
