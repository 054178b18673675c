//! Service-layer collaborators around the allocation domain: repository,
//! use-case handlers and the message bus that dispatches what aggregates record.

pub mod handlers;
pub mod message_bus;
pub mod repository;

pub use handlers::{AllocationOutcome, HandlerError};
pub use message_bus::{DispatchError, MessageBus};
pub use repository::{InMemoryProductRepository, ProductRepository, RepositoryError};
