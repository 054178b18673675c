//! Stock allocation domain module.
//!
//! This crate contains the business rules for reserving order lines against
//! batches of purchased stock, implemented purely as deterministic domain logic
//! (no IO, no storage). `Product` is the aggregate root; every mutation goes
//! through it and every outcome is recorded in its message log.

pub mod batch;
pub mod messages;
pub mod order_line;
pub mod product;

pub use batch::Batch;
pub use messages::{AllocationCommand, AllocationEvent, Message};
pub use order_line::OrderLine;
pub use product::Product;
