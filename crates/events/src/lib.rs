//! Messages exchanged between the allocation domain and its message bus.
//!
//! - [`Event`]: a fact the domain recorded (e.g. an allocation happened)
//! - [`Command`]: a request for the bus to run a use case (e.g. allocate a line)
//! - [`MessageEnvelope`]: delivery metadata wrapped around a payload
//! - [`EventBus`]: pub/sub mechanics, with an in-memory implementation

pub mod bus;
pub mod command;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use command::Command;
pub use envelope::MessageEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
