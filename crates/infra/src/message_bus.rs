//! Message dispatch for the allocation service layer.
//!
//! Aggregates only record messages; this module gives them effect:
//!
//! ```text
//! Message
//!   ↓
//! queue (FIFO)
//!   ├─ Command(Allocate) → handlers::allocate → new messages back on the queue
//!   └─ Event(..)         → wrapped in a MessageEnvelope → EventBus::publish
//! ```
//!
//! Lines released by `change_batch_quantity` come back as `Allocate` commands
//! and are placed on another batch (or reported out of stock) before the call
//! returns.
//!
//! A failure stops the queue. Whatever was already saved stays saved, and the
//! messages not yet delivered travel back in the `DispatchError`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use stockalloc_allocation::{AllocationCommand, AllocationEvent, Message, OrderLine};
use stockalloc_events::{Command, Event, EventBus, MessageEnvelope};

use crate::handlers::{self, HandlerError};
use crate::repository::ProductRepository;

/// A dispatch stopped partway through its queue.
#[derive(Debug, Error)]
#[error("{source} ({} message(s) undelivered)", .undelivered.len())]
pub struct DispatchError {
    pub source: HandlerError,
    /// The message that failed followed by everything still queued behind it.
    pub undelivered: Vec<Message>,
}

impl From<HandlerError> for DispatchError {
    fn from(source: HandlerError) -> Self {
        Self {
            source,
            undelivered: Vec::new(),
        }
    }
}

/// Dispatches product messages until none are left.
#[derive(Debug)]
pub struct MessageBus<R, B> {
    repo: R,
    events: B,
    sequence: AtomicU64,
}

impl<R, B> MessageBus<R, B> {
    pub fn new(repo: R, events: B) -> Self {
        Self {
            repo,
            events,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn event_bus(&self) -> &B {
        &self.events
    }

    /// Number of events published so far.
    pub fn published(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn into_parts(self) -> (R, B) {
        (self.repo, self.events)
    }
}

impl<R, B> MessageBus<R, B>
where
    R: ProductRepository,
    B: EventBus<MessageEnvelope<AllocationEvent>>,
{
    /// Dispatch `message` and everything it causes.
    ///
    /// Returns the result of every `Allocate` command handled, in order.
    pub fn handle(&self, message: Message) -> Result<Vec<Option<String>>, DispatchError> {
        self.drain(VecDeque::from([message]))
    }

    /// Allocate an order line and dispatch the resulting events.
    pub fn allocate(&self, line: OrderLine) -> Result<Option<String>, DispatchError> {
        let results = self.handle(Message::allocate(line))?;
        Ok(results.into_iter().next().flatten())
    }

    /// Change a batch's purchased quantity and re-allocate every released line.
    ///
    /// Returns the re-allocation results, one per released line.
    pub fn change_batch_quantity(
        &self,
        reference: &str,
        qty: u32,
    ) -> Result<Vec<Option<String>>, DispatchError> {
        let messages = handlers::change_batch_quantity(&self.repo, reference, qty)?;
        self.drain(messages.into())
    }

    fn drain(&self, mut queue: VecDeque<Message>) -> Result<Vec<Option<String>>, DispatchError> {
        let mut results = Vec::new();

        while let Some(message) = queue.pop_front() {
            if let Err(source) = self.dispatch(&message, &mut queue, &mut results) {
                let mut undelivered = vec![message];
                undelivered.extend(queue);
                warn!(error = %source, undelivered = undelivered.len(), "dispatch stopped");
                return Err(DispatchError {
                    source,
                    undelivered,
                });
            }
        }

        Ok(results)
    }

    fn dispatch(
        &self,
        message: &Message,
        queue: &mut VecDeque<Message>,
        results: &mut Vec<Option<String>>,
    ) -> Result<(), HandlerError> {
        match message {
            Message::Event(event) => self.publish(event.clone()),
            Message::Command(command) => {
                debug!(sku = command.target_sku(), "dispatching command");
                let outcome = match command {
                    AllocationCommand::Allocate(cmd) => {
                        handlers::allocate(&self.repo, cmd.order_line())?
                    }
                };
                results.push(outcome.batch_ref);
                queue.extend(outcome.messages);
                Ok(())
            }
        }
    }

    fn publish(&self, event: AllocationEvent) -> Result<(), HandlerError> {
        let sequence_number = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let event_type = event.event_type();
        let envelope = MessageEnvelope::new(
            Uuid::now_v7(),
            event.sku().to_string(),
            sequence_number,
            event,
        );

        self.events.publish(envelope).map_err(|e| {
            warn!(event_type, error = ?e, "event publish failed");
            HandlerError::Publish(format!("{e:?}"))
        })?;

        debug!(event_type, sequence_number, "event published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryProductRepository, RepositoryError};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use stockalloc_allocation::Product;
    use stockalloc_events::InMemoryEventBus;

    type Events = InMemoryEventBus<MessageEnvelope<AllocationEvent>>;
    type Bus = MessageBus<InMemoryProductRepository, Events>;

    fn bus() -> Bus {
        MessageBus::new(InMemoryProductRepository::new(), InMemoryEventBus::new())
    }

    #[test]
    fn allocate_publishes_the_allocated_event() {
        let bus = bus();
        let subscription = bus.event_bus().subscribe();
        handlers::add_batch(bus.repository(), "b1", "LAMP", 10, None).unwrap();

        let batch_ref = bus.allocate(OrderLine::new("o1", "LAMP", 3)).unwrap();

        assert_eq!(batch_ref.as_deref(), Some("b1"));
        let published = subscription.drain();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].aggregate_id(), "LAMP");
        assert_eq!(published[0].sequence_number(), 1);
        assert_eq!(published[0].payload().event_type(), "allocation.allocated");
    }

    #[test]
    fn out_of_stock_is_published_and_returns_none() {
        let bus = bus();
        let subscription = bus.event_bus().subscribe();
        handlers::add_batch(bus.repository(), "b1", "LAMP", 1, None).unwrap();

        let batch_ref = bus.allocate(OrderLine::new("o1", "LAMP", 3)).unwrap();

        assert_eq!(batch_ref, None);
        let published = subscription.drain();
        assert_eq!(published.len(), 1);
        assert!(matches!(published[0].payload(), AllocationEvent::OutOfStock(_)));
    }

    #[test]
    fn released_lines_are_reallocated_to_another_batch() {
        let bus = bus();
        let subscription = bus.event_bus().subscribe();
        handlers::add_batch(bus.repository(), "in-stock", "SOFA", 50, None).unwrap();
        handlers::add_batch(
            bus.repository(),
            "shipment",
            "SOFA",
            50,
            NaiveDate::from_ymd_opt(2022, 1, 7),
        )
        .unwrap();
        bus.allocate(OrderLine::new("o1", "SOFA", 20)).unwrap();
        bus.allocate(OrderLine::new("o2", "SOFA", 20)).unwrap();
        subscription.drain();

        let results = bus.change_batch_quantity("in-stock", 25).unwrap();

        assert_eq!(results, vec![Some("shipment".to_string())]);
        let product = bus.repository().get("SOFA").unwrap().unwrap();
        assert_eq!(product.batch("in-stock").unwrap().available_quantity(), 5);
        assert_eq!(product.batch("shipment").unwrap().available_quantity(), 30);
        assert_eq!(product.version_number(), 3);

        let published = subscription.drain();
        assert_eq!(published.len(), 1);
        match published[0].payload() {
            AllocationEvent::Allocated(e) => assert_eq!(e.batch_ref, "shipment"),
            other => panic!("Expected Allocated event, got {other:?}"),
        }
    }

    #[test]
    fn unknown_batch_reference_aborts_without_publishing() {
        let bus = bus();
        let subscription = bus.event_bus().subscribe();

        let err = bus.change_batch_quantity("missing", 0).unwrap_err();

        assert!(matches!(
            err.source,
            HandlerError::Domain(stockalloc_core::DomainError::BatchNotFound(_))
        ));
        assert!(err.undelivered.is_empty());
        assert!(subscription.drain().is_empty());
        assert_eq!(bus.published(), 0);
    }

    /// Lets `allowed` saves through, then fails every save after that.
    struct SaveLimit {
        inner: InMemoryProductRepository,
        allowed: AtomicUsize,
    }

    impl ProductRepository for SaveLimit {
        fn get(&self, sku: &str) -> Result<Option<Product>, RepositoryError> {
            self.inner.get(sku)
        }

        fn get_by_batch_ref(&self, reference: &str) -> Result<Option<Product>, RepositoryError> {
            self.inner.get_by_batch_ref(reference)
        }

        fn add(&self, product: Product) -> Result<(), RepositoryError> {
            self.inner.add(product)
        }

        fn save(&self, product: Product) -> Result<(), RepositoryError> {
            let left = self.allowed.load(AtomicOrdering::SeqCst);
            if left == 0 {
                return Err(RepositoryError::Poisoned);
            }
            self.allowed.store(left - 1, AtomicOrdering::SeqCst);
            self.inner.save(product)
        }
    }

    #[test]
    fn failed_reallocation_returns_the_lines_still_queued() {
        let inner = InMemoryProductRepository::new();
        handlers::add_batch(&inner, "b1", "TABLE", 50, None).unwrap();
        handlers::allocate(&inner, OrderLine::new("o1", "TABLE", 20)).unwrap();
        handlers::allocate(&inner, OrderLine::new("o2", "TABLE", 20)).unwrap();
        let repo = SaveLimit {
            inner,
            allowed: AtomicUsize::new(1),
        };
        let bus = MessageBus::new(repo, Events::new());

        let err = bus.change_batch_quantity("b1", 0).unwrap_err();

        assert!(matches!(err.source, HandlerError::Repository(RepositoryError::Poisoned)));
        assert_eq!(
            err.undelivered,
            vec![
                Message::allocate(OrderLine::new("o2", "TABLE", 20)),
                Message::allocate(OrderLine::new("o1", "TABLE", 20)),
            ]
        );
        let product = bus.repository().get("TABLE").unwrap().unwrap();
        assert_eq!(product.batch("b1").unwrap().purchased_quantity(), 0);
        assert!(product.batch("b1").unwrap().allocations().is_empty());
    }

    #[test]
    fn undelivered_messages_can_be_handed_back_to_the_bus() {
        let bus = bus();
        handlers::add_batch(bus.repository(), "b1", "TABLE", 5, None).unwrap();
        let undelivered = vec![Message::allocate(OrderLine::new("o1", "TABLE", 5))];

        let mut results = Vec::new();
        for message in undelivered {
            results.extend(bus.handle(message).unwrap());
        }

        assert_eq!(results, vec![Some("b1".to_string())]);
    }
}
