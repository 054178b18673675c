//! Messages recorded by the `Product` aggregate.
//!
//! Pure data: the aggregate appends them, the message bus dispatches them.

use serde::{Deserialize, Serialize};

use stockalloc_events::{Command, Event};

use crate::order_line::OrderLine;

/// Event: an order line was reserved against a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocated {
    pub order_id: String,
    pub sku: String,
    pub qty: u32,
    pub batch_ref: String,
}

/// Event: no batch could take an order line for this SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfStock {
    pub sku: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AllocationEvent {
    Allocated(Allocated),
    OutOfStock(OutOfStock),
}

impl Event for AllocationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AllocationEvent::Allocated(_) => "allocation.allocated",
            AllocationEvent::OutOfStock(_) => "allocation.out_of_stock",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

impl AllocationEvent {
    pub fn sku(&self) -> &str {
        match self {
            AllocationEvent::Allocated(e) => &e.sku,
            AllocationEvent::OutOfStock(e) => &e.sku,
        }
    }
}

/// Command: allocate an order line (re-issued for lines knocked off a batch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocate {
    pub order_id: String,
    pub sku: String,
    pub qty: u32,
}

impl Allocate {
    pub fn order_line(&self) -> OrderLine {
        OrderLine::new(self.order_id.clone(), self.sku.clone(), self.qty)
    }
}

impl From<OrderLine> for Allocate {
    fn from(line: OrderLine) -> Self {
        Self {
            order_id: line.order_id().to_string(),
            sku: line.sku().to_string(),
            qty: line.qty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AllocationCommand {
    Allocate(Allocate),
}

impl Command for AllocationCommand {
    fn target_sku(&self) -> &str {
        match self {
            AllocationCommand::Allocate(cmd) => &cmd.sku,
        }
    }
}

/// Anything the aggregate records in its message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    Event(AllocationEvent),
    Command(AllocationCommand),
}

impl Message {
    pub fn allocated(line: &OrderLine, batch_ref: impl Into<String>) -> Self {
        Message::Event(AllocationEvent::Allocated(Allocated {
            order_id: line.order_id().to_string(),
            sku: line.sku().to_string(),
            qty: line.qty(),
            batch_ref: batch_ref.into(),
        }))
    }

    pub fn out_of_stock(sku: impl Into<String>) -> Self {
        Message::Event(AllocationEvent::OutOfStock(OutOfStock { sku: sku.into() }))
    }

    pub fn allocate(line: OrderLine) -> Self {
        Message::Command(AllocationCommand::Allocate(Allocate::from(line)))
    }
}

impl From<AllocationEvent> for Message {
    fn from(event: AllocationEvent) -> Self {
        Message::Event(event)
    }
}

impl From<AllocationCommand> for Message {
    fn from(command: AllocationCommand) -> Self {
        Message::Command(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_are_stable() {
        let line = OrderLine::new("o1", "LAMP", 1);
        let Message::Event(allocated) = Message::allocated(&line, "b1") else {
            panic!("Expected an event");
        };
        let Message::Event(out_of_stock) = Message::out_of_stock("LAMP") else {
            panic!("Expected an event");
        };

        assert_eq!(allocated.event_type(), "allocation.allocated");
        assert_eq!(out_of_stock.event_type(), "allocation.out_of_stock");
        assert_eq!(allocated.version(), 1);
        assert_eq!(allocated.sku(), "LAMP");
    }

    #[test]
    fn allocate_command_carries_the_order_line() {
        let line = OrderLine::new("o1", "LAMP", 4);

        let Message::Command(cmd) = Message::allocate(line.clone()) else {
            panic!("Expected a command");
        };

        assert_eq!(cmd.target_sku(), "LAMP");
        match cmd {
            AllocationCommand::Allocate(allocate) => assert_eq!(allocate.order_line(), line),
        }
    }

    #[test]
    fn json_shape_is_tagged_by_kind_and_type() {
        let json = serde_json::to_value(Message::out_of_stock("LAMP")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "kind": "event", "type": "OutOfStock", "sku": "LAMP" })
        );

        let line = OrderLine::new("o1", "LAMP", 2);
        let json = serde_json::to_value(Message::allocate(line)).unwrap();
        assert_eq!(json["kind"], "command");
        assert_eq!(json["type"], "Allocate");
        assert_eq!(json["qty"], 2);
    }

    #[test]
    fn json_reads_back_into_the_same_message() {
        let original = Message::allocated(&OrderLine::new("o1", "LAMP", 2), "b1");
        let text = serde_json::to_string(&original).unwrap();

        let parsed: Message = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed, original);
    }
}
