//! Module registry, mailboxes, and the inter-module pub/sub bus.
//!
//! This crate is the transport-free heart of the control plane: modules
//! register a mailbox, subscribe to each other's events, and exchange
//! messages by unicast send, multicast publish, or a synchronous
//! request/reply `query`.

pub mod bus;
pub mod error;
pub mod mailbox;
pub mod message;
pub mod registry;

pub use bus::Bus;
pub use error::BusError;
pub use mailbox::{Mailbox, WaitOutcome};
pub use message::{Message, MessageType, Payload};
pub use registry::{request_shutdown, shutdown_requested, ModuleDescriptor, ModuleRegistry};
