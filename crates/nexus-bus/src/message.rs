/// Message envelope exchanged over the pub/sub bus.
///
/// Corresponds to `struct nn_message` (`include/nn_message_queue.h`), whose
/// C form carries a function-pointer free-hook for heterogeneous payload
/// ownership. Here that's a typed sum (`Payload`) instead.
use std::fmt;

/// Discriminates the protocol carried in a message.
///
/// The wire-level value is a raw `u32`; well-known discriminants are named,
/// anything else round-trips through `Custom` so modules can use the bus
/// for their own unicast/multicast events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// A CLI command dispatched to a module.
    Cli,
    /// An opaque reply body rendered to the client as-is.
    CliResp,
    /// A reply that changes the caller's view; payload's first TLV element
    /// is a string carrying the new prompt template.
    CliViewChg,
    /// Fetch the next page of a previously batched response.
    CliContinue,
    /// Any other module-defined event.
    Custom(u32),
}

const CLI: u32 = 1;
const CLI_RESP: u32 = 2;
const CLI_VIEW_CHG: u32 = 3;
const CLI_CONTINUE: u32 = 4;

impl From<u32> for MessageType {
    fn from(v: u32) -> Self {
        match v {
            CLI => MessageType::Cli,
            CLI_RESP => MessageType::CliResp,
            CLI_VIEW_CHG => MessageType::CliViewChg,
            CLI_CONTINUE => MessageType::CliContinue,
            other => MessageType::Custom(other),
        }
    }
}

impl From<MessageType> for u32 {
    fn from(t: MessageType) -> u32 {
        match t {
            MessageType::Cli => CLI,
            MessageType::CliResp => CLI_RESP,
            MessageType::CliViewChg => CLI_VIEW_CHG,
            MessageType::CliContinue => CLI_CONTINUE,
            MessageType::Custom(v) => v,
        }
    }
}

/// Payload ownership. Replaces the C free-hook: `Owned` bytes are dropped
/// normally, `Borrowed` references `'static` data and costs nothing to drop.
#[derive(Debug, Clone)]
pub enum Payload {
    Owned(Vec<u8>),
    Borrowed(&'static [u8]),
}

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Owned(v) => v,
            Payload::Borrowed(s) => s,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Deep-copy into an independently-owned payload: caller and recipient
    /// must not share lifetime.
    pub fn deep_copy(&self) -> Payload {
        match self {
            Payload::Owned(v) => Payload::Owned(v.clone()),
            Payload::Borrowed(s) => Payload::Borrowed(s),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(v: Vec<u8>) -> Self {
        Payload::Owned(v)
    }
}

impl From<&'static [u8]> for Payload {
    fn from(s: &'static [u8]) -> Self {
        Payload::Borrowed(s)
    }
}

/// A message in flight on the bus.
///
/// `request_id` is zero for broadcasts/fire-and-forget sends, non-zero for
/// a correlated request/reply pair allocated by [`crate::bus::Bus::query`].
#[derive(Debug, Clone)]
pub struct Message {
    pub msg_type: MessageType,
    pub sender_id: u32,
    pub request_id: u32,
    pub payload: Payload,
}

impl Message {
    pub fn new(msg_type: MessageType, sender_id: u32, payload: impl Into<Payload>) -> Self {
        Self {
            msg_type,
            sender_id,
            request_id: 0,
            payload: payload.into(),
        }
    }

    pub fn with_request_id(mut self, request_id: u32) -> Self {
        self.request_id = request_id;
        self
    }

    /// Deep-copy this message so a send can hand out an independent copy,
    /// per the bus's cloning policy.
    pub fn cloned_for_delivery(&self) -> Message {
        Message {
            msg_type: self.msg_type,
            sender_id: self.sender_id,
            request_id: self.request_id,
            payload: self.payload.deep_copy(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Message{{type={:?}, from={}, req={}, len={}}}",
            self.msg_type,
            self.sender_id,
            self.request_id,
            self.payload.len()
        )
    }
}
