/// Errors raised by mailboxes, the module registry, and the pub/sub bus.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("mailbox closed")]
    MailboxClosed,

    #[error("duplicate module id {0}")]
    DuplicateModule(u32),

    #[error("unknown module id {0}")]
    UnknownModule(u32),

    #[error("duplicate group id {0}")]
    DuplicateGroup(u32),

    #[error("unknown group id {0}")]
    UnknownGroup(u32),

    #[error("group {group} is owned by {owner}, not {actor}")]
    NotGroupOwner { group: u32, owner: u32, actor: u32 },

    #[error("query to module {target} timed out after {timeout_ms}ms")]
    QueryTimeout { target: u32, timeout_ms: u64 },
}
