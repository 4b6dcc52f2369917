use nexus_tree::NodeId;

/// Errors surfaced while matching a typed command line against a view's
/// command tree.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("unknown command '{token}'")]
    UnknownToken { token: String, node: NodeId },

    /// An argument child exists at this position but the token failed its
    /// type's validation — reported with the validator's own reason rather
    /// than collapsed into "unknown command".
    #[error("{reason}")]
    InvalidArgument {
        token: String,
        reason: String,
        node: NodeId,
    },

    #[error("incomplete command")]
    IncompleteCommand { node: NodeId },
}

/// Errors from dispatch and session handling.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Bus(#[from] nexus_bus::BusError),

    #[error("module timed out or failed to respond")]
    DispatchTimeout,

    #[error("target view {0} not found")]
    UnknownView(u32),
}
