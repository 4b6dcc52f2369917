/// Errors from command-tree / view-tree construction and lookup.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("view {0} already exists")]
    DuplicateView(u32),

    #[error("view {0} not found")]
    UnknownView(u32),

    #[error("node {0:?} not found")]
    UnknownNode(crate::NodeId),

    #[error("node {0:?} already has an argument child")]
    DuplicateArgumentChild(crate::NodeId),
}
