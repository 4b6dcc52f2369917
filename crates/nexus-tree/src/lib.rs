pub mod error;
pub mod node;
pub mod view;

pub use error::TreeError;
pub use node::{CmdNode, CommandTree, NodeId, NodeKind};
pub use view::{ViewNode, ViewTree, ROOT_VIEW_ID};
