pub mod codec;
pub mod element;
pub mod error;
pub mod param_type;

pub use codec::{decode, encode, ElementKind, ElementVisitor, MatchElement, MatchResult};
pub use element::{ElementValue, VIEW_CONTEXT_ELEMENT_ID};
pub use error::TlvError;
pub use param_type::{as_bool, ParamKind, ParamType};
