mod kind;
pub mod names;
mod value;

pub use kind::TagKind;
pub use value::{FromTagValue, TagValue};
