pub mod codec;
pub mod logging;
pub mod sanitize;

pub use codec::{decode, encode, encode_parts, IdPart, NodeId};
pub use sanitize::clean;
