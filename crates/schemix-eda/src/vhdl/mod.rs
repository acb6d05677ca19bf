//! Entity declarations and symbols synthesized from them.

mod entity;
mod synthesize;

pub use entity::{parse_entity, EntityDecl, PortMode, PortSpec};
pub use synthesize::synthesize_symbol;
