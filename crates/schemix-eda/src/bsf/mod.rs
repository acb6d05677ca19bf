//! Block symbol description files (`.bsf`).

mod symbol;
mod writer;

pub use symbol::{parse_bsf, placeholder_symbol, symbol_from_forms};
pub use writer::to_bsf_string;
