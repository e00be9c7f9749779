// Cell and number parsers for uploaded tables

pub mod cell;
pub mod number;

// Public API re-exports
pub use cell::infer_cell;
pub use number::{parse_float, to_number};
