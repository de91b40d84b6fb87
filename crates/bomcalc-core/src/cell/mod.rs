//! Cell types

mod value;

pub use value::{parse_number, Cell, SharedString};
