//! Common types and utilities shared across jotdb.

mod constants;
mod date_utils;
mod type_utils;
mod value;

pub use constants::*;
pub use date_utils::*;
pub use type_utils::*;
pub use value::*;
