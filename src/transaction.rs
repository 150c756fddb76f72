//! Transaction module

pub mod types;

pub use types::*;
