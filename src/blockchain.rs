// Thin re-export module: implementation is in `blockchain/core.rs`, split into
// block sealing, chain management, validation and balance projection.

pub mod core;
pub use core::*;
