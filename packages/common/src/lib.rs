//! Durable key-value storage shared by the folio crates.

pub mod storage;

pub use storage::*;
