//! Upstream items and their binary payloads.
//!
//! Hosts expose their item sequence through [`ItemSource`]. [`MemoryItems`]
//! is a ready-made source backed by in-memory bytes or files on disk.

mod model;
mod source;

pub use model::{Binary, BinaryContent, BinaryMetadata, Item, MemoryItems};
pub use source::{BinaryReadError, ItemSource};
