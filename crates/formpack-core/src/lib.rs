//! # formpack-core
//!
//! File aggregation and upload validation for `formpack`.
//!
//! This crate provides:
//! - Item sources with named binary properties
//! - Upload policy (allowed types, per-file/total size and count limits)
//! - Request parameters and their cross-field rules
//! - Aggregation of files from one item or all items
//! - Request preparation and a transport seam for submission
//!
//! ## Example
//!
//! ```
//! use formpack_core::{AggregationRequest, Binary, Item, MemoryItems, UploadPolicy, prepare_request};
//!
//! let items = MemoryItems::from(vec![
//!     Item::new().with_binary("data", Binary::from_bytes("scan.pdf", &b"%PDF-1.7"[..])),
//! ]);
//!
//! let prepared = prepare_request(
//!     &items,
//!     &AggregationRequest::single_item(0),
//!     &UploadPolicy::default(),
//! )?;
//! assert!(prepared.content_type().unwrap().starts_with("multipart/form-data"));
//! # Ok::<(), formpack_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod aggregate;
mod error;
pub mod item;
pub mod params;
pub mod policy;
pub mod service;

pub use aggregate::{
    AggregationRequest, AggregationResult, DEFAULT_BINARY_PROPERTY, DEFAULT_FILE_FIELD,
    ExtraProperties, Selection, aggregate,
};
pub use error::{Error, Result};
pub use item::{Binary, BinaryContent, BinaryMetadata, BinaryReadError, Item, ItemSource, MemoryItems};
pub use params::{ProcessingMode, RequestParameters};
pub use policy::{ALLOWED_FILE_TYPES, MAX_FILE_SIZE, MAX_FILES, MAX_TOTAL_SIZE, UploadPolicy};
pub use service::{PreparedRequest, Transport, TransportError, prepare_request, submit};
