//! # formpack-multipart
//!
//! `multipart/form-data` body generation and parsing (RFC 7578, RFC 2388).
//!
//! ## Features
//!
//! - **Encoding**: Serialize ordered text fields and file attachments into a
//!   single body with a matching `Content-Type` header value
//! - **Boundaries**: Fresh, unpredictable boundary per body, with an optional
//!   collision-checked variant
//! - **Parameter encoding**: Quoted-string escaping and RFC 2231 filenames
//! - **Parsing**: Recover fields and files from an encoded body
//!
//! ## Quick Start
//!
//! ### Encoding a Form
//!
//! ```ignore
//! use formpack_multipart::{Field, FileAttachment, encode};
//!
//! let fields = vec![Field::new("mode", "create")];
//! let files = vec![
//!     FileAttachment::new("files", "sales.csv", std::fs::read("sales.csv")?)
//!         .with_content_type("text/csv"),
//! ];
//!
//! let body = encode(&fields, &files);
//! println!("Content-Type: {}", body.content_type());
//! ```
//!
//! ### Reproducible Output
//!
//! ```ignore
//! use formpack_multipart::{Boundary, encode_with_boundary};
//!
//! let boundary = Boundary::new("fixed-boundary")?;
//! let body = encode_with_boundary(&fields, &files, boundary);
//! ```
//!
//! ### Parsing a Body
//!
//! ```ignore
//! use formpack_multipart::parse;
//!
//! for part in parse(body.bytes().clone(), body.content_type())? {
//!     println!("{} {:?}", part.name, part.filename);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod boundary;
mod content_type;
mod error;
mod form;
mod header;
mod parser;

pub mod encoding;

pub use boundary::{BOUNDARY_PREFIX, Boundary};
pub use content_type::{ContentType, DEFAULT_FILE_CONTENT_TYPE};
pub use error::{Error, Result};
pub use form::{
    EncodedBody, Field, FileAttachment, MAX_BOUNDARY_ATTEMPTS, encode, encode_checked,
    encode_with_boundary,
};
pub use header::{ContentDisposition, Headers};
pub use parser::{ParsedPart, parse, parse_with_boundary};
