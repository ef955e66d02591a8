//! Request preparation and submission.
//!
//! This module bridges aggregation with the multipart encoder and hands
//! the result to a host-supplied transport.

pub mod upload;

pub use upload::{PreparedRequest, Transport, TransportError, prepare_request, submit};
