//! # formpack
//!
//! Command line front end: treats files on disk as items, validates them
//! against the upload policy and writes the encoded multipart body.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cli;

pub use cli::{Cli, default_policy_path, load_policy, prepare, run};
