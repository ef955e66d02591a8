//! Error types for the core library.

use crate::item::BinaryReadError;
use crate::service::TransportError;
use thiserror::Error;

/// Errors that can occur while aggregating, validating or submitting files.
#[derive(Debug, Error)]
pub enum Error {
    /// The targeted item has no binary data under the designated property.
    #[error("Item {item} has no binary data in property \"{property}\"")]
    MissingBinaryData {
        /// Item index.
        item: usize,
        /// Binary property name.
        property: String,
    },

    /// A present binary property could not be read.
    #[error("Failed to read binary property \"{property}\" of item {item}: {source}")]
    BinaryReadFailure {
        /// Item index.
        item: usize,
        /// Binary property name.
        property: String,
        /// Underlying read error.
        source: BinaryReadError,
    },

    /// File extension is not in the allowed set.
    #[error(
        "File \"{file_name}\" has unsupported type \"{extension}\" (allowed: {})",
        .allowed.join(", ")
    )]
    UnsupportedFileType {
        /// Offending filename.
        file_name: String,
        /// Lowercased extension, empty if the name has none.
        extension: String,
        /// Allowed extensions.
        allowed: Vec<String>,
    },

    /// A single file exceeds the per-file size cap.
    #[error("File \"{file_name}\" is {size} bytes, over the {limit} byte limit")]
    FileTooLarge {
        /// Offending filename.
        file_name: String,
        /// File size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// The accumulated files exceed the total size cap.
    #[error("Total upload size {total} bytes exceeds the {limit} byte limit")]
    TotalSizeExceeded {
        /// Running total in bytes, including the file that tipped it over.
        total: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// More files than allowed were collected.
    #[error("Collected {count} files, more than the limit of {limit}")]
    TooManyFiles {
        /// Number of files collected.
        count: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A parameter required by another parameter is missing.
    #[error("Parameter \"{parameter}\" is required when \"{required_by}\" is set")]
    MissingRequiredParameter {
        /// Missing parameter.
        parameter: &'static str,
        /// Parameter that requires it.
        required_by: &'static str,
    },

    /// A parameter has an unrecognized value.
    #[error("Invalid value \"{value}\" for parameter \"{parameter}\"")]
    InvalidParameter {
        /// Parameter name.
        parameter: &'static str,
        /// Rejected value.
        value: String,
    },

    /// Aggregation produced no files.
    #[error("No files found in binary properties: {}", .properties.join(", "))]
    NoFilesProvided {
        /// Binary property names that were searched.
        properties: Vec<String>,
    },

    /// Multipart encoding failed.
    #[error("Multipart error: {0}")]
    Multipart(#[from] formpack_multipart::Error),

    /// The transport rejected or failed the request.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl Error {
    /// Checks whether this error is an upload policy violation.
    ///
    /// Policy violations abort aggregation even when they come from an
    /// opportunistically included property.
    #[must_use]
    pub const fn is_policy_violation(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFileType { .. }
                | Self::FileTooLarge { .. }
                | Self::TotalSizeExceeded { .. }
                | Self::TooManyFiles { .. }
        )
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
