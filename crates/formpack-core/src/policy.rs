//! Upload policy: allowed file types and size/count limits.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One mebibyte.
const MIB: u64 = 1024 * 1024;

/// Default per-file size cap (80 MiB).
pub const MAX_FILE_SIZE: u64 = 80 * MIB;

/// Default cap on the summed size of all files in one request (80 MiB).
pub const MAX_TOTAL_SIZE: u64 = 80 * MIB;

/// Default maximum number of files collected across items.
pub const MAX_FILES: usize = 50;

/// File extensions accepted by default.
pub const ALLOWED_FILE_TYPES: [&str; 10] = [
    "png", "jpg", "jpeg", "webp", "pdf", "heic", "csv", "tsv", "xls", "xlsx",
];

/// Limits applied to every candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    /// Allowed extensions, matched case-insensitively.
    pub allowed_types: Vec<String>,
    /// Per-file size cap in bytes.
    pub max_file_size: u64,
    /// Cap on the running total in bytes.
    pub max_total_size: u64,
    /// Maximum file count when collecting across items.
    pub max_files: usize,
    /// Regenerate the boundary if it occurs in a payload.
    pub scan_boundary: bool,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_types: ALLOWED_FILE_TYPES.iter().map(ToString::to_string).collect(),
            max_file_size: MAX_FILE_SIZE,
            max_total_size: MAX_TOTAL_SIZE,
            max_files: MAX_FILES,
            scan_boundary: false,
        }
    }
}

impl UploadPolicy {
    /// Parses a policy from JSON; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a limit is zero.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Loads a policy from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.allowed_types.is_empty() {
            return Err(Error::Config("allowed_types must not be empty".into()));
        }
        if self.max_file_size == 0 || self.max_total_size == 0 || self.max_files == 0 {
            return Err(Error::Config("size and count limits must be positive".into()));
        }
        Ok(())
    }

    /// Checks whether an extension is allowed.
    #[must_use]
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }

    /// Validates the type of a file by its name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFileType`] if the extension is not allowed.
    pub fn check_file_type(&self, file_name: &str) -> Result<()> {
        let extension = file_extension(file_name);
        if self.allows_extension(&extension) {
            Ok(())
        } else {
            Err(Error::UnsupportedFileType {
                file_name: file_name.to_string(),
                extension,
                allowed: self.allowed_types.clone(),
            })
        }
    }

    /// Validates the size of a single file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileTooLarge`] if `size` exceeds the per-file cap.
    pub fn check_file_size(&self, file_name: &str, size: u64) -> Result<()> {
        if size > self.max_file_size {
            return Err(Error::FileTooLarge {
                file_name: file_name.to_string(),
                size,
                limit: self.max_file_size,
            });
        }
        Ok(())
    }

    /// Validates the running total size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TotalSizeExceeded`] if `total` exceeds the cap.
    pub fn check_total_size(&self, total: u64) -> Result<()> {
        if total > self.max_total_size {
            return Err(Error::TotalSizeExceeded {
                total,
                limit: self.max_total_size,
            });
        }
        Ok(())
    }

    /// Validates the number of collected files.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyFiles`] if `count` exceeds the limit.
    pub fn check_file_count(&self, count: usize) -> Result<()> {
        if count > self.max_files {
            return Err(Error::TooManyFiles {
                count,
                limit: self.max_files,
            });
        }
        Ok(())
    }
}

/// Returns the lowercased extension after the last `.`, or an empty string.
#[must_use]
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}
