//! Scalar request parameters sent alongside the files.

use crate::error::{Error, Result};
use formpack_multipart::Field;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the remote service should process the uploaded files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// Create a spreadsheet or table from the files.
    #[default]
    Create,
    /// Extract the full structured content.
    Read,
    /// Extract a simplified view of the content.
    ReadSimplified,
}

impl ProcessingMode {
    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::ReadSimplified => "read_simplified",
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "read_simplified" => Ok(Self::ReadSimplified),
            _ => Err(Error::InvalidParameter {
                parameter: "mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Parameters selected by the user for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestParameters {
    /// Processing mode.
    pub mode: ProcessingMode,
    /// Merge all files into a single result.
    pub merge: bool,
    /// Destination folder identifier.
    pub folder_id: Option<String>,
    /// Target spreadsheet identifier.
    pub spreadsheet_id: Option<String>,
    /// Target table identifier; requires a spreadsheet.
    pub table_id: Option<String>,
    /// Free-text processing instructions.
    pub instructions: Option<String>,
}

impl RequestParameters {
    /// Creates parameters for a mode with everything else unset.
    #[must_use]
    pub fn new(mode: ProcessingMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Sets the merge flag.
    #[must_use]
    pub const fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    /// Sets the destination folder.
    #[must_use]
    pub fn with_folder_id(mut self, id: impl Into<String>) -> Self {
        self.folder_id = Some(id.into());
        self
    }

    /// Sets the target spreadsheet.
    #[must_use]
    pub fn with_spreadsheet_id(mut self, id: impl Into<String>) -> Self {
        self.spreadsheet_id = Some(id.into());
        self
    }

    /// Sets the target table.
    #[must_use]
    pub fn with_table_id(mut self, id: impl Into<String>) -> Self {
        self.table_id = Some(id.into());
        self
    }

    /// Sets the instructions.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Checks cross-field dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRequiredParameter`] if a table is targeted
    /// without a spreadsheet.
    pub fn validate(&self) -> Result<()> {
        let has_table = present(self.table_id.as_ref()).is_some();
        if has_table && present(self.spreadsheet_id.as_ref()).is_none() {
            return Err(Error::MissingRequiredParameter {
                parameter: "spreadsheet_id",
                required_by: "table_id",
            });
        }
        Ok(())
    }

    /// Renders the parameters as form fields.
    ///
    /// `mode` is always sent; `merge` only when true; optional values only
    /// when non-blank.
    #[must_use]
    pub fn to_fields(&self) -> Vec<Field> {
        let mut fields = vec![Field::new("mode", self.mode.as_str())];

        if self.merge {
            fields.push(Field::new("merge", "true"));
        }

        let optional = [
            ("folder_id", &self.folder_id),
            ("spreadsheet_id", &self.spreadsheet_id),
            ("table_id", &self.table_id),
            ("instructions", &self.instructions),
        ];
        for (name, value) in optional {
            if let Some(value) = present(value.as_ref()) {
                fields.push(Field::new(name, value));
            }
        }

        fields
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}
