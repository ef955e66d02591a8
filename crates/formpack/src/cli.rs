//! Argument parsing and the command entry point.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use formpack_core::{
    AggregationRequest, Binary, DEFAULT_BINARY_PROPERTY, DEFAULT_FILE_FIELD, Item, MemoryItems,
    PreparedRequest, ProcessingMode, RequestParameters, UploadPolicy, prepare_request,
};
use tracing::{debug, info};

/// Validate files and encode them as a multipart/form-data upload.
#[derive(Debug, Parser)]
#[command(name = "formpack", version, about)]
pub struct Cli {
    /// Files to upload; each one is treated as a separate item
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Upload only the file at this position (0-based)
    #[arg(long)]
    pub item: Option<usize>,

    /// Processing mode: create, read or read_simplified
    #[arg(long, default_value_t = ProcessingMode::Create)]
    pub mode: ProcessingMode,

    /// Merge all files into a single result
    #[arg(long)]
    pub merge: bool,

    /// Destination folder identifier
    #[arg(long)]
    pub folder_id: Option<String>,

    /// Target spreadsheet identifier
    #[arg(long)]
    pub spreadsheet_id: Option<String>,

    /// Target table identifier (requires --spreadsheet-id)
    #[arg(long)]
    pub table_id: Option<String>,

    /// Free-text processing instructions
    #[arg(long)]
    pub instructions: Option<String>,

    /// Form field name the files are sent under
    #[arg(long, default_value = DEFAULT_FILE_FIELD)]
    pub field_name: String,

    /// Upload policy JSON file
    #[arg(long)]
    pub policy: Option<PathBuf>,

    /// Regenerate the boundary if it occurs inside a file
    #[arg(long)]
    pub scan_boundary: bool,

    /// Write the body here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    fn parameters(&self) -> RequestParameters {
        RequestParameters {
            mode: self.mode,
            merge: self.merge,
            folder_id: self.folder_id.clone(),
            spreadsheet_id: self.spreadsheet_id.clone(),
            table_id: self.table_id.clone(),
            instructions: self.instructions.clone(),
        }
    }

    fn aggregation_request(&self) -> AggregationRequest {
        let request = match self.item {
            Some(index) => AggregationRequest::single_item(index),
            None => AggregationRequest::all_items(),
        };
        request
            .with_field_name(self.field_name.clone())
            .with_parameters(self.parameters())
    }

    fn items(&self) -> MemoryItems {
        self.files
            .iter()
            .map(|path| Item::new().with_binary(DEFAULT_BINARY_PROPERTY, Binary::from_path(path)))
            .collect()
    }
}

/// Returns `<config dir>/formpack/policy.json`, if a config dir exists.
#[must_use]
pub fn default_policy_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("formpack").join("policy.json"))
}

/// Loads the upload policy.
///
/// An explicit path must exist. Without one, the default location is used
/// when present, otherwise the built-in limits apply.
///
/// # Errors
///
/// Returns an error if the policy file cannot be read or is invalid.
pub fn load_policy(path: Option<&Path>) -> Result<UploadPolicy> {
    if let Some(path) = path {
        return UploadPolicy::load(path)
            .with_context(|| format!("Failed to load policy from {}", path.display()));
    }

    match default_policy_path() {
        Some(path) if path.exists() => {
            debug!("Loading policy from {:?}", path);
            UploadPolicy::load(&path)
                .with_context(|| format!("Failed to load policy from {}", path.display()))
        }
        _ => Ok(UploadPolicy::default()),
    }
}

/// Builds the request for the given arguments without writing anything.
///
/// # Errors
///
/// Returns an error if the policy cannot be loaded or a file is rejected.
pub fn prepare(cli: &Cli) -> Result<PreparedRequest> {
    let mut policy = load_policy(cli.policy.as_deref())?;
    policy.scan_boundary |= cli.scan_boundary;

    let prepared = prepare_request(&cli.items(), &cli.aggregation_request(), &policy)?;
    Ok(prepared)
}

/// Runs the command: encodes the files and writes the body.
///
/// The `Content-Type` goes to stdout when the body is written to a file,
/// and to stderr when the body itself goes to stdout.
///
/// # Errors
///
/// Returns an error if preparation or writing fails.
pub fn run(cli: &Cli) -> Result<()> {
    let prepared = prepare(cli)?;
    let content_type = prepared.content_type().unwrap_or_default().to_string();

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &prepared.body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(bytes = prepared.body.len(), "Body written to {:?}", path);
            println!("Content-Type: {content_type}");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&prepared.body)?;
            stdout.flush()?;
            eprintln!("Content-Type: {content_type}");
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "formpack",
            "a.pdf",
            "b.png",
            "--mode",
            "read_simplified",
            "--merge",
            "--spreadsheet-id",
            "sp_1",
            "--item",
            "1",
            "-o",
            "body.bin",
        ])
        .unwrap();

        assert_eq!(cli.files.len(), 2);
        assert_eq!(cli.mode, ProcessingMode::ReadSimplified);
        assert!(cli.merge);
        assert_eq!(cli.item, Some(1));
        assert_eq!(cli.field_name, "files");
        assert_eq!(cli.output.as_deref(), Some(Path::new("body.bin")));

        let params = cli.parameters();
        assert_eq!(params.spreadsheet_id.as_deref(), Some("sp_1"));
        assert!(params.table_id.is_none());
    }

    #[test]
    fn test_rejects_unknown_mode_and_missing_files() {
        assert!(Cli::try_parse_from(["formpack", "a.pdf", "--mode", "delete"]).is_err());
        assert!(Cli::try_parse_from(["formpack"]).is_err());
    }

    #[test]
    fn test_items_from_paths() {
        let cli = Cli::try_parse_from(["formpack", "/tmp/x/one.csv", "two.xlsx"]).unwrap();
        let items = cli.items();
        assert_eq!(items.items().len(), 2);
        let binary = items.items()[0].binary(DEFAULT_BINARY_PROPERTY).unwrap();
        assert_eq!(binary.metadata.file_name.as_deref(), Some("one.csv"));
    }

    #[test]
    fn test_explicit_policy_must_exist() {
        let err = load_policy(Some(Path::new("/nonexistent/formpack/policy.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to load policy"));
    }
}
