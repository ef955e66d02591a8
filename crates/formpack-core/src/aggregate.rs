//! File aggregation across upstream items.
//!
//! Aggregation turns one item (or every item) into an ordered list of
//! validated [`FileAttachment`]s. Every limit of the [`UploadPolicy`] is
//! enforced here, before anything is encoded or sent.

use crate::error::{Error, Result};
use crate::item::{BinaryMetadata, ItemSource};
use crate::params::RequestParameters;
use crate::policy::UploadPolicy;
use formpack_multipart::{Field, FileAttachment};
use tracing::{debug, warn};

/// Default binary property holding the file of an item.
pub const DEFAULT_BINARY_PROPERTY: &str = "data";

/// Default form field name files are sent under.
pub const DEFAULT_FILE_FIELD: &str = "files";

/// Base name used when an item carries no filename.
const FALLBACK_FILE_NAME: &str = "file";

/// Which items to collect files from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Exactly one item; it must carry the designated property.
    Item(usize),
    /// Every item; items without the designated property are skipped.
    AllItems,
}

/// Which binary properties besides the designated one are included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExtraProperties {
    /// Every other binary property present on the item.
    #[default]
    Discover,
    /// Only these properties, when present.
    Named(Vec<String>),
    /// None.
    Disabled,
}

/// Input of one aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    /// Designated binary property.
    pub binary_property: String,
    /// Items to read.
    pub selection: Selection,
    /// Extra properties to include.
    pub extra_properties: ExtraProperties,
    /// Form field name for files.
    pub field_name: String,
    /// Scalar parameters.
    pub parameters: RequestParameters,
}

impl AggregationRequest {
    /// Creates a request for a single item.
    #[must_use]
    pub fn single_item(index: usize) -> Self {
        Self::with_selection(Selection::Item(index))
    }

    /// Creates a request collecting from all items.
    #[must_use]
    pub fn all_items() -> Self {
        Self::with_selection(Selection::AllItems)
    }

    fn with_selection(selection: Selection) -> Self {
        Self {
            binary_property: DEFAULT_BINARY_PROPERTY.to_string(),
            selection,
            extra_properties: ExtraProperties::default(),
            field_name: DEFAULT_FILE_FIELD.to_string(),
            parameters: RequestParameters::default(),
        }
    }

    /// Sets the designated binary property.
    #[must_use]
    pub fn with_binary_property(mut self, property: impl Into<String>) -> Self {
        self.binary_property = property.into();
        self
    }

    /// Sets which extra properties are included.
    #[must_use]
    pub fn with_extra_properties(mut self, extra: ExtraProperties) -> Self {
        self.extra_properties = extra;
        self
    }

    /// Sets the form field name for files.
    #[must_use]
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    /// Sets the scalar parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: RequestParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Property names searched, for diagnostics.
    fn searched_properties(&self) -> Vec<String> {
        let mut properties = vec![self.binary_property.clone()];
        if let ExtraProperties::Named(names) = &self.extra_properties {
            properties.extend(names.iter().filter(|n| **n != self.binary_property).cloned());
        }
        properties
    }
}

/// Validated files and parameters for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationResult {
    /// Files in item order, then discovery order within an item.
    pub files: Vec<FileAttachment>,
    /// Scalar parameters.
    pub parameters: RequestParameters,
}

impl AggregationResult {
    /// Returns the parameters as form fields.
    #[must_use]
    pub fn fields(&self) -> Vec<Field> {
        self.parameters.to_fields()
    }

    /// Returns the summed size of all files in bytes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.len() as u64).sum()
    }
}

/// Collects and validates files according to `request` and `policy`.
///
/// # Errors
///
/// Returns the first policy violation, a missing or unreadable designated
/// property, a parameter dependency error, or [`Error::NoFilesProvided`] if
/// nothing was collected.
pub fn aggregate<S: ItemSource + ?Sized>(
    source: &S,
    request: &AggregationRequest,
    policy: &UploadPolicy,
) -> Result<AggregationResult> {
    request.parameters.validate()?;

    let mut collector = Collector {
        source,
        request,
        policy,
        files: Vec::new(),
        total_size: 0,
    };

    match request.selection {
        Selection::Item(index) => {
            if index >= source.item_count()
                || source
                    .binary_metadata(index, &request.binary_property)
                    .is_none()
            {
                return Err(Error::MissingBinaryData {
                    item: index,
                    property: request.binary_property.clone(),
                });
            }
            collector.collect_item(index)?;
        }
        Selection::AllItems => {
            for index in 0..source.item_count() {
                if source
                    .binary_metadata(index, &request.binary_property)
                    .is_none()
                {
                    debug!(
                        item = index,
                        property = %request.binary_property,
                        "Skipping item without binary data"
                    );
                    continue;
                }
                collector.collect_item(index)?;
            }
            policy.check_file_count(collector.files.len())?;
        }
    }

    if collector.files.is_empty() {
        return Err(Error::NoFilesProvided {
            properties: request.searched_properties(),
        });
    }

    debug!(
        files = collector.files.len(),
        total_size = collector.total_size,
        "Aggregated files"
    );

    Ok(AggregationResult {
        files: collector.files,
        parameters: request.parameters.clone(),
    })
}

struct Collector<'a, S: ?Sized> {
    source: &'a S,
    request: &'a AggregationRequest,
    policy: &'a UploadPolicy,
    files: Vec<FileAttachment>,
    total_size: u64,
}

impl<S: ItemSource + ?Sized> Collector<'_, S> {
    /// Adds the designated property, then the extras, of one item.
    fn collect_item(&mut self, item: usize) -> Result<()> {
        let designated = self.request.binary_property.clone();
        self.admit(item, &designated)?;

        for property in self.extra_properties(item) {
            match self.admit(item, &property) {
                Ok(()) => {}
                Err(e) if e.is_policy_violation() => return Err(e),
                Err(e) => {
                    warn!(item, property = %property, error = %e, "Skipping extra binary property");
                }
            }
        }

        Ok(())
    }

    fn extra_properties(&self, item: usize) -> Vec<String> {
        let designated = &self.request.binary_property;
        match &self.request.extra_properties {
            ExtraProperties::Discover => self
                .source
                .binary_properties(item)
                .into_iter()
                .filter(|p| p != designated)
                .collect(),
            ExtraProperties::Named(names) => names
                .iter()
                .filter(|p| *p != designated)
                .filter(|p| self.source.binary_metadata(item, p).is_some())
                .cloned()
                .collect(),
            ExtraProperties::Disabled => Vec::new(),
        }
    }

    /// Validates one property and appends it to the file list.
    fn admit(&mut self, item: usize, property: &str) -> Result<()> {
        let metadata = self
            .source
            .binary_metadata(item, property)
            .ok_or_else(|| Error::MissingBinaryData {
                item,
                property: property.to_string(),
            })?;

        let file_name = resolve_file_name(&metadata, self.policy);
        self.policy.check_file_type(&file_name)?;
        if let Some(size) = metadata.file_size {
            self.policy.check_file_size(&file_name, size)?;
            self.policy.check_total_size(self.total_size + size)?;
        }

        let data = self
            .source
            .read_binary(item, property)
            .map_err(|source| Error::BinaryReadFailure {
                item,
                property: property.to_string(),
                source,
            })?;

        let size = data.len() as u64;
        self.policy.check_file_size(&file_name, size)?;
        let total_size = self.total_size + size;
        self.policy.check_total_size(total_size)?;

        debug!(item, property, file_name = %file_name, size, "Accepted file");

        let mut file = FileAttachment::new(self.request.field_name.clone(), file_name, data);
        file.content_type = resolve_content_type(&metadata, &file.filename);
        self.files.push(file);
        self.total_size = total_size;

        Ok(())
    }
}

/// Uses the host filename, or `file` plus an extension guessed from the
/// MIME type.
fn resolve_file_name(metadata: &BinaryMetadata, policy: &UploadPolicy) -> String {
    if let Some(name) = metadata.file_name.as_deref().filter(|n| !n.trim().is_empty()) {
        return name.to_string();
    }

    let extension = metadata
        .mime_type
        .as_deref()
        .and_then(mime_guess::get_mime_extensions_str)
        .and_then(|exts| {
            exts.iter()
                .find(|ext| policy.allows_extension(ext))
                .or_else(|| exts.first())
        });

    match extension {
        Some(ext) => format!("{FALLBACK_FILE_NAME}.{ext}"),
        None => FALLBACK_FILE_NAME.to_string(),
    }
}

/// Uses the host MIME type, or one guessed from the filename.
///
/// A host value containing control characters is ignored; it would end up
/// verbatim in the part header.
fn resolve_content_type(metadata: &BinaryMetadata, file_name: &str) -> Option<String> {
    metadata
        .mime_type
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty() && !m.chars().any(char::is_control))
        .map(str::to_string)
        .or_else(|| {
            mime_guess::from_path(file_name)
                .first_raw()
                .map(str::to_string)
        })
}
