//! Item domain models.

use super::source::{BinaryReadError, ItemSource};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Descriptive data of a binary property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryMetadata {
    /// Original filename.
    pub file_name: Option<String>,
    /// MIME type reported by the host.
    pub mime_type: Option<String>,
    /// Size in bytes, when known before reading.
    pub file_size: Option<u64>,
}

/// Where the bytes of a binary property live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryContent {
    /// Bytes already in memory.
    Bytes(Bytes),
    /// File read lazily from disk.
    Path(PathBuf),
}

/// A binary property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    /// Metadata.
    pub metadata: BinaryMetadata,
    /// Contents.
    pub content: BinaryContent,
}

impl Binary {
    /// Creates an in-memory binary.
    #[must_use]
    pub fn from_bytes(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            metadata: BinaryMetadata {
                file_name: Some(file_name.into()),
                mime_type: None,
                file_size: Some(data.len() as u64),
            },
            content: BinaryContent::Bytes(data),
        }
    }

    /// Creates a binary backed by a file on disk.
    ///
    /// The filename is taken from the last path component.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            metadata: BinaryMetadata {
                file_name: path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned()),
                mime_type: None,
                file_size: None,
            },
            content: BinaryContent::Path(path),
        }
    }

    /// Sets the MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.metadata.mime_type = Some(mime_type.into());
        self
    }

    fn read(&self) -> Result<Bytes, BinaryReadError> {
        match &self.content {
            BinaryContent::Bytes(data) => Ok(data.clone()),
            BinaryContent::Path(path) => Ok(Bytes::from(std::fs::read(path)?)),
        }
    }

    fn metadata(&self) -> BinaryMetadata {
        let mut metadata = self.metadata.clone();
        if metadata.file_size.is_none() {
            if let BinaryContent::Path(path) = &self.content {
                metadata.file_size = file_len(path);
            }
        }
        metadata
    }
}

fn file_len(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|m| m.len())
}

/// An upstream item with named binary properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    binaries: Vec<(String, Binary)>,
}

impl Item {
    /// Creates an item without binary data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a binary property.
    #[must_use]
    pub fn with_binary(mut self, property: impl Into<String>, binary: Binary) -> Self {
        self.insert(property, binary);
        self
    }

    /// Adds or replaces a binary property in place.
    pub fn insert(&mut self, property: impl Into<String>, binary: Binary) {
        let property = property.into();
        if let Some(slot) = self.binaries.iter_mut().find(|(name, _)| *name == property) {
            slot.1 = binary;
        } else {
            self.binaries.push((property, binary));
        }
    }

    /// Returns a binary property.
    #[must_use]
    pub fn binary(&self, property: &str) -> Option<&Binary> {
        self.binaries
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, binary)| binary)
    }

    /// Returns property names in insertion order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.binaries.iter().map(|(name, _)| name.as_str())
    }
}

/// In-memory item sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryItems {
    items: Vec<Item>,
}

impl MemoryItems {
    /// Creates an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item.
    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Returns the items.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

impl From<Vec<Item>> for MemoryItems {
    fn from(items: Vec<Item>) -> Self {
        Self { items }
    }
}

impl FromIterator<Item> for MemoryItems {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl ItemSource for MemoryItems {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn binary_properties(&self, item: usize) -> Vec<String> {
        self.items
            .get(item)
            .map(|i| i.property_names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn binary_metadata(&self, item: usize, property: &str) -> Option<BinaryMetadata> {
        self.items
            .get(item)?
            .binary(property)
            .map(Binary::metadata)
    }

    fn read_binary(&self, item: usize, property: &str) -> Result<Bytes, BinaryReadError> {
        self.items
            .get(item)
            .and_then(|i| i.binary(property))
            .ok_or_else(|| {
                BinaryReadError::Unavailable(format!("item {item} has no property {property}"))
            })?
            .read()
    }
}
