//! Item source contract.

use super::model::BinaryMetadata;
use bytes::Bytes;

/// Errors reading the bytes of a binary property that is present.
#[derive(Debug, thiserror::Error)]
pub enum BinaryReadError {
    /// I/O error while reading the payload.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The host could not provide the payload.
    #[error("Binary data unavailable: {0}")]
    Unavailable(String),
}

/// An ordered sequence of items carrying named binary properties.
///
/// A property is *absent* when [`binary_metadata`](Self::binary_metadata)
/// returns `None`; reading a present property may still fail.
pub trait ItemSource {
    /// Returns the number of items.
    fn item_count(&self) -> usize;

    /// Returns the binary property names of an item, in discovery order.
    fn binary_properties(&self, item: usize) -> Vec<String>;

    /// Returns metadata for a binary property, or `None` if it is absent.
    fn binary_metadata(&self, item: usize, property: &str) -> Option<BinaryMetadata>;

    /// Reads the bytes of a binary property.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be read.
    fn read_binary(&self, item: usize, property: &str) -> Result<Bytes, BinaryReadError>;
}

impl<T: ItemSource + ?Sized> ItemSource for &T {
    fn item_count(&self) -> usize {
        (**self).item_count()
    }

    fn binary_properties(&self, item: usize) -> Vec<String> {
        (**self).binary_properties(item)
    }

    fn binary_metadata(&self, item: usize, property: &str) -> Option<BinaryMetadata> {
        (**self).binary_metadata(item, property)
    }

    fn read_binary(&self, item: usize, property: &str) -> Result<Bytes, BinaryReadError> {
        (**self).read_binary(item, property)
    }
}
