//! Represents one object-store key as seen through a listing.

use serde::{Deserialize, Serialize};

/// Legacy folder-marker suffix written by older S3 tools.
pub const FOLDER_MARKER_SUFFIX: &str = "_$folder$";

/// A single raw hit returned by the listing client, before normalization.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RawListingEntry {
    /// Object key exactly as returned by the store.
    pub key: String,

    /// Store-supplied content fingerprint, when the listing carried one.
    #[serde(default)]
    pub etag: Option<String>,

    /// Whether the listing client already knows this key is a directory
    /// (for example a common prefix).
    #[serde(default)]
    pub is_dir: bool,
}

/// The normalized record for one key held by a `ListingStore`.
///
/// An entry stored under its canonical key has `normalized_name == None`.
/// An entry stored under any other key is an alias: `normalized_name` names
/// the canonical key holding the authoritative entry.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Raw key as returned by the store. Empty when the entry only exists
    /// as an alias target.
    pub original_name: String,

    /// Redirect to the canonical key, if this entry is an alias.
    pub normalized_name: Option<String>,

    /// True for directory markers, legacy folder markers and prefixes.
    pub is_dir: bool,

    /// Opaque content fingerprint (may be empty).
    pub etag: String,
}

impl ObjectEntry {
    /// True if this entry is authoritative rather than an alias.
    pub fn is_canonical(&self) -> bool {
        self.normalized_name.is_none()
    }
}
