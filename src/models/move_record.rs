//! A single step of a bulk rename or recursive delete.

use serde::Serialize;

/// Stable handle to a record inside a `MoveSet`.
///
/// Handles stay valid for the life of the set; records are never removed
/// individually.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MoveId(pub(crate) usize);

/// One source/destination pair in an ordered move-set.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    /// Path being moved (or deleted).
    pub old_path: String,

    /// Destination path. Equal to `old_path` for delete plans.
    pub new_path: String,

    /// Whether this record describes a directory.
    pub is_dir: bool,

    /// Whether the destination needs a follow-up normalization pass
    /// (implicit directory or legacy folder marker at the source).
    pub needs_normalization: bool,
}
