//! POSIX attributes derived from object-store response headers.

use serde::Serialize;
use std::collections::HashMap;

/// Response headers keyed by their exact (case-sensitive) name.
pub type Headers = HashMap<String, String>;

/// Stat fields the getattr callback needs from an object's metadata.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileAttributes {
    /// Permission bits plus the `S_IFDIR`/`S_IFREG` type bits.
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    /// Seconds since the epoch; 0 when unknown.
    pub mtime: i64,
    pub size: u64,
    /// Number of 512-byte blocks.
    pub blocks: u64,
}

impl FileAttributes {
    pub fn is_dir(&self) -> bool {
        self.mode & (libc::S_IFMT as u32) == libc::S_IFDIR as u32
    }
}
