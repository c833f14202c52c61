//! Path helpers shared by the listing and rename code.

use serde::Serialize;

/// Mount-time settings that every path passes through before it becomes a
/// store key. Built once from `AppConfig` and never mutated afterwards.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MountContext {
    mount_prefix: String,
}

impl MountContext {
    pub fn new(mount_prefix: impl Into<String>) -> Self {
        Self {
            mount_prefix: mount_prefix.into(),
        }
    }

    pub fn mount_prefix(&self) -> &str {
        &self.mount_prefix
    }

    /// `mount_prefix + path`, the path as the store sees it.
    pub fn real_path(&self, path: &str) -> String {
        let mut real = String::with_capacity(self.mount_prefix.len() + path.len());
        real.push_str(&self.mount_prefix);
        real.push_str(path);
        real
    }

    /// Store key for a filesystem path: the real path without its leading `/`.
    pub fn object_key(&self, path: &str) -> String {
        let real = self.real_path(path);
        real.trim_start_matches('/').to_string()
    }
}

/// POSIX `dirname` without mutating its argument.
pub fn dirname(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.is_empty() { "." } else { "/" };
    }
    match trimmed.rfind('/') {
        None => ".",
        Some(pos) => {
            let parent = trimmed[..pos].trim_end_matches('/');
            if parent.is_empty() { "/" } else { parent }
        }
    }
}

/// POSIX `basename` without mutating its argument.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.is_empty() { "." } else { "/" };
    }
    match trimmed.rfind('/') {
        None => trimmed,
        Some(pos) => &trimmed[pos + 1..],
    }
}
