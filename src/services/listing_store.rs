//! src/services/listing_store.rs
//!
//! ListingStore — de-duplicating collection of listing hits keyed by
//! normalized name. Object stores return flat keys in three shapes for a
//! directory (`dir/`, `dir_$folder$`, or nothing at all), and the same
//! logical object may show up under more than one of them. This store
//! folds them into one canonical entry per path and remembers every raw
//! spelling as an alias pointing at it.

use crate::models::object::{FOLDER_MARKER_SUFFIX, ObjectEntry, RawListingEntry};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Normalized view of one listing batch.
///
/// Not internally synchronized: one store belongs to one in-flight listing.
#[derive(Clone, Debug, Default)]
pub struct ListingStore {
    objects: BTreeMap<String, ObjectEntry>,
}

impl ListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a batch of raw listing hits.
    ///
    /// Entries with empty keys are skipped.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a RawListingEntry>,
    {
        let mut store = Self::new();
        for entry in entries {
            if !store.insert(&entry.key, entry.etag.as_deref(), entry.is_dir) {
                debug!("skipping listing hit with empty key");
            }
        }
        store
    }

    /// Insert one raw listing hit.
    ///
    /// - `name_$folder$` is a directory named `name/`.
    /// - A trailing `/` always means directory, whatever `is_dir` says.
    /// - A directory supersedes a same-named file entry; a file hit for an
    ///   already known directory only becomes an alias of that directory.
    ///
    /// Returns false (and leaves the store untouched) for an empty name.
    pub fn insert(&mut self, raw_name: &str, etag: Option<&str>, is_dir: bool) -> bool {
        if raw_name.is_empty() {
            return false;
        }

        let mut is_dir = is_dir;
        let mut canonical = match raw_name.find(FOLDER_MARKER_SUFFIX) {
            Some(pos) => {
                is_dir = true;
                raw_name[..pos].to_string()
            }
            None => raw_name.to_string(),
        };
        if is_dir {
            if !canonical.ends_with('/') {
                canonical.push('/');
            }
        } else if canonical.ends_with('/') {
            is_dir = true;
        }

        if is_dir {
            let file_name = &canonical[..canonical.len() - 1];
            if self.objects.remove(file_name).is_some() {
                trace!("directory `{}` replaces file entry `{}`", canonical, file_name);
            }
        } else {
            let dir_name = format!("{}/", canonical);
            if self.objects.contains_key(&dir_name) {
                trace!("file hit `{}` folded into directory `{}`", raw_name, dir_name);
                return self.insert_alias(raw_name, &dir_name, true);
            }
        }

        match self.objects.get_mut(&canonical) {
            Some(entry) => {
                entry.normalized_name = None;
                entry.original_name = raw_name.to_string();
                entry.is_dir = is_dir;
                if let Some(etag) = etag {
                    entry.etag = etag.to_string();
                }
            }
            None => {
                self.objects.insert(
                    canonical.clone(),
                    ObjectEntry {
                        original_name: raw_name.to_string(),
                        normalized_name: None,
                        is_dir,
                        etag: etag.unwrap_or_default().to_string(),
                    },
                );
            }
        }

        self.insert_alias(raw_name, &canonical, is_dir)
    }

    /// Register `name` as a redirect to `canonical`.
    ///
    /// No-op when both names are equal. An existing entry under `name` loses
    /// its own identity and becomes a pure alias.
    fn insert_alias(&mut self, name: &str, canonical: &str, is_dir: bool) -> bool {
        if name.is_empty() || canonical.is_empty() {
            return false;
        }
        if name == canonical {
            return true;
        }

        trace!("alias `{}` -> `{}`", name, canonical);
        let entry = self.objects.entry(name.to_string()).or_default();
        entry.original_name.clear();
        entry.etag.clear();
        entry.normalized_name = Some(canonical.to_string());
        entry.is_dir = is_dir;
        true
    }

    /// Entry stored under exactly `name`, alias or not.
    pub fn get_entry(&self, name: &str) -> Option<&ObjectEntry> {
        if name.is_empty() {
            return None;
        }
        self.objects.get(name)
    }

    /// Raw store key recorded for `name`. Empty for pure aliases.
    pub fn get_original_name(&self, name: &str) -> Option<&str> {
        self.get_entry(name).map(|entry| entry.original_name.as_str())
    }

    /// Canonical key for `name`: the redirect target for an alias, `name`
    /// itself for an authoritative entry.
    pub fn get_canonical_name<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        let entry = self.get_entry(name)?;
        Some(entry.normalized_name.as_deref().unwrap_or(name))
    }

    pub fn get_etag(&self, name: &str) -> Option<&str> {
        self.get_entry(name).map(|entry| entry.etag.as_str())
    }

    /// False for unknown names.
    pub fn is_directory(&self, name: &str) -> bool {
        self.get_entry(name).is_some_and(|entry| entry.is_dir)
    }

    /// Enumerate stored keys in byte order.
    ///
    /// With `only_canonical`, aliases are skipped. With
    /// `strip_trailing_slash`, a trailing `/` is dropped from every name
    /// except the root `/`. Calling this again restarts the enumeration.
    pub fn extract_names(
        &self,
        only_canonical: bool,
        strip_trailing_slash: bool,
    ) -> impl Iterator<Item = String> + '_ {
        self.objects
            .iter()
            .filter(move |(_, entry)| !only_canonical || entry.is_canonical())
            .map(move |(name, _)| {
                if strip_trailing_slash && name.len() > 1 && name.ends_with('/') {
                    name[..name.len() - 1].to_string()
                } else {
                    name.clone()
                }
            })
    }

    /// Iterate over every `(key, entry)` pair in byte order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ObjectEntry)> {
        self.objects.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::ListingStore;

    fn names(store: &ListingStore) -> Vec<String> {
        store.extract_names(true, false).collect()
    }

    #[test]
    fn insert_rejects_empty_name() {
        let mut store = ListingStore::new();
        assert!(!store.insert("", Some("etag"), false));
        assert!(store.is_empty());
    }

    #[test]
    fn insert_plain_file() {
        let mut store = ListingStore::new();
        assert!(store.insert("a/b.txt", Some("\"abc\""), false));

        assert_eq!(store.len(), 1);
        assert!(!store.is_directory("a/b.txt"));
        assert_eq!(store.get_etag("a/b.txt"), Some("\"abc\""));
        assert_eq!(store.get_original_name("a/b.txt"), Some("a/b.txt"));
        assert_eq!(store.get_canonical_name("a/b.txt"), Some("a/b.txt"));
    }

    #[test]
    fn reinsert_is_idempotent() {
        let mut store = ListingStore::new();
        store.insert("dir/", None, true);
        store.insert("dir/file", Some("e1"), false);
        let before: Vec<_> = store
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();

        store.insert("dir/", None, true);
        store.insert("dir/file", Some("e1"), false);
        let after: Vec<_> = store
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();

        assert_eq!(before, after);
    }

    #[test]
    fn reinsert_refreshes_etag() {
        let mut store = ListingStore::new();
        store.insert("f", Some("old"), false);
        store.insert("f", Some("new"), false);
        assert_eq!(store.get_etag("f"), Some("new"));

        store.insert("f", None, false);
        assert_eq!(store.get_etag("f"), Some("new"));
    }

    #[test]
    fn trailing_slash_forces_directory() {
        let mut store = ListingStore::new();
        store.insert("photos/", None, false);
        assert!(store.is_directory("photos/"));
    }

    #[test]
    fn directory_hint_appends_slash() {
        let mut store = ListingStore::new();
        store.insert("photos", None, true);

        assert!(store.is_directory("photos/"));
        assert_eq!(store.get_canonical_name("photos"), Some("photos/"));
        assert_eq!(names(&store), vec!["photos/"]);
    }

    #[test]
    fn folder_marker_is_directory() {
        let mut legacy = ListingStore::new();
        legacy.insert("a/_$folder$", None, false);

        let mut plain = ListingStore::new();
        plain.insert("a/", None, true);

        assert!(legacy.is_directory("a/"));
        assert_eq!(names(&legacy), names(&plain));
        assert_eq!(legacy.get_canonical_name("a/_$folder$"), Some("a/"));
    }

    #[test]
    fn folder_marker_suffix_on_name() {
        let mut store = ListingStore::new();
        store.insert("docs_$folder$", Some("x"), false);

        assert!(store.is_directory("docs/"));
        assert_eq!(store.get_original_name("docs/"), Some("docs_$folder$"));
        assert_eq!(store.get_canonical_name("docs_$folder$"), Some("docs/"));
        assert_eq!(names(&store), vec!["docs/"]);
    }

    #[test]
    fn directory_supersedes_file() {
        let mut store = ListingStore::new();
        store.insert("docs", Some("e"), false);
        store.insert("docs/", None, true);

        assert!(store.get_entry("docs").is_none());
        assert_eq!(names(&store), vec!["docs/"]);
    }

    #[test]
    fn known_directory_wins_over_file_hit() {
        let mut store = ListingStore::new();
        store.insert("docs/", None, true);
        store.insert("docs", Some("e"), false);

        assert_eq!(names(&store), vec!["docs/"]);
        assert!(store.is_directory("docs/"));
        assert!(store.is_directory("docs"));
        assert_eq!(store.get_canonical_name("docs"), Some("docs/"));
        assert_eq!(store.get_etag("docs"), Some(""));
    }

    #[test]
    fn lookups_fail_soft() {
        let store = ListingStore::new();
        assert!(store.get_entry("").is_none());
        assert!(store.get_entry("missing").is_none());
        assert!(store.get_canonical_name("missing").is_none());
        assert!(store.get_etag("").is_none());
        assert!(!store.is_directory("missing"));
    }

    #[test]
    fn extract_names_strips_slash_except_root() {
        let mut store = ListingStore::new();
        store.insert("/", None, true);
        store.insert("a/", None, true);
        store.insert("a/b", None, false);

        let stripped: Vec<String> = store.extract_names(true, true).collect();
        assert_eq!(stripped, vec!["/", "a", "a/b"]);
    }

    #[test]
    fn extract_names_can_include_aliases() {
        let mut store = ListingStore::new();
        store.insert("a_$folder$", None, false);

        let all: Vec<String> = store.extract_names(false, false).collect();
        assert_eq!(all, vec!["a/", "a_$folder$"]);
        let canonical: Vec<String> = store.extract_names(true, false).collect();
        assert_eq!(canonical, vec!["a/"]);
    }
}
