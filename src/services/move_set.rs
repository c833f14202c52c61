//! src/services/move_set.rs
//!
//! MoveSet — ordered, de-duplicating plan of `(old_path, new_path)` pairs
//! for a bulk rename or recursive delete.
//!
//! Records live in an arena and are threaded into one sequence through
//! prev/next indices. Directory records and file records each form an
//! ascending run by `old_path`; the two runs interleave in the sequence but
//! are not ordered against each other.

use crate::models::move_record::{MoveId, MoveRecord};
use std::collections::{BTreeMap, TryReserveError};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum MoveSetError {
    #[error("move source path is empty")]
    EmptyPath,
    #[error("could not allocate move record: {0}")]
    Allocation(#[from] TryReserveError),
}

pub type MoveSetResult<T> = Result<T, MoveSetError>;

#[derive(Clone, Debug)]
struct Node {
    record: MoveRecord,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Not internally synchronized: one set belongs to one rename or delete
/// transaction and is dropped as a whole when it completes.
#[derive(Clone, Debug, Default)]
pub struct MoveSet {
    nodes: Vec<Node>,
    /// `(is_dir, old_path)` -> arena slot, for de-duplication and to find
    /// the next larger path within a class.
    index: BTreeMap<(bool, String), usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl MoveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, keeping each class ascending by `old_path`.
    ///
    /// If a record with the same `(old_path, is_dir)` already exists its
    /// handle is returned and nothing changes. Otherwise the new record goes
    /// right before the first same-class record with a larger `old_path`, or
    /// at the tail of the whole sequence when there is none.
    ///
    /// The record slot and both path copies are reserved up front, so running
    /// out of memory there is reported as `Allocation` and leaves the set
    /// unchanged. The index node is still allocated infallibly.
    pub fn insert(
        &mut self,
        old_path: &str,
        new_path: &str,
        is_dir: bool,
        needs_normalization: bool,
    ) -> MoveSetResult<MoveId> {
        if old_path.is_empty() {
            return Err(MoveSetError::EmptyPath);
        }

        let key = (is_dir, try_copy(old_path)?);
        if let Some(&slot) = self.index.get(&key) {
            trace!("move record for `{}` already present", old_path);
            return Ok(MoveId(slot));
        }

        let successor = self
            .index
            .range(&key..)
            .next()
            .filter(|((class, _), _)| *class == is_dir)
            .map(|(_, &slot)| slot);

        let record_old = try_copy(old_path)?;
        let record_new = try_copy(new_path)?;
        self.nodes.try_reserve(1)?;
        let slot = self.nodes.len();
        self.nodes.push(Node {
            record: MoveRecord {
                old_path: record_old,
                new_path: record_new,
                is_dir,
                needs_normalization,
            },
            prev: None,
            next: None,
        });

        match successor {
            Some(next) => self.link_before(slot, next),
            None => self.link_tail(slot),
        }
        self.index.insert(key, slot);

        Ok(MoveId(slot))
    }

    fn link_before(&mut self, slot: usize, next: usize) {
        let prev = self.nodes[next].prev;
        self.nodes[slot].prev = prev;
        self.nodes[slot].next = Some(next);
        self.nodes[next].prev = Some(slot);
        match prev {
            Some(prev) => self.nodes[prev].next = Some(slot),
            None => self.head = Some(slot),
        }
    }

    fn link_tail(&mut self, slot: usize) {
        self.nodes[slot].prev = self.tail;
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
    }

    pub fn get(&self, id: MoveId) -> Option<&MoveRecord> {
        self.nodes.get(id.0).map(|node| &node.record)
    }

    /// Look up a record by its source path and class.
    pub fn find(&self, old_path: &str, is_dir: bool) -> Option<&MoveRecord> {
        self.index
            .get(&(is_dir, old_path.to_string()))
            .map(|&slot| &self.nodes[slot].record)
    }

    /// Walk the sequence head to tail.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            set: self,
            cursor: self.head,
            back: false,
        }
    }

    /// Walk the sequence tail to head.
    pub fn iter_rev(&self) -> Iter<'_> {
        Iter {
            set: self,
            cursor: self.tail,
            back: true,
        }
    }

    /// Records of one class, in maintained order.
    pub fn iter_class(&self, is_dir: bool) -> impl Iterator<Item = &MoveRecord> {
        self.iter().filter(move |record| record.is_dir == is_dir)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Release every record at once.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }
}

fn try_copy(path: &str) -> Result<String, TryReserveError> {
    let mut copy = String::new();
    copy.try_reserve_exact(path.len())?;
    copy.push_str(path);
    Ok(copy)
}

pub struct Iter<'a> {
    set: &'a MoveSet,
    cursor: Option<usize>,
    back: bool,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a MoveRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let set = self.set;
        let node = &set.nodes[self.cursor?];
        self.cursor = if self.back { node.prev } else { node.next };
        Some(&node.record)
    }
}

impl<'a> IntoIterator for &'a MoveSet {
    type Item = &'a MoveRecord;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{MoveSet, MoveSetError, try_copy};

    fn old_paths(set: &MoveSet) -> Vec<(String, bool)> {
        set.iter()
            .map(|r| (r.old_path.clone(), r.is_dir))
            .collect()
    }

    #[test]
    fn files_stay_ascending_and_deduplicated() {
        let mut set = MoveSet::new();
        let b = set.insert("b", "B", false, false).unwrap();
        set.insert("a", "A", false, false).unwrap();
        let again = set.insert("b", "other", false, true).unwrap();

        assert_eq!(again, b);
        assert_eq!(set.len(), 2);
        let files: Vec<&str> = set
            .iter_class(false)
            .map(|r| r.old_path.as_str())
            .collect();
        assert_eq!(files, vec!["a", "b"]);
        assert_eq!(set.get(b).unwrap().new_path, "B");
        assert!(!set.get(b).unwrap().needs_normalization);
    }

    #[test]
    fn classes_are_ordered_independently() {
        let mut set = MoveSet::new();
        set.insert("m", "M", true, false).unwrap();
        set.insert("x", "X", false, false).unwrap();
        set.insert("c", "C", false, false).unwrap();
        set.insert("a", "A", true, false).unwrap();
        set.insert("z", "Z", true, false).unwrap();

        let dirs: Vec<&str> = set
            .iter_class(true)
            .map(|r| r.old_path.as_str())
            .collect();
        let files: Vec<&str> = set
            .iter_class(false)
            .map(|r| r.old_path.as_str())
            .collect();
        assert_eq!(dirs, vec!["a", "m", "z"]);
        assert_eq!(files, vec!["c", "x"]);

        // "c" goes before "x", "a" before "m", "z" at the global tail.
        assert_eq!(
            old_paths(&set),
            vec![
                ("a".to_string(), true),
                ("m".to_string(), true),
                ("c".to_string(), false),
                ("x".to_string(), false),
                ("z".to_string(), true),
            ]
        );
    }

    #[test]
    fn same_path_in_both_classes() {
        let mut set = MoveSet::new();
        let dir = set.insert("p", "q", true, false).unwrap();
        let file = set.insert("p", "q", false, false).unwrap();

        assert_ne!(dir, file);
        assert_eq!(set.len(), 2);
        assert!(set.find("p", true).unwrap().is_dir);
        assert!(!set.find("p", false).unwrap().is_dir);
    }

    #[test]
    fn prefix_sorts_first() {
        let mut set = MoveSet::new();
        set.insert("abcd", "", false, false).unwrap();
        set.insert("abd", "", false, false).unwrap();
        set.insert("abc", "", false, false).unwrap();
        set.insert("ab", "", false, false).unwrap();

        let files: Vec<&str> = set.iter().map(|r| r.old_path.as_str()).collect();
        assert_eq!(files, vec!["ab", "abc", "abcd", "abd"]);
    }

    #[test]
    fn reverse_walk_mirrors_forward_walk() {
        let mut set = MoveSet::new();
        for path in ["d/e", "d", "d/e/f", "a"] {
            set.insert(path, path, true, false).unwrap();
        }

        let forward: Vec<&str> = set.iter().map(|r| r.old_path.as_str()).collect();
        let mut backward: Vec<&str> = set
            .iter_rev()
            .map(|r| r.old_path.as_str())
            .collect();
        backward.reverse();
        assert_eq!(forward, vec!["a", "d", "d/e", "d/e/f"]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn empty_source_is_rejected() {
        let mut set = MoveSet::new();
        assert!(matches!(
            set.insert("", "x", false, false),
            Err(MoveSetError::EmptyPath)
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn paths_are_copied_whole() {
        let long = "d/".repeat(2048) + "leaf";
        assert_eq!(try_copy(&long).unwrap(), long);
        assert_eq!(try_copy("").unwrap(), "");

        let mut set = MoveSet::new();
        let id = set.insert(&long, "dst/leaf", false, false).unwrap();
        assert_eq!(set.insert(&long, "ignored", false, false).unwrap(), id);
        let record = set.get(id).unwrap();
        assert_eq!(record.old_path, long);
        assert_eq!(record.new_path, "dst/leaf");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn clear_releases_everything() {
        let mut set = MoveSet::new();
        set.insert("a", "b", false, false).unwrap();
        set.insert("c", "d", true, false).unwrap();
        set.clear();

        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
        assert!(set.find("a", false).is_none());
    }
}
