//! src/services/rename_plan.rs
//!
//! Turn a listing of everything below a directory into an ordered plan of
//! store operations for a recursive rename or delete.
//!
//! The plan runs in three passes over one `MoveSet`:
//! 1. create every destination directory marker, parents first;
//! 2. copy then delete every file;
//! 3. remove every source directory marker, deepest first.

use crate::{
    models::move_record::MoveRecord,
    services::{
        hierarchy::complete_hierarchy,
        listing_store::ListingStore,
        move_set::{MoveSet, MoveSetError},
    },
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("cannot plan an operation on the bucket root")]
    EmptySource,
    #[error("cannot move a directory onto the bucket root")]
    EmptyDestination,
    #[error("cannot move `{from}` into itself (`{to}`)")]
    IntoItself { from: String, to: String },
    #[error(transparent)]
    MoveSet(#[from] MoveSetError),
}

pub type PlanResult<T> = Result<T, PlanError>;

/// One store operation.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PlanStep {
    /// Write a directory marker. `normalize` is set when the source had no
    /// marker in canonical `dir/` form.
    CreateDir { key: String, normalize: bool },
    /// Server-side copy of one object.
    Copy {
        from: String,
        to: String,
        etag: String,
    },
    Delete { key: String },
    /// Delete a source directory marker.
    RemoveDir { key: String },
}

#[derive(Serialize, Clone, Debug)]
pub struct Plan {
    pub from: String,
    pub to: Option<String>,
    pub steps: Vec<PlanStep>,
}

fn trim_dir(path: &str) -> &str {
    path.trim_end_matches('/')
}

/// True unless `dir/` is a marker object stored exactly under that key.
fn needs_normalization(store: &ListingStore, dir: &str) -> bool {
    let marker = format!("{}/", dir);
    match store.get_entry(&marker) {
        Some(entry) if entry.is_canonical() && entry.is_dir => entry.original_name != marker,
        _ => true,
    }
}

/// Key of the object backing directory `dir`, legacy spelling included.
fn marker_key(store: &ListingStore, dir: &str) -> String {
    let marker = format!("{}/", dir);
    match store.get_original_name(&marker) {
        Some(original) if !original.is_empty() => original.to_string(),
        _ => marker,
    }
}

/// Collect `from` and everything below it into a move-set targeting `to`.
///
/// `from` and `to` are store keys of directories, with or without a
/// trailing `/`. Directories that only exist as prefixes of deeper keys are
/// included and flagged for normalization.
pub fn build_move_set(store: &ListingStore, from: &str, to: &str) -> PlanResult<MoveSet> {
    let from = trim_dir(from);
    let to = trim_dir(to);
    if from.is_empty() {
        return Err(PlanError::EmptySource);
    }

    let mut set = MoveSet::new();
    set.insert(from, to, true, needs_normalization(store, from))?;

    let base = format!("{}/", from);
    let mut children: Vec<String> = store
        .extract_names(true, true)
        .filter_map(|name| {
            name.strip_prefix(base.as_str())
                .filter(|rest| !rest.is_empty())
                .map(str::to_string)
        })
        .collect();
    complete_hierarchy(&mut children, false);

    for child in &children {
        let old_path = format!("{}{}", base, child);
        let new_path = format!("{}/{}", to, child);
        let is_file = store
            .get_entry(&old_path)
            .is_some_and(|entry| entry.is_canonical() && !entry.is_dir);
        let normalize = !is_file && needs_normalization(store, &old_path);
        set.insert(&old_path, &new_path, !is_file, normalize)?;
    }

    debug!("planned {} records below `{}`", set.len(), from);
    Ok(set)
}

/// Plan a recursive rename of directory `from` to `to`.
pub fn plan_rename(store: &ListingStore, from: &str, to: &str) -> PlanResult<Plan> {
    let (from_dir, to_dir) = (trim_dir(from), trim_dir(to));
    if to_dir.is_empty() {
        return Err(PlanError::EmptyDestination);
    }
    if to_dir == from_dir || to_dir.starts_with(&format!("{}/", from_dir)) {
        return Err(PlanError::IntoItself {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    let set = build_move_set(store, from, to)?;
    let mut steps = Vec::with_capacity(set.len() * 2);

    for record in set.iter_class(true) {
        steps.push(PlanStep::CreateDir {
            key: format!("{}/", record.new_path),
            normalize: record.needs_normalization,
        });
    }
    for record in set.iter_class(false) {
        steps.push(PlanStep::Copy {
            from: record.old_path.clone(),
            to: record.new_path.clone(),
            etag: store.get_etag(&record.old_path).unwrap_or_default().to_string(),
        });
        steps.push(PlanStep::Delete {
            key: record.old_path.clone(),
        });
    }
    steps.extend(remove_dirs(store, &set));

    Ok(Plan {
        from: from_dir.to_string(),
        to: Some(to_dir.to_string()),
        steps,
    })
}

/// Plan a recursive delete of directory `dir`.
pub fn plan_delete(store: &ListingStore, dir: &str) -> PlanResult<Plan> {
    let set = build_move_set(store, dir, dir)?;
    let mut steps: Vec<PlanStep> = set
        .iter_class(false)
        .map(|record| PlanStep::Delete {
            key: record.old_path.clone(),
        })
        .collect();
    steps.extend(remove_dirs(store, &set));

    Ok(Plan {
        from: trim_dir(dir).to_string(),
        to: None,
        steps,
    })
}

fn remove_dirs<'a>(
    store: &'a ListingStore,
    set: &'a MoveSet,
) -> impl Iterator<Item = PlanStep> + 'a {
    set.iter_rev()
        .filter(|record: &&MoveRecord| record.is_dir)
        .map(move |record| PlanStep::RemoveDir {
            key: marker_key(store, &record.old_path),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::path_util::MountContext;

    fn store(keys: &[&str]) -> ListingStore {
        let mut store = ListingStore::new();
        for key in keys {
            store.insert(key, Some("etag"), false);
        }
        store
    }

    #[test]
    fn move_set_includes_implicit_directories() {
        let store = store(&["src/", "src/a.txt", "src/deep/er/b.txt"]);
        let set = build_move_set(&store, "src", "dst").unwrap();

        let dirs: Vec<(&str, &str, bool)> = set
            .iter_class(true)
            .map(|r| (r.old_path.as_str(), r.new_path.as_str(), r.needs_normalization))
            .collect();
        assert_eq!(
            dirs,
            vec![
                ("src", "dst", false),
                ("src/deep", "dst/deep", true),
                ("src/deep/er", "dst/deep/er", true),
            ]
        );
        let files: Vec<&str> = set
            .iter_class(false)
            .map(|r| r.old_path.as_str())
            .collect();
        assert_eq!(files, vec!["src/a.txt", "src/deep/er/b.txt"]);
    }

    #[test]
    fn sibling_with_shared_prefix_is_excluded() {
        let store = store(&["src/x", "src-old/y", "srcfile"]);
        let set = build_move_set(&store, "src/", "dst/").unwrap();
        let paths: Vec<&str> = set.iter().map(|r| r.old_path.as_str()).collect();
        assert_eq!(paths, vec!["src", "src/x"]);
    }

    #[test]
    fn rename_plan_orders_passes() {
        let store = store(&["src/", "src/sub/", "src/sub/f", "src/g"]);
        let plan = plan_rename(&store, "src", "dst").unwrap();

        assert_eq!(
            plan.steps,
            vec![
                PlanStep::CreateDir {
                    key: "dst/".into(),
                    normalize: false,
                },
                PlanStep::CreateDir {
                    key: "dst/sub/".into(),
                    normalize: false,
                },
                PlanStep::Copy {
                    from: "src/g".into(),
                    to: "dst/g".into(),
                    etag: "etag".into(),
                },
                PlanStep::Delete {
                    key: "src/g".into(),
                },
                PlanStep::Copy {
                    from: "src/sub/f".into(),
                    to: "dst/sub/f".into(),
                    etag: "etag".into(),
                },
                PlanStep::Delete {
                    key: "src/sub/f".into(),
                },
                PlanStep::RemoveDir {
                    key: "src/sub/".into(),
                },
                PlanStep::RemoveDir {
                    key: "src/".into(),
                },
            ]
        );
    }

    #[test]
    fn legacy_marker_is_normalized_and_removed_by_original_key() {
        let store = store(&["src_$folder$", "src/f"]);
        let plan = plan_rename(&store, "src", "dst").unwrap();

        assert_eq!(
            plan.steps.first(),
            Some(&PlanStep::CreateDir {
                key: "dst/".into(),
                normalize: true,
            })
        );
        assert_eq!(
            plan.steps.last(),
            Some(&PlanStep::RemoveDir {
                key: "src_$folder$".into(),
            })
        );
    }

    #[test]
    fn delete_plan_removes_deepest_first() {
        let store = store(&["a/b/c/d.txt", "a/e.txt"]);
        let plan = plan_delete(&store, "a").unwrap();

        assert!(plan.to.is_none());
        assert_eq!(
            plan.steps,
            vec![
                PlanStep::Delete {
                    key: "a/b/c/d.txt".into(),
                },
                PlanStep::Delete {
                    key: "a/e.txt".into(),
                },
                PlanStep::RemoveDir {
                    key: "a/b/c/".into(),
                },
                PlanStep::RemoveDir {
                    key: "a/b/".into(),
                },
                PlanStep::RemoveDir {
                    key: "a/".into(),
                },
            ]
        );
    }

    #[test]
    fn rename_into_itself_is_rejected() {
        let store = store(&["a/x"]);
        assert!(matches!(
            plan_rename(&store, "a", "a/b"),
            Err(PlanError::IntoItself { .. })
        ));
        assert!(matches!(
            plan_rename(&store, "a/", "a"),
            Err(PlanError::IntoItself { .. })
        ));
        assert!(plan_rename(&store, "a", "ab").is_ok());
    }

    #[test]
    fn root_is_rejected() {
        let store = store(&["a"]);
        assert!(matches!(plan_delete(&store, "/"), Err(PlanError::EmptySource)));
        assert!(matches!(plan_delete(&store, ""), Err(PlanError::EmptySource)));
    }

    #[test]
    fn rename_onto_root_is_rejected() {
        let store = store(&["a/", "a/x"]);
        let root = MountContext::default().object_key("/");

        assert!(matches!(
            plan_rename(&store, "a", &root),
            Err(PlanError::EmptyDestination)
        ));
        assert!(matches!(
            plan_rename(&store, "a", "/"),
            Err(PlanError::EmptyDestination)
        ));
    }
}
