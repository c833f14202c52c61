//! Handlers for directory listings and recursive rename/delete plans.
//! All paths given on the command line are filesystem paths; they go
//! through the mount prefix before being compared with store keys.

use crate::{errors::AppError, handlers::input::read_listing};
use bucket_tree::{ListingStore, MountContext, Plan, complete_hierarchy, plan_delete, plan_rename};
use serde::Serialize;
use std::path::Path;

/// One name in a directory listing.
#[derive(Debug, Serialize)]
pub struct ListedEntry {
    pub name: String,
    pub is_dir: bool,
    pub etag: String,
}

#[derive(Debug, Serialize)]
pub struct ListReply {
    /// Store key prefix that was listed (empty for the whole bucket).
    pub prefix: String,
    pub entries: Vec<ListedEntry>,
}

fn load_store(listing: &Path) -> Result<ListingStore, AppError> {
    let entries = read_listing(listing)?;
    Ok(ListingStore::from_entries(&entries))
}

/// Directory flag and etag for a listed name. The `name/` marker wins over
/// `name`, which may only be an alias of it. Names the store never saw are
/// implicit directories.
fn describe(store: &ListingStore, key: &str) -> (bool, String) {
    let marker = if key.ends_with('/') {
        None
    } else {
        store.get_entry(&format!("{}/", key))
    };
    let entry = marker.or_else(|| store.get_entry(key));
    match entry {
        Some(entry) => (entry.is_dir, entry.etag.clone()),
        None => (true, String::new()),
    }
}

/// `ls`: everything below `dir` (or the whole mount), implicit directories
/// included, sorted by name.
pub fn list_directory(
    ctx: &MountContext,
    listing: &Path,
    dir: Option<&str>,
    include_aliases: bool,
    with_slash: bool,
) -> Result<ListReply, AppError> {
    let store = load_store(listing)?;

    let prefix = match dir {
        Some(dir) => ctx.object_key(dir).trim_end_matches('/').to_string(),
        None => ctx.object_key("").trim_end_matches('/').to_string(),
    };
    let base = if prefix.is_empty() {
        String::new()
    } else {
        format!("{}/", prefix)
    };

    let mut names: Vec<String> = store
        .extract_names(!include_aliases, !with_slash)
        .filter_map(|name| {
            name.strip_prefix(base.as_str())
                .filter(|rest| !rest.is_empty() && *rest != "/")
                .map(str::to_string)
        })
        .collect();
    complete_hierarchy(&mut names, with_slash);
    names.sort();

    let entries = names
        .into_iter()
        .map(|name| {
            let key = format!("{}{}", base, name);
            let (is_dir, etag) = describe(&store, &key);
            ListedEntry { name, is_dir, etag }
        })
        .collect();

    Ok(ListReply { prefix, entries })
}

/// `plan-rename`: ordered steps to move directory `from` to `to`.
pub fn rename_directory(
    ctx: &MountContext,
    listing: &Path,
    from: &str,
    to: &str,
) -> Result<Plan, AppError> {
    let store = load_store(listing)?;
    let plan = plan_rename(&store, &ctx.object_key(from), &ctx.object_key(to))?;
    tracing::info!("planned rename {} -> {} in {} steps", from, to, plan.steps.len());
    Ok(plan)
}

/// `plan-delete`: ordered steps to remove directory `dir` and its contents.
pub fn delete_directory(ctx: &MountContext, listing: &Path, dir: &str) -> Result<Plan, AppError> {
    let store = load_store(listing)?;
    let plan = plan_delete(&store, &ctx.object_key(dir))?;
    tracing::info!("planned delete of {} in {} steps", dir, plan.steps.len());
    Ok(plan)
}
