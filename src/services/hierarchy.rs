//! Fill in implicit directories for a flat list of object keys.

use std::collections::BTreeMap;
use tracing::debug;

/// Append every missing ancestor directory of `names` to `names`.
///
/// Existing entries are never removed or reordered; new ancestors are
/// appended at the end in byte order, each exactly once, with a trailing
/// `/` when `with_trailing_slash` is set. Afterwards the parent of every
/// non top-level path is present. Running it twice adds nothing.
///
/// Returns the number of directories appended.
pub fn complete_hierarchy(names: &mut Vec<String>, with_trailing_slash: bool) -> usize {
    // path (without trailing slash) -> listed by the caller
    let mut known: BTreeMap<String, bool> = BTreeMap::new();

    for name in names.iter() {
        let mut path = strip_trailing_slash(name);
        known.insert(path.to_string(), true);

        while let Some(pos) = path.rfind('/') {
            path = &path[..pos];
            if path.is_empty() || path == "/" {
                break;
            }
            known.entry(path.to_string()).or_insert(false);
        }
    }

    let before = names.len();
    for (path, listed) in known {
        if listed {
            continue;
        }
        if with_trailing_slash {
            names.push(format!("{}/", path));
        } else {
            names.push(path);
        }
    }

    let added = names.len() - before;
    if added > 0 {
        debug!("completed hierarchy with {} implicit directories", added);
    }
    added
}

fn strip_trailing_slash(name: &str) -> &str {
    if name.len() > 1 && name.ends_with('/') {
        &name[..name.len() - 1]
    } else {
        name
    }
}
