//! Maps every subcommand to its handler.
//!
//! ## Structure
//! - **Listing commands**
//!   - `ls`          — directory view of a raw listing
//!   - `plan-rename` — ordered steps for a recursive rename
//!   - `plan-delete` — ordered steps for a recursive delete
//!
//! - **Attribute commands**
//!   - `stat`   — POSIX attributes from response headers
//!   - `member` — group membership of a uid

use crate::{
    config::{AppConfig, Command},
    errors::AppError,
    handlers::{
        attribute_handlers::{check_membership, stat_object},
        listing_handlers::{delete_directory, list_directory, rename_directory},
    },
};
use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

fn to_json<T: Serialize>(reply: T) -> Result<Value, AppError> {
    Ok(serde_json::to_value(reply).context("serializing reply")?)
}

/// Run `command` and return its JSON reply.
///
/// The mount prefix from `cfg` is threaded into every handler that turns
/// filesystem paths into store keys.
pub fn dispatch(cfg: &AppConfig, command: Command) -> Result<Value, AppError> {
    let ctx = cfg.mount_context();
    match command {
        Command::Ls {
            listing,
            dir,
            all,
            slash,
        } => to_json(list_directory(&ctx, &listing, dir.as_deref(), all, slash)?),
        Command::Stat {
            headers,
            path,
            force_dir,
        } => to_json(stat_object(&headers, &path, force_dir)?),
        Command::PlanRename { listing, from, to } => {
            to_json(rename_directory(&ctx, &listing, &from, &to)?)
        }
        Command::PlanDelete { listing, dir } => to_json(delete_directory(&ctx, &listing, &dir)?),
        Command::Member { uid, gid } => to_json(check_membership(uid, gid)?),
    }
}
