//! Handlers for stat attributes and group membership.

use crate::{errors::AppError, handlers::input::read_headers};
use bucket_tree::{FileAttributes, is_member};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct StatReply {
    pub path: String,
    pub is_dir: bool,
    #[serde(flatten)]
    pub attributes: FileAttributes,
}

#[derive(Debug, Serialize)]
pub struct MemberReply {
    pub uid: u32,
    pub gid: u32,
    pub member: bool,
}

/// `stat`: attributes for the object whose response headers are in `headers`.
pub fn stat_object(headers: &Path, path: &str, force_dir: bool) -> Result<StatReply, AppError> {
    let headers = read_headers(headers)?;
    let attributes = FileAttributes::from_headers(&headers, path, force_dir);
    Ok(StatReply {
        path: path.to_string(),
        is_dir: attributes.is_dir(),
        attributes,
    })
}

/// `member`: whether `uid` is listed in group `gid`. Lookup failures are
/// errors, never a "no".
pub fn check_membership(uid: u32, gid: u32) -> Result<MemberReply, AppError> {
    let member = is_member(uid, gid).map_err(|err| {
        tracing::warn!("membership check for uid {} in gid {} failed: {}", uid, gid, err);
        AppError::from(err)
    })?;
    Ok(MemberReply { uid, gid, member })
}
