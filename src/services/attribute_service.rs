//! Translate object-store response headers into POSIX attributes.
//!
//! All numeric fields are parsed as base-10 unsigned integers; anything
//! malformed or missing becomes 0. A 0 coming out of these functions is
//! therefore not a trustworthy "set" value.

use crate::models::attributes::{FileAttributes, Headers};
use chrono::{DateTime, NaiveDateTime};

pub const META_MODE: &str = "x-amz-meta-mode";
pub const META_UID: &str = "x-amz-meta-uid";
pub const META_GID: &str = "x-amz-meta-gid";
pub const META_MTIME: &str = "x-amz-meta-mtime";

// Written by s3sync.
pub const LEGACY_META_PERMISSIONS: &str = "x-amz-meta-permissions";
pub const LEGACY_META_OWNER: &str = "x-amz-meta-owner";
pub const LEGACY_META_GROUP: &str = "x-amz-meta-group";

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const LAST_MODIFIED: &str = "Last-Modified";

pub const DIRECTORY_CONTENT_TYPE: &str = "application/x-directory";
const BINARY_CONTENT_TYPES: [&str; 2] = ["binary/octet-stream", "application/octet-stream"];

const S_IFMT: u32 = libc::S_IFMT as u32;
const S_IFDIR: u32 = libc::S_IFDIR as u32;
const S_IFREG: u32 = libc::S_IFREG as u32;

const BLOCK_SIZE: u64 = 512;

/// `strtoul(s, NULL, 10)`: leading whitespace, optional `+`, then as many
/// digits as there are. No digits yields 0; overflow saturates.
fn parse_unsigned(value: &str) -> u64 {
    let trimmed = value.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
        })
}

fn header_value<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers.get(name).map(String::as_str)
}

/// File mode for an object.
///
/// `x-amz-meta-mode` wins over the legacy `x-amz-meta-permissions`. With
/// the legacy field the type bits are taken as stored, except that they
/// are stripped when `check_dir` is false. Otherwise, with `check_dir`, the
/// type bit is synthesized: `force_dir` or a directory content type gives
/// `S_IFDIR`, a path ending in `/` with a generic binary content type also
/// gives `S_IFDIR`, and everything else is `S_IFREG`.
pub fn mode(headers: &Headers, path: &str, check_dir: bool, force_dir: bool) -> u32 {
    let (mut mode, legacy) = match header_value(headers, META_MODE) {
        Some(value) => (parse_unsigned(value) as u32, false),
        None => match header_value(headers, LEGACY_META_PERMISSIONS) {
            Some(value) => (parse_unsigned(value) as u32, true),
            None => (0, false),
        },
    };

    if legacy {
        if !check_dir {
            mode &= !(S_IFDIR | S_IFREG);
        }
        return mode;
    }

    if check_dir {
        mode |= if force_dir || is_directory_content(headers, path) {
            S_IFDIR
        } else {
            S_IFREG
        };
    }
    mode
}

fn is_directory_content(headers: &Headers, path: &str) -> bool {
    match header_value(headers, CONTENT_TYPE) {
        Some(DIRECTORY_CONTENT_TYPE) => true,
        // Older tools wrote directory placeholders as untyped binary objects
        // whose key ends in `/`.
        Some(content_type) if path.ends_with('/') => BINARY_CONTENT_TYPES.contains(&content_type),
        _ => false,
    }
}

/// Owner uid, falling back to the legacy `x-amz-meta-owner`.
pub fn uid(headers: &Headers) -> u32 {
    header_value(headers, META_UID)
        .or_else(|| header_value(headers, LEGACY_META_OWNER))
        .map_or(0, |value| parse_unsigned(value) as u32)
}

/// Group gid, falling back to the legacy `x-amz-meta-group`.
pub fn gid(headers: &Headers) -> u32 {
    header_value(headers, META_GID)
        .or_else(|| header_value(headers, LEGACY_META_GROUP))
        .map_or(0, |value| parse_unsigned(value) as u32)
}

/// Modification time from `x-amz-meta-mtime`, or from `Last-Modified` when
/// `fallback_to_last_modified` is set and the meta field is absent.
pub fn mtime(headers: &Headers, fallback_to_last_modified: bool) -> i64 {
    match header_value(headers, META_MTIME) {
        Some(value) => parse_unsigned(value) as i64,
        None if fallback_to_last_modified => last_modified_from_headers(headers),
        None => 0,
    }
}

pub fn size(headers: &Headers) -> u64 {
    header_value(headers, CONTENT_LENGTH).map_or(0, parse_unsigned)
}

/// 512-byte blocks for `size`; never less than one.
pub fn block_count(size: u64) -> u64 {
    size / BLOCK_SIZE + 1
}

/// Parse an RFC 1123 timestamp (`Sun, 06 Nov 1994 08:49:37 GMT`) into
/// seconds since the epoch. Anything unparseable is 0.
pub fn last_modified(value: &str) -> i64 {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return parsed.timestamp();
    }
    NaiveDateTime::parse_from_str(value, "%a, %d %b %Y %H:%M:%S GMT")
        .map(|naive| naive.and_utc().timestamp())
        .unwrap_or(0)
}

pub fn last_modified_from_headers(headers: &Headers) -> i64 {
    header_value(headers, LAST_MODIFIED).map_or(0, last_modified)
}

impl FileAttributes {
    /// Stat fields for the object at `path`, as getattr reports them.
    pub fn from_headers(headers: &Headers, path: &str, force_dir: bool) -> Self {
        let size = size(headers);
        let mut mode = mode(headers, path, true, force_dir);
        // Legacy permissions may carry no type bits at all.
        if mode & S_IFMT == 0 {
            mode |= if force_dir { S_IFDIR } else { S_IFREG };
        }
        Self {
            mode,
            uid: uid(headers),
            gid: gid(headers),
            mtime: mtime(headers, true),
            size,
            blocks: block_count(size),
        }
    }
}
