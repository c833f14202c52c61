//! Reading command inputs from files or stdin.

use anyhow::{Context, Result};
use bucket_tree::{Headers, RawListingEntry};
use serde::de::DeserializeOwned;
use std::{
    fs,
    io::{self, Read},
    path::Path,
};

/// Read `path` as text; `-` means stdin.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).with_context(|| format!("parsing JSON from {}", path.display()))
}

/// A listing file: a JSON array of raw listing hits.
pub fn read_listing(path: &Path) -> Result<Vec<RawListingEntry>> {
    let entries: Vec<RawListingEntry> = read_json(path)?;
    tracing::debug!("read {} listing hits from {}", entries.len(), path.display());
    Ok(entries)
}

/// A headers file: a JSON object of header name to string value.
pub fn read_headers(path: &Path) -> Result<Headers> {
    read_json(path)
}
