//! Core data records for the listing and attribute layer.
//!
//! These are plain values owned by the services that build them. They
//! serialize naturally as JSON via `serde` so the CLI can print them.

pub mod attributes;
pub mod move_record;
pub mod object;
