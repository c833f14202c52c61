//! The normalization, hierarchy, move-planning and attribute logic.
//!
//! Every structure here is synchronous and owned by a single operation;
//! nothing does I/O except the passwd/group lookups in `membership`.

pub mod attribute_service;
pub mod hierarchy;
pub mod listing_store;
pub mod membership;
pub mod move_set;
pub mod path_util;
pub mod rename_plan;
