//! Listing normalization and POSIX attribute translation for filesystems
//! mounted on top of a flat object store.

pub mod models;
pub mod services;

pub use models::{
    attributes::{FileAttributes, Headers},
    move_record::{MoveId, MoveRecord},
    object::{ObjectEntry, RawListingEntry},
};
pub use services::{
    hierarchy::complete_hierarchy,
    listing_store::ListingStore,
    membership::{MembershipError, is_member},
    move_set::{MoveSet, MoveSetError},
    path_util::MountContext,
    rename_plan::{Plan, PlanError, PlanStep, plan_delete, plan_rename},
};
