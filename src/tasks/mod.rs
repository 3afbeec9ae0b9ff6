//! Background Tasks Module
//!
//! Contains the background workers that expire cache entries.
//!
//! # Tasks
//! - Aging sweeper: owns the aging list, applies renewals, pops expired keys
//! - TTL cleanup: full periodic scan of the flat store

mod cleanup;
mod sweeper;

pub use cleanup::spawn_cleanup_task;
pub use sweeper::{spawn_sweeper, Evict, Renewal, Sweeper};
