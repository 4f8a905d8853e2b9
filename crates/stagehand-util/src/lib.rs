//! Shared utilities for stagehand.
//!
//! This crate provides cross-cutting concerns used by all other stagehand
//! crates: the release error taxonomy, filesystem helpers, archive hashing,
//! and terminal progress indicators.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod progress;
