//! Core data types for stagehand.
//!
//! This crate defines the values that flow between a build host and the
//! release machinery: Maven coordinates, global configuration, resolved
//! credentials, `.stagehand.env` properties, and the build-wide outcome flag.
//!
//! This crate is intentionally free of async code and network I/O.

pub mod config;
pub mod coordinates;
pub mod credentials;
pub mod outcome;
pub mod properties;
