//! Maven Central release protocols: staging profile resolution, the legacy
//! Nexus staging-repository workflow, the Central Portal deployment workflow,
//! authentication, and bundle packaging.

pub mod auth;
pub mod bundle;
pub mod client;
pub mod nexus;
pub mod portal;
pub mod profile;
pub mod repository;
