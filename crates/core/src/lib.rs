//! Core types and shared functionality for precache.
//!
//! This crate provides:
//! - Named, versioned cache stores with a SQLite backend
//! - Storage-eligibility policies
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod policy;

pub use cache::{CacheDb, CacheStore, ResponseType, StoredResponse};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use policy::StoragePolicy;
