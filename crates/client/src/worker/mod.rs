//! Worker lifecycle and fetch interception.
//!
//! ### Lifecycle
//! - install: open the version's store, precache the manifest as one batch
//! - activate: delete every store but the current one, claim open pages
//! - fetch: cache-first for GET, network fallback, store a copy per policy
//!
//! ### Versions
//! - A newer version installs alongside the active one and waits until no
//!   page uses the old version, unless it skips waiting
//! - Activation of the newer version supersedes the old one

pub mod clients;
pub mod config;
pub mod manager;
pub mod registration;

pub use clients::{ClientId, Clients};
pub use config::WorkerConfig;
pub use manager::{ActivationReport, InstallReport, Manager, ResponseSource, Served, WorkerState};
pub use registration::{RegisterReport, Registration};
