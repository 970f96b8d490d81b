//! Client code for precache.
//!
//! This crate provides the network fetch pipeline and the worker lifecycle
//! (install, activate, cache-first fetch interception) shared by the server.

pub mod fetch;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::{CacheRequest, FetchClient, FetchConfig, FetchResponse, Network};
pub use worker::{
    ActivationReport, ClientId, Clients, InstallReport, Manager, RegisterReport, Registration, ResponseSource, Served,
    WorkerConfig, WorkerState,
};
