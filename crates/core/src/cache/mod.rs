//! SQLite-backed named cache stores.
//!
//! Each store maps a normalized request (method + URL) to a response
//! snapshot. The store name carries the worker version, so bumping the
//! version yields a fresh, empty store.
//!
//! - Get-or-create store handles, enumeration and deletion (`stores`)
//! - Entry lookup, upsert and atomic batch writes (`entries`)
//! - Automatic schema migrations, WAL mode

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{CacheStore, ResponseType, StoredResponse};
