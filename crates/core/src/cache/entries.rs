//! Entry operations inside one named store.
//!
//! Only `GET` requests are stored. Writes are upserts keyed by
//! [`compute_request_key`], so concurrent writers to the same request
//! resolve to the last write.

use std::fmt;
use std::str::FromStr;

use super::connection::CacheDb;
use super::hash::compute_request_key;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{
    self, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};

/// How the response relates to the app origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response.
    Basic,
    /// Cross-origin response readable by the app.
    Cors,
    /// Cross-origin response the app may not inspect.
    Opaque,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Opaque => "opaque",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(ResponseType::Basic),
            "cors" => Ok(ResponseType::Cors),
            "opaque" => Ok(ResponseType::Opaque),
            other => Err(Error::CorruptEntry(format!("unknown response type: {other}"))),
        }
    }
}

impl ToSql for ResponseType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ResponseType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|_| FromSqlError::InvalidType)
    }
}

/// A stored response snapshot.
///
/// This is the copy written to the store; the response handed back to the
/// caller is never the same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StoredResponse {
    pub method: String,
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub response_type: ResponseType,
    pub content_type: Option<String>,
    /// JSON list of `[name, value]` pairs.
    pub headers_json: String,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl StoredResponse {
    /// Store key for this entry's request.
    pub fn key(&self) -> String {
        compute_request_key(&self.method, &self.url)
    }

    /// Decode the stored header list.
    pub fn headers(&self) -> Result<Vec<(String, String)>, Error> {
        serde_json::from_str(&self.headers_json).map_err(|e| Error::CorruptEntry(format!("headers for {}: {e}", self.url)))
    }

    fn check_cacheable(&self) -> Result<(), Error> {
        if !self.method.eq_ignore_ascii_case("GET") {
            return Err(Error::NotCacheable(format!("{} {}: only GET requests are stored", self.method, self.url)));
        }
        if self.status == 206 {
            return Err(Error::NotCacheable(format!("{}: partial content responses are not stored", self.url)));
        }
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            method: row.get(0)?,
            url: row.get(1)?,
            final_url: row.get(2)?,
            status: row.get(3)?,
            response_type: row.get(4)?,
            content_type: row.get(5)?,
            headers_json: row.get(6)?,
            body: row.get(7)?,
            stored_at: row.get(8)?,
        })
    }
}

fn insert_entry(conn: &rusqlite::Connection, store: &str, entry: &StoredResponse) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO cache_entries (
            store, key_hash, method, url, final_url, status, response_type,
            content_type, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(store, key_hash) DO UPDATE SET
            final_url = excluded.final_url,
            status = excluded.status,
            response_type = excluded.response_type,
            content_type = excluded.content_type,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            store,
            entry.key(),
            entry.method.to_ascii_uppercase(),
            &entry.url,
            &entry.final_url,
            entry.status,
            entry.response_type,
            &entry.content_type,
            &entry.headers_json,
            &entry.body,
            &entry.stored_at,
        ],
    )?;
    Ok(())
}

/// Handle to one named store.
#[derive(Clone, Debug)]
pub struct CacheStore {
    db: CacheDb,
    name: String,
}

impl CacheStore {
    pub(crate) fn new(db: CacheDb, name: String) -> Self {
        Self { db, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a request.
    ///
    /// Non-GET requests never match.
    pub async fn match_request(&self, method: &str, url: &str) -> Result<Option<StoredResponse>, Error> {
        if !method.eq_ignore_ascii_case("GET") {
            return Ok(None);
        }

        let store = self.name.clone();
        let key = compute_request_key(method, url);
        self.db
            .conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, final_url, status, response_type,
                        content_type, headers_json, body, stored_at
                    FROM cache_entries WHERE store = ?1 AND key_hash = ?2",
                )?;

                match stmt.query_row(params![store, key], StoredResponse::from_row) {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace one entry.
    ///
    /// Fails if the store has been deleted since this handle was opened.
    pub async fn put(&self, entry: &StoredResponse) -> Result<(), Error> {
        entry.check_cacheable()?;

        let store = self.name.clone();
        let entry = entry.clone();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> { insert_entry(conn, &store, &entry) })
            .await
            .map_err(Error::from)
    }

    /// Write a batch of entries atomically.
    ///
    /// Either every entry is written or none is.
    pub async fn put_all(&self, entries: &[StoredResponse]) -> Result<usize, Error> {
        for entry in entries {
            entry.check_cacheable()?;
        }

        let store = self.name.clone();
        let entries = entries.to_vec();
        self.db
            .conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                for entry in &entries {
                    insert_entry(&tx, &store, entry)?;
                }
                tx.commit()?;
                Ok(entries.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Remove the GET entry for `url`. Returns whether anything was removed.
    pub async fn delete(&self, url: &str) -> Result<bool, Error> {
        let store = self.name.clone();
        let key = compute_request_key("GET", url);
        self.db
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM cache_entries WHERE store = ?1 AND key_hash = ?2",
                    params![store, key],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Request URLs in this store, in insertion order.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM cache_entries WHERE store = ?1 ORDER BY rowid ASC")?;
                let urls = stmt
                    .query_map(params![store], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in this store.
    pub async fn len(&self) -> Result<usize, Error> {
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<usize, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cache_entries WHERE store = ?1", params![store], |row| {
                        row.get(0)
                    })?;
                Ok(count as usize)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }
}
