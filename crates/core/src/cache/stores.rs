//! Store-level operations: open, enumerate and delete named stores.

use super::connection::CacheDb;
use super::entries::CacheStore;
use crate::Error;
use tokio_rusqlite::params;

impl CacheDb {
    /// Open the store called `name`, creating it if it does not exist.
    ///
    /// Opening an existing store never touches its entries.
    pub async fn open_store(&self, name: &str) -> Result<CacheStore, Error> {
        if name.is_empty() {
            return Err(Error::InvalidInput("store name cannot be empty".into()));
        }

        let owned = name.to_string();
        let created = self
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let changed = conn.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![owned, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(changed > 0)
            })
            .await
            .map_err(Error::from)?;

        if created {
            tracing::debug!(store = name, "created cache store");
        }

        Ok(CacheStore::new(self.clone(), name.to_string()))
    }

    /// Check whether a store exists.
    pub async fn has_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM cache_stores WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all stores, oldest first.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and every entry in it.
    ///
    /// Returns false if no store had that name.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}
