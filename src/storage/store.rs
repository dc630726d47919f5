//! Per-user state store: durable SQLite table plus an in-memory mirror
//!
//! Reads go through the mirror, lazily creating the user's row; writes hit
//! the durable table first and only then update the mirror, so a failed
//! write never leaves the mirror ahead of storage. Updates for the same
//! user are serialized by the dispatcher, so the mutex here only makes the
//! store shareable across handler tasks.

use std::collections::HashMap;
use tokio::sync::Mutex;

use super::db::{get_connection, introspect_columns, DbPool, Table};
use crate::core::{AppError, AppResult};

/// Column-name to value mapping for one user's row in one table
pub type UserData = HashMap<String, Option<String>>;

pub struct UserStore {
    pool: DbPool,
    /// Declared column sets, introspected once at startup
    columns: HashMap<Table, Vec<String>>,
    cache: Mutex<HashMap<(i64, Table), UserData>>,
}

impl UserStore {
    pub fn new(pool: DbPool) -> AppResult<Self> {
        let conn = get_connection(&pool)?;
        let columns = introspect_columns(&conn)?;
        drop(conn);
        Ok(Self {
            pool,
            columns,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Get the user's row as a column→value map, lazily creating the row
    /// (and its mirror entry) if this is the user's first interaction.
    pub async fn get_user_data(&self, user_id: i64, table: Table) -> AppResult<UserData> {
        let mut cache = self.cache.lock().await;
        self.seed_if_missing(&mut cache, user_id, table)?;
        Ok(cache[&(user_id, table)].clone())
    }

    /// Write column values for the user, durable storage first.
    ///
    /// Values are stored as given (callers JSON-encode anchor text). A
    /// change naming an undeclared column is a schema/code mismatch and
    /// fails with [`AppError::Storage`] before anything is written.
    pub async fn set_user_data(&self, user_id: i64, table: Table, changes: &[(&str, &str)]) -> AppResult<()> {
        let declared = self
            .columns
            .get(&table)
            .ok_or_else(|| AppError::Storage(format!("{table} is not a declared user-state table")))?;
        for (column, _) in changes {
            if *column == "user_id" || !declared.iter().any(|c| c == column) {
                return Err(AppError::Storage(format!("{column} is not a writable column of {table}")));
            }
        }
        if changes.is_empty() {
            return Ok(());
        }

        let mut cache = self.cache.lock().await;
        self.seed_if_missing(&mut cache, user_id, table)?;

        let conn = get_connection(&self.pool)?;
        let assignments = changes
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {table} SET {assignments} WHERE user_id = ?");
        let mut params: Vec<&dyn rusqlite::ToSql> = changes.iter().map(|(_, value)| value as &dyn rusqlite::ToSql).collect();
        params.push(&user_id);
        conn.execute(&sql, params.as_slice())?;

        // Mirror update only after the durable write committed
        if let Some(data) = cache.get_mut(&(user_id, table)) {
            for (column, value) in changes {
                data.insert((*column).to_string(), Some((*value).to_string()));
            }
        }
        Ok(())
    }

    fn seed_if_missing(
        &self,
        cache: &mut HashMap<(i64, Table), UserData>,
        user_id: i64,
        table: Table,
    ) -> AppResult<()> {
        if cache.contains_key(&(user_id, table)) {
            return Ok(());
        }

        let names = self
            .columns
            .get(&table)
            .ok_or_else(|| AppError::Storage(format!("{table} is not a declared user-state table")))?;

        let conn = get_connection(&self.pool)?;
        conn.execute(
            &format!("INSERT OR IGNORE INTO {table} (user_id) VALUES (?1)"),
            rusqlite::params![user_id],
        )?;

        let data = conn.query_row(
            &format!("SELECT * FROM {table} WHERE user_id = ?1"),
            rusqlite::params![user_id],
            |row| {
                let mut data = UserData::new();
                for (idx, name) in names.iter().enumerate() {
                    if name == "user_id" {
                        continue;
                    }
                    data.insert(name.clone(), row.get::<_, Option<String>>(idx)?);
                }
                Ok(data)
            },
        )?;

        log::debug!("Seeded state mirror for user {} ({})", user_id, table);
        cache.insert((user_id, table), data);
        Ok(())
    }
}

/// Encode anchor text for a TEXT column (quoted, like the rest of the row)
pub fn encode_anchor(value: &str) -> AppResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decode a stored anchor column. Malformed values are treated as absent,
/// which routes callers into reply-parent recovery instead of failing.
pub fn decode_anchor(data: &UserData, column: &str) -> Option<String> {
    let raw = data.get(column)?.as_deref()?;
    serde_json::from_str::<String>(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::create_pool;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> UserStore {
        let path = dir.path().join("test.sqlite");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        UserStore::new(pool).unwrap()
    }

    #[tokio::test]
    async fn test_first_read_lazily_creates_null_row() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let data = store.get_user_data(42, Table::Users).await.unwrap();
        assert_eq!(data.get("query_pair"), Some(&None));
        assert_eq!(data.get("query_search"), Some(&None));
        assert!(!data.contains_key("user_id"));
    }

    #[tokio::test]
    async fn test_write_through_survives_store_restart() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let encoded = encode_anchor("WBTC/USDC").unwrap();
        store
            .set_user_data(42, Table::Users, &[("query_search", &encoded)])
            .await
            .unwrap();

        // A fresh store over the same file sees the durable value
        let reopened = store_in(&dir);
        let data = reopened.get_user_data(42, Table::Users).await.unwrap();
        assert_eq!(decode_anchor(&data, "query_search").as_deref(), Some("WBTC/USDC"));
        // The other column is untouched
        assert_eq!(data.get("query_pair"), Some(&None));
    }

    #[tokio::test]
    async fn test_unknown_column_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store
            .set_user_data(42, Table::Users, &[("no_such_column", "1")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));

        // The rejected write never touched the mirror or the table
        let data = store.get_user_data(42, Table::Users).await.unwrap();
        assert!(!data.contains_key("no_such_column"));
    }

    #[tokio::test]
    async fn test_user_id_is_not_writable() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store
            .set_user_data(42, Table::Users, &[("user_id", "7")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[tokio::test]
    async fn test_users_do_not_share_state() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let encoded = encode_anchor("PEPE").unwrap();
        store
            .set_user_data(1, Table::Users, &[("query_search", &encoded)])
            .await
            .unwrap();

        let other = store.get_user_data(2, Table::Users).await.unwrap();
        assert_eq!(other.get("query_search"), Some(&None));
    }

    #[test]
    fn test_malformed_stored_anchor_decodes_as_absent() {
        let mut data = UserData::new();
        data.insert("query_search".to_string(), Some("not json".to_string()));
        assert_eq!(decode_anchor(&data, "query_search"), None);

        data.insert("query_search".to_string(), Some("\"WBTC\"".to_string()));
        assert_eq!(decode_anchor(&data, "query_search").as_deref(), Some("WBTC"));
    }
}
