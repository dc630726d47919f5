use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Result;
use std::collections::HashMap;

/// Tables holding per-user state. Writes naming anything outside this set
/// are rejected by the store as a programming error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
}

impl Table {
    pub const ALL: [Table; 1] = [Table::Users];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::Users => "users",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and bootstraps
/// the schema on the first connection.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder().max_size(10).build(manager)?;

    let conn = pool.get()?;
    if let Err(e) = migrate_schema(&conn) {
        log::error!("Failed to migrate schema: {}", e);
    }

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Ensure all user-state tables exist
///
/// Nullable TEXT columns hold JSON-encoded anchor values; rows are created
/// lazily on a user's first interaction.
pub fn migrate_schema(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY,
            query_pair TEXT,
            query_search TEXT
        )",
        [],
    )?;
    Ok(())
}

/// Introspect the declared column names of every user-state table
///
/// Run once at startup; the resulting sets seed the in-memory mirror for
/// lazily created users and validate writes.
pub fn introspect_columns(conn: &rusqlite::Connection) -> Result<HashMap<Table, Vec<String>>> {
    let mut columns = HashMap::new();
    for table in Table::ALL {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<String>>>()?;
        columns.insert(table, names);
    }
    Ok(columns)
}
