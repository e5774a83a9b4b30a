//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. `DatabasePool` keeps a
//! multi-connection reader pool for concurrent reads and a single-connection
//! writer pool for serialized writes.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

/// Where a `DATABASE_URL` points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

/// Parse a SQLAlchemy-style SQLite URL.
///
/// - `sqlite:////abs/path.db` is the absolute path `/abs/path.db`
/// - `sqlite:///rel/path.db` is the relative path `rel/path.db`
/// - `sqlite://path.db` and `sqlite:path.db` are relative too
/// - `sqlite::memory:`, `sqlite://` and `sqlite:///:memory:` are in-memory
///
/// Query parameters (`?mode=rwc`) are ignored.
pub fn parse_database_url(url: &str) -> Result<DatabaseLocation, sqlx::Error> {
    let rest = url.trim().strip_prefix("sqlite:").ok_or_else(|| {
        sqlx::Error::Configuration(format!("not a sqlite URL: {url}").into())
    })?;
    let rest = rest.split_once('?').map_or(rest, |(path, _)| path);

    let path = rest
        .strip_prefix("///")
        .or_else(|| rest.strip_prefix("//"))
        .unwrap_or(rest);

    if path.is_empty() || path == ":memory:" {
        return Ok(DatabaseLocation::Memory);
    }
    Ok(DatabaseLocation::File(PathBuf::from(path)))
}

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: Multi-connection pool (up to 8) for concurrent SELECT queries.
/// - `writer`: Single-connection pool for serialized INSERT/UPDATE/DELETE.
///
/// For in-memory databases both handles share the writer's single
/// connection, since each connection would otherwise see its own database.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open (creating if needed) the database at `database_url` and run
    /// migrations on the writer before the reader pool is opened.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let location = parse_database_url(database_url)?;

        let base_opts = match &location {
            DatabaseLocation::Memory => SqliteConnectOptions::from_str("sqlite::memory:")?,
            DatabaseLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                SqliteConnectOptions::new()
                    .filename(path)
                    .journal_mode(SqliteJournalMode::Wal)
                    .create_if_missing(true)
            }
        }
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

        let writer = match &location {
            DatabaseLocation::Memory => SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None),
            DatabaseLocation::File(_) => SqlitePoolOptions::new().max_connections(1),
        }
        .connect_with(base_opts.clone())
        .await?;

        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = match &location {
            DatabaseLocation::Memory => writer.clone(),
            DatabaseLocation::File(_) => {
                SqlitePoolOptions::new()
                    .max_connections(8)
                    .connect_with(base_opts.read_only(true))
                    .await?
            }
        };

        info!(location = ?location, "database ready");
        Ok(Self { reader, writer })
    }
}
