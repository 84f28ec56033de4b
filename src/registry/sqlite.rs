//! SQLite-backed symbol registry

use super::{RecordUpdate, StorageError, SymbolRegistry, TrackedSymbol};
use crate::config::StorageConfig;
use crate::quote::QuoteSnapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{FromRow, Row};
use std::path::PathBuf;
use std::str::FromStr;

const SELECT_COLUMNS: &str = "id, symbol, price, market_cap, currency, updated_at";

/// Symbol registry stored in a single SQLite table
#[derive(Clone)]
pub struct SqliteRegistry {
    pool: SqlitePool,
}

impl SqliteRegistry {
    /// Open (creating if needed) the database at `database_url`
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let in_memory = is_memory_url(database_url);
        if !in_memory {
            prepare_sqlite_path(database_url)?;
        }

        let mut options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // Every connection to :memory: is its own database, so keep exactly one alive
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_with(options)
                .await?
        };

        let registry = Self { pool };
        registry.init_schema().await?;

        tracing::info!(database_url, "Symbol registry ready");
        Ok(registry)
    }

    /// Open the registry described by the storage config
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        Self::connect(&config.database_url, config.max_connections).await
    }

    /// Fresh private in-memory registry
    pub async fn in_memory() -> Result<Self, StorageError> {
        Self::connect("sqlite::memory:", 1).await
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS tracked_symbols (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL UNIQUE,
                price REAL,
                market_cap INTEGER,
                currency TEXT,
                previous_price REAL,
                updated_at TEXT NOT NULL
            )"#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SymbolRegistry for SqliteRegistry {
    async fn upsert(
        &self,
        symbol: &str,
        snapshot: &QuoteSnapshot,
    ) -> Result<TrackedSymbol, StorageError> {
        let symbol = symbol.trim().to_ascii_uppercase();

        // Absent snapshot fields keep whatever is stored
        let record = sqlx::query_as::<_, TrackedSymbol>(&format!(
            r#"INSERT INTO tracked_symbols (symbol, price, market_cap, currency, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(symbol) DO UPDATE SET
                previous_price = tracked_symbols.price,
                price = COALESCE(excluded.price, tracked_symbols.price),
                market_cap = COALESCE(excluded.market_cap, tracked_symbols.market_cap),
                currency = COALESCE(excluded.currency, tracked_symbols.currency),
                updated_at = excluded.updated_at
            RETURNING {SELECT_COLUMNS}"#
        ))
        .bind(&symbol)
        .bind(snapshot.price)
        .bind(snapshot.market_cap)
        .bind(snapshot.currency.as_deref())
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(record)
    }

    async fn update_existing(
        &self,
        symbol: &str,
        snapshot: &QuoteSnapshot,
    ) -> Result<Option<RecordUpdate>, StorageError> {
        // Right-hand sides see the row as it was before this statement
        let row = sqlx::query(&format!(
            r#"UPDATE tracked_symbols SET
                previous_price = price,
                price = COALESCE(?, price),
                market_cap = COALESCE(?, market_cap),
                currency = COALESCE(?, currency),
                updated_at = ?
            WHERE symbol = ?
            RETURNING previous_price, {SELECT_COLUMNS}"#
        ))
        .bind(snapshot.price)
        .bind(snapshot.market_cap)
        .bind(snapshot.currency.as_deref())
        .bind(Utc::now().to_rfc3339())
        .bind(symbol.trim().to_ascii_uppercase())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let previous_price = row.try_get("previous_price")?;
        let record = TrackedSymbol::from_row(&row).map_err(storage_error)?;
        Ok(Some(RecordUpdate {
            previous_price,
            record,
        }))
    }

    async fn remove(&self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM tracked_symbols WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<TrackedSymbol>, StorageError> {
        let records = sqlx::query_as::<_, TrackedSymbol>(&format!(
            "SELECT {SELECT_COLUMNS} FROM tracked_symbols ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(records)
    }

    async fn get(&self, symbol: &str) -> Result<Option<TrackedSymbol>, StorageError> {
        let record = sqlx::query_as::<_, TrackedSymbol>(&format!(
            "SELECT {SELECT_COLUMNS} FROM tracked_symbols WHERE symbol = ?"
        ))
        .bind(symbol.trim().to_ascii_uppercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(record)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

impl FromRow<'_, SqliteRow> for TrackedSymbol {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let updated_at: String = row.try_get("updated_at")?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map_err(|err| sqlx::Error::ColumnDecode {
                index: "updated_at".into(),
                source: Box::new(err),
            })?
            .with_timezone(&Utc);

        Ok(TrackedSymbol {
            id: row.try_get("id")?,
            symbol: row.try_get("symbol")?,
            price: row.try_get("price")?,
            market_cap: row.try_get("market_cap")?,
            currency: row.try_get("currency")?,
            updated_at,
        })
    }
}

/// Rows that fail to decode are reported as corrupt rather than as driver errors
fn storage_error(err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::ColumnDecode { index, source } => {
            StorageError::Corrupt(format!("column {}: {}", index, source))
        }
        other => StorageError::Database(other),
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Create the parent directory of a file-backed database
fn prepare_sqlite_path(database_url: &str) -> Result<(), StorageError> {
    let path_part = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path_part = path_part.split('?').next().unwrap_or_default();
    if path_part.is_empty() {
        return Ok(());
    }

    let fs_path = PathBuf::from(path_part);
    if let Some(parent) = fs_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(())
}
