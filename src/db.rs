use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name of the SQLite index inside the persist directory.
pub const INDEX_FILE: &str = "index.sqlite";

pub fn index_path(persist_dir: &Path) -> PathBuf {
    persist_dir.join(INDEX_FILE)
}

/// Open the index database under `persist_dir`.
///
/// With `create` the directory and file are created when missing;
/// without it a missing file is an error, so a load never silently
/// produces an empty index.
pub async fn connect(persist_dir: &Path, create: bool) -> Result<SqlitePool> {
    let db_path = index_path(persist_dir);

    if create {
        std::fs::create_dir_all(persist_dir)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(create)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await?;

    Ok(pool)
}
