//! SQLite database for per-object records.

use std::path::Path;

use chrono::{DateTime, Utc};
use common::object::{Metadata, ObjectInfo};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
    Row,
};

use crate::error::Result;

/// What the storage node records about an object when it is written.
#[derive(Debug, Clone)]
pub(crate) struct ObjectRecord {
    pub size: i64,
    pub crc32: u32,
    pub source_ip: String,
    pub created_at: i64,
}

impl ObjectRecord {
    pub fn into_info(self) -> ObjectInfo {
        ObjectInfo {
            size: self.size as u64,
            create_time: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            source_ip_addr: self.source_ip,
            crc32: self.crc32,
        }
    }
}

/// SQLite database connection pool.
#[derive(Debug, Clone)]
pub(crate) struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection from a file path.
    pub async fn new(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Create an in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .journal_mode(SqliteJournalMode::Wal);

        // a single connection that never gets recycled, or the data goes with it
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Insert an object record together with its metadata pairs.
    pub async fn insert_object(
        &self,
        group: &str,
        remote_name: &str,
        record: &ObjectRecord,
        metadata: &Metadata,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO objects (group_name, remote_name, size, crc32, source_ip, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(group)
        .bind(remote_name)
        .bind(record.size)
        .bind(record.crc32 as i64)
        .bind(&record.source_ip)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, (key, value)) in metadata.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO object_metadata (group_name, remote_name, position, meta_key, meta_value)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(group)
            .bind(remote_name)
            .bind(position as i64)
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Get an object record.
    pub async fn get_object(&self, group: &str, remote_name: &str) -> Result<Option<ObjectRecord>> {
        let row = sqlx::query(
            r#"
            SELECT size, crc32, source_ip, created_at
            FROM objects
            WHERE group_name = ? AND remote_name = ?
            "#,
        )
        .bind(group)
        .bind(remote_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ObjectRecord {
            size: r.get("size"),
            crc32: r.get::<i64, _>("crc32") as u32,
            source_ip: r.get("source_ip"),
            created_at: r.get("created_at"),
        }))
    }

    /// Get the metadata pairs of an object in upload order.
    pub async fn get_metadata(&self, group: &str, remote_name: &str) -> Result<Metadata> {
        let rows = sqlx::query(
            r#"
            SELECT meta_key, meta_value
            FROM object_metadata
            WHERE group_name = ? AND remote_name = ?
            ORDER BY position
            "#,
        )
        .bind(group)
        .bind(remote_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| {
                (
                    r.get::<String, _>("meta_key"),
                    r.get::<String, _>("meta_value"),
                )
            })
            .collect())
    }

    /// Delete an object record and its metadata. Returns false if there was no record.
    pub async fn delete_object(&self, group: &str, remote_name: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM object_metadata WHERE group_name = ? AND remote_name = ?
            "#,
        )
        .bind(group)
        .bind(remote_name)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            r#"
            DELETE FROM objects WHERE group_name = ? AND remote_name = ?
            "#,
        )
        .bind(group)
        .bind(remote_name)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
impl Database {
    /// Count objects in a group.
    pub async fn count_objects(&self, group: &str) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as count FROM objects WHERE group_name = ?
            "#,
        )
        .bind(group)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(size: i64) -> ObjectRecord {
        ObjectRecord {
            size,
            crc32: 0xdead_beef,
            source_ip: "10.0.0.5".to_string(),
            created_at: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::in_memory().await.unwrap();
        let meta = Metadata::author("wu").with("height", "20");

        db.insert_object("group1", "M00/00/00/a.txt", &record(5), &meta)
            .await
            .unwrap();

        let found = db
            .get_object("group1", "M00/00/00/a.txt")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.size, 5);
        assert_eq!(found.crc32, 0xdead_beef);

        let info = found.into_info();
        assert_eq!(info.create_time.timestamp(), 1_700_000_000);
        assert_eq!(info.source_ip_addr, "10.0.0.5");

        assert_eq!(
            db.get_metadata("group1", "M00/00/00/a.txt").await.unwrap(),
            meta
        );
        assert_eq!(db.count_objects("group1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::in_memory().await.unwrap();
        db.insert_object("group1", "x", &record(1), &Metadata::author("wu"))
            .await
            .unwrap();

        assert!(db.delete_object("group1", "x").await.unwrap());
        assert!(!db.delete_object("group1", "x").await.unwrap());
        assert!(db.get_object("group1", "x").await.unwrap().is_none());
        assert!(db.get_metadata("group1", "x").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("objects.db");

        {
            let db = Database::new(&path).await.unwrap();
            db.insert_object("group1", "y", &record(9), &Metadata::new())
                .await
                .unwrap();
        }

        let db = Database::new(&path).await.unwrap();
        assert_eq!(db.get_object("group1", "y").await.unwrap().unwrap().size, 9);
    }
}
