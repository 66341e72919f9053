use crate::traits::{PersistenceMetadata, PersistenceStore, StoreSnapshot, FORMAT_VERSION};
use async_trait::async_trait;
use opsboard_core::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite, SqliteConnection};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

const SCHEMA: &str = include_str!("../schema.sql");
const METADATA_KEY: &str = "snapshot";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotData {
    #[serde(default)]
    boards: Vec<Value>,
    #[serde(default)]
    lists: Vec<Value>,
    #[serde(default)]
    cards: Vec<Value>,
    #[serde(default)]
    activities: Vec<Value>,
    #[serde(default)]
    users: Vec<Value>,
}

fn db_err(e: sqlx::Error) -> BoardError {
    BoardError::Database(e.to_string())
}

fn required_str<'a>(record: &'a Value, key: &str, table: &str) -> BoardResult<&'a str> {
    record[key].as_str().ok_or_else(|| {
        BoardError::Serialization(format!("{} row is missing string field '{}'", table, key))
    })
}

fn required_i64(record: &Value, key: &str, table: &str) -> BoardResult<i64> {
    record[key].as_i64().ok_or_else(|| {
        BoardError::Serialization(format!("{} row is missing integer field '{}'", table, key))
    })
}

/// SQLite-backed store. Boards, lists, cards and users are replaced inside
/// one transaction per save; activities are only ever inserted.
pub struct SqliteStore {
    path: PathBuf,
    instance_id: Uuid,
    pool: tokio::sync::OnceCell<Pool<Sqlite>>,
}

impl SqliteStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_instance_id(path, Uuid::new_v4())
    }

    pub fn with_instance_id(path: impl AsRef<Path>, instance_id: Uuid) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id,
            pool: tokio::sync::OnceCell::new(),
        }
    }

    async fn get_pool(&self) -> BoardResult<&Pool<Sqlite>> {
        self.pool
            .get_or_try_init(|| async {
                let options = SqliteConnectOptions::from_str(&format!(
                    "sqlite://{}?mode=rwc",
                    self.path.display()
                ))
                .map_err(db_err)?
                .create_if_missing(true)
                .foreign_keys(true);

                let pool = SqlitePoolOptions::new()
                    .max_connections(5)
                    .connect_with(options)
                    .await
                    .map_err(|e| BoardError::Connection(e.to_string()))?;

                sqlx::raw_sql(SCHEMA).execute(&pool).await.map_err(db_err)?;
                tracing::debug!("SQLite schema ready at {}", self.path.display());

                Ok(pool)
            })
            .await
    }

    async fn fetch_data(pool: &Pool<Sqlite>, sql: &str) -> BoardResult<Vec<Value>> {
        sqlx::query(sql)
            .fetch_all(pool)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|row| {
                let data: String = row.get("data");
                serde_json::from_str(&data).map_err(BoardError::from)
            })
            .collect()
    }

    async fn replace_aggregates(
        conn: &mut SqliteConnection,
        data: &SnapshotData,
    ) -> BoardResult<()> {
        // Cascades take lists and cards along with their boards.
        for table in ["cards", "lists", "boards", "users"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *conn)
                .await
                .map_err(db_err)?;
        }

        for board in &data.boards {
            sqlx::query("INSERT INTO boards (id, city_id, name, data) VALUES (?, ?, ?, ?)")
                .bind(required_str(board, "id", "boards")?)
                .bind(required_str(board, "city_id", "boards")?)
                .bind(required_str(board, "name", "boards")?)
                .bind(board.to_string())
                .execute(&mut *conn)
                .await
                .map_err(db_err)?;
        }

        for list in &data.lists {
            sqlx::query("INSERT INTO lists (id, board_id, position, data) VALUES (?, ?, ?, ?)")
                .bind(required_str(list, "id", "lists")?)
                .bind(required_str(list, "board_id", "lists")?)
                .bind(required_i64(list, "position", "lists")?)
                .bind(list.to_string())
                .execute(&mut *conn)
                .await
                .map_err(db_err)?;
        }

        for card in &data.cards {
            sqlx::query(
                "INSERT INTO cards (id, list_id, position, invoice, data) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(required_str(card, "id", "cards")?)
            .bind(required_str(card, "list_id", "cards")?)
            .bind(required_i64(card, "position", "cards")?)
            .bind(card["invoice"].as_str())
            .bind(card.to_string())
            .execute(&mut *conn)
            .await
            .map_err(db_err)?;
        }

        for user in &data.users {
            sqlx::query("INSERT INTO users (id, email, data) VALUES (?, ?, ?)")
                .bind(required_str(user, "id", "users")?)
                .bind(required_str(user, "email", "users")?)
                .bind(user.to_string())
                .execute(&mut *conn)
                .await
                .map_err(db_err)?;
        }
        Ok(())
    }

    /// Returns how many activities were new.
    async fn append_activities(
        conn: &mut SqliteConnection,
        activities: &[Value],
    ) -> BoardResult<u64> {
        let mut inserted = 0;
        for activity in activities {
            let result = sqlx::query(
                "INSERT INTO activities (id, sequence, board_id, card_id, created_at, data)
                 VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO NOTHING",
            )
            .bind(required_str(activity, "id", "activities")?)
            .bind(required_i64(activity, "sequence", "activities")?)
            .bind(required_str(activity, "board_id", "activities")?)
            .bind(activity["card_id"].as_str())
            .bind(required_str(activity, "created_at", "activities")?)
            .bind(activity.to_string())
            .execute(&mut *conn)
            .await
            .map_err(db_err)?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }
}

#[async_trait]
impl PersistenceStore for SqliteStore {
    async fn save(&self, mut snapshot: StoreSnapshot) -> BoardResult<PersistenceMetadata> {
        snapshot.metadata.instance_id = self.instance_id;
        snapshot.metadata.saved_at = chrono::Utc::now();
        snapshot.metadata.format_version = FORMAT_VERSION;

        let data: SnapshotData = serde_json::from_slice(&snapshot.data)?;
        let metadata_json = serde_json::to_string(&snapshot.metadata)?;
        let pool = self.get_pool().await?;

        let mut tx = pool.begin().await.map_err(db_err)?;
        Self::replace_aggregates(&mut *tx, &data).await?;
        let appended = Self::append_activities(&mut *tx, &data.activities).await?;
        sqlx::query(
            "INSERT INTO metadata (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(METADATA_KEY)
        .bind(&metadata_json)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;

        tracing::info!(
            boards = data.boards.len(),
            cards = data.cards.len(),
            new_activities = appended,
            "Saved snapshot to {}",
            self.path.display()
        );
        Ok(snapshot.metadata)
    }

    async fn load(&self) -> BoardResult<(StoreSnapshot, PersistenceMetadata)> {
        let pool = self.get_pool().await?;

        let data = SnapshotData {
            boards: Self::fetch_data(pool, "SELECT data FROM boards ORDER BY name, id").await?,
            lists: Self::fetch_data(pool, "SELECT data FROM lists ORDER BY board_id, position")
                .await?,
            cards: Self::fetch_data(pool, "SELECT data FROM cards ORDER BY list_id, position")
                .await?,
            activities: Self::fetch_data(pool, "SELECT data FROM activities ORDER BY sequence")
                .await?,
            users: Self::fetch_data(pool, "SELECT data FROM users ORDER BY email").await?,
        };

        let stored: Option<String> = sqlx::query("SELECT value FROM metadata WHERE key = ?")
            .bind(METADATA_KEY)
            .fetch_optional(pool)
            .await
            .map_err(db_err)?
            .map(|row| row.get("value"));
        let metadata = match stored {
            Some(json) => serde_json::from_str(&json)?,
            None => PersistenceMetadata::new(self.instance_id),
        };

        tracing::info!(
            boards = data.boards.len(),
            activities = data.activities.len(),
            "Loaded snapshot from {}",
            self.path.display()
        );
        let snapshot = StoreSnapshot {
            data: serde_json::to_vec(&data)?,
            metadata: metadata.clone(),
        };
        Ok((snapshot, metadata))
    }

    async fn exists(&self) -> bool {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return false;
        }
        let Ok(pool) = self.get_pool().await else {
            return false;
        };
        sqlx::query("SELECT 1 FROM metadata WHERE key = ?")
            .bind(METADATA_KEY)
            .fetch_optional(pool)
            .await
            .map(|row| row.is_some())
            .unwrap_or(false)
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn instance_id(&self) -> Uuid {
        self.instance_id
    }
}
