use crate::store::atomic_writer::AtomicWriter;
use crate::traits::{PersistenceMetadata, PersistenceStore, StoreSnapshot, FORMAT_VERSION};
use opsboard_core::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// JSON file-based persistence store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    instance_id: Uuid,
}

/// On-disk wrapper around the state.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: PersistenceMetadata,
    pub data: serde_json::Value,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_instance_id(path, Uuid::new_v4())
    }

    pub fn with_instance_id(path: impl AsRef<Path>, instance_id: Uuid) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id,
        }
    }

    /// Parse file contents. A bare state object without the envelope (as
    /// written by hand or by early tooling) is accepted and wrapped.
    fn parse(&self, bytes: &[u8]) -> BoardResult<JsonEnvelope> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if value.get("version").is_some() && value.get("data").is_some() {
            let envelope: JsonEnvelope = serde_json::from_value(value)?;
            if envelope.version > FORMAT_VERSION {
                return Err(BoardError::Serialization(format!(
                    "Unsupported format version: {}",
                    envelope.version
                )));
            }
            return Ok(envelope);
        }

        tracing::info!(
            "No envelope found in {}; treating contents as bare state",
            self.path.display()
        );
        Ok(JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: PersistenceMetadata::new(self.instance_id),
            data: value,
        })
    }
}

#[async_trait::async_trait]
impl PersistenceStore for JsonFileStore {
    async fn save(&self, mut snapshot: StoreSnapshot) -> BoardResult<PersistenceMetadata> {
        snapshot.metadata.instance_id = self.instance_id;
        snapshot.metadata.saved_at = chrono::Utc::now();
        snapshot.metadata.format_version = FORMAT_VERSION;

        let envelope = JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: snapshot.metadata.clone(),
            data: serde_json::from_slice(&snapshot.data)?,
        };
        let json_bytes = serde_json::to_vec_pretty(&envelope)?;

        AtomicWriter::write_atomic(&self.path, &json_bytes).await?;

        tracing::info!("Saved {} bytes to {}", json_bytes.len(), self.path.display());
        Ok(snapshot.metadata)
    }

    async fn load(&self) -> BoardResult<(StoreSnapshot, PersistenceMetadata)> {
        let file_bytes = AtomicWriter::read_all(&self.path).await?;
        let envelope = self.parse(&file_bytes)?;

        let snapshot = StoreSnapshot {
            data: serde_json::to_vec(&envelope.data)?,
            metadata: envelope.metadata.clone(),
        };

        tracing::info!(
            "Loaded {} bytes from {}",
            file_bytes.len(),
            self.path.display()
        );
        Ok((snapshot, envelope.metadata))
    }

    async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn instance_id(&self) -> Uuid {
        self.instance_id
    }
}
