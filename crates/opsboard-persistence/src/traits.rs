use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opsboard_core::BoardResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Metadata for persistence operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceMetadata {
    /// Version of the persistence format
    pub format_version: u32,
    /// ID of the process that performed the save
    pub instance_id: Uuid,
    /// When this data was saved
    pub saved_at: DateTime<Utc>,
}

impl PersistenceMetadata {
    pub fn new(instance_id: Uuid) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            instance_id,
            saved_at: Utc::now(),
        }
    }
}

/// Point-in-time snapshot of everything the service holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// JSON bytes of the full state: boards, lists, cards, activities, users
    pub data: Vec<u8>,
    pub metadata: PersistenceMetadata,
}

impl StoreSnapshot {
    pub fn new(data: Vec<u8>, instance_id: Uuid) -> Self {
        Self {
            data,
            metadata: PersistenceMetadata::new(instance_id),
        }
    }
}

/// Storage backend for state snapshots.
///
/// A `save` either lands completely or leaves the previous snapshot intact.
/// Activities already written are never updated or removed by a later save.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Save a snapshot to the store
    async fn save(&self, snapshot: StoreSnapshot) -> BoardResult<PersistenceMetadata>;

    /// Load the current snapshot from the store
    async fn load(&self) -> BoardResult<(StoreSnapshot, PersistenceMetadata)>;

    /// Check if the store has been written to before
    async fn exists(&self) -> bool;

    /// Location of the backing file
    fn path(&self) -> &Path;

    fn instance_id(&self) -> Uuid;
}
