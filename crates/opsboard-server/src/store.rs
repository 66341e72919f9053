use opsboard_core::{BoardResult, ServerConfig, StorageBackend};
use opsboard_persistence::{JsonFileStore, PersistenceStore};
use std::sync::Arc;

/// Open the backend named in `config`.
pub fn open_store(config: &ServerConfig) -> BoardResult<Arc<dyn PersistenceStore>> {
    match config.storage {
        StorageBackend::Json => Ok(Arc::new(JsonFileStore::new(&config.data_file))),
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite => Ok(Arc::new(opsboard_persistence::SqliteStore::new(
            &config.data_file,
        ))),
        #[cfg(not(feature = "sqlite"))]
        StorageBackend::Sqlite => Err(opsboard_core::BoardError::Internal(
            "this build has no SQLite support; rebuild with --features sqlite".to_string(),
        )),
    }
}
