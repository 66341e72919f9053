//! The live state shared by every request.
//!
//! Mutations are serialized behind one write lock. Each runs against a
//! cloned draft which is persisted before it replaces the live state, so a
//! rejected operation or a failed save leaves nothing behind.

use opsboard_core::BoardResult;
use opsboard_domain::BoardState;
use opsboard_persistence::{PersistenceStore, StoreSnapshot};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct Workspace {
    state: RwLock<BoardState>,
    store: Arc<dyn PersistenceStore>,
}

impl Workspace {
    pub fn new(state: BoardState, store: Arc<dyn PersistenceStore>) -> Self {
        Self {
            state: RwLock::new(state),
            store,
        }
    }

    /// Open the workspace from `store`, starting empty if nothing was saved yet.
    pub async fn load(store: Arc<dyn PersistenceStore>) -> BoardResult<Self> {
        if !store.exists().await {
            tracing::info!("No saved state at {}, starting empty", store.path().display());
            return Ok(Self::new(BoardState::default(), store));
        }

        let (snapshot, metadata) = store.load().await?;
        let state: BoardState = serde_json::from_slice(&snapshot.data)?;
        tracing::info!(
            boards = state.boards.len(),
            cards = state.cards.len(),
            activities = state.activities.len(),
            saved_at = %metadata.saved_at,
            "Loaded state from {}",
            store.path().display()
        );
        Ok(Self::new(state, store))
    }

    pub async fn read<R>(
        &self,
        query: impl FnOnce(&BoardState) -> BoardResult<R>,
    ) -> BoardResult<R> {
        let state = self.state.read().await;
        query(&state)
    }

    /// Apply one operation as a unit: run, persist, then publish.
    pub async fn mutate<R>(
        &self,
        operation: &str,
        apply: impl FnOnce(&mut BoardState) -> BoardResult<R>,
    ) -> BoardResult<R> {
        let mut live = self.state.write().await;
        let mut draft = live.clone();

        let output = match apply(&mut draft) {
            Ok(output) => output,
            Err(e) => {
                if e.is_client_error() {
                    tracing::warn!(operation, error = %e, "operation rejected");
                } else {
                    tracing::error!(operation, error = %e, "operation failed");
                }
                return Err(e);
            }
        };

        if let Err(e) = self.persist(&draft).await {
            tracing::error!(operation, error = %e, "failed to persist, changes discarded");
            return Err(e);
        }

        let appended = draft.activities.len() - live.activities.len();
        *live = draft;
        tracing::info!(operation, activities = appended, "operation committed");
        Ok(output)
    }

    async fn persist(&self, state: &BoardState) -> BoardResult<()> {
        let data = serde_json::to_vec(state)?;
        self.store
            .save(StoreSnapshot::new(data, self.store.instance_id()))
            .await?;
        Ok(())
    }

    pub fn store(&self) -> &dyn PersistenceStore {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsboard_domain::{Role, User};
    use opsboard_persistence::JsonFileStore;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_mutation_is_persisted_and_reloaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("opsboard.json");
        let workspace = Workspace::load(Arc::new(JsonFileStore::new(&path))).await.unwrap();

        workspace
            .mutate("add user", |state| {
                state.add_user(User::new("A".into(), "a@example.com".into(), Role::Admin))
            })
            .await
            .unwrap();

        let reopened = Workspace::load(Arc::new(JsonFileStore::new(&path))).await.unwrap();
        let users = reopened.read(|s| Ok(s.users.len())).await.unwrap();
        assert_eq!(users, 1);
    }

    #[tokio::test]
    async fn test_rejected_mutation_leaves_state_alone() {
        let dir = tempdir().unwrap();
        let workspace =
            Workspace::load(Arc::new(JsonFileStore::new(dir.path().join("s.json")))).await.unwrap();

        let result = workspace
            .mutate("add user", |state| {
                state.add_user(User::new("A".into(), "a@example.com".into(), Role::Admin))?;
                state.add_user(User::new("B".into(), "A@example.com".into(), Role::User))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(workspace.read(|s| Ok(s.users.len())).await.unwrap(), 0);
        assert!(!workspace.store().exists().await);
    }
}
