use opsboard_core::{BoardError, BoardResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Writes files through a temp file in the same directory followed by a
/// rename, so readers only ever see the old or the new content.
pub struct AtomicWriter;

impl AtomicWriter {
    pub async fn write_atomic(path: &Path, data: &[u8]) -> BoardResult<()> {
        let target: PathBuf = path.to_path_buf();
        let bytes = data.to_vec();
        let len = bytes.len();

        tokio::task::spawn_blocking(move || -> BoardResult<()> {
            let parent = match target.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            std::fs::create_dir_all(&parent)?;
            let mut temp = tempfile::NamedTempFile::new_in(&parent)?;
            temp.write_all(&bytes)?;
            temp.as_file().sync_all()?;
            temp.persist(&target).map_err(|e| BoardError::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| BoardError::Internal(format!("write task failed: {}", e)))??;

        tracing::debug!("Atomically wrote {} bytes to {}", len, path.display());
        Ok(())
    }

    pub async fn read_all(path: &Path) -> BoardResult<Vec<u8>> {
        let data = fs::read(path).await?;
        tracing::debug!("Read {} bytes from {}", data.len(), path.display());
        Ok(data)
    }
}
