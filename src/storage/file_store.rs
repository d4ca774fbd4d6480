use crate::{error::Result, storage::Storage};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-backed storage: the whole board as one JSON document under a
/// `.studyboard` directory in the project root
pub struct FileStore {
    root_path: PathBuf,
}

impl FileStore {
    const STUDYBOARD_DIR: &'static str = ".studyboard";
    const BOARD_FILE: &'static str = "board.json";

    /// Creates a new FileStore for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::STUDYBOARD_DIR),
        }
    }

    fn board_file(&self) -> PathBuf {
        self.root_path.join(Self::BOARD_FILE)
    }

    async fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_path.exists() {
            fs::create_dir_all(&self.root_path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&board_file).await?;
        Ok(Some(bytes))
    }

    async fn save(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_directory_exists().await?;
        fs::write(self.board_file(), bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_before_any_save_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        store.save(b"{}").await.unwrap();

        let board_file = temp_dir.path().join(".studyboard").join("board.json");
        assert!(board_file.exists());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        store.save(b"first").await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(b"first".to_vec()));

        store.save(b"second").await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_separate_stores_share_the_same_file() {
        let temp_dir = TempDir::new().unwrap();

        let writer = FileStore::new(temp_dir.path());
        writer.save(b"persisted").await.unwrap();

        let reader = FileStore::new(temp_dir.path());
        assert_eq!(reader.load().await.unwrap(), Some(b"persisted".to_vec()));
    }
}
