use crate::{
    error::{BoardError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use std::sync::Mutex;

/// In-memory storage: one byte slot, the shape of a single browser
/// local-storage key. Used by tests and by hosts that do not want disk I/O.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds the given bytes, as if a previous
    /// session had saved them
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            slot: Mutex::new(Some(bytes.into())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Vec<u8>>>> {
        self.slot
            .lock()
            .map_err(|_| BoardError::StorageError("memory store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.clone())
    }

    async fn save(&self, bytes: &[u8]) -> Result<()> {
        *self.lock()? = Some(bytes.to_vec());
        Ok(())
    }
}
