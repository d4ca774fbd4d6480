use crate::error::Result;
use async_trait::async_trait;

pub mod memory;

#[cfg(feature = "file-store")]
pub mod file_store;

/// Storage trait for persisting the serialized board.
///
/// Single-key overwrite semantics: `save` replaces whatever was stored
/// before, `load` returns the latest saved bytes, or `None` when nothing
/// has been stored yet. No ordering or durability guarantees beyond that;
/// hosts with their own persistence (a browser embedding, a database) plug
/// in by implementing this trait.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Loads the stored board bytes, if any
    async fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Stores the board bytes, replacing any previous value
    async fn save(&self, bytes: &[u8]) -> Result<()>;
}
