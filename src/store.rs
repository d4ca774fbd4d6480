use crate::{
    domain::{Board, Column, ColumnId, MoveOutcome, MoveRequest, Task, TaskId},
    error::{BoardError, Result},
    storage::Storage,
};

/// An in-flight task edit: which task is being edited and the draft text.
///
/// Beginning an edit captures the task's current content as the draft; the
/// host replaces the draft as the user types and either commits or cancels.
/// The session is store state only and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    column_id: ColumnId,
    task_id: TaskId,
    draft: String,
}

impl EditSession {
    pub fn column_id(&self) -> &ColumnId {
        &self.column_id
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }
}

/// Owns the canonical board and drives the commit-then-persist cycle.
///
/// Every mutation runs the pure transition on the current snapshot first;
/// only a successful transition is committed and then saved through the
/// storage backend. Saving is best-effort: a failure is logged, retained
/// for [`take_save_error`](Self::take_save_error), and never rolls back
/// the committed state.
pub struct BoardStore<S> {
    board: Board,
    storage: S,
    edit: Option<EditSession>,
    last_save_error: Option<BoardError>,
}

impl<S: Storage> BoardStore<S> {
    /// Opens a store over the given storage backend.
    ///
    /// Absent bytes seed the built-in starter board; unreadable, malformed,
    /// or invalid bytes are logged and also fall back to the seed, so
    /// opening never fails on bad persisted state. Whenever the seed is
    /// used, it is written back so the next open finds it.
    pub async fn open(storage: S) -> Self {
        let board = match Self::load_board(&storage).await {
            Ok(Some(board)) => Some(board),
            Ok(None) => {
                tracing::debug!("no stored board, seeding");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "stored board unusable, falling back to seed");
                None
            }
        };

        let seeded = board.is_none();
        let mut store = Self {
            board: board.unwrap_or_else(Board::seed),
            storage,
            edit: None,
            last_save_error: None,
        };
        if seeded {
            store.persist().await;
        }
        store
    }

    async fn load_board(storage: &S) -> Result<Option<Board>> {
        let bytes = match storage.load().await? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        let board: Board = serde_json::from_slice(&bytes)?;
        board.validate()?;
        Ok(Some(board))
    }

    /// The current board snapshot
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The storage backend this store persists through
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The most recent persistence failure, if any, clearing it
    pub fn take_save_error(&mut self) -> Option<BoardError> {
        self.last_save_error.take()
    }

    /// Reads a task's content without mutating anything, e.g. for the host
    /// to hand to a clipboard
    pub fn task_content(&self, column_id: &ColumnId, task_id: &TaskId) -> Result<&str> {
        self.board.task_content(column_id, task_id)
    }

    /// Adds a new empty column after all existing columns
    pub async fn add_column(&mut self, title: impl Into<String>) -> Result<ColumnId> {
        let (board, id) = self.board.add_column(title)?;
        tracing::debug!(column = %id, "column added");
        self.commit(board).await;
        Ok(id)
    }

    /// Deletes a column and every task in it. Returns the removed column so
    /// the host can name it when reporting the deletion.
    pub async fn delete_column(&mut self, id: &ColumnId) -> Result<Column> {
        let (board, removed) = self.board.remove_column(id)?;
        if self.edit.as_ref().is_some_and(|edit| edit.column_id == *id) {
            self.edit = None;
        }
        tracing::debug!(column = %id, tasks = removed.len(), "column deleted");
        self.commit(board).await;
        Ok(removed)
    }

    /// Adds a task with the given content at the end of a column
    pub async fn add_task(
        &mut self,
        column_id: &ColumnId,
        content: impl Into<String>,
    ) -> Result<TaskId> {
        let (board, id) = self.board.add_task(column_id, content)?;
        tracing::debug!(column = %column_id, task = %id, "task added");
        self.commit(board).await;
        Ok(id)
    }

    /// Deletes a task, returning it
    pub async fn delete_task(&mut self, column_id: &ColumnId, task_id: &TaskId) -> Result<Task> {
        let (board, removed) = self.board.remove_task(column_id, task_id)?;
        if self.edit.as_ref().is_some_and(|edit| edit.task_id == *task_id) {
            self.edit = None;
        }
        tracing::debug!(column = %column_id, task = %task_id, "task deleted");
        self.commit(board).await;
        Ok(removed)
    }

    /// Rewrites a task's content in place, outside any edit session
    pub async fn edit_task(
        &mut self,
        column_id: &ColumnId,
        task_id: &TaskId,
        content: impl Into<String>,
    ) -> Result<()> {
        let board = self.board.edit_task(column_id, task_id, content)?;
        tracing::debug!(column = %column_id, task = %task_id, "task edited");
        self.commit(board).await;
        Ok(())
    }

    /// Applies a drag-and-drop move. A drop back on the slot it came from
    /// changes nothing and skips both commit and persistence.
    pub async fn move_task(&mut self, request: &MoveRequest) -> Result<MoveOutcome> {
        let (board, outcome) = self.board.move_task(request)?;
        if !outcome.changed() {
            return Ok(outcome);
        }
        tracing::debug!(
            source = %request.source_column,
            dest = %request.dest_column,
            "task moved"
        );
        self.commit(board).await;
        Ok(outcome)
    }

    /// Starts editing a task, capturing its current content as the draft.
    /// Replaces any session already in progress.
    pub fn begin_edit(&mut self, column_id: &ColumnId, task_id: &TaskId) -> Result<()> {
        let draft = self.board.task_content(column_id, task_id)?.to_string();
        self.edit = Some(EditSession {
            column_id: column_id.clone(),
            task_id: task_id.clone(),
            draft,
        });
        Ok(())
    }

    /// The edit session in progress, if any
    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// The draft text of the session in progress
    pub fn edit_draft(&self) -> Option<&str> {
        self.edit.as_ref().map(|edit| edit.draft.as_str())
    }

    /// Replaces the draft text as the user types
    pub fn set_edit_draft(&mut self, draft: impl Into<String>) -> Result<()> {
        match &mut self.edit {
            Some(edit) => {
                edit.draft = draft.into();
                Ok(())
            }
            None => Err(BoardError::NoActiveEdit),
        }
    }

    /// Abandons the session without touching the board, returning it so the
    /// host can report the cancellation
    pub fn cancel_edit(&mut self) -> Option<EditSession> {
        self.edit.take()
    }

    /// Applies the draft to the task under edit and clears the session.
    ///
    /// A blank draft fails with `EmptyContent` and leaves the session open
    /// so the user can correct the text; committing with no session in
    /// progress is `NoActiveEdit`.
    pub async fn commit_edit(&mut self) -> Result<()> {
        let (column_id, task_id, draft) = match &self.edit {
            Some(edit) => (
                edit.column_id.clone(),
                edit.task_id.clone(),
                edit.draft.clone(),
            ),
            None => return Err(BoardError::NoActiveEdit),
        };

        let board = self.board.edit_task(&column_id, &task_id, draft)?;
        self.edit = None;
        tracing::debug!(column = %column_id, task = %task_id, "task edit committed");
        self.commit(board).await;
        Ok(())
    }

    async fn commit(&mut self, board: Board) {
        self.board = board;
        self.persist().await;
    }

    async fn persist(&mut self) {
        if let Err(err) = self.try_persist().await {
            tracing::warn!(error = %err, "failed to persist board");
            self.last_save_error = Some(err);
        }
    }

    async fn try_persist(&self) -> Result<()> {
        let bytes = serde_json::to_vec(&self.board)?;
        self.storage.save(&bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Wraps a MemoryStore and counts how many saves reach it
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        saves: AtomicUsize,
    }

    impl CountingStore {
        fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Storage for CountingStore {
        async fn load(&self) -> Result<Option<Vec<u8>>> {
            self.inner.load().await
        }

        async fn save(&self, bytes: &[u8]) -> Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(bytes).await
        }
    }

    /// Loads fine but refuses every save
    struct FailingStore;

    #[async_trait]
    impl Storage for FailingStore {
        async fn load(&self) -> Result<Option<Vec<u8>>> {
            Ok(Some(serde_json::to_vec(&Board::seed())?))
        }

        async fn save(&self, _bytes: &[u8]) -> Result<()> {
            Err(BoardError::StorageError("disk full".to_string()))
        }
    }

    fn persisted_board(bytes: &[u8]) -> Board {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_open_empty_storage_seeds_and_writes_back() {
        let store = BoardStore::open(CountingStore::default()).await;

        assert_eq!(store.board(), &Board::seed());
        assert_eq!(store.storage().save_count(), 1);

        let bytes = store.storage().load().await.unwrap().unwrap();
        assert_eq!(persisted_board(&bytes), Board::seed());
    }

    #[tokio::test]
    async fn test_open_uses_persisted_board() {
        let board = Board::new().add_column("Only Column").unwrap().0;
        let bytes = serde_json::to_vec(&board).unwrap();

        let store = BoardStore::open(MemoryStore::with_bytes(bytes)).await;

        assert_eq!(store.board(), &board);
    }

    #[tokio::test]
    async fn test_open_does_not_rewrite_a_good_board() {
        let seed_bytes = serde_json::to_vec(&Board::seed()).unwrap();
        let counting = CountingStore {
            inner: MemoryStore::with_bytes(seed_bytes),
            saves: AtomicUsize::new(0),
        };

        let store = BoardStore::open(counting).await;

        assert_eq!(store.storage().save_count(), 0);
    }

    #[tokio::test]
    async fn test_open_falls_back_to_seed_on_malformed_bytes() {
        let store = BoardStore::open(MemoryStore::with_bytes(b"not json".to_vec())).await;
        assert_eq!(store.board(), &Board::seed());
    }

    #[tokio::test]
    async fn test_open_falls_back_to_seed_on_invalid_board() {
        // Parses, but task-1 appears in two columns
        let bytes = serde_json::json!({
            "todo": {
                "id": "todo",
                "title": "To Do",
                "tasks": [{ "id": "task-1", "content": "one" }]
            },
            "done": {
                "id": "done",
                "title": "Done",
                "tasks": [{ "id": "task-1", "content": "two" }]
            }
        })
        .to_string();

        let store = BoardStore::open(MemoryStore::with_bytes(bytes.into_bytes())).await;
        assert_eq!(store.board(), &Board::seed());
    }

    #[tokio::test]
    async fn test_mutations_persist_the_new_snapshot() {
        let mut store = BoardStore::open(MemoryStore::new()).await;

        let column_id = store.add_column("Blocked").await.unwrap();
        let task_id = store.add_task(&column_id, "Chase the textbook").await.unwrap();

        let bytes = store.storage().load().await.unwrap().unwrap();
        let persisted = persisted_board(&bytes);
        assert!(persisted.contains_column(&column_id));
        assert!(persisted.contains_task(&task_id));

        store.delete_task(&column_id, &task_id).await.unwrap();
        let bytes = store.storage().load().await.unwrap().unwrap();
        assert!(!persisted_board(&bytes).contains_task(&task_id));
    }

    #[tokio::test]
    async fn test_delete_column_returns_it_for_reporting() {
        let mut store = BoardStore::open(MemoryStore::new()).await;

        let removed = store.delete_column(&ColumnId::new("done")).await.unwrap();

        assert_eq!(removed.title(), "Done");
        assert!(!store.board().contains_column(&ColumnId::new("done")));
    }

    #[tokio::test]
    async fn test_rejected_mutation_does_not_persist() {
        let mut store = BoardStore::open(CountingStore::default()).await;
        let baseline = store.storage().save_count();

        assert!(store.add_task(&ColumnId::new("todo"), "   ").await.is_err());
        assert!(store
            .move_task(&MoveRequest::new("todo", 9, "done", 0))
            .await
            .is_err());

        assert_eq!(store.storage().save_count(), baseline);
        assert_eq!(store.board(), &Board::seed());
    }

    #[tokio::test]
    async fn test_same_slot_move_skips_persistence() {
        let mut store = BoardStore::open(CountingStore::default()).await;
        let baseline = store.storage().save_count();

        let outcome = store
            .move_task(&MoveRequest::new("todo", 0, "todo", 0))
            .await
            .unwrap();

        assert_eq!(outcome, MoveOutcome::Unchanged);
        assert_eq!(store.storage().save_count(), baseline);

        let outcome = store
            .move_task(&MoveRequest::new("todo", 0, "inProgress", 1))
            .await
            .unwrap();

        assert!(outcome.changed());
        assert_eq!(store.storage().save_count(), baseline + 1);
    }

    #[tokio::test]
    async fn test_save_failure_is_retained_without_rollback() {
        let mut store = BoardStore::open(FailingStore).await;
        assert!(store.take_save_error().is_none());

        let column_id = store.add_column("Blocked").await.unwrap();

        // the commit stands even though the save failed
        assert!(store.board().contains_column(&column_id));
        assert!(matches!(
            store.take_save_error(),
            Some(BoardError::StorageError(_))
        ));
        assert!(store.take_save_error().is_none());

        // and the store keeps working
        store.add_task(&column_id, "still accepted").await.unwrap();
        assert_eq!(store.board().column(&column_id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_task_content_read_through() {
        let store = BoardStore::open(MemoryStore::new()).await;
        assert_eq!(
            store
                .task_content(&ColumnId::new("todo"), &TaskId::new("task-1"))
                .unwrap(),
            "Start my chemistry assignment"
        );
    }

    #[tokio::test]
    async fn test_begin_edit_captures_current_content() {
        let mut store = BoardStore::open(MemoryStore::new()).await;

        store
            .begin_edit(&ColumnId::new("todo"), &TaskId::new("task-1"))
            .unwrap();

        assert_eq!(store.edit_draft(), Some("Start my chemistry assignment"));
        let session = store.edit_session().unwrap();
        assert_eq!(session.column_id(), &ColumnId::new("todo"));
        assert_eq!(session.task_id(), &TaskId::new("task-1"));
    }

    #[tokio::test]
    async fn test_begin_edit_missing_task() {
        let mut store = BoardStore::open(MemoryStore::new()).await;
        assert!(matches!(
            store.begin_edit(&ColumnId::new("todo"), &TaskId::new("task-9")),
            Err(BoardError::TaskNotFound(_))
        ));
        assert!(store.edit_session().is_none());
    }

    #[tokio::test]
    async fn test_commit_edit_applies_draft_and_persists() {
        let mut store = BoardStore::open(MemoryStore::new()).await;
        store
            .begin_edit(&ColumnId::new("todo"), &TaskId::new("task-1"))
            .unwrap();
        store.set_edit_draft("Start my physics assignment").unwrap();

        store.commit_edit().await.unwrap();

        assert!(store.edit_session().is_none());
        assert_eq!(
            store
                .task_content(&ColumnId::new("todo"), &TaskId::new("task-1"))
                .unwrap(),
            "Start my physics assignment"
        );
        let bytes = store.storage().load().await.unwrap().unwrap();
        assert_eq!(
            persisted_board(&bytes)
                .task_content(&ColumnId::new("todo"), &TaskId::new("task-1"))
                .unwrap(),
            "Start my physics assignment"
        );
    }

    #[tokio::test]
    async fn test_commit_edit_blank_draft_keeps_session_open() {
        let mut store = BoardStore::open(MemoryStore::new()).await;
        store
            .begin_edit(&ColumnId::new("todo"), &TaskId::new("task-1"))
            .unwrap();
        store.set_edit_draft("   ").unwrap();

        assert!(matches!(
            store.commit_edit().await,
            Err(BoardError::EmptyContent)
        ));

        // session survives so the user can fix the text
        assert_eq!(store.edit_draft(), Some("   "));
        assert_eq!(
            store
                .task_content(&ColumnId::new("todo"), &TaskId::new("task-1"))
                .unwrap(),
            "Start my chemistry assignment"
        );
    }

    #[tokio::test]
    async fn test_commit_edit_without_session() {
        let mut store = BoardStore::open(MemoryStore::new()).await;
        assert!(matches!(
            store.commit_edit().await,
            Err(BoardError::NoActiveEdit)
        ));
    }

    #[tokio::test]
    async fn test_set_edit_draft_without_session() {
        let mut store = BoardStore::open(MemoryStore::new()).await;
        assert!(matches!(
            store.set_edit_draft("anything"),
            Err(BoardError::NoActiveEdit)
        ));
    }

    #[tokio::test]
    async fn test_cancel_edit_returns_session_and_leaves_board_alone() {
        let mut store = BoardStore::open(MemoryStore::new()).await;
        store
            .begin_edit(&ColumnId::new("todo"), &TaskId::new("task-1"))
            .unwrap();
        store.set_edit_draft("half-typed change").unwrap();

        let abandoned = store.cancel_edit().unwrap();

        assert_eq!(abandoned.draft(), "half-typed change");
        assert!(store.edit_session().is_none());
        assert_eq!(
            store
                .task_content(&ColumnId::new("todo"), &TaskId::new("task-1"))
                .unwrap(),
            "Start my chemistry assignment"
        );
        assert!(store.cancel_edit().is_none());
    }

    #[tokio::test]
    async fn test_begin_edit_replaces_existing_session() {
        let mut store = BoardStore::open(MemoryStore::new()).await;
        store
            .begin_edit(&ColumnId::new("todo"), &TaskId::new("task-1"))
            .unwrap();
        store
            .begin_edit(&ColumnId::new("done"), &TaskId::new("task-4"))
            .unwrap();

        assert_eq!(store.edit_draft(), Some("Complete my english homework"));
    }

    #[tokio::test]
    async fn test_deleting_the_edited_task_invalidates_the_session() {
        let mut store = BoardStore::open(MemoryStore::new()).await;
        store
            .begin_edit(&ColumnId::new("todo"), &TaskId::new("task-1"))
            .unwrap();

        store
            .delete_task(&ColumnId::new("todo"), &TaskId::new("task-1"))
            .await
            .unwrap();

        assert!(store.edit_session().is_none());
    }

    #[tokio::test]
    async fn test_deleting_an_unrelated_task_keeps_the_session() {
        let mut store = BoardStore::open(MemoryStore::new()).await;
        store
            .begin_edit(&ColumnId::new("todo"), &TaskId::new("task-1"))
            .unwrap();

        store
            .delete_task(&ColumnId::new("todo"), &TaskId::new("task-2"))
            .await
            .unwrap();

        assert!(store.edit_session().is_some());
    }

    #[tokio::test]
    async fn test_deleting_the_edited_column_invalidates_the_session() {
        let mut store = BoardStore::open(MemoryStore::new()).await;
        store
            .begin_edit(&ColumnId::new("inProgress"), &TaskId::new("task-3"))
            .unwrap();

        store
            .delete_column(&ColumnId::new("inProgress"))
            .await
            .unwrap();

        assert!(store.edit_session().is_none());
    }
}
