use crate::domain::column::{Column, ColumnId};
use crate::domain::moves::{MoveOutcome, MoveRequest};
use crate::domain::task::{Task, TaskId};
use crate::error::{BoardError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The whole board: an insertion-ordered mapping of column id to column.
///
/// Serializes transparently as that mapping, so the persisted value is the
/// bare object of columns in display order. Column insertion order is
/// display order and survives every mutation and round-trip.
///
/// Every mutation is a pure transition: it borrows the current board and
/// returns a complete new snapshot, or an error with the input untouched.
/// A caller holding the old value can always diff it against the new one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    columns: IndexMap<ColumnId, Column>,
}

// Column order is display order, so board equality is order-sensitive.
// IndexMap's own PartialEq compares as an unordered map.
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.columns.iter().eq(other.columns.iter())
    }
}

impl Eq for Board {}

impl Board {
    /// Creates an empty board (zero columns is a valid board)
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in starter board used when no persisted state exists
    pub fn seed() -> Self {
        let todo = Column::new(ColumnId::new("todo"), "To Do")
            .with_task(Task::new(
                TaskId::new("task-1"),
                "Start my chemistry assignment",
            ))
            .with_task(Task::new(
                TaskId::new("task-2"),
                "Finish my mathematics homework",
            ));
        let in_progress = Column::new(ColumnId::new("inProgress"), "In Progress").with_task(
            Task::new(TaskId::new("task-3"), "Prepare my history presentation"),
        );
        let done = Column::new(ColumnId::new("done"), "Done").with_task(Task::new(
            TaskId::new("task-4"),
            "Complete my english homework",
        ));

        let mut columns = IndexMap::new();
        for column in [todo, in_progress, done] {
            columns.insert(column.id().clone(), column);
        }
        Self { columns }
    }

    /// Columns in display order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.get(id)
    }

    pub fn contains_column(&self, id: &ColumnId) -> bool {
        self.columns.contains_key(id)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Total number of tasks across all columns
    pub fn task_count(&self) -> usize {
        self.columns.values().map(Column::len).sum()
    }

    /// The column and index holding the task with the given id, if any
    pub fn find_task(&self, id: &TaskId) -> Option<(&Column, usize)> {
        self.columns
            .values()
            .find_map(|column| column.position_of(id).map(|index| (column, index)))
    }

    pub fn contains_task(&self, id: &TaskId) -> bool {
        self.find_task(id).is_some()
    }

    /// Reads a task's content, e.g. for handing to the clipboard. Pure
    /// read; never mutates.
    pub fn task_content(&self, column_id: &ColumnId, task_id: &TaskId) -> Result<&str> {
        let column = self
            .column(column_id)
            .ok_or_else(|| BoardError::ColumnNotFound(column_id.to_string()))?;
        let task = column
            .task(task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))?;
        Ok(task.content())
    }

    /// Appends a new empty column with a fresh id after all existing columns
    pub fn add_column(&self, title: impl Into<String>) -> Result<(Board, ColumnId)> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(BoardError::EmptyTitle);
        }
        let id = ColumnId::generate();
        let mut next = self.clone();
        next.columns
            .insert(id.clone(), Column::new(id.clone(), title));
        Ok((next, id))
    }

    /// Adds a caller-built column (seed data, tests). Enforces title and
    /// content rules plus id uniqueness across the whole board.
    pub fn insert_column(&self, column: Column) -> Result<Board> {
        column.validate()?;
        if self.columns.contains_key(column.id()) {
            return Err(BoardError::DuplicateColumn(column.id().to_string()));
        }
        let mut incoming = HashSet::new();
        for task in column.tasks() {
            if self.contains_task(task.id()) || !incoming.insert(task.id().clone()) {
                return Err(BoardError::DuplicateTask(task.id().to_string()));
            }
        }
        let mut next = self.clone();
        next.columns.insert(column.id().clone(), column);
        Ok(next)
    }

    /// Removes a column and every task in it. No tasks are transferred.
    pub fn remove_column(&self, id: &ColumnId) -> Result<(Board, Column)> {
        let mut next = self.clone();
        // shift_remove keeps the display order of the remaining columns
        match next.columns.shift_remove(id) {
            Some(removed) => Ok((next, removed)),
            None => Err(BoardError::ColumnNotFound(id.to_string())),
        }
    }

    /// Appends a task with a fresh id to the end of the given column
    pub fn add_task(
        &self,
        column_id: &ColumnId,
        content: impl Into<String>,
    ) -> Result<(Board, TaskId)> {
        let content = content.into();
        let mut next = self.clone();
        let column = next
            .columns
            .get_mut(column_id)
            .ok_or_else(|| BoardError::ColumnNotFound(column_id.to_string()))?;
        if content.trim().is_empty() {
            return Err(BoardError::EmptyContent);
        }
        let task = Task::new(TaskId::generate(), content);
        let id = task.id().clone();
        column.push_task(task);
        Ok((next, id))
    }

    /// Adds a caller-built task to the end of the given column (seed data,
    /// tests). Enforces the content rule and board-wide id uniqueness.
    pub fn insert_task(&self, column_id: &ColumnId, task: Task) -> Result<Board> {
        if !self.columns.contains_key(column_id) {
            return Err(BoardError::ColumnNotFound(column_id.to_string()));
        }
        task.validate()?;
        if self.contains_task(task.id()) {
            return Err(BoardError::DuplicateTask(task.id().to_string()));
        }
        let mut next = self.clone();
        let column = next
            .columns
            .get_mut(column_id)
            .ok_or_else(|| BoardError::ColumnNotFound(column_id.to_string()))?;
        column.push_task(task);
        Ok(next)
    }

    /// Removes a task, closing the gap it leaves
    pub fn remove_task(&self, column_id: &ColumnId, task_id: &TaskId) -> Result<(Board, Task)> {
        let mut next = self.clone();
        let column = next
            .columns
            .get_mut(column_id)
            .ok_or_else(|| BoardError::ColumnNotFound(column_id.to_string()))?;
        let removed = column
            .remove_task(task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))?;
        Ok((next, removed))
    }

    /// Replaces a task's content in place; id and position are untouched.
    /// The content check runs before any lookup, so blank input is always
    /// reported as such even when the target is missing.
    pub fn edit_task(
        &self,
        column_id: &ColumnId,
        task_id: &TaskId,
        content: impl Into<String>,
    ) -> Result<Board> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(BoardError::EmptyContent);
        }
        let mut next = self.clone();
        let column = next
            .columns
            .get_mut(column_id)
            .ok_or_else(|| BoardError::ColumnNotFound(column_id.to_string()))?;
        let task = column
            .task_mut(task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))?;
        task.set_content(content);
        Ok(next)
    }

    /// Relocates one task per the request, as a single transition.
    ///
    /// Within one column this is a splice-out/splice-in reorder where
    /// `dest_index` addresses the already-shortened list. Across columns
    /// the task leaves the source and enters the destination in the same
    /// snapshot; `dest_index` may equal the destination's current length
    /// to append. Every bound is checked before anything is spliced, so a
    /// rejected move leaves no trace.
    pub fn move_task(&self, request: &MoveRequest) -> Result<(Board, MoveOutcome)> {
        let source_len = self
            .column(&request.source_column)
            .ok_or_else(|| BoardError::ColumnNotFound(request.source_column.to_string()))?
            .len();
        let dest_len = self
            .column(&request.dest_column)
            .ok_or_else(|| BoardError::ColumnNotFound(request.dest_column.to_string()))?
            .len();

        if request.source_index >= source_len {
            return Err(BoardError::IndexOutOfBounds {
                column: request.source_column.to_string(),
                index: request.source_index,
                len: source_len,
            });
        }

        // Dropped back on the slot it came from: idempotent short-circuit.
        if request.is_same_slot() {
            return Ok((self.clone(), MoveOutcome::Unchanged));
        }

        // The destination bound is taken after the task is out of the
        // source: one shorter within the same column, untouched across
        // columns. destIndex == bound appends at the end.
        let bound = if request.is_within_column() {
            source_len - 1
        } else {
            dest_len
        };
        if request.dest_index > bound {
            return Err(BoardError::IndexOutOfBounds {
                column: request.dest_column.to_string(),
                index: request.dest_index,
                len: bound,
            });
        }

        let mut next = self.clone();
        let task = next
            .columns
            .get_mut(&request.source_column)
            .ok_or_else(|| BoardError::ColumnNotFound(request.source_column.to_string()))?
            .remove_task_at(request.source_index);
        next.columns
            .get_mut(&request.dest_column)
            .ok_or_else(|| BoardError::ColumnNotFound(request.dest_column.to_string()))?
            .insert_task_at(request.dest_index, task);

        let outcome = if request.is_within_column() {
            MoveOutcome::Reordered {
                column: request.source_column.clone(),
            }
        } else {
            MoveOutcome::Transferred {
                source: request.source_column.clone(),
                dest: request.dest_column.clone(),
            }
        };
        Ok((next, outcome))
    }

    /// Checks a board that bypassed the transition layer (i.e. came off
    /// disk): every map key matches its column's embedded id, titles and
    /// contents are non-blank, and no task id appears twice anywhere.
    /// Column id uniqueness is structural — the map cannot hold two
    /// entries under one key.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (key, column) in &self.columns {
            if key != column.id() {
                return Err(BoardError::ColumnKeyMismatch {
                    key: key.to_string(),
                    id: column.id().to_string(),
                });
            }
            column.validate()?;
            for task in column.tasks() {
                if !seen.insert(task.id().clone()) {
                    return Err(BoardError::DuplicateTask(task.id().to_string()));
                }
            }
        }
        Ok(())
    }
}
