use crate::domain::column::ColumnId;
use serde::{Deserialize, Serialize};

/// A move instruction as handed over by the drag-gesture layer: which slot
/// the task was picked up from and which slot it was dropped on.
///
/// Indices follow splice semantics: `source_index` addresses the task in the
/// source column as displayed; `dest_index` is interpreted against the
/// destination list after the task has been taken out (so within one column
/// the valid range shrinks by one, while across columns `dest_index == len`
/// appends).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub source_column: ColumnId,
    pub source_index: usize,
    pub dest_column: ColumnId,
    pub dest_index: usize,
}

impl MoveRequest {
    pub fn new(
        source_column: impl Into<ColumnId>,
        source_index: usize,
        dest_column: impl Into<ColumnId>,
        dest_index: usize,
    ) -> Self {
        Self {
            source_column: source_column.into(),
            source_index,
            dest_column: dest_column.into(),
            dest_index,
        }
    }

    /// True when the task was dropped back on the exact slot it came from
    pub fn is_same_slot(&self) -> bool {
        self.source_column == self.dest_column && self.source_index == self.dest_index
    }

    /// True when source and destination are the same column
    pub fn is_within_column(&self) -> bool {
        self.source_column == self.dest_column
    }
}

/// What a committed move actually did. Callers phrase user-facing
/// notifications from this ("moved within X" vs. "moved from X to Y").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Dropped back where it came from; the board is unchanged
    Unchanged,
    /// Reordered inside a single column
    Reordered { column: ColumnId },
    /// Transferred from one column to another
    Transferred { source: ColumnId, dest: ColumnId },
}

impl MoveOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}
