//! Change notifications from a [`crate::FilePair`] to whatever displays it.

use crate::types::Column;

/// Receives incremental change notifications, so a view can refresh the
/// affected rows instead of reloading everything.
///
/// All methods default to doing nothing.
pub trait PairObserver {
    /// Rows `first..=last` were inserted; rows previously at `first` and below moved down.
    fn rows_inserted(&mut self, first: usize, last: usize) {
        let _ = (first, last);
    }

    /// The cell at (`row`, `column`) changed.
    fn cell_changed(&mut self, row: usize, column: Column) {
        let _ = (row, column);
    }

    /// Anything may have changed (re-parse, committed inserted rows).
    fn data_changed(&mut self) {}
}
