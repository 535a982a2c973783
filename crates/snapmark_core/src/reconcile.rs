//! Reconciling an externally observed board against the authoritative one.
//!
//! The observation path (a photo of a physical board, a screenshot, a
//! hand-typed grid) produces a whole [`Board`]; the engine wants a
//! single [`Move`]. This module bridges the two by diffing cell by cell.

use crate::board::{Board, Move};
use tracing::{debug, instrument, warn};

/// Errors from reconciling an observed board.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ReconcileError {
    /// The observed board differs from the authoritative one in more
    /// than one cell, so no single move explains it.
    #[display("observed board differs in {} cells, expected at most one", differences.len())]
    Ambiguous {
        /// Every cell where the observation disagrees, in row-major order.
        differences: Vec<Move>,
    },
}

impl std::error::Error for ReconcileError {}

/// Infers the move that turns `current` into `observed`.
///
/// The two boards are compared cell by cell. Exactly one differing cell
/// means that cell is the new move; zero means nothing happened since
/// the authoritative state was captured (not an error, the caller
/// decides whether a no-op observation is acceptable).
///
/// No legality checks happen here. Whether the differing cell holds a
/// plausible mark, or was previously empty, is for the engine to judge
/// when the move is applied.
///
/// # Errors
///
/// [`ReconcileError::Ambiguous`] when two or more cells differ,
/// carrying every differing position for diagnostics.
#[instrument(skip_all)]
pub fn infer_move(current: &Board, observed: &Board) -> Result<Option<Move>, ReconcileError> {
    let differences: Vec<Move> = current
        .iter()
        .filter(|&(mv, cell)| observed.get(mv) != cell)
        .map(|(mv, _)| mv)
        .collect();

    match differences.as_slice() {
        [] => {
            debug!("observed board matches authoritative board");
            Ok(None)
        }
        [mv] => {
            debug!(mv = %mv, "inferred move from observation");
            Ok(Some(*mv))
        }
        _ => {
            warn!(count = differences.len(), "observation is ambiguous");
            Err(ReconcileError::Ambiguous { differences })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    fn mv(row: usize, col: usize) -> Move {
        Move::new(row, col).unwrap()
    }

    #[test]
    fn test_identical_boards_yield_no_move() {
        let board = Board::from_rows([
            [Cell::X, Cell::Empty, Cell::O],
            [Cell::Empty, Cell::X, Cell::Empty],
            [Cell::O, Cell::Empty, Cell::Empty],
        ]);
        assert_eq!(infer_move(&board, &board.clone()), Ok(None));
    }

    #[test]
    fn test_single_difference_is_the_move() {
        let current = Board::new();
        let mut observed = current.clone();
        observed.set(mv(1, 2), Cell::X);
        assert_eq!(infer_move(&current, &observed), Ok(Some(mv(1, 2))));
    }

    #[test]
    fn test_two_differences_are_ambiguous() {
        let current = Board::new();
        let mut observed = current.clone();
        observed.set(mv(0, 0), Cell::X);
        observed.set(mv(2, 2), Cell::O);
        let err = infer_move(&current, &observed).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::Ambiguous {
                differences: vec![mv(0, 0), mv(2, 2)],
            }
        );
    }

    #[test]
    fn test_differences_reported_in_row_major_order() {
        let current = Board::new();
        let mut observed = current.clone();
        observed.set(mv(2, 1), Cell::O);
        observed.set(mv(0, 2), Cell::X);
        observed.set(mv(1, 0), Cell::X);
        let ReconcileError::Ambiguous { differences } =
            infer_move(&current, &observed).unwrap_err();
        assert_eq!(differences, vec![mv(0, 2), mv(1, 0), mv(2, 1)]);
    }

    #[test]
    fn test_changed_existing_mark_still_counts_as_difference() {
        // A cell flipping from X to O is a difference like any other;
        // the engine rejects it later as occupied.
        let mut current = Board::new();
        current.set(mv(0, 0), Cell::X);
        let mut observed = current.clone();
        observed.set(mv(0, 0), Cell::O);
        assert_eq!(infer_move(&current, &observed), Ok(Some(mv(0, 0))));
    }
}
