//! Backtracking constraint solver for the 9x9 grid.
//!
//! The search is an explicit stack machine rather than a recursive
//! function: frames of `(cell, placed value)` are pushed as values are
//! placed and popped to roll the grid back, which keeps the stack depth
//! bounded by the number of blanks and gives the deadline and cancellation
//! checks a natural place between placement attempts.
//!
//! Determinism: the next cell is always the first blank in row-major order
//! and values are tried ascending, so a grid with a unique solution always
//! yields that solution and a grid with several always yields the same one
//! (the lexicographically first under this search order).
//!
//! The solver does not pre-validate its clues. A grid whose pre-filled
//! values already conflict is discovered through exhaustive search and
//! reported as unsatisfiable; callers who want a fast-fail should run
//! [`Grid::find_conflict`] first.

use crate::core::config::SolverLimits;
use crate::core::errors::{SudocrError, SudocrResult};
use crate::domain::grid::{GRID_SIZE, Grid};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::debug;

/// Cooperative cancellation handle for a running solve.
///
/// Clone the token, hand one copy to the solver, and call
/// [`CancelToken::cancel`] from any thread to stop the search at its next
/// check point.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A placed value, remembered so it can be rolled back.
struct Frame {
    cell: usize,
    value: u8,
}

/// Completes the grid, or proves that no completion exists.
///
/// # Arguments
///
/// * `grid` - The clues; blanks are 0. Not mutated.
/// * `limits` - Deadline and check-interval configuration.
/// * `cancel` - Optional cooperative cancellation token.
///
/// # Errors
///
/// [`SudocrError::Unsatisfiable`] when every placement has been exhausted,
/// [`SudocrError::Cancelled`] when the deadline passed or the token was
/// cancelled mid-search. The two are never conflated: a cancelled search
/// says nothing about solvability.
pub fn solve(
    grid: &Grid,
    limits: &SolverLimits,
    cancel: Option<&CancelToken>,
) -> SudocrResult<Grid> {
    limits.validate().map_err(SudocrError::from)?;

    let started = Instant::now();
    let deadline = limits.deadline();
    let interval = limits.check_interval as u64;

    let mut work = *grid;
    let empties: Vec<(usize, usize)> = (0..GRID_SIZE)
        .flat_map(|row| (0..GRID_SIZE).map(move |col| (row, col)))
        .filter(|&(row, col)| work.get(row, col) == 0)
        .collect();

    let mut stack: Vec<Frame> = Vec::with_capacity(empties.len());
    let mut depth = 0usize;
    let mut next_value = 1u8;
    let mut attempts = 0u64;

    loop {
        if depth == empties.len() {
            debug!(
                attempts,
                blanks = empties.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "search completed"
            );
            return Ok(work);
        }

        let (row, col) = empties[depth];
        let mut placed = false;
        let mut value = next_value;
        while value <= 9 {
            attempts += 1;
            if attempts % interval == 0 {
                if deadline.is_some_and(|budget| started.elapsed() >= budget) {
                    debug!(attempts, "deadline reached");
                    return Err(SudocrError::Cancelled);
                }
                if cancel.is_some_and(CancelToken::is_cancelled) {
                    debug!(attempts, "cancellation requested");
                    return Err(SudocrError::Cancelled);
                }
            }

            if work.value_fits(row, col, value) {
                work.set(row, col, value);
                stack.push(Frame { cell: depth, value });
                depth += 1;
                next_value = 1;
                placed = true;
                break;
            }
            value += 1;
        }

        if !placed {
            match stack.pop() {
                Some(frame) => {
                    let (back_row, back_col) = empties[frame.cell];
                    work.set(back_row, back_col, 0);
                    depth = frame.cell;
                    next_value = frame.value + 1;
                }
                None => {
                    debug!(attempts, "placements exhausted");
                    return Err(SudocrError::Unsatisfiable);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The worked example puzzle.
    fn example_puzzle() -> Grid {
        Grid::from_rows([
            [5, 3, 0, 0, 7, 0, 0, 0, 0],
            [6, 0, 0, 1, 9, 5, 0, 0, 0],
            [0, 9, 8, 0, 0, 0, 0, 6, 0],
            [8, 0, 0, 0, 6, 0, 0, 0, 3],
            [4, 0, 0, 8, 0, 3, 0, 0, 1],
            [7, 0, 0, 0, 2, 0, 0, 0, 6],
            [0, 6, 0, 0, 0, 0, 2, 8, 0],
            [0, 0, 0, 4, 1, 9, 0, 0, 5],
            [0, 0, 0, 0, 8, 0, 0, 7, 9],
        ])
        .unwrap()
    }

    fn example_solution() -> Grid {
        Grid::from_rows([
            [5, 3, 4, 6, 7, 8, 9, 1, 2],
            [6, 7, 2, 1, 9, 5, 3, 4, 8],
            [1, 9, 8, 3, 4, 2, 5, 6, 7],
            [8, 5, 9, 7, 6, 1, 4, 2, 3],
            [4, 2, 6, 8, 5, 3, 7, 9, 1],
            [7, 1, 3, 9, 2, 4, 8, 5, 6],
            [9, 6, 1, 5, 3, 7, 2, 8, 4],
            [2, 8, 7, 4, 1, 9, 6, 3, 5],
            [3, 4, 5, 2, 8, 6, 1, 7, 9],
        ])
        .unwrap()
    }

    #[test]
    fn solves_example_to_canonical_completion() {
        let solved = solve(&example_puzzle(), &SolverLimits::default(), None).unwrap();
        assert_eq!(solved, example_solution());
        assert_eq!(solved.rows()[0], [5, 3, 4, 6, 7, 8, 9, 1, 2]);
    }

    #[test]
    fn repeated_solves_are_identical() {
        let limits = SolverLimits::default();
        let first = solve(&example_puzzle(), &limits, None).unwrap();
        let second = solve(&example_puzzle(), &limits, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn solving_a_solved_grid_returns_it_unchanged() {
        let solution = example_solution();
        let again = solve(&solution, &SolverLimits::default(), None).unwrap();
        assert_eq!(again, solution);
    }

    #[test]
    fn multiple_solution_grids_resolve_deterministically() {
        let empty = Grid::empty();
        let first = solve(&empty, &SolverLimits::default(), None).unwrap();
        let second = solve(&empty, &SolverLimits::default(), None).unwrap();
        assert_eq!(first, second);
        assert!(first.is_complete());
        assert!(first.is_consistent());
        // Lexicographically-first completion starts 1..9.
        assert_eq!(first.rows()[0], [1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn duplicate_row_clue_is_unsatisfiable() {
        // Injecting a second 5 into row 0 of the example leaves every other
        // unit consistent, so the search must exhaust to prove failure.
        let mut grid = example_puzzle();
        grid.set(0, 2, 5);
        assert!(grid.find_conflict().is_some());
        assert!(matches!(
            solve(&grid, &SolverLimits::default(), None),
            Err(SudocrError::Unsatisfiable)
        ));
    }

    #[test]
    fn duplicate_column_clue_is_unsatisfiable() {
        // Two 9s in column 8 leave (0, 8) with no legal value at all.
        let mut grid = Grid::empty();
        for (col, value) in [1u8, 2, 3, 4, 5, 6, 7, 8].iter().enumerate() {
            grid.set(0, col, *value);
        }
        grid.set(1, 8, 9);
        grid.set(2, 8, 9);
        assert!(matches!(
            solve(&grid, &SolverLimits::default(), None),
            Err(SudocrError::Unsatisfiable)
        ));
    }

    #[test]
    fn zero_deadline_cancels_before_unsatisfiability_is_claimed() {
        let limits = SolverLimits::default()
            .with_deadline_ms(Some(0))
            .with_check_interval(1);
        let err = solve(&Grid::empty(), &limits, None).unwrap_err();
        assert!(matches!(err, SudocrError::Cancelled));
    }

    #[test]
    fn cancel_token_stops_the_search() {
        let token = CancelToken::new();
        token.cancel();
        let limits = SolverLimits::default().with_check_interval(1);
        let err = solve(&Grid::empty(), &limits, Some(&token)).unwrap_err();
        assert!(matches!(err, SudocrError::Cancelled));
    }

    #[test]
    fn cancellation_is_not_reported_for_quick_solves() {
        let token = CancelToken::new();
        let solved = solve(&example_puzzle(), &SolverLimits::default(), Some(&token)).unwrap();
        assert!(solved.is_complete());
    }
}
