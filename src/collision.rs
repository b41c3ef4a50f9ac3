//! Placement validity: may the piece, shifted by an offset, occupy the grid?

use crate::grid::{Cell, Grid};
use crate::piece::Piece;

/// How cells above the visible playfield (y < 0) are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CeilingPolicy {
    /// Above the top is free only within the playfield's columns.
    #[default]
    Strict,
    /// Above the top is free at any column.
    Permissive,
}

/// True if every cell of `piece` shifted by (dx, dy) is free.
///
/// Cells below the top must be inside the grid and empty. Cells above the top never collide
/// with locked cells; under [`CeilingPolicy::Strict`] they must still lie within the columns.
pub fn is_valid(piece: &Piece, dx: i32, dy: i32, grid: &Grid, policy: CeilingPolicy) -> bool {
    piece.cells_on_grid(dx, dy).into_iter().all(|at| {
        if at.y < 0 {
            return match policy {
                CeilingPolicy::Permissive => true,
                CeilingPolicy::Strict => at.x >= 0 && (at.x as usize) < grid.columns(),
            };
        }
        grid.get(at) == Some(Cell::Empty)
    })
}
