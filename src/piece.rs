//! Active piece: a shape placed on the grid with a column/row offset and rotation index.

use crate::grid::{Coord, Rgb};
use crate::shapes::{Shape, MASK_ROWS};

/// Mask column that lines up with the piece's x.
const PIVOT_COL: i32 = 2;
/// Bottom mask row lands one row above the piece's y.
const PIVOT_ROW: i32 = MASK_ROWS as i32;

/// Piece position and rotation. Cheap to copy; try a move on a copy, commit if valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    shape: &'static Shape,
    pub x: i32,
    pub y: i32,
    rotation: usize,
}

impl Piece {
    /// New piece at the top middle of a playfield `columns` wide.
    pub fn spawn(shape: &'static Shape, columns: usize) -> Self {
        Self {
            shape,
            x: (columns / 2) as i32,
            y: 0,
            rotation: 0,
        }
    }

    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    pub fn color(&self) -> Rgb {
        self.shape.color
    }

    pub fn rotation(&self) -> usize {
        self.rotation
    }

    /// Absolute grid coordinates of the current rotation, shifted by (dx, dy).
    pub fn cells_on_grid(&self, dx: i32, dy: i32) -> Vec<Coord> {
        let ox = self.x + dx - PIVOT_COL;
        let oy = self.y + dy - PIVOT_ROW;
        self.shape
            .mask(self.rotation)
            .cells()
            .iter()
            .map(|&(col, row)| Coord::new(ox + col as i32, oy + row as i32))
            .collect()
    }

    /// Move by (dx, dy). No validation.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Step the rotation index by `direction` (negative turns back). No validation.
    pub fn rotate(&mut self, direction: i32) {
        let states = self.shape.rotation_count() as i32;
        self.rotation = (self.rotation as i32 + direction).rem_euclid(states) as usize;
    }

    pub fn shifted(mut self, dx: i32, dy: i32) -> Self {
        self.translate(dx, dy);
        self
    }

    pub fn rotated(mut self, direction: i32) -> Self {
        self.rotate(direction);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{catalog, ShapeKind};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn piece(kind: ShapeKind) -> Piece {
        Piece::spawn(catalog().unwrap().shape(kind), 10)
    }

    #[test]
    fn test_spawn_top_middle() {
        let p = piece(ShapeKind::T);
        assert_eq!((p.x, p.y, p.rotation()), (5, 0, 0));
        assert_eq!(p.color(), Rgb(128, 0, 128));
    }

    #[test]
    fn test_spawn_is_above_the_playfield() {
        for kind in ShapeKind::ALL {
            assert!(piece(kind).cells_on_grid(0, 0).iter().all(|c| c.y < 0));
        }
    }

    #[test]
    fn test_t_cells() {
        let p = piece(ShapeKind::T).shifted(0, 4);
        let mut cells = p.cells_on_grid(0, 0);
        cells.sort();
        assert_eq!(
            cells,
            vec![
                Coord::new(4, 3),
                Coord::new(5, 2),
                Coord::new(5, 3),
                Coord::new(6, 3),
            ]
        );
    }

    #[test]
    fn test_offset_is_applied() {
        let p = piece(ShapeKind::O);
        let base = p.cells_on_grid(0, 0);
        let moved = p.cells_on_grid(-1, 3);
        for (a, b) in base.iter().zip(&moved) {
            assert_eq!(*b, a.offset(-1, 3));
        }
    }

    #[test]
    fn test_rotate_wraps_both_ways() {
        let mut p = piece(ShapeKind::J);
        p.rotate(1);
        assert_eq!(p.rotation(), 1);
        p.rotate(3);
        assert_eq!(p.rotation(), 0);
        p.rotate(-1);
        assert_eq!(p.rotation(), 3);

        let mut o = piece(ShapeKind::O);
        let before = o.cells_on_grid(0, 0);
        o.rotate(1);
        assert_eq!(o.rotation(), 0);
        assert_eq!(o.cells_on_grid(0, 0), before);
    }

    #[test]
    fn test_rotate_then_inverse_restores() {
        let p = piece(ShapeKind::S);
        assert_eq!(p.rotated(1).rotated(-1), p);
    }


    proptest! {
        #[test]
        fn prop_cells_match_mask(
            kind_idx in 0usize..7,
            rotation in 0usize..8,
            x in -5i32..15,
            y in -5i32..25,
            dx in -3i32..4,
            dy in -3i32..4,
        ) {
            let shape = catalog().unwrap().shape(ShapeKind::ALL[kind_idx]);
            let mut p = Piece::spawn(shape, 10);
            p.translate(x - p.x, y - p.y);
            p.rotate(rotation as i32);
            let cells = p.cells_on_grid(dx, dy);
            let unique: HashSet<_> = cells.iter().copied().collect();
            prop_assert_eq!(cells.len(), shape.mask(rotation).cells().len());
            prop_assert_eq!(unique.len(), cells.len());
        }
    }
}
