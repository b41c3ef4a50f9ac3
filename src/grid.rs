//! Playfield grid and the locked-cell store it is rebuilt from every tick.
//!
//! Coordinates: (x, y) with x = column (0 is left) and y = row (0 is top). Rows above the
//! visible playfield have negative y; they are never part of a [`Grid`] but may appear in
//! [`LockedCells`], where they signal game over.

use crate::error::EngineError;
use crate::piece::Piece;
use std::collections::HashMap;
#[cfg(test)]
use std::collections::HashSet;

/// Display colour of an occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Single grid cell: empty or filled with a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Rgb),
}

impl Cell {
    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[cfg(test)]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Cells that have settled permanently, keyed by coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockedCells {
    cells: HashMap<Coord, Rgb>,
}

impl LockedCells {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, at: Coord, color: Rgb) {
        self.cells.insert(at, color);
    }

    /// Merge every cell of `piece` into the store with the piece's colour.
    pub fn lock(&mut self, piece: &Piece) {
        for at in piece.cells_on_grid(0, 0) {
            self.insert(at, piece.color());
        }
    }

    #[cfg(test)]
    pub fn get(&self, at: Coord) -> Option<Rgb> {
        self.cells.get(&at).copied()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, Rgb)> + '_ {
        self.cells.iter().map(|(c, rgb)| (*c, *rgb))
    }

    /// True if any settled cell sits above the visible playfield.
    pub fn has_overflow(&self) -> bool {
        self.cells.keys().any(|c| c.y < 0)
    }
}

impl FromIterator<(Coord, Rgb)> for LockedCells {
    fn from_iter<T: IntoIterator<Item = (Coord, Rgb)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Rows x columns snapshot of the playfield. rows[0] is the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// All-empty grid, then every in-range locked cell written over it.
    /// Locked cells outside the playfield (negative y in particular) are skipped.
    pub fn build(rows: usize, columns: usize, locked: &LockedCells) -> Result<Self, EngineError> {
        if rows == 0 || columns == 0 {
            return Err(EngineError::GridDimensions { rows, columns });
        }
        let mut grid = Self {
            rows,
            columns,
            cells: vec![vec![Cell::Empty; columns]; rows],
        };
        grid.reset(locked);
        Ok(grid)
    }

    /// Clear every cell, then write the in-range locked cells. Keeps the dimensions.
    pub fn reset(&mut self, locked: &LockedCells) {
        for row in &mut self.cells {
            row.fill(Cell::Empty);
        }
        for (at, color) in locked.iter() {
            if let Some((x, y)) = index(at, self.rows, self.columns) {
                self.cells[y][x] = Cell::Filled(color);
            }
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Cell at `at`, or None outside the grid.
    pub fn get(&self, at: Coord) -> Option<Cell> {
        index(at, self.rows, self.columns).map(|(x, y)| self.cells[y][x])
    }

    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        self.cells.get(y).map(Vec::as_slice)
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(Vec::as_slice)
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.row(y)
            .is_some_and(|row| row.iter().all(|c| !c.is_empty()))
    }

    /// Coordinates of every empty cell.
    #[cfg(test)]
    pub fn empty_cells(&self) -> HashSet<Coord> {
        let mut out = HashSet::new();
        for (y, row) in self.cells.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    out.insert(Coord::new(x as i32, y as i32));
                }
            }
        }
        out
    }

    /// Paint the piece's visible cells onto this snapshot (display only).
    pub fn overlay(&mut self, piece: &Piece) {
        let color = piece.color();
        for at in piece.cells_on_grid(0, 0) {
            if let Some((x, y)) = index(at, self.rows, self.columns) {
                self.cells[y][x] = Cell::Filled(color);
            }
        }
    }
}

#[inline]
fn index(at: Coord, rows: usize, columns: usize) -> Option<(usize, usize)> {
    if at.x < 0 || at.y < 0 || at.x as usize >= columns || at.y as usize >= rows {
        return None;
    }
    Some((at.x as usize, at.y as usize))
}
