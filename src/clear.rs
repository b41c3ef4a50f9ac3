//! Line clearing: drop full rows from the locked store and let everything above fall.

use crate::grid::{Coord, Grid, LockedCells};

/// Remove every full row of `grid` from `locked`, compact the rest downward, and return the
/// number of rows removed.
///
/// The store is rebuilt from a snapshot: each surviving cell moves down by the number of
/// cleared rows strictly below it, so columns and relative order are preserved.
pub fn clear_full_rows(grid: &Grid, locked: &mut LockedCells) -> u32 {
    let full: Vec<i32> = (0..grid.rows())
        .filter(|&y| grid.is_row_full(y))
        .map(|y| y as i32)
        .collect();
    if full.is_empty() {
        return 0;
    }

    let rebuilt: LockedCells = locked
        .iter()
        .filter(|(at, _)| !full.contains(&at.y))
        .map(|(at, color)| {
            let below = full.iter().filter(|&&row| row > at.y).count() as i32;
            (Coord::new(at.x, at.y + below), color)
        })
        .collect();
    *locked = rebuilt;

    full.len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Rgb;
    use proptest::prelude::*;

    const ROWS: usize = 20;
    const COLS: i32 = 10;

    fn fill_row(locked: &mut LockedCells, y: i32, color: Rgb) {
        for x in 0..COLS {
            locked.insert(Coord::new(x, y), color);
        }
    }

    fn run(locked: &mut LockedCells) -> u32 {
        let grid = Grid::build(ROWS, COLS as usize, locked).unwrap();
        clear_full_rows(&grid, locked)
    }

    #[test]
    fn test_no_full_rows_is_noop() {
        let mut locked = LockedCells::new();
        for x in 0..COLS - 1 {
            locked.insert(Coord::new(x, 19), Rgb(1, 1, 1));
        }
        let before = locked.clone();
        assert_eq!(run(&mut locked), 0);
        assert_eq!(locked, before);
    }

    #[test]
    fn test_single_row_clear_shifts_above_only() {
        let mut locked = LockedCells::new();
        fill_row(&mut locked, 17, Rgb(255, 0, 0));
        locked.insert(Coord::new(2, 16), Rgb(0, 255, 0));
        locked.insert(Coord::new(3, 12), Rgb(0, 0, 255));
        locked.insert(Coord::new(4, 18), Rgb(9, 9, 9));
        locked.insert(Coord::new(5, 19), Rgb(8, 8, 8));

        assert_eq!(run(&mut locked), 1);
        assert_eq!(locked.len(), 4);
        assert_eq!(locked.get(Coord::new(2, 17)), Some(Rgb(0, 255, 0)));
        assert_eq!(locked.get(Coord::new(3, 13)), Some(Rgb(0, 0, 255)));
        assert_eq!(locked.get(Coord::new(4, 18)), Some(Rgb(9, 9, 9)));
        assert_eq!(locked.get(Coord::new(5, 19)), Some(Rgb(8, 8, 8)));
    }

    #[test]
    fn test_four_rows_at_bottom() {
        let mut locked = LockedCells::new();
        for y in 16..20 {
            fill_row(&mut locked, y, Rgb(0, 255, 255));
        }
        locked.insert(Coord::new(0, 15), Rgb(1, 2, 3));
        assert_eq!(run(&mut locked), 4);
        assert_eq!(locked.len(), 1);
        assert_eq!(locked.get(Coord::new(0, 19)), Some(Rgb(1, 2, 3)));
    }

    #[test]
    fn test_split_clear_compacts_gap() {
        // Full rows 19 and 17 with a partial row 18 between them.
        let mut locked = LockedCells::new();
        fill_row(&mut locked, 19, Rgb(1, 0, 0));
        fill_row(&mut locked, 17, Rgb(2, 0, 0));
        locked.insert(Coord::new(7, 18), Rgb(3, 0, 0));
        locked.insert(Coord::new(6, 16), Rgb(4, 0, 0));

        assert_eq!(run(&mut locked), 2);
        assert_eq!(locked.len(), 2);
        assert_eq!(locked.get(Coord::new(7, 19)), Some(Rgb(3, 0, 0)));
        assert_eq!(locked.get(Coord::new(6, 18)), Some(Rgb(4, 0, 0)));
    }

    #[test]
    fn test_cells_above_the_top_also_fall() {
        let mut locked = LockedCells::new();
        fill_row(&mut locked, 19, Rgb(1, 0, 0));
        locked.insert(Coord::new(4, -1), Rgb(5, 5, 5));
        assert_eq!(run(&mut locked), 1);
        assert_eq!(locked.get(Coord::new(4, 0)), Some(Rgb(5, 5, 5)));
        assert!(!locked.has_overflow());
    }

    proptest! {
        #[test]
        fn prop_one_full_row_conserves_the_rest(
            r in 1i32..20,
            cells in proptest::collection::vec((0i32..10, 0i32..20), 0..120),
        ) {
            let mut locked = LockedCells::new();
            for (x, y) in cells {
                // column 0 stays empty outside row `r`, so only `r` is full
                if y != r && x != 0 {
                    locked.insert(Coord::new(x, y), Rgb(x as u8, y as u8, 7));
                }
            }
            fill_row(&mut locked, r, Rgb(200, 200, 200));
            let before = locked.clone();

            prop_assert_eq!(run(&mut locked), 1);
            prop_assert_eq!(locked.len(), before.len() - COLS as usize);
            for (at, color) in before.iter() {
                if at.y == r {
                    continue;
                }
                let expected = if at.y < r { at.offset(0, 1) } else { at };
                prop_assert_eq!(locked.get(expected), Some(color));
            }
        }
    }
}
