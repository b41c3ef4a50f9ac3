//! Game state: locked cells, active/next piece, gravity, locking, line clears, score and level.

use crate::clear::clear_full_rows;
use crate::collision::{is_valid, CeilingPolicy};
use crate::error::EngineError;
use crate::grid::{Grid, LockedCells};
use crate::piece::Piece;
use crate::scoring::{FallTable, Progression};
use crate::shapes::{catalog, Catalog, ShapeKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::Duration;

/// Player command, applied on the next tick after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Active piece descending.
    Falling,
    /// Active piece can no longer descend; it is merged at the end of the tick.
    Locking,
    GameOver,
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub locked: bool,
    pub lines_cleared: u32,
    pub points: u32,
    pub level_up: bool,
    pub game_over: bool,
}

#[derive(Debug)]
pub struct GameState {
    catalog: &'static Catalog,
    rows: usize,
    columns: usize,
    fall_table: FallTable,
    ceiling: CeilingPolicy,
    locked: LockedCells,
    current: Piece,
    next: Piece,
    progress: Progression,
    /// Time since the last gravity step.
    fall_time: Duration,
    pending: VecDeque<Command>,
    status: Status,
    /// Last snapshot handed to the renderer, with the active piece painted in.
    grid: Grid,
    rng: StdRng,
}

impl GameState {
    pub fn new(config: &crate::GameConfig) -> Result<Self, EngineError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_seed(config, seed)
    }

    /// Deterministic piece sequence for a given seed.
    pub fn with_seed(config: &crate::GameConfig, seed: u64) -> Result<Self, EngineError> {
        let catalog = catalog()?;
        let locked = LockedCells::new();
        let grid = Grid::build(config.rows, config.columns, &locked)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let current = random_piece(catalog, &mut rng, config.columns);
        let next = random_piece(catalog, &mut rng, config.columns);
        Ok(Self {
            catalog,
            rows: config.rows,
            columns: config.columns,
            fall_table: config.fall_table.clone(),
            ceiling: config.ceiling,
            locked,
            current,
            next,
            progress: Progression::default(),
            fall_time: Duration::ZERO,
            pending: VecDeque::new(),
            status: Status::Falling,
            grid,
            rng,
        })
    }

    /// Start a new session with the same configuration; the piece sequence continues.
    pub fn restart(&mut self) {
        self.locked = LockedCells::new();
        self.current = random_piece(self.catalog, &mut self.rng, self.columns);
        self.next = random_piece(self.catalog, &mut self.rng, self.columns);
        self.progress = Progression::default();
        self.fall_time = Duration::ZERO;
        self.pending.clear();
        self.status = Status::Falling;
        self.grid.reset(&self.locked);
        self.grid.overlay(&self.current);
    }

    /// Queue a command for the next tick.
    pub fn push(&mut self, command: Command) {
        if self.status != Status::GameOver {
            self.pending.push_back(command);
        }
    }

    /// Advance by `elapsed`: gravity, buffered commands, lock, clears, score, game over.
    pub fn tick(&mut self, elapsed: Duration) -> Result<TickReport, EngineError> {
        let mut report = TickReport::default();
        if self.status == Status::GameOver {
            self.pending.clear();
            return Ok(report);
        }

        let grid = Grid::build(self.rows, self.columns, &self.locked)?;

        self.fall_time += elapsed;
        if self.fall_time >= self.fall_interval() {
            self.fall_time = Duration::ZERO;
            if self.fits(&self.current, 0, 1, &grid) {
                self.current.translate(0, 1);
            } else {
                self.status = Status::Locking;
            }
        }

        while let Some(command) = self.pending.pop_front() {
            self.apply(command, &grid);
        }

        if self.status == Status::Locking {
            report = self.lock_current()?;
        }

        if Self::is_over(&self.locked) {
            self.status = Status::GameOver;
            report.game_over = true;
        }

        self.grid = Grid::build(self.rows, self.columns, &self.locked)?;
        if self.status != Status::GameOver {
            self.grid.overlay(&self.current);
        }
        Ok(report)
    }

    /// True once any locked cell sits above the visible playfield.
    pub fn is_over(locked: &LockedCells) -> bool {
        locked.has_overflow()
    }

    fn fits(&self, piece: &Piece, dx: i32, dy: i32, grid: &Grid) -> bool {
        is_valid(piece, dx, dy, grid, self.ceiling)
    }

    fn apply(&mut self, command: Command, grid: &Grid) {
        let candidate = match command {
            Command::MoveLeft => self.current.shifted(-1, 0),
            Command::MoveRight => self.current.shifted(1, 0),
            Command::SoftDrop => self.current.shifted(0, 1),
            Command::Rotate => self.current.rotated(1),
        };
        if self.fits(&candidate, 0, 0, grid) {
            self.current = candidate;
        }
    }

    fn lock_current(&mut self) -> Result<TickReport, EngineError> {
        self.locked.lock(&self.current);
        self.current = self.next;
        self.next = random_piece(self.catalog, &mut self.rng, self.columns);
        self.status = Status::Falling;

        let merged = Grid::build(self.rows, self.columns, &self.locked)?;
        let lines = clear_full_rows(&merged, &mut self.locked);
        let level_before = self.progress.level;
        let points = self.progress.record_clear(lines, &self.fall_table);
        Ok(TickReport {
            locked: true,
            lines_cleared: lines,
            points,
            level_up: self.progress.level > level_before,
            game_over: false,
        })
    }

    /// Snapshot of the playfield with the active piece painted in.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[cfg(test)]
    pub fn locked(&self) -> &LockedCells {
        &self.locked
    }

    #[cfg(test)]
    pub fn current(&self) -> &Piece {
        &self.current
    }

    pub fn next(&self) -> &Piece {
        &self.next
    }

    pub fn score(&self) -> u32 {
        self.progress.score
    }

    pub fn level(&self) -> usize {
        self.progress.level
    }

    #[cfg(test)]
    pub fn progression(&self) -> Progression {
        self.progress
    }

    pub fn fall_interval(&self) -> Duration {
        self.fall_table.interval(self.progress.level)
    }

    #[cfg(test)]
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status == Status::GameOver
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }
}

/// Independent uniform choice over the seven kinds.
fn random_piece(catalog: &'static Catalog, rng: &mut StdRng, columns: usize) -> Piece {
    let kind = ShapeKind::ALL[rng.random_range(0..ShapeKind::ALL.len())];
    Piece::spawn(catalog.shape(kind), columns)
}
