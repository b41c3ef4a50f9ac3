//! Score, level and fall speed progression.

use crate::error::EngineError;
use std::time::Duration;

/// Fall interval per level, in seconds (level 0 first).
pub const DEFAULT_FALL_INTERVALS: [f64; 10] =
    [0.35, 0.33, 0.30, 0.27, 0.24, 0.20, 0.16, 0.14, 0.12, 0.10];

/// Clear events needed at level 0 before the level can advance; grows by 2 per level.
const BASE_CLEARS_PER_LEVEL: u32 = 10;

/// Ordered, non-empty list of fall intervals, one per level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallTable {
    intervals: Vec<Duration>,
}

impl FallTable {
    pub fn new(intervals: Vec<Duration>) -> Result<Self, EngineError> {
        if intervals.is_empty() {
            return Err(EngineError::EmptyFallTable);
        }
        if let Some(zero) = intervals.iter().find(|d| d.is_zero()) {
            return Err(EngineError::FallTable(format!("{}", zero.as_secs_f64())));
        }
        Ok(Self { intervals })
    }

    /// Parse comma-separated seconds, e.g. `"0.35,0.3,0.2"`.
    pub fn parse(s: &str) -> Result<Self, EngineError> {
        let mut intervals = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let interval = part
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
                .and_then(|v| Duration::try_from_secs_f64(v).ok())
                .ok_or_else(|| EngineError::FallTable(part.to_string()))?;
            intervals.push(interval);
        }
        Self::new(intervals)
    }

    /// Interval for `level`, clamped to the last entry.
    pub fn interval(&self, level: usize) -> Duration {
        self.intervals[level.min(self.intervals.len() - 1)]
    }

    pub fn levels(&self) -> usize {
        self.intervals.len()
    }
}

impl Default for FallTable {
    fn default() -> Self {
        Self {
            intervals: DEFAULT_FALL_INTERVALS
                .iter()
                .map(|s| Duration::from_secs_f64(*s))
                .collect(),
        }
    }
}

/// Points for clearing `lines` rows in one lock at `level`.
///
/// Base 1→10, 2→25, 3→40, 4→55, scaled by 1 + 0.1 * level in f64 and rounded to nearest,
/// ties to even. The product is not exact, so 55 * 1.1 lands just above 60.5 and gives 61.
pub fn points_for(lines: u32, level: usize) -> u32 {
    if lines == 0 {
        return 0;
    }
    let base = f64::from(lines * 10 + (lines - 1) * 5);
    (base * (1.0 + 0.1 * level as f64)).round_ties_even() as u32
}

/// Score and level counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progression {
    pub score: u32,
    pub level: usize,
    pub clears_in_level: u32,
}

impl Progression {
    /// Apply one lock event that cleared `lines` rows. Returns the points awarded.
    ///
    /// Every event with at least one line counts once towards the next level, however many
    /// rows it cleared. The counter resets when it passes `10 + 2 * level`; the level only
    /// advances while the table has a faster entry.
    pub fn record_clear(&mut self, lines: u32, table: &FallTable) -> u32 {
        if lines == 0 {
            return 0;
        }
        let points = points_for(lines, self.level);
        self.score = self.score.saturating_add(points);
        self.clears_in_level += 1;
        if self.clears_in_level > BASE_CLEARS_PER_LEVEL + 2 * self.level as u32 {
            self.clears_in_level = 0;
            if self.level + 1 < table.levels() {
                self.level += 1;
            }
        }
        points
    }
}
