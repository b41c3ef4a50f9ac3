//! Blockfall: classic falling-block puzzle game in the terminal.

mod app;
mod clear;
mod collision;
mod error;
mod game;
mod grid;
mod highscores;
mod input;
mod piece;
mod scoring;
mod shapes;
mod theme;
mod ui;

use anyhow::{ensure, Context, Result};
use app::App;
use clap::Parser;
use collision::CeilingPolicy;
use highscores::FileHighScores;
use scoring::FallTable;

/// Largest playfield accepted from the command line, in cells.
const MAX_COLUMNS: usize = 100;
const MAX_ROWS: usize = 100;

/// Engine settings derived from the CLI: playfield size, fall speeds, ceiling rule, seed.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rows: usize,
    pub columns: usize,
    pub fall_table: FallTable,
    pub ceiling: CeilingPolicy,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 20,
            columns: 10,
            fall_table: FallTable::default(),
            ceiling: CeilingPolicy::Strict,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        ensure!(
            (1..=MAX_COLUMNS).contains(&args.columns),
            "--columns must be between 1 and {MAX_COLUMNS}, got {}",
            args.columns
        );
        ensure!(
            (1..=MAX_ROWS).contains(&args.rows),
            "--rows must be between 1 and {MAX_ROWS}, got {}",
            args.rows
        );
        let fall_table = match args.fall_intervals.as_deref() {
            Some(s) => FallTable::parse(s).context("parsing --fall-intervals")?,
            None => FallTable::default(),
        };
        let ceiling = if args.permissive_ceiling {
            CeilingPolicy::Permissive
        } else {
            CeilingPolicy::Strict
        };
        Ok(Self {
            rows: args.rows,
            columns: args.columns,
            fall_table,
            ceiling,
            seed: args.seed,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref()).unwrap_or_default();
    let config = GameConfig::from_args(&args)?;
    let store = match args.score_file.clone() {
        Some(path) => FileHighScores::new(path),
        None => FileHighScores::default_location(),
    };
    let mut app = App::new(&args, config, theme, Box::new(store)).context("starting game")?;
    app.run()?;
    Ok(())
}

/// Classic falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Classic falling-block puzzle game in the terminal. Fill rows to clear them.",
    long_about = "Blockfall is a terminal falling-block puzzle.\n\n\
        Move and rotate the falling piece; full rows disappear and everything above drops. \
        Clearing rows scores points and, every few clears, raises the level and the fall speed. \
        The game ends when the stack pokes above the top of the playfield.\n\n\
        CONTROLS:\n  Left/Right or h/l  Move    Up or k  Rotate    Down or j  Soft drop\n  \
        Space/Enter        Start / continue        Q / Esc  Quit"
)]
pub struct Args {
    /// Playfield width in columns.
    #[arg(long, default_value = "10", value_name = "COLS")]
    pub columns: usize,

    /// Playfield height in rows.
    #[arg(long, default_value = "20", value_name = "ROWS")]
    pub rows: usize,

    /// Fall interval per level in seconds, comma-separated (level 0 first).
    #[arg(long, value_name = "SECS,...")]
    pub fall_intervals: Option<String>,

    /// Let pieces above the playfield extend past the side walls.
    #[arg(long)]
    pub permissive_ceiling: bool,

    /// High score file. Defaults to $XDG_CONFIG_HOME/blockfall/score.txt.
    #[arg(long, value_name = "FILE")]
    pub score_file: Option<std::path::PathBuf>,

    /// Seed for the piece sequence (random if not set).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]="value").
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Skip the title screen and start playing immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,
}
