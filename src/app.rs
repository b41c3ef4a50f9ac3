//! App: terminal init, main loop, tick and key handling.

use crate::game::GameState;
use crate::highscores::HighScoreStore;
use crate::input::{key_to_action, Action};
use crate::theme::Theme;
use crate::ui::{self, Hud};
use crate::{Args, GameConfig};
use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
}

pub struct App {
    theme: Theme,
    /// Time budget of one rendered frame.
    frame_interval: Duration,
    state: GameState,
    screen: Screen,
    high_scores: Box<dyn HighScoreStore>,
    /// Best score known to this session (loaded at start, raised on a new record).
    high_score: u32,
    new_record: bool,
    save_error: Option<String>,
    last_tick: Instant,
    /// Fade of the board behind the game-over message (created on first game-over frame).
    game_over_effect: Option<Effect>,
    /// Last time the fade was advanced (for delta).
    game_over_effect_time: Option<Instant>,
}

impl App {
    pub fn new(
        args: &Args,
        config: GameConfig,
        theme: Theme,
        high_scores: Box<dyn HighScoreStore>,
    ) -> Result<Self> {
        if !(args.frame_rate.is_finite() && args.frame_rate > 0.0) {
            bail!("frame rate must be a positive number, got {}", args.frame_rate);
        }
        let state = GameState::new(&config)?;
        let high_score = high_scores.load();
        let screen = if args.no_menu {
            Screen::Playing
        } else {
            Screen::Menu
        };
        Ok(Self {
            theme,
            frame_interval: Duration::from_secs_f64(1.0 / args.frame_rate),
            state,
            screen,
            high_scores,
            high_score,
            new_record: false,
            save_error: None,
            last_tick: Instant::now(),
            game_over_effect: None,
            game_over_effect_time: None,
        })
    }

    #[cfg(test)]
    fn screen(&self) -> Screen {
        self.screen
    }

    fn start_game(&mut self) {
        self.state.restart();
        self.screen = Screen::Playing;
        self.new_record = false;
        self.save_error = None;
        self.last_tick = Instant::now();
        self.game_over_effect = None;
        self.game_over_effect_time = None;
    }

    /// Apply one key action. Returns true when the player asked to quit.
    fn handle_action(&mut self, action: Action) -> bool {
        if action == Action::Quit {
            return true;
        }
        match self.screen {
            Screen::Menu => {
                if action == Action::Confirm {
                    self.start_game();
                }
            }
            Screen::Playing => {
                if let Some(command) = action.command() {
                    self.state.push(command);
                }
            }
            Screen::GameOver => {
                if action == Action::Confirm {
                    self.screen = Screen::Menu;
                }
            }
        }
        false
    }

    /// Advance the game by `elapsed` while playing.
    fn update(&mut self, elapsed: Duration) -> Result<()> {
        if self.screen != Screen::Playing {
            return Ok(());
        }
        self.state.tick(elapsed)?;
        if self.state.is_game_over() {
            self.screen = Screen::GameOver;
            self.record_result(self.state.score());
        }
        Ok(())
    }

    /// Save `score` if it beats the record. A failed save is shown on screen, not fatal.
    fn record_result(&mut self, score: u32) {
        if score <= self.high_score {
            return;
        }
        self.high_score = score;
        self.new_record = true;
        if let Err(e) = self.high_scores.save(score) {
            self.save_error = Some(format!("{e:#}"));
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let result = ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))
            .map_err(anyhow::Error::from)
            .and_then(|mut terminal| self.run_loop(&mut terminal));

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.last_tick = Instant::now();
        loop {
            let now = Instant::now();
            let hud = Hud {
                high_score: self.high_score,
                new_record: self.new_record,
                save_error: self.save_error.as_deref(),
            };
            terminal.draw(|f| {
                ui::draw(
                    f,
                    self.screen,
                    &self.state,
                    &self.theme,
                    hud,
                    &mut self.game_over_effect,
                    &mut self.game_over_effect_time,
                    now,
                )
            })?;

            let timeout = self.frame_interval.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        // Release and repeat events arrive only with keyboard enhancement; ignore them.
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_action(key_to_action(key)) {
                            return Ok(());
                        }
                    }
                }
            }

            let elapsed = self.last_tick.elapsed();
            self.last_tick = Instant::now();
            self.update(elapsed)?;
            if self.screen != Screen::GameOver {
                self.game_over_effect = None;
                self.game_over_effect_time = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::MemoryHighScores;
    use clap::Parser;

    fn app_with(store: MemoryHighScores, extra: &[&str]) -> App {
        let mut argv = vec!["blockfall", "--seed", "7"];
        argv.extend_from_slice(extra);
        let args = Args::parse_from(argv);
        let config = GameConfig::from_args(&args).unwrap();
        App::new(&args, config, Theme::default(), Box::new(store)).unwrap()
    }

    fn app() -> App {
        app_with(MemoryHighScores::default(), &[])
    }

    fn play_until_over(app: &mut App) {
        for _ in 0..10_000 {
            if app.screen() == Screen::GameOver {
                return;
            }
            app.update(Duration::from_secs(1)).unwrap();
        }
        panic!("game never ended");
    }

    #[test]
    fn test_starts_on_menu_with_stored_record() {
        let store = MemoryHighScores::default();
        store.best.set(300);
        let app = app_with(store, &[]);
        assert_eq!(app.screen(), Screen::Menu);
        assert_eq!(app.high_score, 300);
    }

    #[test]
    fn test_no_menu_starts_playing() {
        let app = app_with(MemoryHighScores::default(), &["--no-menu"]);
        assert_eq!(app.screen(), Screen::Playing);
    }

    #[test]
    fn test_bad_frame_rate_rejected() {
        let args = Args::parse_from(["blockfall", "--frame-rate", "0"]);
        let config = GameConfig::from_args(&args).unwrap();
        let result = App::new(&args, config, Theme::default(), Box::new(MemoryHighScores::default()));
        assert!(result.is_err());
    }

    #[test]
    fn test_menu_confirm_and_quit() {
        let mut app = app();
        assert!(!app.handle_action(Action::MoveLeft));
        assert_eq!(app.screen(), Screen::Menu);
        assert!(!app.handle_action(Action::Confirm));
        assert_eq!(app.screen(), Screen::Playing);
        assert!(app.handle_action(Action::Quit));
    }

    #[test]
    fn test_menu_does_not_tick() {
        let mut app = app();
        let before = *app.state.current();
        app.update(Duration::from_secs(5)).unwrap();
        assert_eq!(*app.state.current(), before);
    }

    #[test]
    fn test_playing_forwards_commands() {
        let mut app = app();
        app.handle_action(Action::Confirm);
        let x = app.state.current().x;
        app.handle_action(Action::MoveLeft);
        app.update(Duration::ZERO).unwrap();
        assert_eq!(app.state.current().x, x - 1);
    }

    #[test]
    fn test_game_over_then_back_to_menu() {
        let mut app = app();
        app.handle_action(Action::Confirm);
        play_until_over(&mut app);
        assert!(app.state.is_game_over());
        assert!(!app.handle_action(Action::SoftDrop));
        assert_eq!(app.screen(), Screen::GameOver);
        app.handle_action(Action::Confirm);
        assert_eq!(app.screen(), Screen::Menu);
        app.handle_action(Action::Confirm);
        assert_eq!(app.screen(), Screen::Playing);
        assert!(!app.state.is_game_over());
        assert_eq!(app.state.score(), 0);
    }

    #[test]
    fn test_new_record_is_saved() {
        let store = MemoryHighScores::default();
        store.best.set(40);
        let mut app = app_with(store, &[]);
        app.record_result(55);
        assert!(app.new_record);
        assert_eq!(app.high_score, 55);
        assert_eq!(app.high_scores.load(), 55);
        assert!(app.save_error.is_none());
    }

    #[test]
    fn test_lower_or_equal_score_not_saved() {
        let store = MemoryHighScores::default();
        store.best.set(40);
        let mut app = app_with(store, &[]);
        app.record_result(40);
        app.record_result(10);
        assert!(!app.new_record);
        assert_eq!(app.high_scores.load(), 40);
    }

    #[test]
    fn test_failed_save_is_reported_not_fatal() {
        let store = MemoryHighScores {
            fail_saves: true,
            ..Default::default()
        };
        let mut app = app_with(store, &[]);
        app.record_result(25);
        assert!(app.new_record);
        assert_eq!(app.high_score, 25);
        assert_eq!(app.save_error.as_deref(), Some("disk full"));
    }
}
