//! Layout and drawing: title screen, playfield, sidebar (score, record, level, next), game over.

use crate::app::Screen;
use crate::game::GameState;
use crate::grid::Cell;
use crate::shapes::{MASK_COLS, MASK_ROWS};
use crate::theme::{cell_color, Theme};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each grid cell is two terminal columns wide so cells look square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 24;
/// Dim-out of the board behind the game-over message.
const GAME_OVER_FADE_MS: u32 = 600;

const FILLED: &str = "██";
const EMPTY: &str = " ·";

/// Playfield size in terminal cells (border included) for a grid of `columns` x `rows`.
pub fn playfield_size(columns: usize, rows: usize) -> (u16, u16) {
    let columns = u16::try_from(columns).unwrap_or(u16::MAX);
    let rows = u16::try_from(rows).unwrap_or(u16::MAX);
    (
        columns.saturating_mul(CELL_WIDTH).saturating_add(2),
        rows.saturating_add(2),
    )
}

/// What the screen needs besides the game state.
#[derive(Debug, Clone, Copy)]
pub struct Hud<'a> {
    pub high_score: u32,
    pub new_record: bool,
    pub save_error: Option<&'a str>,
}

/// Draw the current screen. On game over the board fades out behind the message, driven by
/// `fade` / `fade_time`.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    state: &GameState,
    theme: &Theme,
    hud: Hud<'_>,
    fade: &mut Option<Effect>,
    fade_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    frame.buffer_mut().set_style(area, Style::default().bg(theme.bg));
    match screen {
        Screen::Menu => draw_menu(frame, theme, hud, area),
        Screen::Playing => draw_game(frame, state, theme, hud, area),
        Screen::GameOver => {
            draw_game(frame, state, theme, hud, area);
            apply_game_over_fade(frame, theme, area, fade, fade_time, now);
            draw_game_over(frame, state, theme, hud, area);
        }
    }
}

fn centered(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_menu(frame: &mut Frame, theme: &Theme, hud: Hud<'_>, area: Rect) {
    let popup = centered(area, 40, 9);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" BLOCKFALL ", Style::default().fg(theme.title).bold())),
        Line::from(""),
        Line::from(Span::styled(
            format!("Record: {}", hud.high_score),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press [space] to play",
            Style::default().fg(theme.main_fg).bold(),
        )),
        Line::from(Span::styled("[q] quit", Style::default().fg(theme.div_line))),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

/// Playfield plus sidebar, centred in `area`.
fn draw_game(frame: &mut Frame, state: &GameState, theme: &Theme, hud: Hud<'_>, area: Rect) {
    let (pw, ph) = playfield_size(state.columns(), state.rows());
    let total_w = pw.saturating_add(SIDEBAR_WIDTH);
    let active = centered(area, total_w, ph);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(active);
    draw_playfield(frame, state, theme, chunks[0]);
    draw_sidebar(frame, state, theme, hud, chunks[1]);
}

fn draw_playfield(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border).bg(theme.bg))
        .title(Span::styled(" BLOCKFALL ", Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    for (y, row) in state.grid().iter_rows().enumerate() {
        let ry = inner.y + y as u16;
        if ry >= inner.y + inner.height {
            break;
        }
        for (x, cell) in row.iter().enumerate() {
            let rx = inner.x + x as u16 * CELL_WIDTH;
            if rx + CELL_WIDTH > inner.x + inner.width {
                break;
            }
            let (symbol, style) = match cell {
                Cell::Filled(rgb) => (FILLED, Style::default().fg(cell_color(*rgb)).bg(theme.bg)),
                Cell::Empty => (EMPTY, Style::default().fg(theme.div_line).bg(theme.bg)),
            };
            buf.set_string(rx, ry, symbol, style);
        }
    }
}

fn draw_sidebar(frame: &mut Frame, state: &GameState, theme: &Theme, hud: Hud<'_>, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(MASK_ROWS as u16 + 3), // Next (border + title + mask)
            Constraint::Length(1),
            Constraint::Length(5), // Score, record, level
        ])
        .split(area);

    let next_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    let next_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(MASK_ROWS as u16)])
        .split(next_inner);
    Paragraph::new(Line::from(Span::styled("Next", title_style)))
        .render(next_layout[0], frame.buffer_mut());
    draw_next_preview(frame, state, next_layout[1]);

    let stats_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let stats_inner = stats_block.inner(chunks[2]);
    stats_block.render(chunks[2], frame.buffer_mut());
    let stats = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(state.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Record: ", title_style),
            Span::styled(hud.high_score.max(state.score()).to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Level: ", title_style),
            Span::styled(state.level().to_string(), fg_style),
        ]),
    ];
    Paragraph::new(ratatui::text::Text::from(stats)).render(stats_inner, frame.buffer_mut());
}

/// Next piece drawn from its spawn rotation mask, in its own colour.
fn draw_next_preview(frame: &mut Frame, state: &GameState, area: Rect) {
    let next = state.next();
    let color = cell_color(next.color());
    let mask = next.shape().mask(next.rotation());
    let off_x = area
        .width
        .saturating_sub(MASK_COLS as u16 * CELL_WIDTH)
        / 2;
    let buf = frame.buffer_mut();
    for &(col, row) in mask.cells() {
        let rx = area.x + off_x + col as u16 * CELL_WIDTH;
        let ry = area.y + row as u16;
        if rx + CELL_WIDTH <= area.x + area.width && ry < area.y + area.height {
            buf.set_string(rx, ry, FILLED, Style::default().fg(color));
        }
    }
}

/// Create the fade on first use, then advance it by the time since the last frame.
fn apply_game_over_fade(
    frame: &mut Frame,
    theme: &Theme,
    area: Rect,
    fade: &mut Option<Effect>,
    fade_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = fade_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *fade_time = Some(now);

    let effect = fade.get_or_insert_with(|| {
        fx::fade_to(theme.bg, theme.bg, (GAME_OVER_FADE_MS, Interpolation::Linear))
            .with_area(area)
    });
    frame.render_effect(effect, area, TfxDuration::from_millis(delta_ms));
}

fn draw_game_over(frame: &mut Frame, state: &GameState, theme: &Theme, hud: Hud<'_>, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game over! ",
            Style::default().fg(theme.bg).bg(ratatui::style::Color::Yellow).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Score: {}", state.score()),
            Style::default().fg(theme.main_fg),
        )),
    ];
    if hud.new_record {
        lines.push(Line::from(Span::styled(
            format!("New high score - {}", state.score()),
            Style::default().fg(theme.hi_fg).bold(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("Record: {}", hud.high_score),
            Style::default().fg(theme.main_fg),
        )));
    }
    if let Some(err) = hud.save_error {
        lines.push(Line::from(Span::styled(
            format!("Could not save: {err}"),
            Style::default().fg(ratatui::style::Color::Red),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press [space] to continue",
        Style::default().fg(theme.main_fg),
    )));

    let popup = centered(area, 44, lines.len() as u16 + 2);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}
