use super::Session;
use super::terminal::{self, Rgb, TICK_MS, TerminalGuard, paint};
use crate::config::MemoryConfig;
use crate::error::Result;
use crate::rounds::memory::{
    Card, CardFace, Difficulty, GRID_COLUMNS, MemoryEvent, MemoryRound, RevealResult,
};
use crate::rounds::{MEMORY_GAME, RoundStatus};
use crate::sound::SoundCue;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::{Duration, Instant};

const CARD_W: usize = 10;
const CARD_H: usize = 3;
const CARD_GAP_X: usize = 2;
const CARD_GAP_Y: usize = 1;
const HEADER_ROWS: usize = 4;
const IMAGE_SIZE: u32 = 400;

const BACK: Rgb = Rgb { r: 40, g: 60, b: 120 };
const SELECTED: Rgb = Rgb { r: 230, g: 190, b: 40 };
const MATCHED_FG: Rgb = Rgb { r: 20, g: 20, b: 20 };
const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

enum Exit
{
    Finished,
    Restart(Difficulty),
    Quit,
}

pub fn run(session: &mut Session, config: &MemoryConfig) -> Result<()>
{
    let mut term = TerminalGuard::enter()?;
    let mut difficulty = config.difficulty;

    loop {
        term.draw(&["Loading images...".to_string()])?;
        let images = match load_images(session, difficulty.pairs()) {
            Ok(images) => images,
            Err(err) if err.is_retryable() => {
                tracing::warn!("memory images failed: {err}");
                term.draw(&[
                    MEMORY_GAME.to_string(),
                    String::new(),
                    "Failed to load images. Please try again.".to_string(),
                    String::new(),
                    "R retries, Esc quits.".to_string(),
                ])?;
                match terminal::wait_for_key(&[KeyCode::Char('r'), KeyCode::Esc])? {
                    KeyCode::Esc => return Ok(()),
                    _ => continue,
                }
            }
            Err(err) => return Err(err),
        };

        let mut round = MemoryRound::new();
        round.start_round(images, &mut session.rng);
        session.play(SoundCue::Click);

        match play_round(&mut term, session, &mut round, difficulty)? {
            Exit::Quit => return Ok(()),
            Exit::Restart(next) => {
                difficulty = next;
                continue;
            }
            Exit::Finished => {}
        }

        let Some(summary) = round.summary() else {
            continue;
        };
        session.record(&summary);
        session.play(SoundCue::Success);
        term.draw(&[
            "All pairs matched!".to_string(),
            String::new(),
            format!("Moves: {}", round.moves()),
            format!("Time: {} seconds", summary.elapsed),
            format!("Score: {} points", summary.score),
            String::new(),
            "R plays again. Space or Esc exits.".to_string(),
        ])?;
        let key = terminal::wait_for_key(&[KeyCode::Char('r'), KeyCode::Char(' '), KeyCode::Esc])?;
        if key != KeyCode::Char('r') {
            return Ok(());
        }
    }
}

fn load_images(session: &mut Session, pairs: usize) -> Result<Vec<String>>
{
    let images = session
        .images
        .fetch_multiple_images(pairs, "nature", IMAGE_SIZE, IMAGE_SIZE)?;
    for url in &images {
        session.images.preload(url)?;
    }
    Ok(images)
}

fn play_round(
    term: &mut TerminalGuard,
    session: &mut Session,
    round: &mut MemoryRound,
    difficulty: Difficulty,
) -> Result<Exit>
{
    let best = session.best(MEMORY_GAME);
    let card_count = round.cards().len();
    let mut selected = 0usize;
    let mut last_frame = Instant::now();
    let mut last_draw = Instant::now();

    loop {
        for event in terminal::pending_events()? {
            let before = selected;
            match event {
                Event::Key(KeyEvent {
                    code, modifiers, ..
                }) => match code {
                    KeyCode::Esc => return Ok(Exit::Quit),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(Exit::Quit);
                    }
                    KeyCode::Char('r') => return Ok(Exit::Restart(difficulty)),
                    KeyCode::Char('1') => return Ok(Exit::Restart(Difficulty::Easy)),
                    KeyCode::Char('2') => return Ok(Exit::Restart(Difficulty::Medium)),
                    KeyCode::Char('3') => return Ok(Exit::Restart(Difficulty::Hard)),
                    KeyCode::Left => selected = selected.saturating_sub(1),
                    KeyCode::Right => selected = (selected + 1).min(card_count.saturating_sub(1)),
                    KeyCode::Up => selected = selected.saturating_sub(GRID_COLUMNS),
                    KeyCode::Down => {
                        if selected + GRID_COLUMNS < card_count {
                            selected += GRID_COLUMNS;
                        }
                    }
                    KeyCode::Enter | KeyCode::Char(' ') => reveal(session, round, selected),
                    _ => {}
                },
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    column,
                    row,
                    ..
                }) => {
                    if let Some(index) = card_at(column as usize, row as usize, card_count) {
                        selected = index;
                        reveal(session, round, index);
                    }
                }
                _ => {}
            }
            if selected != before {
                session.play(SoundCue::Hover);
            }
        }

        let now = Instant::now();
        for event in round.advance(now.saturating_duration_since(last_frame)) {
            match event {
                MemoryEvent::Matched { .. } => session.play(SoundCue::Success),
                MemoryEvent::Reverted => session.play(SoundCue::Error),
                MemoryEvent::Complete => {}
            }
        }
        last_frame = now;

        if round.status() == RoundStatus::Complete {
            return Ok(Exit::Finished);
        }

        if last_draw.elapsed() >= Duration::from_millis(TICK_MS) {
            term.draw(&render(round, selected, difficulty, best))?;
            last_draw = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(1));
    }
}

fn reveal(session: &mut Session, round: &mut MemoryRound, index: usize)
{
    match round.reveal(index) {
        RevealResult::Revealed | RevealResult::Compared { .. } => session.play(SoundCue::Click),
        RevealResult::Rejected(reason) => tracing::trace!(?reason, index, "reveal rejected"),
    }
}

fn card_at(column: usize, row: usize, card_count: usize) -> Option<usize>
{
    let row = row.checked_sub(HEADER_ROWS)?;
    let (grid_row, within_y) = (row / (CARD_H + CARD_GAP_Y), row % (CARD_H + CARD_GAP_Y));
    let (grid_col, within_x) = (column / (CARD_W + CARD_GAP_X), column % (CARD_W + CARD_GAP_X));
    if within_y >= CARD_H || within_x >= CARD_W || grid_col >= GRID_COLUMNS {
        return None;
    }
    let index = grid_row * GRID_COLUMNS + grid_col;
    (index < card_count).then_some(index)
}

fn pair_color(pair_id: usize) -> Rgb
{
    Rgb::from_hsl(pair_id as f64 * 45.0, 0.7, 0.55)
}

fn pair_symbol(pair_id: usize) -> char
{
    char::from(b'A' + (pair_id % 26) as u8)
}

/// Three text rows for one card.
fn card_rows(card: &Card, is_selected: bool) -> [String; CARD_H]
{
    let (bg, fg, middle) = match card.face {
        CardFace::FaceDown => (BACK, WHITE, "?".to_string()),
        CardFace::FaceUp => (pair_color(card.pair_id), WHITE, pair_symbol(card.pair_id).to_string()),
        CardFace::Matched => (
            pair_color(card.pair_id),
            MATCHED_FG,
            format!("{} ok", pair_symbol(card.pair_id)),
        ),
    };
    let bg = if is_selected && card.face != CardFace::FaceUp {
        SELECTED
    } else {
        bg
    };
    let blank = paint(&" ".repeat(CARD_W), bg, fg);
    let centered = paint(&format!("{middle:^width$}", width = CARD_W), bg, fg);
    [blank.clone(), centered, blank]
}

fn render(round: &MemoryRound, selected: usize, difficulty: Difficulty, best: Option<u32>) -> Vec<String>
{
    let mut lines = Vec::new();
    lines.push(format!("Picture Games - {MEMORY_GAME} ({})", difficulty.name()));
    lines.push(format!(
        "Moves {}   Matches {} / {}   Time {}s   Best {}",
        round.moves(),
        round.matched_pairs(),
        round.pair_count(),
        round.elapsed(),
        best.map_or_else(|| "-".to_string(), |b| b.to_string())
    ));
    lines.push(String::new());
    lines.push(String::new());

    let gap_x = " ".repeat(CARD_GAP_X);
    for (row_index, row) in round.cards().chunks(GRID_COLUMNS).enumerate() {
        let mut rows: [String; CARD_H] = Default::default();
        for (col_index, card) in row.iter().enumerate() {
            let index = row_index * GRID_COLUMNS + col_index;
            for (line, text) in rows.iter_mut().zip(card_rows(card, index == selected)) {
                line.push_str(&text);
                line.push_str(&gap_x);
            }
        }
        lines.extend(rows);
        for _ in 0..CARD_GAP_Y {
            lines.push(String::new());
        }
    }

    if let Some(card) = round.cards().get(selected) {
        if card.face != CardFace::FaceDown {
            lines.push(format!("Picture: {}", card.image));
        } else {
            lines.push(String::new());
        }
    }
    lines.push("Arrows or click to pick, Enter flips. 1/2/3 difficulty, R restarts, Esc quits.".to_string());
    lines
}
