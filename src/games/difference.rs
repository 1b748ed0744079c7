use super::Session;
use super::terminal::{self, Rgb, TICK_MS, TerminalGuard, paint};
use crate::error::Result;
use crate::rounds::difference::{
    DEFAULT_HEIGHT, DEFAULT_WIDTH, DifferenceRound, DifferenceTarget, GuessResult, TARGET_COUNT,
};
use crate::rounds::{DIFFERENCE_GAME, Point, RoundStatus};
use crate::sound::SoundCue;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::{Duration, Instant};

const PANEL_W: usize = 40;
const PANEL_H: usize = 16;
const PANEL_GAP: usize = 4;
const HEADER_ROWS: usize = 4;

const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// The "photo" both panels share, one colour per cell.
struct Scene
{
    url: String,
    cells: Vec<Rgb>,
}

enum Exit
{
    Finished,
    Restart,
    Quit,
}

enum Action
{
    Quit,
    Restart,
    Move(isize, isize),
    Guess,
    GuessAt(usize, usize),
}

pub fn run(session: &mut Session) -> Result<()>
{
    let mut term = TerminalGuard::enter()?;

    loop {
        term.draw(&["Loading image...".to_string()])?;
        let scene = match load_scene(session) {
            Ok(scene) => scene,
            Err(err) if err.is_retryable() => {
                tracing::warn!("difference image failed: {err}");
                term.draw(&[
                    DIFFERENCE_GAME.to_string(),
                    String::new(),
                    "Failed to load image. Please try again.".to_string(),
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

        let mut round = DifferenceRound::new(DEFAULT_WIDTH, DEFAULT_HEIGHT);
        round.start_round(&mut session.rng);

        match play_round(&mut term, session, &scene, &mut round)? {
            Exit::Quit => return Ok(()),
            Exit::Restart => {
                session.play(SoundCue::Click);
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
            "All differences found!".to_string(),
            String::new(),
            format!("Time: {} seconds", summary.elapsed),
            format!("Time bonus: {} points", round.time_bonus()),
            format!("Final score: {} points", summary.score),
            String::new(),
            "R plays again. Space or Esc exits.".to_string(),
        ])?;
        let key = terminal::wait_for_key(&[KeyCode::Char('r'), KeyCode::Char(' '), KeyCode::Esc])?;
        if key != KeyCode::Char('r') {
            return Ok(());
        }
    }
}

fn load_scene(session: &mut Session) -> Result<Scene>
{
    let url = session
        .images
        .fetch_random_image("nature", DEFAULT_WIDTH, DEFAULT_HEIGHT)?;
    session.images.preload(&url)?;

    let base_hue = session.rng.unit() * 360.0;
    let phase_x = session.rng.unit() * std::f64::consts::TAU;
    let phase_y = session.rng.unit() * std::f64::consts::TAU;
    let mut cells = Vec::with_capacity(PANEL_W * PANEL_H);
    for row in 0..PANEL_H {
        for col in 0..PANEL_W {
            let hue = base_hue
                + 40.0 * (col as f64 * 0.3 + phase_x).sin()
                + 30.0 * (row as f64 * 0.5 + phase_y).cos();
            let lightness = 0.3 + 0.08 * session.rng.unit();
            cells.push(Rgb::from_hsl(hue, 0.35, lightness));
        }
    }
    Ok(Scene { url, cells })
}

fn play_round(
    term: &mut TerminalGuard,
    session: &mut Session,
    scene: &Scene,
    round: &mut DifferenceRound,
) -> Result<Exit>
{
    let best = session.best(DIFFERENCE_GAME);
    let mut cursor = (PANEL_W / 2, PANEL_H / 2);
    let mut message: Option<String> = None;
    let mut last_frame = Instant::now();
    let mut last_draw = Instant::now();

    loop {
        for event in terminal::pending_events()? {
            let Some(action) = map_event(event) else {
                continue;
            };
            match action {
                Action::Quit => return Ok(Exit::Quit),
                Action::Restart => return Ok(Exit::Restart),
                Action::Move(dx, dy) => {
                    let moved = (
                        cursor.0.saturating_add_signed(dx).min(PANEL_W - 1),
                        cursor.1.saturating_add_signed(dy).min(PANEL_H - 1),
                    );
                    if moved != cursor {
                        cursor = moved;
                        session.play(SoundCue::Hover);
                    }
                }
                Action::GuessAt(col, row) => {
                    cursor = (col, row);
                    message = Some(check(session, round, cursor));
                }
                Action::Guess => {
                    message = Some(check(session, round, cursor));
                }
            }
        }

        let now = Instant::now();
        round.advance(now.saturating_duration_since(last_frame));
        last_frame = now;

        if round.status() == RoundStatus::Complete {
            return Ok(Exit::Finished);
        }

        if last_draw.elapsed() >= Duration::from_millis(TICK_MS) {
            term.draw(&render(scene, round, cursor, &message, best))?;
            last_draw = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(1));
    }
}

fn check(session: &mut Session, round: &mut DifferenceRound, cursor: (usize, usize)) -> String
{
    match round.submit_guess(cell_center(cursor.0, cursor.1)) {
        GuessResult::Hit(_) => {
            session.play(SoundCue::Success);
            "Found one!".to_string()
        }
        GuessResult::Miss => {
            session.play(SoundCue::Error);
            "Nothing different there.".to_string()
        }
    }
}

fn map_event(event: Event) -> Option<Action>
{
    match event {
        Event::Key(KeyEvent {
            code, modifiers, ..
        }) => match code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Restart),
            KeyCode::Left => Some(Action::Move(-1, 0)),
            KeyCode::Right => Some(Action::Move(1, 0)),
            KeyCode::Up => Some(Action::Move(0, -1)),
            KeyCode::Down => Some(Action::Move(0, 1)),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Guess),
            _ => None,
        },
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => panel_cell(column as usize, row as usize).map(|(c, r)| Action::GuessAt(c, r)),
        _ => None,
    }
}

/// Screen position to panel cell; either panel counts.
fn panel_cell(column: usize, row: usize) -> Option<(usize, usize)>
{
    let row = row.checked_sub(HEADER_ROWS).filter(|r| *r < PANEL_H)?;
    if column < PANEL_W {
        return Some((column, row));
    }
    let right = column.checked_sub(PANEL_W + PANEL_GAP)?;
    (right < PANEL_W).then_some((right, row))
}

fn cell_center(col: usize, row: usize) -> Point
{
    Point::new(
        (col as f64 + 0.5) / PANEL_W as f64,
        (row as f64 + 0.5) / PANEL_H as f64,
    )
}

fn covers(target: &DifferenceTarget, col: usize, row: usize) -> bool
{
    let center = cell_center(col, row);
    let dx = (center.x - target.center.x) * DEFAULT_WIDTH as f64;
    let dy = (center.y - target.center.y) * DEFAULT_HEIGHT as f64;
    let own_col = ((target.center.x * PANEL_W as f64) as usize).min(PANEL_W - 1);
    let own_row = ((target.center.y * PANEL_H as f64) as usize).min(PANEL_H - 1);
    (col, row) == (own_col, own_row) || dx * dx + dy * dy <= target.radius * target.radius
}

fn render(
    scene: &Scene,
    round: &DifferenceRound,
    cursor: (usize, usize),
    message: &Option<String>,
    best: Option<u32>,
) -> Vec<String>
{
    let mut lines = Vec::new();
    lines.push(format!("Picture Games - {DIFFERENCE_GAME}"));
    lines.push(format!("Image: {}", scene.url));
    lines.push(format!(
        "Found {} / {}   Score {}   Time {}s   Best {}",
        round.found().len(),
        TARGET_COUNT,
        round.score(),
        round.elapsed(),
        best.map_or_else(|| "-".to_string(), |b| b.to_string())
    ));
    lines.push(String::new());

    for row in 0..PANEL_H {
        let mut left = String::new();
        let mut right = String::new();
        for col in 0..PANEL_W {
            let base = scene.cells[row * PANEL_W + col];
            let blob = round.targets().iter().find(|t| covers(t, col, row));
            let marked = blob.is_some_and(|t| round.is_found(t.id));
            let glyph = if (col, row) == cursor {
                "+"
            } else if marked {
                "o"
            } else {
                " "
            };
            left.push_str(&paint(glyph, base, WHITE));
            let modified = blob.map_or(base, |t| Rgb::from_hsl(t.hue, 0.7, 0.5));
            let fg = if marked { BLACK } else { WHITE };
            right.push_str(&paint(glyph, modified, fg));
        }
        lines.push(format!("{left}{}{right}", " ".repeat(PANEL_GAP)));
    }

    lines.push(String::new());
    lines.push(message.clone().unwrap_or_default());
    lines.push("Click a spot or move with arrows, Enter to check. R new image. Esc quits.".to_string());
    lines
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn clicks_map_to_either_panel()
    {
        assert_eq!(panel_cell(0, HEADER_ROWS), Some((0, 0)));
        assert_eq!(panel_cell(PANEL_W + PANEL_GAP + 3, HEADER_ROWS + 2), Some((3, 2)));
        assert_eq!(panel_cell(PANEL_W + 1, HEADER_ROWS), None);
        assert_eq!(panel_cell(0, 0), None);
        assert_eq!(panel_cell(0, HEADER_ROWS + PANEL_H), None);
    }

    #[test]
    fn every_cell_center_is_normalized()
    {
        let first = cell_center(0, 0);
        let last = cell_center(PANEL_W - 1, PANEL_H - 1);
        assert!(first.x > 0.0 && first.y > 0.0);
        assert!(last.x < 1.0 && last.y < 1.0);
    }

    #[test]
    fn target_cell_is_within_hit_range()
    {
        let target = DifferenceTarget {
            id: 0,
            center: Point::new(0.51, 0.49),
            radius: 10.0,
            hue: 0.0,
        };
        let col = (target.center.x * PANEL_W as f64) as usize;
        let row = (target.center.y * PANEL_H as f64) as usize;
        assert!(covers(&target, col, row));
        assert!(cell_center(col, row).distance(target.center) < crate::rounds::difference::HIT_THRESHOLD);
    }
}
