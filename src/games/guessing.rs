use super::Session;
use super::terminal::{self, TICK_MS, TerminalGuard};
use crate::config::GuessingConfig;
use crate::error::Result;
use crate::rounds::GUESSING_GAME;
use crate::rounds::guessing::{Category, GuessOutcome, GuessingEvent, GuessingRound, Phase};
use crate::sound::SoundCue;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

const IMAGE_WIDTH: u32 = 800;
const IMAGE_HEIGHT: u32 = 600;
const MAX_GUESS_LEN: usize = 40;

pub fn run(session: &mut Session, config: &GuessingConfig) -> Result<()>
{
    let mut term = TerminalGuard::enter()?;
    let mut round = GuessingRound::new(config.countdown);
    round.start_round(&mut session.rng);

    let Some(mut image) = image_for_round(&mut term, session, &mut round)? else {
        return Ok(());
    };
    let mut input = String::new();
    let mut show_hint = false;
    let mut last_frame = Instant::now();
    let mut last_draw = Instant::now();

    'game: loop {
        for event in terminal::pending_events()? {
            let Event::Key(KeyEvent {
                code, modifiers, ..
            }) = event
            else {
                continue;
            };
            match code {
                KeyCode::Esc => break 'game,
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break 'game,
                KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                    session.play(SoundCue::Click);
                    round.restart(&mut session.rng);
                    input.clear();
                    show_hint = false;
                    match image_for_round(&mut term, session, &mut round)? {
                        Some(url) => image = url,
                        None => break 'game,
                    }
                    last_frame = Instant::now();
                }
                KeyCode::Char('n') if modifiers.contains(KeyModifiers::CONTROL) => {
                    session.play(SoundCue::Click);
                    round.skip(&mut session.rng);
                    input.clear();
                    show_hint = false;
                    match image_for_round(&mut term, session, &mut round)? {
                        Some(url) => image = url,
                        None => break 'game,
                    }
                    last_frame = Instant::now();
                }
                KeyCode::Tab => {
                    show_hint = true;
                    session.play(SoundCue::Click);
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Enter => match round.submit_guess(&input) {
                    Some(GuessOutcome::Correct) => {
                        session.play(SoundCue::Success);
                        input.clear();
                    }
                    Some(_) => {
                        session.play(SoundCue::Error);
                        input.clear();
                    }
                    None => {}
                },
                KeyCode::Char(ch) => {
                    if round.accepting_guesses() && input.chars().count() < MAX_GUESS_LEN {
                        input.push(ch);
                    }
                }
                _ => {}
            }
        }

        let now = Instant::now();
        let events = round.advance(now.saturating_duration_since(last_frame), &mut session.rng);
        last_frame = now;
        for event in events {
            match event {
                GuessingEvent::TimedOut => {
                    session.play(SoundCue::Error);
                    input.clear();
                }
                GuessingEvent::NextRound => {
                    show_hint = false;
                    match image_for_round(&mut term, session, &mut round)? {
                        Some(url) => image = url,
                        None => break 'game,
                    }
                    // Loading may have taken a while; don't charge it to the new round.
                    last_frame = Instant::now();
                }
                GuessingEvent::Retry => {}
            }
        }

        if last_draw.elapsed() >= Duration::from_millis(TICK_MS) {
            term.draw(&render(&round, &image, &input, show_hint))?;
            last_draw = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(1));
    }

    if let Some(summary) = round.session_summary() {
        session.record(&summary);
    }
    Ok(())
}

fn load_image(session: &mut Session, category: &Category) -> Result<String>
{
    let url = session
        .images
        .fetch_random_image(category.query, IMAGE_WIDTH, IMAGE_HEIGHT)?;
    session.images.preload(&url)?;
    Ok(url)
}

/// Image for the current round, retrying on request. `None` when the
/// player gives up.
fn image_for_round(
    term: &mut TerminalGuard,
    session: &mut Session,
    round: &mut GuessingRound,
) -> Result<Option<String>>
{
    loop {
        term.draw(&["Loading image...".to_string()])?;
        match load_image(session, round.category()) {
            Ok(url) => return Ok(Some(url)),
            Err(err) if err.is_retryable() => {
                tracing::warn!("guessing image failed: {err}");
                term.draw(&[
                    GUESSING_GAME.to_string(),
                    String::new(),
                    "Failed to load image. Please try again.".to_string(),
                    String::new(),
                    "R retries, Esc quits.".to_string(),
                ])?;
                if terminal::wait_for_key(&[KeyCode::Char('r'), KeyCode::Esc])? == KeyCode::Esc {
                    return Ok(None);
                }
                round.start_round(&mut session.rng);
            }
            Err(err) => return Err(err),
        }
    }
}

fn feedback(round: &GuessingRound) -> Option<String>
{
    let answer = round.category().canonical();
    match round.phase() {
        Phase::Guessing => None,
        Phase::Feedback(GuessOutcome::Correct) => Some("Correct! Well done!".to_string()),
        Phase::Feedback(GuessOutcome::Incorrect) => Some(format!(
            "Not quite! The answer was related to \"{answer}\". Try again!"
        )),
        Phase::Feedback(GuessOutcome::Timeout) => {
            Some(format!("Time's up! The answer was related to \"{answer}\"."))
        }
    }
}

fn render(round: &GuessingRound, image: &str, input: &str, show_hint: bool) -> Vec<String>
{
    let mut lines = Vec::new();
    lines.push(format!("Picture Games - {GUESSING_GAME}"));
    lines.push(format!(
        "Round {}   Score {}   Time left {}s",
        round.round_number(),
        round.score(),
        round.remaining()
    ));
    lines.push(String::new());
    lines.push(format!("Open this picture: {image}"));
    lines.push(String::new());
    lines.push(format!("Your guess: {input}_"));
    lines.push(String::new());
    if let Some(text) = feedback(round) {
        lines.push(text);
    } else if show_hint {
        if let Some(hint) = round.hint() {
            lines.push(format!("Hint: the image is related to \"{hint}\""));
        }
    } else {
        lines.push(String::new());
    }
    lines.push(String::new());
    lines.push("Enter submits. Tab shows a hint. Ctrl+N skips. Ctrl+R restarts. Esc quits.".to_string());
    lines
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::rng::GameRng;

    #[test]
    fn feedback_follows_phase()
    {
        let mut rng = GameRng::new(11);
        let mut round = GuessingRound::default();
        round.start_round(&mut rng);
        assert_eq!(feedback(&round), None);

        round.submit_guess("zzzz");
        let text = feedback(&round).unwrap();
        assert!(text.contains(round.category().canonical()));
        assert!(text.starts_with("Not quite"));
    }

    #[test]
    fn render_shows_round_and_input()
    {
        let mut round = GuessingRound::default();
        round.start_round(&mut GameRng::new(12));
        let lines = render(&round, "https://picsum.photos/800/600?random=1", "do", false);
        assert!(lines.iter().any(|l| l.contains("Round 1")));
        assert!(lines.iter().any(|l| l.contains("Your guess: do_")));
    }
}
