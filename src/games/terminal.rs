//! Raw-mode terminal plumbing shared by the game screens.

use crate::error::{GameError, Result};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use std::io::{self, Stdout, Write};
use std::time::Duration;

pub const TICK_MS: u64 = 33;

pub struct TerminalGuard
{
    stdout: Stdout,
}

impl TerminalGuard
{
    pub fn enter() -> Result<Self>
    {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode().map_err(GameError::Terminal)?;
        execute!(stdout, EnterAlternateScreen, Hide, EnableMouseCapture)
            .map_err(GameError::Terminal)?;
        Ok(Self { stdout })
    }

    pub fn draw(&mut self, lines: &[String]) -> Result<()>
    {
        let output = format!("{}\r\n", lines.join("\r\n"));
        queue!(self.stdout, MoveTo(0, 0), Clear(ClearType::All)).map_err(GameError::Terminal)?;
        self.stdout
            .write_all(output.as_bytes())
            .map_err(GameError::Terminal)?;
        self.stdout.flush().map_err(GameError::Terminal)
    }
}

impl Drop for TerminalGuard
{
    fn drop(&mut self)
    {
        let _ = execute!(self.stdout, DisableMouseCapture, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Everything queued right now, without blocking.
pub fn pending_events() -> Result<Vec<Event>>
{
    let mut events = Vec::new();
    while event::poll(Duration::from_millis(0)).map_err(GameError::Terminal)? {
        events.push(event::read().map_err(GameError::Terminal)?);
    }
    Ok(events)
}

/// Blocks until one of `keys` is pressed and returns it.
pub fn wait_for_key(keys: &[KeyCode]) -> Result<KeyCode>
{
    // Drop anything typed before the prompt appeared.
    pending_events()?;

    loop {
        if event::poll(Duration::from_millis(50)).map_err(GameError::Terminal)? {
            if let Event::Key(KeyEvent { code, .. }) = event::read().map_err(GameError::Terminal)? {
                if keys.contains(&code) {
                    return Ok(code);
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb
{
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb
{
    /// Saturation and lightness as fractions.
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self
    {
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let h = (hue.rem_euclid(360.0)) / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = lightness - c / 2.0;
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
        }
    }
}

pub fn paint(text: &str, bg: Rgb, fg: Rgb) -> String
{
    format!(
        "\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m{}\x1b[0m",
        bg.r, bg.g, bg.b, fg.r, fg.g, fg.b, text
    )
}
