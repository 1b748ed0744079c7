//! Round engines, one per game, all the same shape: a status, a clock, a
//! score and a generation counter that bumps on every new round.

pub mod difference;
pub mod guessing;
pub mod memory;

use crate::ledger::ScoreEntry;

pub const DIFFERENCE_GAME: &str = "Spot the Difference";
pub const GUESSING_GAME: &str = "Image Guessing";
pub const MEMORY_GAME: &str = "Memory Matching";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundStatus
{
    NotStarted,
    Active,
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundSummary
{
    pub game: &'static str,
    pub score: u32,
    pub elapsed: u32,
}

impl RoundSummary
{
    pub fn to_entry(&self) -> ScoreEntry
    {
        ScoreEntry::now(self.game, self.score, self.elapsed)
    }
}

/// Position on an image, both axes scaled to `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point
{
    pub x: f64,
    pub y: f64,
}

impl Point
{
    pub fn new(x: f64, y: f64) -> Self
    {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64
    {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}
