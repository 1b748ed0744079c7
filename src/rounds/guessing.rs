//! Guess what the picture shows before the countdown runs out.

use super::{GUESSING_GAME, RoundStatus, RoundSummary};
use crate::clock::{Deferred, RoundClock};
use crate::rng::GameRng;
use std::time::Duration;

pub const DEFAULT_COUNTDOWN: u32 = 30;
pub const FEEDBACK_DELAY: Duration = Duration::from_millis(2000);
const POINTS_PER_CORRECT: u32 = 10;

#[derive(Debug, PartialEq, Eq)]
pub struct Category
{
    pub query: &'static str,
    /// First entry is the canonical answer, the rest are synonyms.
    pub answers: &'static [&'static str],
}

pub const CATEGORIES: [Category; 5] = [
    Category {
        query: "animal",
        answers: &[
            "animal", "dog", "cat", "bird", "horse", "elephant", "lion", "tiger", "bear", "deer",
        ],
    },
    Category {
        query: "nature",
        answers: &[
            "nature", "landscape", "mountain", "forest", "tree", "lake", "river", "ocean",
            "beach", "sunset",
        ],
    },
    Category {
        query: "food",
        answers: &[
            "food", "pizza", "burger", "cake", "fruit", "vegetable", "bread", "pasta", "sushi",
            "salad",
        ],
    },
    Category {
        query: "building",
        answers: &[
            "building", "house", "architecture", "skyscraper", "tower", "bridge", "church",
            "castle", "monument",
        ],
    },
    Category {
        query: "vehicle",
        answers: &[
            "vehicle", "car", "truck", "bike", "motorcycle", "bus", "train", "airplane", "boat",
            "ship",
        ],
    },
];

impl Category
{
    pub fn canonical(&self) -> &'static str
    {
        self.answers[0]
    }

    /// Loose on purpose: the guess may sit inside an answer or an answer
    /// inside the guess, so "ca" and "my red car" both count for vehicles.
    pub fn accepts(&self, guess: &str) -> bool
    {
        let guess = normalize(guess);
        !guess.is_empty()
            && self.answers.iter().any(|answer| {
                let answer = answer.to_lowercase();
                guess.contains(&answer) || answer.contains(&guess)
            })
    }
}

fn normalize(text: &str) -> String
{
    text.trim().to_lowercase()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuessOutcome
{
    Correct,
    Incorrect,
    /// Countdown hit zero with no correct answer.
    Timeout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase
{
    Guessing,
    Feedback(GuessOutcome),
}

/// What `advance` changed, for the presentation to react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuessingEvent
{
    TimedOut,
    NextRound,
    Retry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Continuation
{
    Advance,
    Retry,
}

pub struct GuessingRound
{
    countdown: u32,
    status: RoundStatus,
    category: usize,
    score: u32,
    round_number: u32,
    phase: Phase,
    clock: RoundClock,
    pending: Deferred<Continuation>,
    generation: u64,
}

impl GuessingRound
{
    pub fn new(countdown: u32) -> Self
    {
        Self {
            countdown,
            status: RoundStatus::NotStarted,
            category: 0,
            score: 0,
            round_number: 1,
            phase: Phase::Guessing,
            clock: RoundClock::count_down(countdown),
            pending: Deferred::default(),
            generation: 0,
        }
    }

    pub fn start_round(&mut self, rng: &mut GameRng) -> &'static Category
    {
        self.generation += 1;
        self.category = rng.gen_range_usize(0..CATEGORIES.len());
        self.status = RoundStatus::Active;
        self.phase = Phase::Guessing;
        self.clock.start();
        tracing::debug!(
            generation = self.generation,
            round = self.round_number,
            query = self.category().query,
            "guessing round started"
        );
        self.category()
    }

    /// Back to round one with no points.
    pub fn restart(&mut self, rng: &mut GameRng) -> &'static Category
    {
        self.score = 0;
        self.round_number = 1;
        self.start_round(rng)
    }

    /// `None` when the guess is blank or the round isn't taking guesses.
    pub fn submit_guess(&mut self, text: &str) -> Option<GuessOutcome>
    {
        if normalize(text).is_empty() {
            return None;
        }
        if self.status != RoundStatus::Active || self.phase != Phase::Guessing {
            return None;
        }

        self.clock.stop();
        let outcome = if self.category().accepts(text) {
            self.score += POINTS_PER_CORRECT;
            self.round_number += 1;
            self.status = RoundStatus::Complete;
            self.pending
                .schedule(FEEDBACK_DELAY, self.generation, Continuation::Advance);
            GuessOutcome::Correct
        } else {
            self.pending
                .schedule(FEEDBACK_DELAY, self.generation, Continuation::Retry);
            GuessOutcome::Incorrect
        };
        self.phase = Phase::Feedback(outcome);
        tracing::debug!(guess = text, ?outcome, "guess checked");
        Some(outcome)
    }

    /// Moves time forward by `dt`. The countdown runs up to each due
    /// continuation, the continuation runs, then the countdown takes the
    /// rest, so a restarted countdown is only charged from its restart.
    pub fn advance(&mut self, dt: Duration, rng: &mut GameRng) -> Vec<GuessingEvent>
    {
        let mut events = Vec::new();
        let base = self.pending.now();
        let mut consumed = Duration::ZERO;

        for entry in self.pending.advance(dt) {
            let offset = entry.due.saturating_sub(base).min(dt);
            self.run_clock(offset.saturating_sub(consumed), &mut events);
            consumed = consumed.max(offset);

            if entry.generation != self.generation {
                tracing::debug!(
                    stale = entry.generation,
                    current = self.generation,
                    "dropping continuation from an earlier round"
                );
                continue;
            }
            match entry.action {
                Continuation::Advance => {
                    self.start_round(rng);
                    events.push(GuessingEvent::NextRound);
                }
                Continuation::Retry => {
                    self.phase = Phase::Guessing;
                    self.clock.start();
                    events.push(GuessingEvent::Retry);
                }
            }
        }

        self.run_clock(dt.saturating_sub(consumed), &mut events);
        events
    }

    /// A timeout's auto-advance is scheduled from the end of the current
    /// `advance`, so it never fires in the same call.
    fn run_clock(&mut self, step: Duration, events: &mut Vec<GuessingEvent>)
    {
        let update = self.clock.advance(step);
        if update.expired && self.accepting_guesses() {
            self.clock.stop();
            self.status = RoundStatus::Complete;
            self.phase = Phase::Feedback(GuessOutcome::Timeout);
            self.pending
                .schedule(FEEDBACK_DELAY, self.generation, Continuation::Advance);
            events.push(GuessingEvent::TimedOut);
        }
    }

    /// Drops the current picture for a new one without touching score or
    /// round number. Anything still pending for the old picture is void.
    pub fn skip(&mut self, rng: &mut GameRng) -> &'static Category
    {
        tracing::debug!(round = self.round_number, "picture skipped");
        self.start_round(rng)
    }

    pub fn category(&self) -> &'static Category
    {
        &CATEGORIES[self.category]
    }

    pub fn hint(&self) -> Option<&'static str>
    {
        (self.status != RoundStatus::NotStarted).then(|| self.category().query)
    }

    pub fn accepting_guesses(&self) -> bool
    {
        self.status == RoundStatus::Active && self.phase == Phase::Guessing
    }

    /// Ledger entry for the whole session, if anything was scored.
    pub fn session_summary(&self) -> Option<RoundSummary>
    {
        (self.score > 0).then(|| RoundSummary {
            game: GUESSING_GAME,
            score: self.score,
            elapsed: self.countdown.saturating_sub(self.clock.seconds()),
        })
    }

    pub fn status(&self) -> RoundStatus
    {
        self.status
    }

    pub fn phase(&self) -> Phase
    {
        self.phase
    }

    pub fn score(&self) -> u32
    {
        self.score
    }

    pub fn round_number(&self) -> u32
    {
        self.round_number
    }

    pub fn remaining(&self) -> u32
    {
        self.clock.seconds()
    }

    pub fn generation(&self) -> u64
    {
        self.generation
    }
}

impl Default for GuessingRound
{
    fn default() -> Self
    {
        Self::new(DEFAULT_COUNTDOWN)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn started(seed: u64) -> (GuessingRound, GameRng)
    {
        let mut rng = GameRng::new(seed);
        let mut round = GuessingRound::default();
        round.start_round(&mut rng);
        (round, rng)
    }

    fn animals() -> &'static Category
    {
        &CATEGORIES[0]
    }

    #[test]
    fn catalog_canonical_is_query()
    {
        for category in &CATEGORIES {
            assert_eq!(category.canonical(), category.query);
        }
    }

    #[test]
    fn exact_term_is_accepted()
    {
        assert!(animals().accepts("cat"));
        assert!(animals().accepts("  DOG "));
    }

    #[test]
    fn containment_goes_both_ways()
    {
        assert!(animals().accepts("a black cat on a wall"));
        assert!(animals().accepts("ca"));
        assert!(animals().accepts("ele"));
        assert!(!animals().accepts("zzzz"));
        assert!(!animals().accepts("   "));
    }

    #[test]
    fn blank_guess_changes_nothing()
    {
        let (mut round, _) = started(1);
        assert_eq!(round.submit_guess("   "), None);
        assert_eq!(round.phase(), Phase::Guessing);
        assert!(round.accepting_guesses());
    }

    #[test]
    fn correct_guess_scores_and_advances()
    {
        let (mut round, mut rng) = started(2);
        let answer = round.category().canonical();
        assert_eq!(round.submit_guess(answer), Some(GuessOutcome::Correct));
        assert_eq!(round.score(), 10);
        assert_eq!(round.round_number(), 2);
        assert_eq!(round.status(), RoundStatus::Complete);

        // Locked during feedback.
        assert_eq!(round.submit_guess(answer), None);

        let generation = round.generation();
        assert!(round.advance(Duration::from_millis(1999), &mut rng).is_empty());
        let events = round.advance(Duration::from_millis(1), &mut rng);
        assert_eq!(events, vec![GuessingEvent::NextRound]);
        assert_eq!(round.generation(), generation + 1);
        assert!(round.accepting_guesses());
        assert_eq!(round.remaining(), DEFAULT_COUNTDOWN);
    }

    #[test]
    fn wrong_guess_retries_same_round()
    {
        let (mut round, mut rng) = started(3);
        let query = round.category().query;
        round.advance(Duration::from_secs(5), &mut rng);
        assert_eq!(round.submit_guess("zzzz"), Some(GuessOutcome::Incorrect));
        assert_eq!(round.score(), 0);
        assert_eq!(round.status(), RoundStatus::Active);

        // Clock is frozen while feedback shows.
        round.advance(Duration::from_millis(1500), &mut rng);
        assert_eq!(round.remaining(), DEFAULT_COUNTDOWN - 5);

        let events = round.advance(Duration::from_millis(500), &mut rng);
        assert_eq!(events, vec![GuessingEvent::Retry]);
        assert_eq!(round.category().query, query);
        assert_eq!(round.remaining(), DEFAULT_COUNTDOWN);
        assert!(round.accepting_guesses());
    }

    #[test]
    fn countdown_to_zero_is_timeout_not_incorrect()
    {
        let (mut round, mut rng) = started(4);
        let events = round.advance(Duration::from_secs(30), &mut rng);
        assert_eq!(events, vec![GuessingEvent::TimedOut]);
        assert_eq!(round.phase(), Phase::Feedback(GuessOutcome::Timeout));
        assert_eq!(round.status(), RoundStatus::Complete);
        assert_eq!(round.score(), 0);
        assert_eq!(round.round_number(), 1);

        let events = round.advance(FEEDBACK_DELAY, &mut rng);
        assert_eq!(events, vec![GuessingEvent::NextRound]);
        assert!(round.accepting_guesses());
    }

    #[test]
    fn stale_continuation_does_not_touch_new_round()
    {
        let (mut round, mut rng) = started(5);
        let answer = round.category().canonical();
        round.submit_guess(answer);

        round.restart(&mut rng);
        let generation = round.generation();
        let category = round.category();

        let events = round.advance(FEEDBACK_DELAY, &mut rng);
        assert!(events.is_empty());
        assert_eq!(round.generation(), generation);
        assert_eq!(round.category(), category);
        assert_eq!(round.score(), 0);
        assert_eq!(round.round_number(), 1);
    }

    #[test]
    fn retry_countdown_starts_when_feedback_ends()
    {
        let (mut round, mut rng) = started(8);
        round.submit_guess("zzzz");
        let events = round.advance(Duration::from_secs(3), &mut rng);
        assert_eq!(events, vec![GuessingEvent::Retry]);
        assert_eq!(round.remaining(), DEFAULT_COUNTDOWN - 1);
    }

    #[test]
    fn next_round_countdown_starts_when_feedback_ends()
    {
        let (mut round, mut rng) = started(9);
        let answer = round.category().canonical();
        round.submit_guess(answer);
        let events = round.advance(Duration::from_millis(4500), &mut rng);
        assert_eq!(events, vec![GuessingEvent::NextRound]);
        assert_eq!(round.remaining(), DEFAULT_COUNTDOWN - 2);
    }

    #[test]
    fn restart_hands_out_a_full_countdown()
    {
        let (mut round, mut rng) = started(12);
        round.advance(Duration::from_secs(20), &mut rng);
        assert_eq!(round.remaining(), DEFAULT_COUNTDOWN - 20);

        round.restart(&mut rng);
        assert_eq!(round.remaining(), DEFAULT_COUNTDOWN);
        assert!(round.advance(Duration::ZERO, &mut rng).is_empty());
        assert_eq!(round.remaining(), DEFAULT_COUNTDOWN);
    }

    #[test]
    fn skip_keeps_score_and_round()
    {
        let (mut round, mut rng) = started(10);
        let answer = round.category().canonical();
        round.submit_guess(answer);
        round.advance(FEEDBACK_DELAY, &mut rng);
        round.advance(Duration::from_secs(7), &mut rng);

        let generation = round.generation();
        round.skip(&mut rng);
        assert_eq!(round.generation(), generation + 1);
        assert_eq!(round.score(), 10);
        assert_eq!(round.round_number(), 2);
        assert_eq!(round.remaining(), DEFAULT_COUNTDOWN);
        assert!(round.accepting_guesses());
    }

    #[test]
    fn skip_during_feedback_voids_pending_retry()
    {
        let (mut round, mut rng) = started(11);
        round.submit_guess("zzzz");
        round.skip(&mut rng);
        let generation = round.generation();

        round.advance(Duration::from_secs(5), &mut rng);
        assert_eq!(round.generation(), generation);
        assert_eq!(round.remaining(), DEFAULT_COUNTDOWN - 5);
        assert_eq!(round.phase(), Phase::Guessing);
        assert_eq!(round.score(), 0);
    }

    #[test]
    fn session_summary_needs_points()
    {
        let (mut round, mut rng) = started(6);
        assert!(round.session_summary().is_none());

        round.advance(Duration::from_secs(4), &mut rng);
        let answer = round.category().canonical();
        round.submit_guess(answer);
        let summary = round.session_summary().unwrap();
        assert_eq!(summary.game, GUESSING_GAME);
        assert_eq!(summary.score, 10);
        assert_eq!(summary.elapsed, 4);
    }

    #[test]
    fn hint_is_category_query()
    {
        let mut round = GuessingRound::default();
        assert_eq!(round.hint(), None);
        let category = round.start_round(&mut GameRng::new(7));
        assert_eq!(round.hint(), Some(category.query));
    }
}
