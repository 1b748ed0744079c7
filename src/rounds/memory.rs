//! Memory matching: flip two cards, keep them if they pair up.

use super::{MEMORY_GAME, RoundStatus, RoundSummary};
use crate::clock::{Deferred, RoundClock};
use crate::rng::GameRng;
use std::time::Duration;

pub const MATCH_DELAY: Duration = Duration::from_millis(500);
pub const MISMATCH_DELAY: Duration = Duration::from_millis(1000);
pub const GRID_COLUMNS: usize = 4;

const BASE_SCORE: u32 = 1000;
const MOVE_PENALTY: u32 = 10;
const SECOND_PENALTY: u32 = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Difficulty
{
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty
{
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn pairs(self) -> usize
    {
        match self {
            Difficulty::Easy => 4,
            Difficulty::Medium => 6,
            Difficulty::Hard => 8,
        }
    }

    pub fn name(self) -> &'static str
    {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_name(name: &str) -> Option<Self>
    {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardFace
{
    FaceDown,
    FaceUp,
    Matched,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card
{
    pub id: usize,
    pub image: String,
    pub pair_id: usize,
    pub face: CardFace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason
{
    NotActive,
    NoSuchCard,
    AlreadyUp,
    AlreadyMatched,
    /// Two cards are already waiting to be resolved.
    TwoPending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealResult
{
    /// First card of a comparison is up.
    Revealed,
    /// Second card is up; the outcome lands after a delay.
    Compared
    {
        matched: bool,
    },
    Rejected(RejectReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryEvent
{
    Matched
    {
        pair_id: usize,
    },
    Reverted,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Resolution
{
    first: usize,
    second: usize,
    matched: bool,
}

pub struct MemoryRound
{
    status: RoundStatus,
    cards: Vec<Card>,
    face_up: Vec<usize>,
    pair_count: usize,
    matched_pairs: usize,
    moves: u32,
    clock: RoundClock,
    pending: Deferred<Resolution>,
    generation: u64,
}

impl MemoryRound
{
    pub fn new() -> Self
    {
        Self {
            status: RoundStatus::NotStarted,
            cards: Vec::new(),
            face_up: Vec::new(),
            pair_count: 0,
            matched_pairs: 0,
            moves: 0,
            clock: RoundClock::count_up(),
            pending: Deferred::default(),
            generation: 0,
        }
    }

    /// Deals two face-down cards per image, shuffled.
    pub fn start_round(&mut self, images: Vec<String>, rng: &mut GameRng) -> &[Card]
    {
        self.generation += 1;
        self.pair_count = images.len();
        let mut cards: Vec<Card> = images
            .into_iter()
            .enumerate()
            .flat_map(|(pair_id, image)| {
                [0, 1].map(|half| Card {
                    id: pair_id * 2 + half,
                    image: image.clone(),
                    pair_id,
                    face: CardFace::FaceDown,
                })
            })
            .collect();
        rng.shuffle(&mut cards);
        self.cards = cards;
        self.face_up.clear();
        self.matched_pairs = 0;
        self.moves = 0;
        self.status = RoundStatus::Active;
        self.clock.start();
        tracing::debug!(
            generation = self.generation,
            pairs = self.pair_count,
            "memory round started"
        );
        if self.pair_count == 0 {
            // Nothing to match.
            self.status = RoundStatus::Complete;
            self.clock.stop();
        }
        &self.cards
    }

    pub fn reveal(&mut self, index: usize) -> RevealResult
    {
        if self.status != RoundStatus::Active {
            return RevealResult::Rejected(RejectReason::NotActive);
        }
        let Some(card) = self.cards.get(index) else {
            return RevealResult::Rejected(RejectReason::NoSuchCard);
        };
        match card.face {
            CardFace::FaceUp => return RevealResult::Rejected(RejectReason::AlreadyUp),
            CardFace::Matched => return RevealResult::Rejected(RejectReason::AlreadyMatched),
            CardFace::FaceDown => {}
        }
        if self.face_up.len() >= 2 {
            return RevealResult::Rejected(RejectReason::TwoPending);
        }

        self.cards[index].face = CardFace::FaceUp;
        self.face_up.push(index);
        if self.face_up.len() < 2 {
            return RevealResult::Revealed;
        }

        self.moves += 1;
        let (first, second) = (self.face_up[0], self.face_up[1]);
        let matched = self.cards[first].pair_id == self.cards[second].pair_id;
        let delay = if matched { MATCH_DELAY } else { MISMATCH_DELAY };
        self.pending.schedule(
            delay,
            self.generation,
            Resolution {
                first,
                second,
                matched,
            },
        );
        RevealResult::Compared { matched }
    }

    /// The clock runs up to each due resolution before it is applied, so
    /// a finishing match stops the clock at the moment it lands.
    pub fn advance(&mut self, dt: Duration) -> Vec<MemoryEvent>
    {
        let mut events = Vec::new();
        let base = self.pending.now();
        let mut consumed = Duration::ZERO;

        for entry in self.pending.advance(dt) {
            let offset = entry.due.saturating_sub(base).min(dt);
            self.clock.advance(offset.saturating_sub(consumed));
            consumed = consumed.max(offset);

            if entry.generation != self.generation {
                tracing::debug!(
                    stale = entry.generation,
                    current = self.generation,
                    "dropping card resolution from an earlier round"
                );
                continue;
            }
            events.extend(self.resolve(entry.action));
        }
        self.clock.advance(dt.saturating_sub(consumed));
        events
    }

    fn resolve(&mut self, resolution: Resolution) -> Vec<MemoryEvent>
    {
        let Resolution {
            first,
            second,
            matched,
        } = resolution;
        self.face_up.clear();

        if !matched {
            self.cards[first].face = CardFace::FaceDown;
            self.cards[second].face = CardFace::FaceDown;
            return vec![MemoryEvent::Reverted];
        }

        self.cards[first].face = CardFace::Matched;
        self.cards[second].face = CardFace::Matched;
        self.matched_pairs += 1;
        let mut events = vec![MemoryEvent::Matched {
            pair_id: self.cards[first].pair_id,
        }];

        if self.matched_pairs == self.pair_count {
            self.status = RoundStatus::Complete;
            self.clock.stop();
            tracing::info!(
                moves = self.moves,
                elapsed = self.clock.seconds(),
                score = self.score(),
                "all pairs matched"
            );
            events.push(MemoryEvent::Complete);
        }
        events
    }

    pub fn score(&self) -> u32
    {
        BASE_SCORE
            .saturating_sub(MOVE_PENALTY.saturating_mul(self.moves))
            .saturating_sub(SECOND_PENALTY.saturating_mul(self.clock.seconds()))
    }

    pub fn summary(&self) -> Option<RoundSummary>
    {
        (self.status == RoundStatus::Complete).then(|| RoundSummary {
            game: MEMORY_GAME,
            score: self.score(),
            elapsed: self.clock.seconds(),
        })
    }

    pub fn face_up_unresolved(&self) -> usize
    {
        self.cards
            .iter()
            .filter(|c| c.face == CardFace::FaceUp)
            .count()
    }

    pub fn cards(&self) -> &[Card]
    {
        &self.cards
    }

    pub fn status(&self) -> RoundStatus
    {
        self.status
    }

    pub fn moves(&self) -> u32
    {
        self.moves
    }

    pub fn matched_pairs(&self) -> usize
    {
        self.matched_pairs
    }

    pub fn pair_count(&self) -> usize
    {
        self.pair_count
    }

    pub fn elapsed(&self) -> u32
    {
        self.clock.seconds()
    }

    pub fn generation(&self) -> u64
    {
        self.generation
    }
}

impl Default for MemoryRound
{
    fn default() -> Self
    {
        Self::new()
    }
}
