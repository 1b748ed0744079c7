//! Spot the difference: five synthetic blobs painted on a copy of the
//! image, found by clicking near them.

use super::{DIFFERENCE_GAME, Point, RoundStatus, RoundSummary};
use crate::clock::{ClockUpdate, RoundClock};
use crate::rng::GameRng;
use std::time::Duration;

pub const TARGET_COUNT: usize = 5;
pub const HIT_THRESHOLD: f64 = 0.05;
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

const POINTS_PER_HIT: u32 = 100;
const MAX_TIME_BONUS: u32 = 500;
const BONUS_LOSS_PER_SEC: u32 = 5;
const EDGE_MARGIN_PX: f64 = 25.0;
const MIN_SIZE_PX: f64 = 20.0;
const SIZE_SPREAD_PX: f64 = 30.0;

#[derive(Clone, Debug, PartialEq)]
pub struct DifferenceTarget
{
    pub id: usize,
    pub center: Point,
    /// Pixels, in the source image.
    pub radius: f64,
    pub hue: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuessResult
{
    Hit(usize),
    Miss,
}

pub struct DifferenceRound
{
    width: u32,
    height: u32,
    status: RoundStatus,
    targets: Vec<DifferenceTarget>,
    found: Vec<usize>,
    clock: RoundClock,
    generation: u64,
}

impl DifferenceRound
{
    pub fn new(width: u32, height: u32) -> Self
    {
        Self {
            width: width.max(1),
            height: height.max(1),
            status: RoundStatus::NotStarted,
            targets: Vec::new(),
            found: Vec::new(),
            clock: RoundClock::count_up(),
            generation: 0,
        }
    }

    /// Paints a fresh set of differences and starts the clock. Targets may
    /// land close enough to shadow each other; nothing spreads them apart.
    pub fn start_round(&mut self, rng: &mut GameRng) -> &[DifferenceTarget]
    {
        self.generation += 1;
        self.found.clear();
        self.targets = (0..TARGET_COUNT)
            .map(|id| {
                let x = place(rng, self.width);
                let y = place(rng, self.height);
                let size = MIN_SIZE_PX + rng.unit() * SIZE_SPREAD_PX;
                DifferenceTarget {
                    id,
                    center: Point::new(x / self.width as f64, y / self.height as f64),
                    radius: size / 2.0,
                    hue: rng.unit() * 360.0,
                }
            })
            .collect();
        self.status = RoundStatus::Active;
        self.clock.start();
        tracing::debug!(generation = self.generation, "difference round started");
        &self.targets
    }

    pub fn submit_guess(&mut self, point: Point) -> GuessResult
    {
        self.submit_guess_with(point, HIT_THRESHOLD)
    }

    pub fn submit_guess_with(&mut self, point: Point, threshold: f64) -> GuessResult
    {
        if self.status != RoundStatus::Active {
            return GuessResult::Miss;
        }

        let hit = self
            .targets
            .iter()
            .filter(|t| !self.found.contains(&t.id))
            .find(|t| point.distance(t.center) < threshold)
            .map(|t| t.id);

        let Some(id) = hit else {
            return GuessResult::Miss;
        };

        self.found.push(id);
        if self.found.len() == self.targets.len() {
            self.status = RoundStatus::Complete;
            self.clock.stop();
            tracing::info!(
                elapsed = self.clock.seconds(),
                score = self.final_score(),
                "all differences found"
            );
        }
        GuessResult::Hit(id)
    }

    pub fn advance(&mut self, dt: Duration) -> ClockUpdate
    {
        self.clock.advance(dt)
    }

    /// Points for hits so far, without the time bonus.
    pub fn score(&self) -> u32
    {
        POINTS_PER_HIT * self.found.len() as u32
    }

    pub fn time_bonus(&self) -> u32
    {
        MAX_TIME_BONUS.saturating_sub(BONUS_LOSS_PER_SEC.saturating_mul(self.clock.seconds()))
    }

    pub fn final_score(&self) -> u32
    {
        self.score() + self.time_bonus()
    }

    pub fn summary(&self) -> Option<RoundSummary>
    {
        (self.status == RoundStatus::Complete).then(|| RoundSummary {
            game: DIFFERENCE_GAME,
            score: self.final_score(),
            elapsed: self.clock.seconds(),
        })
    }

    pub fn status(&self) -> RoundStatus
    {
        self.status
    }

    pub fn targets(&self) -> &[DifferenceTarget]
    {
        &self.targets
    }

    pub fn found(&self) -> &[usize]
    {
        &self.found
    }

    pub fn is_found(&self, id: usize) -> bool
    {
        self.found.contains(&id)
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

impl Default for DifferenceRound
{
    fn default() -> Self
    {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Pixel coordinate kept clear of the border, like the painted blobs.
fn place(rng: &mut GameRng, extent: u32) -> f64
{
    let extent = extent as f64;
    let margin = EDGE_MARGIN_PX.min(extent / 2.0);
    rng.unit() * (extent - 2.0 * margin) + margin
}

#[cfg(test)]
mod tests
{
    use super::*;
    use proptest::prelude::*;

    fn started(seed: u64) -> DifferenceRound
    {
        let mut round = DifferenceRound::default();
        round.start_round(&mut GameRng::new(seed));
        round
    }

    #[test]
    fn start_makes_five_targets_in_order()
    {
        let round = started(1);
        assert_eq!(round.status(), RoundStatus::Active);
        let ids: Vec<_> = round.targets().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        for target in round.targets() {
            assert!((10.0..=25.0).contains(&target.radius));
            assert!((0.0..360.0).contains(&target.hue));
        }
    }

    #[test]
    fn hit_then_repeat_is_miss()
    {
        let mut round = started(2);
        let center = round.targets()[3].center;
        assert_eq!(round.submit_guess_with(center, 1e-9), GuessResult::Hit(3));
        assert_eq!(round.score(), 100);
        assert_eq!(round.submit_guess_with(center, 1e-9), GuessResult::Miss);
        assert_eq!(round.score(), 100);
        assert!(round.is_found(3));
    }

    #[test]
    fn first_generated_target_wins_overlap()
    {
        let mut round = started(9);
        let first = round.targets()[0].center;
        // Everything is within a threshold of 2.0 of everything else.
        assert_eq!(round.submit_guess_with(first, 2.0), GuessResult::Hit(0));
        assert_eq!(round.submit_guess_with(first, 2.0), GuessResult::Hit(1));
    }

    #[test]
    fn threshold_is_strict()
    {
        let mut round = started(3);
        let target = round.targets()[0].clone();
        // Distance zero is not strictly below a zero threshold.
        assert_eq!(round.submit_guess_with(target.center, 0.0), GuessResult::Miss);

        let inside = Point::new(target.center.x + 0.049, target.center.y);
        assert!(matches!(round.submit_guess(inside), GuessResult::Hit(_)));
    }

    #[test]
    fn far_click_misses()
    {
        let mut round = DifferenceRound::default();
        round.start_round(&mut GameRng::new(4));
        assert_eq!(round.submit_guess(Point::new(-1.0, -1.0)), GuessResult::Miss);
        assert_eq!(round.score(), 0);
        assert!(round.found().is_empty());
    }

    #[test]
    fn guesses_before_start_are_ignored()
    {
        let mut round = DifferenceRound::default();
        assert_eq!(round.submit_guess(Point::new(0.5, 0.5)), GuessResult::Miss);
        assert_eq!(round.status(), RoundStatus::NotStarted);
    }

    #[test]
    fn all_five_in_ten_seconds_scores_950()
    {
        let mut round = started(5);
        round.advance(Duration::from_secs(10));

        let mut hits = 0;
        while round.status() == RoundStatus::Active {
            let next = round
                .targets()
                .iter()
                .find(|t| !round.is_found(t.id))
                .map(|t| t.center)
                .unwrap();
            if let GuessResult::Hit(_) = round.submit_guess_with(next, 1e-9) {
                hits += 1;
            }
        }

        assert_eq!(hits, 5);
        let summary = round.summary().unwrap();
        assert_eq!(summary.score, 950);
        assert_eq!(summary.elapsed, 10);
        assert_eq!(summary.game, DIFFERENCE_GAME);
    }

    #[test]
    fn clock_stops_on_completion()
    {
        let mut round = started(6);
        let centers: Vec<_> = round.targets().iter().map(|t| t.center).collect();
        for center in centers {
            round.submit_guess_with(center, 1e-9);
        }
        assert_eq!(round.status(), RoundStatus::Complete);
        round.advance(Duration::from_secs(30));
        assert_eq!(round.elapsed(), 0);
        assert_eq!(round.final_score(), 1000);
    }

    #[test]
    fn slow_round_gets_no_bonus()
    {
        let mut round = started(7);
        round.advance(Duration::from_secs(200));
        assert_eq!(round.time_bonus(), 0);
    }

    #[test]
    fn restart_clears_found_and_bumps_generation()
    {
        let mut rng = GameRng::new(8);
        let mut round = DifferenceRound::default();
        round.start_round(&mut rng);
        let center = round.targets()[0].center;
        round.submit_guess(center);
        let generation = round.generation();

        round.start_round(&mut rng);
        assert!(round.found().is_empty());
        assert_eq!(round.generation(), generation + 1);
        assert_eq!(round.elapsed(), 0);
    }

    proptest! {
        #[test]
        fn targets_are_normalized(seed in any::<u64>(), width in 1u32..3000, height in 1u32..3000)
        {
            let mut round = DifferenceRound::new(width, height);
            let targets = round.start_round(&mut GameRng::new(seed));
            prop_assert_eq!(targets.len(), TARGET_COUNT);
            for t in targets {
                prop_assert!((0.0..=1.0).contains(&t.center.x));
                prop_assert!((0.0..=1.0).contains(&t.center.y));
            }
        }
    }
}
