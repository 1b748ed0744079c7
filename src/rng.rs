//! Seedable randomness shared by every game.
//!
//! A fixed `--seed` reproduces a whole session, which is also what the
//! tests rely on.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Clone, Debug)]
pub struct GameRng
{
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng
{
    pub fn new(seed: u64) -> Self
    {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed from the thread RNG when the player didn't ask for one.
    pub fn from_entropy() -> Self
    {
        Self::new(rand::thread_rng().gen_range(0..u64::MAX))
    }

    pub fn seed(&self) -> u64
    {
        self.seed
    }

    /// Uniform draw in `[0, 1)`.
    pub fn unit(&mut self) -> f64
    {
        self.inner.gen_range(0.0..1.0)
    }

    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize
    {
        self.inner.gen_range(range)
    }

    /// In-place Fisher–Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T])
    {
        items.shuffle(&mut self.inner);
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn same_seed_same_sequence()
    {
        let mut a = GameRng::new(7);
        let mut b = GameRng::new(7);
        for _ in 0..50 {
            assert_eq!(a.gen_range_usize(0..1000), b.gen_range_usize(0..1000));
        }
    }

    #[test]
    fn unit_stays_in_half_open_range()
    {
        let mut rng = GameRng::new(3);
        for _ in 0..1000 {
            let v = rng.unit();
            assert!((0.0..1.0).contains(&v));
        }
    }

    proptest! {
        #[test]
        fn shuffle_is_a_permutation(seed in any::<u64>(), items in proptest::collection::vec(0u8..20, 0..40))
        {
            let mut rng = GameRng::new(seed);
            let mut out = items.clone();
            rng.shuffle(&mut out);
            prop_assert_eq!(out.len(), items.len());

            let mut sorted_in = items.clone();
            let mut sorted_out = out;
            sorted_in.sort_unstable();
            sorted_out.sort_unstable();
            prop_assert_eq!(sorted_in, sorted_out);
        }
    }
}
