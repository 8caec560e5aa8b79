//! Deterministic random number generation for shuffles and draws.
//!
//! The only randomness in a match: bag shuffles, deck shuffles, the random
//! starting-player policy and blind reserves from a random level. Card
//! generation and the spiral fill order never consult the RNG.
//!
//! ```
//! use gem_duel::core::GameRng;
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! let (mut left, mut right) = ([1, 2, 3, 4, 5], [1, 2, 3, 4, 5]);
//! a.shuffle(&mut left);
//! b.shuffle(&mut right);
//! assert_eq!(left, right);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded ChaCha8 stream owned by one match.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Generate a random boolean with given probability of true.
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen_bool(0.5), rng2.gen_bool(0.5));
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = GameRng::new(1);
        let mut rng2 = GameRng::new(2);

        let mut seq1: Vec<u32> = (0..20).collect();
        let mut seq2 = seq1.clone();
        rng1.shuffle(&mut seq1);
        rng2.shuffle(&mut seq2);

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = GameRng::new(42);
        let mut data: Vec<u32> = (1..=25).collect();

        rng.shuffle(&mut data);
        assert_ne!(data, (1..=25).collect::<Vec<_>>());

        data.sort_unstable();
        assert_eq!(data, (1..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_choose() {
        let mut rng = GameRng::new(42);
        let items = [1, 2, 3];
        assert!(items.contains(rng.choose(&items).unwrap()));

        let empty: [i32; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }
}
