//! Deterministic random number generation for playouts.
//!
//! Same seed, same sequence. `fork` derives an independent deterministic
//! stream, so each playout of a batch gets its own RNG without the batch
//! order mattering.
//!
//! ```
//! use rust_efg::core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//! let mut playout_rng = rng.fork();
//!
//! let mut rng2 = GameRng::new(42);
//! let mut playout_rng2 = rng2.fork();
//!
//! assert_eq!(playout_rng.gen_index(100), playout_rng2.gen_index(100));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::action::Action;

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Derive an independent, deterministic stream.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self.seed.wrapping_add(self.fork_counter.wrapping_mul(0x9E3779B97F4A7C15));
        Self {
            inner: ChaCha8Rng::seed_from_u64(fork_seed),
            seed: fork_seed,
            fork_counter: 0,
        }
    }

    /// Uniform index in `0..len`.
    pub fn gen_index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Sample a chance outcome by probability.
    ///
    /// Probabilities need not be normalised. Returns `None` if `outcomes` is
    /// empty or carries no mass.
    pub fn sample_outcome(&mut self, outcomes: &[(Action, f64)]) -> Option<Action> {
        let total: f64 = outcomes.iter().map(|(_, p)| p).sum();
        if outcomes.is_empty() || total <= 0.0 {
            return None;
        }

        let mut threshold = self.inner.gen::<f64>() * total;

        for &(action, p) in outcomes {
            threshold -= p;
            if threshold <= 0.0 {
                return Some(action);
            }
        }

        // Floating point edge case - return last outcome with mass
        outcomes.iter().rev().find(|(_, p)| *p > 0.0).map(|(a, _)| *a)
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
            assert_eq!(rng1.gen_index(1000), rng2.gen_index(1000));
        }
    }

    #[test]
    fn test_fork_produces_different_sequence() {
        let mut rng = GameRng::new(42);
        let mut forked = rng.fork();

        let seq1: Vec<_> = (0..10).map(|_| rng.gen_index(1000)).collect();
        let seq2: Vec<_> = (0..10).map(|_| forked.gen_index(1000)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_sample_outcome_skips_zero_mass() {
        let mut rng = GameRng::new(7);
        let outcomes = [(Action(0), 0.0), (Action(1), 1.0), (Action(2), 0.0)];

        for _ in 0..50 {
            assert_eq!(rng.sample_outcome(&outcomes), Some(Action(1)));
        }
    }

    #[test]
    fn test_sample_outcome_empty() {
        let mut rng = GameRng::new(7);
        assert_eq!(rng.sample_outcome(&[]), None);
        assert_eq!(rng.sample_outcome(&[(Action(0), 0.0)]), None);
    }

    #[test]
    fn test_sample_outcome_covers_support() {
        let mut rng = GameRng::new(3);
        let outcomes = [(Action(0), 0.5), (Action(1), 0.5)];

        let mut seen = [false; 2];
        for _ in 0..200 {
            if let Some(a) = rng.sample_outcome(&outcomes) {
                seen[a.index()] = true;
            }
        }
        assert!(seen[0] && seen[1]);
    }

    #[test]
    fn test_choose() {
        let mut rng = GameRng::new(1);
        let items = [10, 20, 30];
        let chosen = rng.choose(&items).unwrap();
        assert!(items.contains(chosen));

        let empty: [i32; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }
}
