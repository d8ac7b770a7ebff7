//! Deterministic random number generation.
//!
//! The engine never reaches for ambient randomness: every randomized outcome
//! (severance draws, offering confidence, attrition rolls, candidate ability
//! variance, development results) flows through a single seeded [`GameRng`]
//! owned by the orchestrator. Same seed, same simulation: that is what makes
//! replaying a bug report or asserting on a scenario possible.
//!
//! The generator is xorshift64*: small state, fast, good statistical quality
//! for game purposes, and trivially serializable so a host can checkpoint
//! RNG position alongside its other state.

use serde::{Deserialize, Serialize};

/// Seeded xorshift64* generator.
///
/// # Example
/// ```
/// use venture_simulator_core::GameRng;
///
/// let mut rng = GameRng::new(42);
/// let months = rng.range_i64(1, 4); // severance months in [1, 4)
/// assert!((1..4).contains(&months));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    /// Create a generator from a seed. A zero seed is remapped to 1
    /// (all-zero state is a fixed point of xorshift).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Advance the state and return the next raw value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform integer in `[min, max)`.
    ///
    /// # Panics
    /// Panics if `min >= max`.
    pub fn range_i64(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");
        let span = (max - min) as u64;
        min + (self.next_u64() % span) as i64
    }

    /// Uniform float in `[0.0, 1.0)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform float in `[min, max)`.
    ///
    /// # Panics
    /// Panics if `min >= max`.
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        assert!(min < max, "min must be less than max");
        min + self.next_f64() * (max - min)
    }

    /// Bernoulli trial with probability `p` (clamped to [0, 1]).
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }

    /// Current internal state, for checkpointing.
    pub fn state(&self) -> u64 {
        self.state
    }
}
