//! RNG module - seeded tile generation
//!
//! Every random decision the engine makes (tile kinds on refill, bomb
//! promotion rolls, ambient bomb placement) goes through one [`TileSource`],
//! so a game is fully reproducible from its seed.
//!
//! Backed by ChaCha8 rather than the thread RNG to keep replays stable across
//! platforms and crate upgrades.

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::types::TileKind;

/// Deterministic source of tile kinds and engine dice rolls.
#[derive(Debug, Clone)]
pub struct TileSource {
    rng: ChaCha8Rng,
    seed: u64,
}

impl TileSource {
    /// Create a new source with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Fresh seed from the OS-backed thread RNG, for interactive play.
    pub fn entropy_seed() -> u64 {
        rand::rng().random()
    }

    /// Seed this source was created with (for restarting with the same sequence)
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniformly random tile kind
    pub fn next_kind(&mut self) -> TileKind {
        TileKind::from_index(self.rng.random_range(0..TileKind::ALL.len()))
    }

    /// Random value in `[0, max)`; `max` must be non-zero.
    pub fn next_range(&mut self, max: usize) -> usize {
        self.rng.random_range(0..max)
    }

    /// Bernoulli roll with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.random_bool(p.clamp(0.0, 1.0))
    }

    /// Raw 64-bit draw, used to derive per-game seeds.
    pub fn next_u64(&mut self) -> u64 {
        self.rng.random()
    }

    /// Up to `count` distinct items, in random order.
    pub fn pick_distinct<T: Copy>(&mut self, items: &[T], count: usize) -> Vec<T> {
        items.choose_multiple(&mut self.rng, count).copied().collect()
    }
}

impl Default for TileSource {
    fn default() -> Self {
        Self::new(1)
    }
}
