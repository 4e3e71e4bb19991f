//! Shared gameplay randomness.
//!
//! Every random decision (wave choice, sideways mirroring, asteroid batches,
//! enemy fire delays) draws from this one stream so a configured seed replays
//! the same session.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Resource, Debug, Clone)]
pub struct GameRng(pub ChaCha8Rng);

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Use `seed` when given, otherwise draw one from the thread RNG.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random::<u64>);
        debug!("Gameplay RNG seed: {seed}");
        Self::seeded(seed)
    }
}
