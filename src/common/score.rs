//! Session score.

use bevy::prelude::*;

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Score(pub u64);

impl Score {
    #[inline]
    pub fn add(&mut self, points: u32) {
        self.0 = self.0.saturating_add(u64::from(points));
    }

    /// Multiplier granted for a fully cleared wave.
    #[inline]
    pub fn double(&mut self) {
        self.0 = self.0.saturating_mul(2);
    }
}
