//! Per-wave completion tracking.
//!
//! A tracker reconciles two per-member signals into one wave outcome:
//! - `Killed`: the member was destroyed by the player.
//! - `Destroyed`: the member left the world for any reason (always reported,
//!   exactly once per member, after `Killed` when both happen).
//!
//! When every expected member has been destroyed the tracker yields a single
//! `WaveOutcome` and retires. Any further signal is a defect.

use bevy::prelude::*;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveOutcome {
    /// Every member was killed by the player rather than escaping.
    pub fully_cleared: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("tracker has already reported completion")]
    Retired,
    #[error("more kills reported than the {expected} members expected")]
    TooManyKills { expected: u32 },
}

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct CompletionTracker {
    expected: u32,
    killed: u32,
    destroyed: u32,
    retired: bool,
}

impl CompletionTracker {
    /// `expected` is fixed here, before the first spawn; zero can never complete.
    pub fn new(expected: u32) -> Self {
        assert!(expected > 0, "a wave tracker must expect at least one member");
        Self { expected, killed: 0, destroyed: 0, retired: false }
    }

    #[inline]
    pub fn expected(&self) -> u32 {
        self.expected
    }

    #[inline]
    pub fn killed(&self) -> u32 {
        self.killed
    }

    #[inline]
    pub fn destroyed(&self) -> u32 {
        self.destroyed
    }

    #[inline]
    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub fn on_killed(&mut self) -> Result<(), TrackerError> {
        if self.retired {
            return Err(TrackerError::Retired);
        }
        if self.killed == self.expected {
            return Err(TrackerError::TooManyKills { expected: self.expected });
        }
        self.killed += 1;
        Ok(())
    }

    /// Returns the outcome on the call that destroys the last expected member.
    pub fn on_destroyed(&mut self) -> Result<Option<WaveOutcome>, TrackerError> {
        if self.retired {
            return Err(TrackerError::Retired);
        }
        self.destroyed += 1;
        if self.destroyed < self.expected {
            return Ok(None);
        }

        debug_assert!(self.killed <= self.destroyed);
        self.retired = true;
        Ok(Some(WaveOutcome { fully_cleared: self.killed == self.expected }))
    }
}

/// Spawned-entity handle: the wave entity whose tracker this member reports to.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveMember {
    pub wave: Entity,
}
