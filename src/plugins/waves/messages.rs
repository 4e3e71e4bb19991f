//! Wave message queues.
//!
//! Producers never touch trackers or controllers directly:
//! - patterns produce `SpawnRequest`s, consumed by the spawner of each prototype
//! - gameplay produces `MemberReport`s, consumed once per tick by the tracker system
//! - trackers produce `WaveCompleted`, consumed by the game flow

use bevy::prelude::*;

use super::patterns::SpawnOrder;

/// Instantiate `order`; tag the result with `WaveMember { wave }` when tracked.
#[derive(Message, Clone, Copy, Debug)]
pub struct SpawnRequest {
    pub wave: Option<Entity>,
    pub order: SpawnOrder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberOutcome {
    Killed,
    Destroyed,
}

/// One ordered queue for both signals keeps `Killed` ahead of `Destroyed`.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberReport {
    pub wave: Entity,
    pub outcome: MemberOutcome,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveCompleted {
    pub wave: Entity,
    pub fully_cleared: bool,
}
