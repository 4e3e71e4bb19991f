//! Waves plugin: timed spawn schedules and per-wave completion tracking.
//!
//! ```text
//!   Update
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ advance_wave_controllers                                     │
//!   │   WaveController ── SequenceTask ── WavePattern::resume      │
//!   │   writes: SpawnRequest                                       │
//!   │ process_member_reports                                       │
//!   │   reads: MemberReport   mutates: CompletionTracker           │
//!   │   writes: WaveCompleted (once per tracker, then despawns)    │
//!   └──────────────────────────────────────────────────────────────┘
//!   PostUpdate
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ report_departed_members  (WaveMember + PendingDespawn)       │
//!   │   writes: MemberReport::Destroyed                            │
//!   │ despawn_marked                                               │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! `MemberReport::Killed` is written by whoever kills a member (enemies plugin)
//! in the frame of death, always before the member is marked for despawn.

use bevy::prelude::*;

use crate::common::cleanup::despawn_marked;
use crate::common::state::GameState;

pub mod controller;
pub mod messages;
pub mod patterns;
pub mod systems;
pub mod task;
pub mod tracker;

pub use controller::WaveController;
pub use messages::{MemberOutcome, MemberReport, SpawnRequest, WaveCompleted};
pub use patterns::{Behavior, Prototype, SpawnOrder, WavePattern};
pub use systems::{launch_wave, start_wave};
pub use tracker::{CompletionTracker, WaveMember};

/// Controllers advance and trackers settle inside this set.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaveSystems;

pub fn plugin(app: &mut App) {
    app.add_message::<SpawnRequest>()
        .add_message::<MemberReport>()
        .add_message::<WaveCompleted>();

    app.add_systems(
        Update,
        (systems::advance_wave_controllers, systems::process_member_reports)
            .chain()
            .in_set(WaveSystems)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(PostUpdate, systems::report_departed_members.before(despawn_marked));
}

#[cfg(test)]
mod tests;
