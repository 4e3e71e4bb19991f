//! Test helpers.
//!
//! Systems that use `Commands` enqueue structural changes; we call `world.flush()`
//! after running so queued commands are applied before assertions.

use std::time::Duration;

use bevy::ecs::message::{Message, Messages};
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// Install a manually driven `Time` so systems reading `Res<Time>` see `dt`.
pub fn insert_time(world: &mut World) {
    world.insert_resource(Time::<()>::default());
}

/// Advance the manual clock by `secs`; the next system run sees it as its delta.
pub fn advance_time(world: &mut World, secs: f32) {
    world.resource_mut::<Time>().advance_by(Duration::from_secs_f32(secs));
}

/// Drain every message of type `M` currently buffered in the world.
pub fn drain_messages<M: Message + Clone>(world: &mut World) -> Vec<M> {
    world.resource_mut::<Messages<M>>().drain().collect()
}
