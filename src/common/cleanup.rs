//! Centralised despawning.
//!
//! Nothing removes gameplay entities directly. Systems mark them with
//! `PendingDespawn` and `despawn_marked` removes them in PostUpdate, so
//! observers of the removal (wave trackers) get exactly one chance to see
//! each departing entity.

use bevy::prelude::*;

/// Marker: entity should be removed from the world.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn;

pub fn despawn_marked(mut commands: Commands, q: Query<Entity, With<PendingDespawn>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}
