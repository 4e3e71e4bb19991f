//! World plugin: the play field backdrop and its bounds.
//!
//! Anything tagged `CullOutsideArena` that drifts past the field (plus a
//! margin, so entities can spawn just off-screen) is marked for despawn.
//! Wave members culled this way report `Destroyed` but never `Killed`.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::cleanup::PendingDespawn;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;

/// Marker: removed once outside the arena bounds.
#[derive(Component, Debug, Clone, Copy)]
pub struct CullOutsideArena;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_backdrop);
    app.add_systems(Update, cull_outside_arena.run_if(in_state(GameState::InGame)));
}

fn spawn_backdrop(mut commands: Commands, tunables: Res<Tunables>) {
    let size = tunables.arena.half_extents() * 2.0;
    commands.spawn((
        Name::new("Backdrop"),
        Sprite::from_color(Color::srgb(0.04, 0.04, 0.09), size),
        Transform::from_xyz(0.0, 0.0, 0.0),
        DespawnOnExit(GameState::InGame),
    ));
}

fn cull_outside_arena(
    mut commands: Commands,
    tunables: Res<Tunables>,
    q: Query<(Entity, &Transform), (With<CullOutsideArena>, Without<PendingDespawn>)>,
) {
    let bounds = tunables.arena.cull_bounds();
    for (e, tf) in &q {
        if !bounds.contains(tf.translation.truncate()) {
            commands.entity(e).insert(PendingDespawn);
        }
    }
}
