//! Projectiles plugin: bolts, guns and bolt hit resolution.
//!
//! ```text
//!   FixedUpdate
//!   ┌────────────────────────────────────────────────────────────┐
//!   │ fire_guns       Gun::ready -> spawn_bolt (enemy bolts)     │
//!   │ bolt_lifetime   Lifetime finished -> PendingDespawn        │
//!   └────────────────────────────────────────────────────────────┘
//!   FixedPostUpdate (after Avian writes CollisionStart)
//!   ┌────────────────────────────────────────────────────────────┐
//!   │ process_bolt_collisions                                    │
//!   │   player bolt x Health on enemy layer -> hp -= damage      │
//!   │   bolt -> non-interacting + PendingDespawn                 │
//!   └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bolts never despawn themselves. Removal goes through `PendingDespawn`
//! like every other gameplay entity. Enemy bolts hitting the player are
//! resolved by the player plugin, which owns the hit rules.

pub mod collision;
pub mod components;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::cleanup::PendingDespawn;
use crate::common::layers::Layer;
use crate::common::state::GameState;
use crate::common::tunables::{BoltTunables, Tunables};
use crate::plugins::world::CullOutsideArena;

pub use components::{Bolt, BoltKind, Gun, Health, Lifetime};

const BOLT_SIZE: Vec2 = Vec2::new(0.15, 0.5);

/// Gun muzzles sit this far below the shooter.
const MUZZLE_OFFSET: f32 = 0.6;

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        (fire_guns, bolt_lifetime).run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedPostUpdate,
        collision::process_bolt_collisions
            .after(CollisionEventSystems)
            .run_if(in_state(GameState::InGame)),
    );
}

#[inline]
pub fn bolt_layers(kind: BoltKind) -> CollisionLayers {
    match kind {
        BoltKind::Player => CollisionLayers::new(Layer::PlayerBolt, [Layer::Enemy]),
        BoltKind::Enemy => CollisionLayers::new(Layer::EnemyBolt, [Layer::Player]),
    }
}

/// Spawn one bolt travelling at `velocity`.
pub fn spawn_bolt(
    commands: &mut Commands,
    kind: BoltKind,
    position: Vec2,
    velocity: Vec2,
    tunables: &BoltTunables,
) -> Entity {
    let color = match kind {
        BoltKind::Player => Color::srgb(1.0, 0.85, 0.3),
        BoltKind::Enemy => Color::srgb(1.0, 0.3, 0.45),
    };

    commands
        .spawn((
            Name::new("Bolt"),
            Bolt { kind, damage: tunables.damage },
            Lifetime(Timer::from_seconds(tunables.lifetime, TimerMode::Once)),
            Sprite { color, custom_size: Some(BOLT_SIZE), ..default() },
            Transform::from_translation(position.extend(2.0)),
            RigidBody::Kinematic,
            Collider::rectangle(BOLT_SIZE.x, BOLT_SIZE.y),
            Sensor,
            bolt_layers(kind),
            LinearVelocity(velocity),
            // Avian only emits CollisionStart when one side opts in.
            CollisionEventsEnabled,
            CullOutsideArena,
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

fn fire_guns(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    mut q: Query<(&mut Gun, &Transform), Without<PendingDespawn>>,
) {
    let dt = time.delta_secs();
    for (mut gun, tf) in &mut q {
        if !gun.ready(dt) {
            continue;
        }
        let muzzle = tf.translation.truncate() - Vec2::Y * MUZZLE_OFFSET;
        spawn_bolt(
            &mut commands,
            BoltKind::Enemy,
            muzzle,
            Vec2::NEG_Y * tunables.bolt.enemy_speed,
            &tunables.bolt,
        );
    }
}

fn bolt_lifetime(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut q: Query<(Entity, &mut Lifetime), Without<PendingDespawn>>,
) {
    for (e, mut lifetime) in &mut q {
        lifetime.tick(time.delta());
        if lifetime.is_finished() {
            commands.entity(e).insert(PendingDespawn);
        }
    }
}
