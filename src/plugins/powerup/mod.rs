//! Powerups: a pickup drifting down the field that raises the player's level.
//!
//! Collection is resolved by the player plugin's contact rules.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::Layer;
use crate::common::state::GameState;
use crate::common::tunables::{PowerupTunables, plane_point};
use crate::plugins::movement::Movement;
use crate::plugins::world::CullOutsideArena;

const POWERUP_RADIUS: f32 = 0.35;

#[derive(Component, Debug, Clone, Copy)]
pub struct Powerup;

pub fn spawn_powerup(commands: &mut Commands, tunables: &PowerupTunables) -> Entity {
    commands
        .spawn((
            Name::new("Powerup"),
            Powerup,
            Movement::Straight { velocity: Vec2::NEG_Y * tunables.speed },
            Sprite {
                color: Color::srgb(0.35, 1.0, 0.45),
                custom_size: Some(Vec2::splat(POWERUP_RADIUS * 2.0)),
                ..default()
            },
            Transform::from_translation(plane_point(tunables.spawn)),
            RigidBody::Kinematic,
            Collider::circle(POWERUP_RADIUS),
            Sensor,
            CollisionLayers::new(Layer::Pickup, [Layer::Player]),
            LinearVelocity::ZERO,
            CullOutsideArena,
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}
