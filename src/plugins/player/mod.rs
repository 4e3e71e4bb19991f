//! Player plugin.
//!
//! Pipeline:
//! - Update: sample input, write PlayerInput resource
//! - FixedUpdate: apply velocity to kinematic rigid body, tick shield, fire volleys
//! - FixedPostUpdate: resolve contacts against hostiles, enemy bolts and powerups
//!
//! The player's `level` doubles as its life counter: powerups raise it, hits
//! lower it and raise a temporary shield. A hit at level 0 destroys the ship.

use avian2d::collision::narrow_phase::CollisionEventSystems;
use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::cleanup::PendingDespawn;
use crate::common::layers::{Layer, non_interacting};
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::enemies::{Asteroid, Enemy, EnemyLifeState};
use crate::plugins::powerup::Powerup;
use crate::plugins::projectiles::collision::{is_in_layer, process_bolt_collisions, targets};
use crate::plugins::projectiles::{Bolt, BoltKind, Health, spawn_bolt};

pub const MAX_LEVEL: i32 = 2;

const PLAYER_RADIUS: f32 = 0.4;

/// Bolts leave the ship this far ahead of its centre.
const MUZZLE_OFFSET: f32 = 0.5;

#[derive(Component, Debug, Clone, Copy)]
pub struct Player;

/// The player was hit below level 0.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerDestroyed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Shield up (or control already lost): nothing happens.
    Absorbed,
    /// Lost a level, shield raised.
    Survived,
    Destroyed,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub level: i32,
    /// Seconds of shield left; zero when down.
    pub shield: f32,
    pub controllable: bool,
    /// Seconds until the next volley may fire.
    pub fire_cooldown: f32,
}

impl PlayerStatus {
    pub fn new(level: i32) -> Self {
        Self { level: level.clamp(0, MAX_LEVEL), shield: 0.0, controllable: true, fire_cooldown: 0.0 }
    }

    #[inline]
    pub fn shield_active(&self) -> bool {
        self.shield > 0.0
    }

    pub fn take_hit(&mut self, shield_duration: f32) -> HitOutcome {
        if !self.controllable || self.shield_active() {
            return HitOutcome::Absorbed;
        }

        self.level -= 1;
        if self.level < 0 {
            self.controllable = false;
            return HitOutcome::Destroyed;
        }

        self.shield = shield_duration;
        HitOutcome::Survived
    }

    /// Returns the level after the powerup; capped at `MAX_LEVEL`.
    pub fn raise_level(&mut self) -> i32 {
        if self.level < MAX_LEVEL {
            self.level += 1;
        }
        self.level
    }
}

#[derive(Resource, Default, Debug)]
struct PlayerInput {
    move_axis: Vec2,
    fire: bool,
}

/// `(lateral offset, tilt in radians towards +x)` for every bolt of a volley.
pub fn volley(level: i32) -> &'static [(f32, f32)] {
    const TILT: f32 = 25.0 * std::f32::consts::PI / 180.0;
    match level {
        i32::MIN..=0 => &[(0.0, 0.0)],
        1 => &[(-0.25, 0.0), (0.25, 0.0)],
        _ => &[(-0.25, 0.0), (0.25, 0.0), (0.5, TILT), (-0.5, -TILT)],
    }
}

pub fn plugin(app: &mut App) {
    app.add_message::<PlayerDestroyed>();

    app.insert_resource(PlayerInput::default())
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(Update, (gather_input, shield_tint).run_if(in_state(GameState::InGame)))
        .add_systems(
            FixedUpdate,
            (tick_status, apply_movement, fire_volleys)
                .chain()
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            process_player_contacts
                .after(CollisionEventSystems)
                .after(process_bolt_collisions)
                .run_if(in_state(GameState::InGame)),
        );
}

fn spawn(mut commands: Commands, tunables: Res<Tunables>) {
    let layers = CollisionLayers::new(Layer::Player, [Layer::Enemy, Layer::EnemyBolt, Layer::Pickup]);
    let (x, y) = tunables.player.spawn;

    commands.spawn((
        Name::new("Player"),
        Player,
        PlayerStatus::new(tunables.player.start_level),
        Sprite {
            color: Color::srgb(0.2, 0.75, 0.9),
            custom_size: Some(Vec2::splat(PLAYER_RADIUS * 2.0)),
            ..default()
        },
        Transform::from_xyz(x, y, 1.0),
        RigidBody::Kinematic,
        Collider::circle(PLAYER_RADIUS),
        layers,
        LinearVelocity::ZERO,
        CollisionEventsEnabled,
        DespawnOnExit(GameState::InGame),
    ));
}

fn gather_input(keys: Option<Res<ButtonInput<KeyCode>>>, mut input: ResMut<PlayerInput>) {
    // Headless apps have no keyboard.
    let Some(keys) = keys else {
        return;
    };

    let mut axis = Vec2::ZERO;

    if keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        axis.y += 1.0;
    }
    if keys.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        axis.y -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        axis.x -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        axis.x += 1.0;
    }

    input.move_axis = axis.normalize_or_zero();
    input.fire = keys.pressed(KeyCode::Space);
}

fn tick_status(time: Res<Time<Fixed>>, mut q: Query<&mut PlayerStatus>) {
    let dt = time.delta_secs();
    for mut status in &mut q {
        status.shield = (status.shield - dt).max(0.0);
        status.fire_cooldown = (status.fire_cooldown - dt).max(0.0);
    }
}

fn apply_movement(
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q_player: Query<(&PlayerStatus, &mut LinearVelocity, &mut Transform), With<Player>>,
) {
    let Ok((status, mut vel, mut tf)) = q_player.single_mut() else {
        return;
    };

    if !status.controllable {
        vel.0 = Vec2::ZERO;
        return;
    }

    // Keep the whole ship inside the visible field.
    let limit = tunables.arena.half_extents() - Vec2::splat(PLAYER_RADIUS);
    let pos = tf.translation.truncate();
    let clamped = pos.clamp(-limit, limit);
    if clamped != pos {
        tf.translation.x = clamped.x;
        tf.translation.y = clamped.y;
    }

    let mut v = input.move_axis * tunables.player.speed;
    // No pushing against an edge the ship already touches.
    if (clamped.x >= limit.x && v.x > 0.0) || (clamped.x <= -limit.x && v.x < 0.0) {
        v.x = 0.0;
    }
    if (clamped.y >= limit.y && v.y > 0.0) || (clamped.y <= -limit.y && v.y < 0.0) {
        v.y = 0.0;
    }
    vel.0 = v;
}

fn fire_volleys(
    mut commands: Commands,
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q_player: Query<(&mut PlayerStatus, &Transform), (With<Player>, Without<PendingDespawn>)>,
) {
    let Ok((mut status, tf)) = q_player.single_mut() else {
        return;
    };
    if !input.fire || !status.controllable || status.fire_cooldown > 0.0 {
        return;
    }

    let muzzle = tf.translation.truncate() + Vec2::Y * MUZZLE_OFFSET;
    for &(offset, tilt) in volley(status.level) {
        let dir = Vec2::new(tilt.sin(), tilt.cos());
        spawn_bolt(
            &mut commands,
            BoltKind::Player,
            muzzle + Vec2::X * offset,
            dir * tunables.bolt.speed,
            &tunables.bolt,
        );
    }
    status.fire_cooldown = tunables.player.fire_rate;
}

/// Fade the ship towards white while the shield is up.
fn shield_tint(tunables: Res<Tunables>, mut q: Query<(&PlayerStatus, &mut Sprite), With<Player>>) {
    let duration = tunables.player.shield_duration.max(0.0001);
    for (status, mut sprite) in &mut q {
        let s = (status.shield / duration).clamp(0.0, 1.0);
        sprite.color = Color::srgb(0.2 + 0.8 * s, 0.75 + 0.25 * s, 0.9 + 0.1 * s);
    }
}

/// Contact rules between the player and everything that can touch it.
///
/// - enemy bolt: hit (absorbed by the shield); the bolt is spent either way
/// - enemy ship: shield up destroys it without a kill; otherwise the player
///   takes a hit and, if it survives, the ship is killed (via its `Health`)
/// - asteroid: hit; the asteroid is destroyed without a kill
/// - powerup: level up; the powerup is consumed
/// - anything else on the enemy layer (boss parts): hit
pub fn process_player_contacts(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut started: MessageReader<CollisionStart>,
    mut destroyed: MessageWriter<PlayerDestroyed>,
    mut q_player: Query<&mut PlayerStatus, (With<Player>, Without<PendingDespawn>)>,
    q_bolts: Query<&Bolt>,
    mut q_ships: Query<(&EnemyLifeState, &mut Health), (With<Enemy>, Without<PendingDespawn>)>,
    q_asteroids: Query<(), (With<Asteroid>, Without<PendingDespawn>)>,
    q_powerups: Query<(), (With<Powerup>, Without<PendingDespawn>)>,
    q_layers: Query<&CollisionLayers>,
    // Per-frame dedupe of the non-player side
    mut handled: Local<HashSet<Entity>>,
) {
    handled.clear();
    let shield_duration = tunables.player.shield_duration;

    for ev in started.read() {
        let (t1, t2) = targets(ev);

        let (player, other) = if q_player.contains(t1.gameplay_owner()) {
            (t1.gameplay_owner(), t2)
        } else if q_player.contains(t2.gameplay_owner()) {
            (t2.gameplay_owner(), t1)
        } else {
            continue;
        };
        let other_e = other.gameplay_owner();
        if !handled.insert(other_e) {
            continue;
        }
        let Ok(mut status) = q_player.get_mut(player) else {
            continue;
        };

        let outcome = if let Ok(bolt) = q_bolts.get(other.collider) {
            if bolt.kind != BoltKind::Enemy {
                continue;
            }
            commands.entity(other.collider).insert((non_interacting(Layer::EnemyBolt), PendingDespawn));
            status.take_hit(shield_duration)
        } else if let Ok((life, mut health)) = q_ships.get_mut(other_e) {
            // A ship depleted by a bolt this step is left to the death lifecycle.
            if !matches!(life, EnemyLifeState::Alive) || health.is_depleted() {
                continue;
            }
            if status.shield_active() {
                commands.entity(other_e).insert((non_interacting(Layer::Enemy), PendingDespawn));
                HitOutcome::Absorbed
            } else {
                let outcome = status.take_hit(shield_duration);
                if outcome == HitOutcome::Survived {
                    health.hp = 0;
                }
                outcome
            }
        } else if q_asteroids.contains(other_e) {
            commands.entity(other_e).insert((non_interacting(Layer::Enemy), PendingDespawn));
            status.take_hit(shield_duration)
        } else if q_powerups.contains(other_e) {
            if status.controllable {
                let level = status.raise_level();
                info!("Powerup collected, player level {level}");
                commands.entity(other_e).insert((non_interacting(Layer::Pickup), PendingDespawn));
            }
            HitOutcome::Absorbed
        } else if q_layers.get(other.collider).is_ok_and(|l| is_in_layer(l, Layer::Enemy)) {
            status.take_hit(shield_duration)
        } else {
            continue;
        };

        match outcome {
            HitOutcome::Survived => debug!("Player hit, level now {}", status.level),
            HitOutcome::Destroyed => {
                info!("Player destroyed");
                commands.entity(player).insert((non_interacting(Layer::Player), PendingDespawn));
                destroyed.write(PlayerDestroyed);
            }
            HitOutcome::Absorbed => {}
        }
    }
}
