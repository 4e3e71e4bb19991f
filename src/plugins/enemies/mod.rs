//! Enemies plugin: turns spawn requests into hostiles and runs their death.
//!
//! ---------------------------
//! HOW THIS IS DESIGNED (ECS)
//! ---------------------------
//! 1) FACTS live in components:
//!    - `Health`, `EnemyLifeState` describe gameplay reality.
//!    - `WaveMember` ties a hostile to the tracker of the wave that spawned it.
//!
//! 2) RULES mutate facts in predictable places:
//!    - bolt and contact resolution (projectiles / player) lower `Health`.
//!    - this module reads `Health` and transitions `EnemyLifeState`.
//!
//! 3) REPORTING is a side effect of a transition:
//!    - Alive -> Dying writes `MemberReport::Killed` (and awards score).
//!    - `PendingDespawn` later yields `MemberReport::Destroyed` (waves plugin).
//!
//! Ships and asteroids share one shape: a kinematic body on the enemy layer
//! with a `Movement`, `Health` and a `ScoreValue`. Ships get a short dying
//! state; asteroids break up at once.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use rand::Rng;

use crate::common::cleanup::PendingDespawn;
use crate::common::layers::{Layer, non_interacting};
use crate::common::rng::GameRng;
use crate::common::score::Score;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::movement::Movement;
use crate::plugins::player::process_player_contacts;
use crate::plugins::projectiles::collision::process_bolt_collisions;
use crate::plugins::projectiles::{Gun, Health};
use crate::plugins::waves::{MemberOutcome, MemberReport, Prototype, SpawnOrder, SpawnRequest, WaveMember, WaveSystems};
use crate::plugins::world::CullOutsideArena;

const ENEMY_RADIUS: f32 = 0.45;

// -----------------------------------------------------------------------------
// Components
// -----------------------------------------------------------------------------

#[derive(Component, Debug, Clone, Copy)]
pub struct Enemy;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Asteroid {
    pub variant: u8,
}

impl Asteroid {
    #[inline]
    pub fn radius(self) -> f32 {
        0.35 + 0.15 * f32::from(self.variant)
    }
}

/// Points awarded when the player destroys this entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreValue(pub u32);

/// Enemy lifecycle state machine.
///
/// - Alive: normal gameplay.
/// - Dying: short transition animation; no longer interacts.
/// - Dead: terminal marker to stop further state transitions.
#[derive(Component, Debug, Clone)]
pub enum EnemyLifeState {
    Alive,
    Dying { timer: Timer },
    Dead,
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        spawn_requested_hostiles
            .after(WaveSystems)
            .run_if(in_state(GameState::InGame)),
    );

    // Death runs after both hit resolvers so it sees this step's Health.
    app.add_systems(
        FixedPostUpdate,
        (enemy_death_trigger, enemy_death_progress, break_asteroids)
            .after(process_bolt_collisions)
            .after(process_player_contacts)
            .run_if(in_state(GameState::InGame)),
    );
}

/// Enemy collision intent: the player and the player's bolts.
#[inline]
pub fn enemy_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [Layer::Player, Layer::PlayerBolt])
}

// -----------------------------------------------------------------------------
// Spawn
// -----------------------------------------------------------------------------

/// Instantiate every requested prototype; tracked requests become wave members.
fn spawn_requested_hostiles(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut requests: MessageReader<SpawnRequest>,
) {
    for request in requests.read() {
        let e = match request.order.prototype {
            Prototype::Enemy => spawn_enemy(&mut commands, &request.order, &tunables, &mut rng.0),
            Prototype::Asteroid { variant } => {
                spawn_asteroid(&mut commands, &request.order, Asteroid { variant }, &tunables)
            }
        };

        if let Some(wave) = request.wave {
            commands.entity(e).insert(WaveMember { wave });
        }
    }
}

pub fn spawn_enemy<R: Rng + ?Sized>(
    commands: &mut Commands,
    order: &SpawnOrder,
    tunables: &Tunables,
    rng: &mut R,
) -> Entity {
    let enemy = &tunables.enemy;
    let mut e = commands.spawn((
        Name::new("Enemy"),
        Enemy,
        Health { hp: enemy.health },
        ScoreValue(enemy.score),
        EnemyLifeState::Alive,
        Movement::for_behavior(order.behavior, order.position, enemy),
        Sprite {
            color: Color::srgb(0.9, 0.25, 0.25),
            custom_size: Some(Vec2::splat(ENEMY_RADIUS * 2.0)),
            ..default()
        },
        Transform::from_translation(order.position),
        RigidBody::Kinematic,
        Collider::circle(ENEMY_RADIUS),
        enemy_layers(),
        LinearVelocity::ZERO,
        CullOutsideArena,
        DespawnOnExit(GameState::InGame),
    ));

    // Only hard sessions arm their enemies, after a random warm-up.
    if tunables.difficulty.is_hard() {
        let (min, max) = enemy.fire_delay;
        e.insert(Gun::new(rng.random_range(min..=max), enemy.fire_rate));
    }

    e.id()
}

pub fn spawn_asteroid(commands: &mut Commands, order: &SpawnOrder, asteroid: Asteroid, tunables: &Tunables) -> Entity {
    let radius = asteroid.radius();
    commands
        .spawn((
            Name::new(format!("Asteroid{}", asteroid.variant)),
            asteroid,
            Health { hp: tunables.asteroid.health },
            ScoreValue(tunables.asteroid.score),
            Movement::Straight { velocity: Vec2::NEG_Y * tunables.asteroid.speed },
            Sprite {
                color: Color::srgb(0.45, 0.42, 0.38),
                custom_size: Some(Vec2::splat(radius * 2.0)),
                ..default()
            },
            Transform::from_translation(order.position),
            RigidBody::Kinematic,
            Collider::circle(radius),
            enemy_layers(),
            LinearVelocity::ZERO,
            CullOutsideArena,
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

// -----------------------------------------------------------------------------
// Rules: death lifecycle
// -----------------------------------------------------------------------------

/// Transition Alive -> Dying when HP drops to 0.
///
/// This is the single place a ship counts as killed: score and the
/// `Killed` report happen here, in the same step, before any despawn mark.
fn enemy_death_trigger(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut score: ResMut<Score>,
    mut reports: MessageWriter<MemberReport>,
    mut q: Query<
        (
            Entity,
            &Health,
            &ScoreValue,
            Option<&WaveMember>,
            &mut EnemyLifeState,
            &mut CollisionLayers,
            &mut Sprite,
        ),
        (With<Enemy>, Without<PendingDespawn>),
    >,
) {
    for (e, hp, value, member, mut life, mut layers, mut sprite) in &mut q {
        if !matches!(*life, EnemyLifeState::Alive) || !hp.is_depleted() {
            continue;
        }

        *life = EnemyLifeState::Dying {
            timer: Timer::from_seconds(tunables.enemy.dying_time, TimerMode::Once),
        };
        *layers = non_interacting(Layer::Enemy);
        sprite.color = Color::srgba(0.8, 0.8, 0.8, 1.0);
        commands.entity(e).remove::<Gun>();

        score.add(value.0);
        if let Some(member) = member {
            reports.write(MemberReport { wave: member.wave, outcome: MemberOutcome::Killed });
        }
    }
}

/// Animate Dying state and mark PendingDespawn once finished.
fn enemy_death_progress(
    time: Res<Time<Fixed>>,
    mut commands: Commands,
    mut q: Query<(Entity, &mut EnemyLifeState, &mut Sprite, &mut Transform), (With<Enemy>, Without<PendingDespawn>)>,
) {
    for (e, mut life, mut sprite, mut tf) in &mut q {
        let EnemyLifeState::Dying { timer } = &mut *life else {
            continue;
        };

        timer.tick(time.delta());

        let dur = timer.duration().as_secs_f32().max(0.0001);
        let t = (timer.elapsed_secs() / dur).clamp(0.0, 1.0);
        tf.scale = Vec3::splat(1.0 - t);

        let mut c = sprite.color.to_srgba();
        c.alpha = 1.0 - t;
        sprite.color = c.into();

        if timer.is_finished() {
            *life = EnemyLifeState::Dead;
            commands.entity(e).insert(PendingDespawn);
        }
    }
}

/// Asteroids have no dying state: depleted means gone, with score.
fn break_asteroids(
    mut commands: Commands,
    mut score: ResMut<Score>,
    mut reports: MessageWriter<MemberReport>,
    mut q: Query<
        (Entity, &Health, &ScoreValue, Option<&WaveMember>, &mut CollisionLayers),
        (With<Asteroid>, Without<PendingDespawn>),
    >,
) {
    for (e, hp, value, member, mut layers) in &mut q {
        if !hp.is_depleted() {
            continue;
        }
        *layers = non_interacting(Layer::Enemy);
        score.add(value.0);
        if let Some(member) = member {
            reports.write(MemberReport { wave: member.wave, outcome: MemberOutcome::Killed });
        }
        commands.entity(e).insert(PendingDespawn);
    }
}
