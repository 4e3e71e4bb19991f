//! Boss plugin: the final fight.
//!
//! The boss is a body flying a figure eight, a core that only takes damage
//! while exposed, and weak points that expose the core once all are gone.
//! Parts are separate kinematic bodies that track the body every fixed step.
//!
//! ```text
//!   FixedUpdate      advance_cycles  (VulnerabilityCycle::tick -> spawn weak points / hide core)
//!                    follow_boss     (parts copy body position + velocity)
//!   FixedPostUpdate  vulnerability_hits (weak point depleted -> cycle -> expose core)
//!                    boss_defeat        (core depleted -> score, BossDefeated, despawn all)
//! ```

pub mod cycle;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::cleanup::PendingDespawn;
use crate::common::layers::{Layer, non_interacting};
use crate::common::score::Score;
use crate::common::state::GameState;
use crate::common::tunables::{Tunables, plane_point};
use crate::plugins::movement::{Movement, apply_movement};
use crate::plugins::projectiles::collision::process_bolt_collisions;
use crate::plugins::projectiles::{Gun, Health};

pub use cycle::{CycleEvent, CyclePhase, VulnerabilityCycle};

const BODY_SIZE: Vec2 = Vec2::new(3.2, 1.4);
const CORE_RADIUS: f32 = 0.5;
const VULNERABILITY_RADIUS: f32 = 0.35;

#[derive(Component, Debug, Clone, Copy)]
pub struct Boss {
    pub core: Entity,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct BossCore;

#[derive(Component, Debug, Clone, Copy)]
pub struct Vulnerability;

/// Rigidly attached to `boss` at `offset`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct BossPart {
    pub boss: Entity,
    pub offset: Vec2,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossDefeated;

pub fn plugin(app: &mut App) {
    app.add_message::<BossDefeated>();

    app.add_systems(
        FixedUpdate,
        (advance_cycles, follow_boss.after(apply_movement))
            .chain()
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedPostUpdate,
        (vulnerability_hits, boss_defeat)
            .after(process_bolt_collisions)
            .run_if(in_state(GameState::InGame)),
    );
}

/// Layers and visibility of the core; a hidden core ignores bolts.
#[inline]
fn core_state(exposed: bool) -> (CollisionLayers, Visibility) {
    if exposed {
        (CollisionLayers::new(Layer::Enemy, [Layer::Player, Layer::PlayerBolt]), Visibility::Inherited)
    } else {
        (non_interacting(Layer::Enemy), Visibility::Hidden)
    }
}

/// Spawn the boss body and its (hidden) core. Weak points come later.
pub fn spawn_boss(commands: &mut Commands, tunables: &Tunables) -> Entity {
    let cfg = &tunables.boss;
    let position = plane_point(cfg.spawn);
    let hp = if tunables.difficulty.is_hard() { cfg.health * 2 } else { cfg.health };

    let boss = commands
        .spawn((
            Name::new("Boss"),
            Movement::FigureEight { max_speed: cfg.max_speed, period: cfg.period, elapsed: 0.0 },
            VulnerabilityCycle::new(cfg.vulnerability_delay, cfg.core_time, cfg.vulnerabilities.len() as u32),
            Gun::new(cfg.fire_rate, cfg.fire_rate),
            Sprite {
                color: Color::srgb(0.55, 0.2, 0.7),
                custom_size: Some(BODY_SIZE),
                ..default()
            },
            Transform::from_translation(position),
            RigidBody::Kinematic,
            Collider::rectangle(BODY_SIZE.x, BODY_SIZE.y),
            // Bolts pass over the hull; only ramming the player matters.
            CollisionLayers::new(Layer::Enemy, [Layer::Player]),
            LinearVelocity::ZERO,
            DespawnOnExit(GameState::InGame),
        ))
        .id();

    let core = commands
        .spawn((
            Name::new("BossCore"),
            BossCore,
            BossPart { boss, offset: Vec2::ZERO },
            Health { hp },
            Sprite {
                color: Color::srgb(1.0, 0.9, 0.3),
                custom_size: Some(Vec2::splat(CORE_RADIUS * 2.0)),
                ..default()
            },
            Transform::from_translation(position + Vec3::Z * 0.1),
            RigidBody::Kinematic,
            Collider::circle(CORE_RADIUS),
            core_state(false),
            LinearVelocity::ZERO,
            DespawnOnExit(GameState::InGame),
        ))
        .id();

    commands.entity(boss).insert(Boss { core });
    info!("Boss spawned with {hp} hp");
    boss
}

fn spawn_vulnerabilities(commands: &mut Commands, boss: Entity, at: Vec3, tunables: &Tunables) {
    for &(x, y) in &tunables.boss.vulnerabilities {
        let offset = Vec2::new(x, y);
        commands.spawn((
            Name::new("Vulnerability"),
            Vulnerability,
            BossPart { boss, offset },
            Health { hp: 1 },
            Sprite {
                color: Color::srgb(1.0, 0.55, 0.15),
                custom_size: Some(Vec2::splat(VULNERABILITY_RADIUS * 2.0)),
                ..default()
            },
            Transform::from_translation(at + offset.extend(0.2)),
            RigidBody::Kinematic,
            Collider::circle(VULNERABILITY_RADIUS),
            CollisionLayers::new(Layer::Enemy, [Layer::Player, Layer::PlayerBolt]),
            LinearVelocity::ZERO,
            DespawnOnExit(GameState::InGame),
        ));
    }
}

fn advance_cycles(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    mut q: Query<(Entity, &Boss, &mut VulnerabilityCycle, &Transform), Without<PendingDespawn>>,
) {
    let dt = time.delta_secs();
    for (e, boss, mut cycle, tf) in &mut q {
        match cycle.tick(dt) {
            Some(CycleEvent::SpawnVulnerabilities) => {
                debug!("Boss weak points up");
                spawn_vulnerabilities(&mut commands, e, tf.translation, &tunables);
            }
            Some(CycleEvent::HideCore) => {
                debug!("Boss core hidden");
                commands.entity(boss.core).insert(core_state(false));
            }
            Some(CycleEvent::ExposeCore) | None => {}
        }
    }
}

fn follow_boss(
    q_boss: Query<(&Transform, &LinearVelocity), (With<Boss>, Without<BossPart>)>,
    mut q_parts: Query<(&BossPart, &mut Transform, &mut LinearVelocity), Without<Boss>>,
) {
    for (part, mut tf, mut vel) in &mut q_parts {
        let Ok((boss_tf, boss_vel)) = q_boss.get(part.boss) else {
            continue;
        };
        tf.translation.x = boss_tf.translation.x + part.offset.x;
        tf.translation.y = boss_tf.translation.y + part.offset.y;
        vel.0 = boss_vel.0;
    }
}

fn vulnerability_hits(
    mut commands: Commands,
    q_parts: Query<(Entity, &BossPart, &Health), (With<Vulnerability>, Without<PendingDespawn>)>,
    mut q_boss: Query<(&Boss, &mut VulnerabilityCycle)>,
) {
    for (e, part, hp) in &q_parts {
        if !hp.is_depleted() {
            continue;
        }
        commands.entity(e).insert((non_interacting(Layer::Enemy), PendingDespawn));

        let Ok((boss, mut cycle)) = q_boss.get_mut(part.boss) else {
            continue;
        };
        if cycle.vulnerability_destroyed() == Some(CycleEvent::ExposeCore) {
            debug!("Boss core exposed");
            commands.entity(boss.core).insert(core_state(true));
        }
    }
}

fn boss_defeat(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut score: ResMut<Score>,
    mut defeated: MessageWriter<BossDefeated>,
    q_core: Query<(&BossPart, &Health), (With<BossCore>, Without<PendingDespawn>)>,
    q_parts: Query<(Entity, &BossPart)>,
) {
    for (core, hp) in &q_core {
        if !hp.is_depleted() {
            continue;
        }
        info!("Boss defeated");
        score.add(tunables.boss.score);
        defeated.write(BossDefeated);

        commands.entity(core.boss).insert(PendingDespawn);
        for (e, part) in &q_parts {
            if part.boss == core.boss {
                commands.entity(e).insert((non_interacting(Layer::Enemy), PendingDespawn));
            }
        }
    }
}
