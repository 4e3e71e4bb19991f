//! Movement strategies for hostiles.
//!
//! Every moving hostile is a kinematic body; its `Movement` decides the
//! velocity each fixed step. Strategies are plain data plus a pure `step`,
//! so the curves can be tested without a physics world.
//!
//! ```text
//! FixedUpdate: Movement::step(dt) -> LinearVelocity (+ optional positional jump)
//! ```

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::EnemyTunables;
use crate::plugins::waves::Behavior;

/// Seconds a sideways ship keeps sweeping after its last pass, before the
/// per-sibling stagger is added.
const SIDEWAYS_SETTLE: f32 = 2.0;

/// Result of one fixed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementStep {
    pub velocity: Vec2,
    /// Instant positional offset applied this step.
    pub jump: Vec2,
}

impl MovementStep {
    #[inline]
    fn velocity(velocity: Vec2) -> Self {
        Self { velocity, jump: Vec2::ZERO }
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
pub enum Movement {
    Straight {
        velocity: Vec2,
    },
    /// Falls at `fall` while oscillating sideways.
    ///
    /// Lateral acceleration is `cos(t / period) * peak_acceleration`; the
    /// lateral velocity is its integral from rest.
    Sinusoidal {
        fall: f32,
        peak_acceleration: f32,
        period: f32,
        elapsed: f32,
    },
    /// Sweeps across the field, jumps down and reverses once per pass,
    /// keeps sweeping for `settle` seconds after the last pass, then
    /// descends out of the field.
    Sideways {
        speed: f32,
        direction: f32,
        sweep_time: f32,
        sweep_left: f32,
        passes_left: u32,
        jump: f32,
        settle: f32,
        fall: f32,
        descending: bool,
    },
    /// v = (cos t, cos 2t) * max_speed with t = elapsed / period.
    FigureEight {
        max_speed: f32,
        period: f32,
        elapsed: f32,
    },
}

impl Movement {
    /// Strategy for an enemy spawned with `behavior` at `position`.
    pub fn for_behavior(behavior: Behavior, position: Vec3, enemy: &EnemyTunables) -> Self {
        match behavior {
            Behavior::Straight => Self::Straight { velocity: Vec2::NEG_Y * enemy.speed },
            Behavior::Sinusoidal => Self::Sinusoidal {
                fall: enemy.speed,
                peak_acceleration: enemy.sine_acceleration,
                period: enemy.sine_period,
                elapsed: 0.0,
            },
            Behavior::Sideways { remaining } => Self::sideways(position, remaining, enemy),
        }
    }

    /// Later siblings (smaller `remaining`) settle sooner, spreading the wave out.
    fn sideways(position: Vec3, remaining: u32, enemy: &EnemyTunables) -> Self {
        // Ships entering on the left sweep right and vice versa.
        let direction = if position.x < 0.0 { 1.0 } else { -1.0 };
        let settle = SIDEWAYS_SETTLE + remaining as f32;
        let passes_left = enemy.side_passes;
        let sweep_left = if passes_left == 0 { enemy.side_sweep_time + settle } else { enemy.side_sweep_time };

        Self::Sideways {
            speed: enemy.side_speed,
            direction,
            sweep_time: enemy.side_sweep_time,
            sweep_left,
            passes_left,
            jump: enemy.side_jump,
            settle,
            fall: enemy.speed,
            descending: false,
        }
    }

    pub fn step(&mut self, dt: f32) -> MovementStep {
        match self {
            Self::Straight { velocity } => MovementStep::velocity(*velocity),
            Self::Sinusoidal { fall, peak_acceleration, period, elapsed } => {
                *elapsed += dt;
                let lateral = *peak_acceleration * *period * (*elapsed / *period).sin();
                MovementStep::velocity(Vec2::new(lateral, -*fall))
            }
            Self::Sideways {
                speed,
                direction,
                sweep_time,
                sweep_left,
                passes_left,
                jump,
                settle,
                fall,
                descending,
            } => {
                if *descending {
                    return MovementStep::velocity(Vec2::NEG_Y * *fall);
                }

                *sweep_left -= dt;
                if *sweep_left > 0.0 {
                    return MovementStep::velocity(Vec2::X * (*direction * *speed));
                }

                if *passes_left == 0 {
                    *descending = true;
                    return MovementStep::velocity(Vec2::NEG_Y * *fall);
                }

                *passes_left -= 1;
                *direction = -*direction;
                *sweep_left += *sweep_time;
                if *passes_left == 0 {
                    *sweep_left += *settle;
                }
                MovementStep { velocity: Vec2::X * (*direction * *speed), jump: Vec2::NEG_Y * *jump }
            }
            Self::FigureEight { max_speed, period, elapsed } => {
                *elapsed += dt;
                let t = *elapsed / *period;
                MovementStep::velocity(Vec2::new(t.cos(), (2.0 * t).cos()) * *max_speed)
            }
        }
    }
}

pub fn plugin(app: &mut App) {
    app.add_systems(FixedUpdate, apply_movement.run_if(in_state(GameState::InGame)));
}

pub fn apply_movement(
    time: Res<Time<Fixed>>,
    mut q: Query<(&mut Movement, &mut LinearVelocity, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (mut movement, mut velocity, mut tf) in &mut q {
        let step = movement.step(dt);
        velocity.0 = step.velocity;
        if step.jump != Vec2::ZERO {
            tf.translation += step.jump.extend(0.0);
        }
    }
}
