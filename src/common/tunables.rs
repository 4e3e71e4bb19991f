//! Tunable gameplay constants.
//!
//! All distances are world units (meters); the camera maps them to pixels
//! with `pixels_per_meter`. The play field is a vertical strip: enemies enter
//! from the top (+y) and the player sits near the bottom.

use bevy::prelude::*;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Difficulty {
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    #[inline]
    pub fn is_hard(self) -> bool {
        self == Self::Hard
    }
}

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    pub difficulty: Difficulty,
    /// Fixed RNG seed; random per session when absent.
    pub seed: Option<u64>,
    pub arena: ArenaTunables,
    pub player: PlayerTunables,
    pub bolt: BoltTunables,
    pub enemy: EnemyTunables,
    pub asteroid: AsteroidTunables,
    pub waves: WaveTunables,
    pub boss: BossTunables,
    pub powerup: PowerupTunables,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 40.0,
            difficulty: Difficulty::Normal,
            seed: None,
            arena: ArenaTunables::default(),
            player: PlayerTunables::default(),
            bolt: BoltTunables::default(),
            enemy: EnemyTunables::default(),
            asteroid: AsteroidTunables::default(),
            waves: WaveTunables::default(),
            boss: BossTunables::default(),
            powerup: PowerupTunables::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArenaTunables {
    pub half_width: f32,
    pub half_height: f32,
    /// Distance past the visible field at which entities are culled.
    pub cull_margin: f32,
}

impl ArenaTunables {
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.half_width, self.half_height)
    }

    /// Visible field grown by the cull margin on every side.
    pub fn cull_bounds(&self) -> Rect {
        Rect::from_center_half_size(Vec2::ZERO, self.half_extents() + Vec2::splat(self.cull_margin))
    }
}

impl Default for ArenaTunables {
    fn default() -> Self {
        Self { half_width: 8.0, half_height: 9.0, cull_margin: 2.5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerTunables {
    pub speed: f32,
    /// Seconds between volleys.
    pub fire_rate: f32,
    pub shield_duration: f32,
    pub start_level: i32,
    pub spawn: (f32, f32),
}

impl Default for PlayerTunables {
    fn default() -> Self {
        Self { speed: 8.0, fire_rate: 0.25, shield_duration: 2.0, start_level: 0, spawn: (0.0, -7.0) }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoltTunables {
    pub speed: f32,
    /// Bolts fired by enemies and the boss.
    pub enemy_speed: f32,
    pub lifetime: f32,
    pub damage: i32,
}

impl Default for BoltTunables {
    fn default() -> Self {
        Self { speed: 18.0, enemy_speed: 9.0, lifetime: 2.0, damage: 1 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnemyTunables {
    pub speed: f32,
    pub health: i32,
    pub score: u32,
    pub dying_time: f32,
    /// Hard mode only: enemies start firing after a delay in this range.
    pub fire_delay: (f32, f32),
    pub fire_rate: f32,
    pub sine_acceleration: f32,
    pub sine_period: f32,
    pub side_speed: f32,
    pub side_sweep_time: f32,
    pub side_passes: u32,
    pub side_jump: f32,
}

impl Default for EnemyTunables {
    fn default() -> Self {
        Self {
            speed: 3.0,
            health: 1,
            score: 10,
            dying_time: 0.35,
            fire_delay: (0.5, 2.0),
            fire_rate: 1.5,
            sine_acceleration: 2.5,
            sine_period: 1.0,
            side_speed: 5.0,
            side_sweep_time: 2.4,
            side_passes: 2,
            side_jump: 1.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AsteroidTunables {
    pub speed: f32,
    pub health: i32,
    pub score: u32,
}

impl Default for AsteroidTunables {
    fn default() -> Self {
        Self { speed: 2.5, health: 1, score: 5 }
    }
}

/// Spawn schedule shapes an enemy wave can take.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum WavePatternConfig {
    Formation { layers: u32, spacing: f32, interval: f32 },
    Sinusoidal { count: u32, interval: f32 },
    Sideways { count: u32, interval: f32 },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WaveTemplate {
    pub start_delay: f32,
    pub origin: (f32, f32),
    pub pattern: WavePatternConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AsteroidFieldTunables {
    pub start_delay: f32,
    pub spawn_y: f32,
    pub x_range: (f32, f32),
    /// Largest batch spawned at once (1..=4).
    pub max: u32,
    pub interval: (f32, f32),
    pub variants: u8,
}

impl Default for AsteroidFieldTunables {
    fn default() -> Self {
        Self {
            start_delay: 2.0,
            spawn_y: 10.5,
            x_range: (-7.0, 7.0),
            max: 3,
            interval: (1.5, 3.0),
            variants: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WaveTunables {
    /// Number of enemy waves before the boss.
    pub budget: u32,
    /// Each enemy wave spawns at one random height within this distance of its origin.
    pub height_variation: f32,
    pub templates: Vec<WaveTemplate>,
    pub asteroid_field: AsteroidFieldTunables,
}

impl Default for WaveTunables {
    fn default() -> Self {
        Self {
            budget: 6,
            height_variation: 1.0,
            templates: vec![
                WaveTemplate {
                    start_delay: 1.0,
                    origin: (0.0, 10.0),
                    pattern: WavePatternConfig::Formation { layers: 3, spacing: 1.5, interval: 0.6 },
                },
                WaveTemplate {
                    start_delay: 1.0,
                    origin: (0.0, 10.0),
                    pattern: WavePatternConfig::Sinusoidal { count: 5, interval: 0.8 },
                },
                WaveTemplate {
                    start_delay: 1.0,
                    origin: (9.0, 7.0),
                    pattern: WavePatternConfig::Sideways { count: 4, interval: 0.7 },
                },
            ],
            asteroid_field: AsteroidFieldTunables::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BossTunables {
    pub health: i32,
    pub score: u32,
    /// Pause between the last wave and the boss entrance.
    pub delay: f32,
    pub spawn: (f32, f32),
    pub max_speed: f32,
    pub period: f32,
    /// Weak point offsets relative to the boss centre.
    pub vulnerabilities: Vec<(f32, f32)>,
    pub vulnerability_delay: f32,
    pub core_time: f32,
    pub fire_rate: f32,
}

impl Default for BossTunables {
    fn default() -> Self {
        Self {
            health: 10,
            score: 500,
            delay: 3.0,
            spawn: (0.0, 5.0),
            max_speed: 2.0,
            period: 1.5,
            vulnerabilities: vec![(-1.5, 0.0), (1.5, 0.0), (0.0, 1.0)],
            vulnerability_delay: 2.0,
            core_time: 4.0,
            fire_rate: 0.8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PowerupTunables {
    pub spawn: (f32, f32),
    pub speed: f32,
}

impl Default for PowerupTunables {
    fn default() -> Self {
        Self { spawn: (0.0, 9.5), speed: 2.0 }
    }
}

/// `(x, y)` config pair as a world position on the gameplay plane.
#[inline]
pub fn plane_point((x, y): (f32, f32)) -> Vec3 {
    Vec3::new(x, y, 1.0)
}
