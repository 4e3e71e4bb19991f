//! Spawn patterns: resumable step functions.
//!
//! Each pattern keeps its own progress. `resume` performs the spawn actions
//! due now (appending `SpawnOrder`s) and says how long to wait before the next
//! resume, or that the schedule is over.

use bevy::prelude::*;
use rand::Rng;

use crate::common::tunables::{AsteroidFieldTunables, WavePatternConfig};

/// Minimum lateral distance between asteroids of one batch.
pub const MIN_ASTEROID_SEPARATION: f32 = 1.0;

/// Draws allowed per asteroid position before that asteroid is dropped.
pub const MAX_PLACEMENT_DRAWS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prototype {
    Enemy,
    Asteroid { variant: u8 },
}

/// Movement a spawned entity is given on top of its prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Straight,
    Sinusoidal,
    /// Number of siblings still to come after this one.
    Sideways { remaining: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnOrder {
    pub prototype: Prototype,
    pub position: Vec3,
    pub behavior: Behavior,
}

impl SpawnOrder {
    fn enemy(position: Vec3, behavior: Behavior) -> Self {
        Self { prototype: Prototype::Enemy, position, behavior }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Wait(f32),
    Done,
}

/// V-formation: a leader, then one mirrored pair per layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FormationPattern {
    layers: u32,
    spacing: f32,
    interval: f32,
    next_layer: u32,
}

impl FormationPattern {
    pub fn new(layers: u32, spacing: f32, interval: f32) -> Self {
        Self { layers, spacing, interval, next_layer: 0 }
    }

    pub fn expected_count(&self) -> u32 {
        self.layers * 2 - 1
    }

    fn resume(&mut self, origin: Vec3, out: &mut Vec<SpawnOrder>) -> Step {
        if self.next_layer == 0 {
            out.push(SpawnOrder::enemy(origin, Behavior::Straight));
        } else {
            let offset = Vec3::X * (self.spacing * self.next_layer as f32);
            out.push(SpawnOrder::enemy(origin - offset, Behavior::Straight));
            out.push(SpawnOrder::enemy(origin + offset, Behavior::Straight));
        }

        self.next_layer += 1;
        if self.next_layer < self.layers {
            Step::Wait(self.interval)
        } else {
            Step::Done
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SinusoidalPattern {
    count: u32,
    interval: f32,
    spawned: u32,
}

impl SinusoidalPattern {
    pub fn new(count: u32, interval: f32) -> Self {
        Self { count, interval, spawned: 0 }
    }

    fn resume(&mut self, origin: Vec3, out: &mut Vec<SpawnOrder>) -> Step {
        out.push(SpawnOrder::enemy(origin, Behavior::Sinusoidal));
        self.spawned += 1;
        if self.spawned < self.count {
            Step::Wait(self.interval)
        } else {
            Step::Done
        }
    }
}

/// Enemies entering from one side; the side is picked once per wave.
#[derive(Debug, Clone, PartialEq)]
pub struct SidewaysPattern {
    count: u32,
    interval: f32,
    spawned: u32,
    mirrored: Option<bool>,
}

impl SidewaysPattern {
    pub fn new(count: u32, interval: f32) -> Self {
        Self { count, interval, spawned: 0, mirrored: None }
    }

    fn resume<R: Rng + ?Sized>(&mut self, origin: Vec3, rng: &mut R, out: &mut Vec<SpawnOrder>) -> Step {
        let mirrored = *self.mirrored.get_or_insert_with(|| rng.random_bool(0.5));
        let mut position = origin;
        if mirrored {
            position.x = -position.x;
        }

        self.spawned += 1;
        out.push(SpawnOrder::enemy(position, Behavior::Sideways { remaining: self.count - self.spawned }));

        if self.spawned < self.count {
            Step::Wait(self.interval)
        } else {
            Step::Done
        }
    }
}

/// Endless asteroid batches; only stopping the controller ends it.
#[derive(Debug, Clone, PartialEq)]
pub struct AsteroidFieldPattern {
    max: u32,
    x_range: (f32, f32),
    interval: (f32, f32),
    variants: u8,
}

impl AsteroidFieldPattern {
    pub fn new(max: u32, x_range: (f32, f32), interval: (f32, f32), variants: u8) -> Self {
        Self { max: max.max(1), x_range, interval, variants: variants.max(1) }
    }

    pub fn from_tunables(field: &AsteroidFieldTunables) -> Self {
        Self::new(field.max, field.x_range, field.interval, field.variants)
    }

    fn resume<R: Rng + ?Sized>(&mut self, origin: Vec3, rng: &mut R, out: &mut Vec<SpawnOrder>) -> Step {
        let count = rng.random_range(1..=self.max) as usize;
        let (x_min, x_max) = self.x_range;

        for x in separated_positions(rng, count, x_min, x_max, MIN_ASTEROID_SEPARATION) {
            let variant = rng.random_range(0..self.variants);
            out.push(SpawnOrder {
                prototype: Prototype::Asteroid { variant },
                position: Vec3::new(x, origin.y, origin.z),
                behavior: Behavior::Straight,
            });
        }

        Step::Wait(rng.random_range(self.interval.0..=self.interval.1))
    }
}

/// Up to `count` values in `[min, max]` with pairwise distance ≥ `separation`.
///
/// Rejection sampling with `MAX_PLACEMENT_DRAWS` draws per value; a value that
/// cannot be placed is skipped, so crowded ranges yield fewer values.
pub fn separated_positions<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    min: f32,
    max: f32,
    separation: f32,
) -> Vec<f32> {
    let mut placed: Vec<f32> = Vec::with_capacity(count);
    for _ in 0..count {
        for _ in 0..MAX_PLACEMENT_DRAWS {
            let x = rng.random_range(min..=max);
            if placed.iter().all(|p| (p - x).abs() >= separation) {
                placed.push(x);
                break;
            }
        }
    }
    placed
}

#[derive(Debug, Clone, PartialEq)]
pub enum WavePattern {
    Formation(FormationPattern),
    Sinusoidal(SinusoidalPattern),
    Sideways(SidewaysPattern),
    AsteroidField(AsteroidFieldPattern),
}

impl WavePattern {
    pub fn from_config(config: &WavePatternConfig) -> Self {
        match *config {
            WavePatternConfig::Formation { layers, spacing, interval } => {
                Self::Formation(FormationPattern::new(layers, spacing, interval))
            }
            WavePatternConfig::Sinusoidal { count, interval } => {
                Self::Sinusoidal(SinusoidalPattern::new(count, interval))
            }
            WavePatternConfig::Sideways { count, interval } => Self::Sideways(SidewaysPattern::new(count, interval)),
        }
    }

    /// Number of members the schedule spawns, or `None` for endless patterns.
    pub fn expected_count(&self) -> Option<u32> {
        match self {
            Self::Formation(p) => Some(p.expected_count()),
            Self::Sinusoidal(p) => Some(p.count),
            Self::Sideways(p) => Some(p.count),
            Self::AsteroidField(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Formation(_) => "formation",
            Self::Sinusoidal(_) => "sinusoidal",
            Self::Sideways(_) => "sideways",
            Self::AsteroidField(_) => "asteroid field",
        }
    }

    pub fn resume<R: Rng + ?Sized>(&mut self, origin: Vec3, rng: &mut R, out: &mut Vec<SpawnOrder>) -> Step {
        match self {
            Self::Formation(p) => p.resume(origin, out),
            Self::Sinusoidal(p) => p.resume(origin, out),
            Self::Sideways(p) => p.resume(origin, rng, out),
            Self::AsteroidField(p) => p.resume(origin, rng, out),
        }
    }
}
