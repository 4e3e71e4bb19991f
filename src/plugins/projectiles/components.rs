use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoltKind {
    /// Fired by the player; damages anything with `Health` on the enemy layer.
    Player,
    /// Fired by enemies and the boss; hurts the player.
    Enemy,
}

#[derive(Component, Debug, Clone)]
pub struct Bolt {
    pub kind: BoltKind,
    pub damage: i32,
}

/// Bolts expire even when they never leave the field.
#[derive(Component, Debug, Clone, Deref, DerefMut)]
pub struct Lifetime(pub Timer);

#[derive(Component, Debug, Clone)]
pub struct Health {
    pub hp: i32,
}

impl Health {
    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.hp <= 0
    }
}

/// Periodic straight-down fire.
///
/// `wait` is the time until the next shot; after a shot it is refilled
/// with `cooldown` (carrying over any overshoot).
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Gun {
    pub wait: f32,
    pub cooldown: f32,
}

impl Gun {
    pub fn new(warmup: f32, cooldown: f32) -> Self {
        Self { wait: warmup, cooldown }
    }

    /// Returns true when a shot is due this step.
    pub fn ready(&mut self, dt: f32) -> bool {
        self.wait -= dt;
        if self.wait > 0.0 {
            return false;
        }
        self.wait = (self.wait + self.cooldown).max(0.0);
        true
    }
}
