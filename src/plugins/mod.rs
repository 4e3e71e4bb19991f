//! Feature plugins.

use bevy::prelude::*;

pub mod boss;
pub mod core;
pub mod enemies;
pub mod flow;
pub mod highscores;
pub mod movement;
pub mod pause;
pub mod physics;
pub mod player;
pub mod powerup;
pub mod projectiles;
pub mod waves;
pub mod world;

// Render-only
pub mod camera;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    // Loads tunables; everything below reads them.
    core::plugin(app);
    physics::plugin(app);
    world::plugin(app);
    movement::plugin(app);
    waves::plugin(app);
    enemies::plugin(app);
    projectiles::plugin(app);
    player::plugin(app);
    boss::plugin(app);
    flow::plugin(app);
    highscores::plugin(app);
    pause::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
}

/// Register all plugins (full app).
pub fn register_all(app: &mut App) {
    register_gameplay(app);
    register_render(app);
}
