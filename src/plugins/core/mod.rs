//! Core plugin: shared resources and global settings.

use std::path::Path;

use bevy::prelude::*;

use crate::common::cleanup::despawn_marked;
use crate::common::config::{TUNABLES_PATH, load_or_default};
use crate::common::rng::GameRng;
use crate::common::score::Score;

pub fn plugin(app: &mut App) {
    let tunables = load_or_default(Path::new(TUNABLES_PATH));
    app.insert_resource(GameRng::from_seed_option(tunables.seed));
    app.insert_resource(tunables);
    app.init_resource::<Score>();
    app.insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.05)));

    app.add_systems(PostUpdate, despawn_marked);
}

#[cfg(test)]
mod tests;
