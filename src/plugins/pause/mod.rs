//! Pause: Escape freezes virtual time during a running session.
//!
//! Everything gameplay-related reads virtual time (fixed steps included), so
//! pausing `Time<Virtual>` holds waves, movement and physics in place.

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::flow::GameFlow;

pub fn plugin(app: &mut App) {
    app.add_systems(Update, toggle_pause.run_if(in_state(GameState::InGame)));
}

pub fn set_paused(time: &mut Time<Virtual>, paused: bool) {
    if paused {
        time.pause();
    } else {
        time.unpause();
    }
}

fn toggle_pause(keys: Option<Res<ButtonInput<KeyCode>>>, flow: Res<GameFlow>, mut time: ResMut<Time<Virtual>>) {
    let Some(keys) = keys else {
        return;
    };
    if !keys.just_pressed(KeyCode::Escape) {
        return;
    }

    let paused = !time.is_paused();
    // A finished session can be resumed but not paused.
    if paused && flow.is_over() {
        return;
    }
    set_paused(&mut time, paused);
    info!("{}", if paused { "Paused" } else { "Resumed" });
}
