//! Wave shooter: timed enemy waves, completion tracking and a boss fight.
//!
//! Integration tests in `tests/` are compiled as separate crates; this
//! library gives them a stable API surface.

pub mod common;
pub mod game;
pub mod plugins;
