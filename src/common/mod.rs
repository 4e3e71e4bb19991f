//! Common, shared types.

pub mod cleanup;
pub mod config;
pub mod layers;
pub mod rng;
pub mod score;
pub mod state;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
