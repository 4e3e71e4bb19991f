//! Collision layers.

use avian2d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    Player,
    Enemy,
    PlayerBolt,
    EnemyBolt,
    Pickup,
}

/// Membership kept, filters cleared: the entity stops generating new contacts
/// without a structural change.
#[inline]
pub fn non_interacting(membership: Layer) -> CollisionLayers {
    CollisionLayers::new(membership, [] as [Layer; 0])
}
