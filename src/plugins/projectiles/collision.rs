use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::cleanup::PendingDespawn;
use crate::common::layers::{Layer, non_interacting};

use super::components::{Bolt, BoltKind, Health};

#[derive(Clone, Copy, Debug)]
pub(crate) struct CollisionTarget {
    pub collider: Entity,
    pub body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    pub fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
pub(crate) fn targets(ev: &CollisionStart) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget { collider: ev.collider1, body: ev.body1 },
        CollisionTarget { collider: ev.collider2, body: ev.body2 },
    )
}

#[inline]
pub(crate) fn is_in_layer(layers: &CollisionLayers, layer: Layer) -> bool {
    layers.memberships.has_all(layer)
}

/// Player bolts damage whatever `Health` they hit on the enemy layer.
///
/// A bolt is spent on its first hit: it stops interacting at once and is
/// marked for despawn. Health reaching zero is handled by the owner's
/// plugin (enemy death, asteroid break-up, boss parts).
pub fn process_bolt_collisions(
    mut commands: Commands,
    mut started: MessageReader<CollisionStart>,
    mut q_bolts: Query<(&Bolt, &mut CollisionLayers), Without<PendingDespawn>>,
    q_layers: Query<&CollisionLayers, Without<Bolt>>,
    mut q_health: Query<&mut Health>,
    // Per-frame dedupe
    mut spent: Local<HashSet<Entity>>,
) {
    spent.clear();

    for ev in started.read() {
        let (t1, t2) = targets(ev);

        let b1 = q_bolts.contains(t1.collider);
        let b2 = q_bolts.contains(t2.collider);
        if !(b1 ^ b2) {
            continue; // must be exactly one bolt
        }
        let (bolt_side, other_side) = if b1 { (t1, t2) } else { (t2, t1) };

        if spent.contains(&bolt_side.collider) {
            continue;
        }

        let Ok(other_layers) = q_layers.get(other_side.collider) else {
            continue;
        };
        let Ok((bolt, mut bolt_layers)) = q_bolts.get_mut(bolt_side.collider) else {
            continue;
        };

        if bolt.kind != BoltKind::Player || !is_in_layer(other_layers, Layer::Enemy) {
            continue;
        }

        let Ok(mut health) = q_health.get_mut(other_side.gameplay_owner()) else {
            continue;
        };

        health.hp -= bolt.damage;
        spent.insert(bolt_side.collider);
        *bolt_layers = non_interacting(Layer::PlayerBolt);
        commands.entity(bolt_side.collider).insert(PendingDespawn);
    }
}
