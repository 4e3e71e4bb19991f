use bevy::prelude::*;

use crate::common::cleanup::PendingDespawn;
use crate::common::rng::GameRng;
use crate::common::score::Score;
use crate::common::tunables::Tunables;
use crate::plugins::core;

#[test]
fn inserts_resources() {
    let mut app = App::new();
    core::plugin(&mut app);
    assert!(app.world().get_resource::<Tunables>().is_some());
    assert!(app.world().get_resource::<GameRng>().is_some());
    assert_eq!(app.world().get_resource::<Score>(), Some(&Score(0)));
    assert!(app.world().get_resource::<ClearColor>().is_some());
}

#[test]
fn marked_entities_are_despawned_in_post_update() {
    let mut app = App::new();
    core::plugin(&mut app);
    let doomed = app.world_mut().spawn(PendingDespawn).id();
    let kept = app.world_mut().spawn_empty().id();

    app.update();

    assert!(app.world().get_entity(doomed).is_err());
    assert!(app.world().get_entity(kept).is_ok());
}
