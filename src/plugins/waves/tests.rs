use bevy::ecs::message::Messages;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::common::cleanup::{PendingDespawn, despawn_marked};
use crate::common::rng::GameRng;
use crate::common::test_utils::{advance_time, drain_messages, insert_time, run_system_once};

use super::controller::{Progress, WaveController};
use super::messages::{MemberOutcome, MemberReport, SpawnRequest, WaveCompleted};
use super::patterns::*;
use super::systems;
use super::task::{SequenceTask, TaskStatus};
use super::tracker::{CompletionTracker, TrackerError, WaveMember, WaveOutcome};

fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Advance `controller` in `dt` steps until its schedule ends, collecting
/// every order with the tick index it was issued on.
fn run_to_end(controller: &mut WaveController, dt: f32, max_ticks: usize) -> Vec<(usize, SpawnOrder)> {
    let mut rng = rng(1);
    let mut issued = Vec::new();
    let mut out = Vec::new();
    for tick in 0..max_ticks {
        out.clear();
        let progress = controller.advance(dt, &mut rng, &mut out);
        issued.extend(out.iter().map(|o| (tick, *o)));
        if progress == Progress::Finished {
            return issued;
        }
    }
    panic!("schedule did not finish within {max_ticks} ticks");
}

// -----------------------------------------------------------------------------
// CompletionTracker
// -----------------------------------------------------------------------------

#[test]
fn tracker_completes_once_when_all_destroyed() {
    let mut tracker = CompletionTracker::new(3);
    assert_eq!(tracker.on_destroyed(), Ok(None));
    assert_eq!(tracker.on_destroyed(), Ok(None));
    assert_eq!(tracker.on_destroyed(), Ok(Some(WaveOutcome { fully_cleared: false })));
    assert!(tracker.is_retired());
    assert_eq!(tracker.on_destroyed(), Err(TrackerError::Retired));
    assert_eq!(tracker.on_killed(), Err(TrackerError::Retired));
}

#[test]
fn tracker_fully_cleared_only_when_every_member_killed() {
    let mut tracker = CompletionTracker::new(2);
    tracker.on_killed().unwrap();
    assert_eq!(tracker.on_destroyed(), Ok(None));
    tracker.on_killed().unwrap();
    assert_eq!(tracker.on_destroyed(), Ok(Some(WaveOutcome { fully_cleared: true })));

    let mut partial = CompletionTracker::new(2);
    partial.on_killed().unwrap();
    partial.on_destroyed().unwrap();
    // Second member leaves the play area without being killed.
    assert_eq!(partial.on_destroyed(), Ok(Some(WaveOutcome { fully_cleared: false })));
}

#[test]
fn tracker_rejects_more_kills_than_expected() {
    let mut tracker = CompletionTracker::new(1);
    tracker.on_killed().unwrap();
    assert_eq!(tracker.on_killed(), Err(TrackerError::TooManyKills { expected: 1 }));
    assert_eq!(tracker.killed(), 1);
}

#[test]
#[should_panic]
fn tracker_with_nothing_to_expect_is_a_defect() {
    let _ = CompletionTracker::new(0);
}

// -----------------------------------------------------------------------------
// Patterns
// -----------------------------------------------------------------------------

#[test]
fn formation_with_three_layers_spawns_a_v_of_five() {
    let origin = Vec3::new(0.0, 10.0, 1.0);
    let pattern = WavePattern::Formation(FormationPattern::new(3, 1.5, 0.5));
    assert_eq!(pattern.expected_count(), Some(5));

    let mut controller = WaveController::new(pattern, 0.0, origin);
    controller.start_wave();
    let issued = run_to_end(&mut controller, 0.25, 100);

    let xs: Vec<(usize, f32)> = issued.iter().map(|(t, o)| (*t, o.position.x)).collect();
    // Leader on the first tick, then a pair every 0.5s.
    assert_eq!(xs, vec![(0, 0.0), (1, -1.5), (1, 1.5), (3, -3.0), (3, 3.0)]);
    assert!(issued.iter().all(|(_, o)| o.position.y == origin.y && o.prototype == Prototype::Enemy));
    assert_eq!(controller.spawned(), 5);
    assert!(!controller.is_running());
}

#[test]
fn single_layer_formation_is_just_the_leader() {
    let mut pattern = FormationPattern::new(1, 2.0, 0.5);
    assert_eq!(pattern.expected_count(), 1);
    let mut out = Vec::new();
    let step = WavePattern::Formation(pattern.clone()).resume(Vec3::ZERO, &mut rng(0), &mut out);
    assert_eq!(step, Step::Done);
    assert_eq!(out.len(), 1);
    pattern = FormationPattern::new(2, 2.0, 0.5);
    assert_eq!(pattern.expected_count(), 3);
}

#[test]
fn sinusoidal_spawns_count_members_at_the_origin() {
    let origin = Vec3::new(2.0, 10.0, 1.0);
    let mut controller = WaveController::new(WavePattern::Sinusoidal(SinusoidalPattern::new(4, 0.5)), 1.0, origin);
    controller.start_wave();
    let issued = run_to_end(&mut controller, 0.25, 100);

    let ticks: Vec<usize> = issued.iter().map(|(t, _)| *t).collect();
    // 1.0s start delay, then one every 0.5s.
    assert_eq!(ticks, vec![3, 5, 7, 9]);
    assert!(issued.iter().all(|(_, o)| o.position == origin && o.behavior == Behavior::Sinusoidal));
}

#[test]
fn sideways_tells_each_member_how_many_siblings_remain() {
    let origin = Vec3::new(9.0, 7.0, 1.0);
    let mut pattern = WavePattern::Sideways(SidewaysPattern::new(3, 0.5));
    let mut rng = rng(42);
    let mut out = Vec::new();
    while pattern.resume(origin, &mut rng, &mut out) != Step::Done {}

    let remaining: Vec<Behavior> = out.iter().map(|o| o.behavior).collect();
    assert_eq!(
        remaining,
        vec![
            Behavior::Sideways { remaining: 2 },
            Behavior::Sideways { remaining: 1 },
            Behavior::Sideways { remaining: 0 },
        ]
    );

    // The side is chosen once and shared by the whole wave.
    let x = out[0].position.x;
    assert!(x == origin.x || x == -origin.x);
    assert!(out.iter().all(|o| o.position.x == x));
}

#[test]
fn sideways_picks_both_sides_across_waves() {
    let origin = Vec3::new(9.0, 7.0, 1.0);
    let mut rng = rng(7);
    let mut sides = std::collections::HashSet::new();
    for _ in 0..64 {
        let mut out = Vec::new();
        let mut pattern = WavePattern::Sideways(SidewaysPattern::new(1, 0.5));
        pattern.resume(origin, &mut rng, &mut out);
        sides.insert(out[0].position.x > 0.0);
    }
    assert_eq!(sides.len(), 2);
}

#[test]
fn separated_positions_respect_minimum_distance() {
    let mut rng = rng(0xA57E_801D);
    for _ in 0..2_000 {
        let xs = separated_positions(&mut rng, 4, -7.0, 7.0, MIN_ASTEROID_SEPARATION);
        assert!(!xs.is_empty());
        for (i, a) in xs.iter().enumerate() {
            assert!((-7.0..=7.0).contains(a));
            for b in &xs[i + 1..] {
                assert!((a - b).abs() >= MIN_ASTEROID_SEPARATION);
            }
        }
    }
}

#[test]
fn crowded_range_terminates_with_fewer_positions() {
    // Four asteroids cannot fit a width-2 range with unit separation.
    let mut rng = rng(3);
    for _ in 0..500 {
        let xs = separated_positions(&mut rng, 4, 0.0, 2.0, 1.0);
        assert!((1..=3).contains(&xs.len()));
        for (i, a) in xs.iter().enumerate() {
            for b in &xs[i + 1..] {
                assert!((a - b).abs() >= 1.0);
            }
        }
    }
}

#[test]
fn asteroid_field_batches_and_waits_within_configured_ranges() {
    let mut pattern = WavePattern::AsteroidField(AsteroidFieldPattern::new(4, (-7.0, 7.0), (1.5, 3.0), 3));
    assert_eq!(pattern.expected_count(), None);

    let mut rng = rng(11);
    for _ in 0..200 {
        let mut out = Vec::new();
        let Step::Wait(wait) = pattern.resume(Vec3::new(0.0, 10.5, 1.0), &mut rng, &mut out) else {
            panic!("asteroid field never finishes on its own");
        };
        assert!((1.5..=3.0).contains(&wait));
        assert!((1..=4).contains(&out.len()));
        for order in &out {
            let Prototype::Asteroid { variant } = order.prototype else {
                panic!("asteroid field spawned {:?}", order.prototype);
            };
            assert!(variant < 3);
            assert_eq!(order.position.y, 10.5);
        }
    }
}

// -----------------------------------------------------------------------------
// Task + controller
// -----------------------------------------------------------------------------

#[test]
fn task_waits_for_start_delay_before_first_resume() {
    let mut task = SequenceTask::new(WavePattern::Sinusoidal(SinusoidalPattern::new(2, 1.0)), 0.5);
    let mut out = Vec::new();
    let mut rng = rng(0);

    assert_eq!(task.advance(0.25, Vec3::ZERO, &mut rng, &mut out), TaskStatus::Suspended);
    assert!(out.is_empty());
    assert_eq!(task.advance(0.25, Vec3::ZERO, &mut rng, &mut out), TaskStatus::Suspended);
    assert_eq!(out.len(), 1);
    // One long frame covers the remaining interval.
    assert_eq!(task.advance(2.0, Vec3::ZERO, &mut rng, &mut out), TaskStatus::Finished);
    assert_eq!(out.len(), 2);
}

#[test]
fn start_while_running_is_a_no_op() {
    let pattern = WavePattern::Sinusoidal(SinusoidalPattern::new(3, 0.5));
    let mut controller = WaveController::new(pattern, 0.0, Vec3::ZERO);
    let mut rng = rng(0);
    let mut out = Vec::new();

    controller.start_wave();
    controller.advance(0.0, &mut rng, &mut out);
    assert_eq!(out.len(), 1);

    // A second start must not restart the schedule from its first spawn.
    controller.start_wave();
    assert!(controller.is_running());
    controller.advance(0.25, &mut rng, &mut out);
    assert_eq!(out.len(), 1);
    controller.advance(0.25, &mut rng, &mut out);
    assert_eq!(out.len(), 2);
}

#[test]
fn stop_while_idle_is_a_no_op() {
    let pattern = WavePattern::Sinusoidal(SinusoidalPattern::new(3, 0.5));
    let mut controller = WaveController::new(pattern, 0.0, Vec3::ZERO);
    controller.stop_wave();
    assert!(!controller.is_running());
    assert_eq!(controller.advance(1.0, &mut rng(0), &mut Vec::new()), Progress::Idle);

    controller.start_wave();
    assert!(controller.is_running());
}

#[test]
fn stop_cancels_at_next_resume_and_keeps_earlier_spawns() {
    let pattern = WavePattern::AsteroidField(AsteroidFieldPattern::new(2, (-5.0, 5.0), (0.5, 0.5), 1));
    let mut controller = WaveController::new(pattern, 0.0, Vec3::ZERO);
    let mut rng = rng(5);
    let mut out = Vec::new();

    controller.start_wave();
    for _ in 0..8 {
        assert_eq!(controller.advance(0.25, &mut rng, &mut out), Progress::Running);
    }
    let before = out.len();
    assert!(before >= 4);

    controller.stop_wave();
    assert!(!controller.is_running());
    assert_eq!(controller.advance(10.0, &mut rng, &mut out), Progress::Cancelled);
    assert_eq!(out.len(), before);
    assert_eq!(controller.advance(10.0, &mut rng, &mut out), Progress::Idle);
    assert_eq!(controller.spawned() as usize, before);
}

// -----------------------------------------------------------------------------
// Systems
// -----------------------------------------------------------------------------

fn wave_world() -> World {
    let mut world = World::new();
    insert_time(&mut world);
    world.insert_resource(GameRng::seeded(9));
    world.init_resource::<Messages<SpawnRequest>>();
    world.init_resource::<Messages<MemberReport>>();
    world.init_resource::<Messages<WaveCompleted>>();
    world
}

fn start(world: &mut World, pattern: WavePattern, start_delay: f32) -> Entity {
    run_system_once(world, move |mut commands: Commands| {
        systems::start_wave(&mut commands, pattern.clone(), start_delay, Vec3::new(0.0, 10.0, 1.0))
    })
}

fn tick(world: &mut World, dt: f32) -> Vec<SpawnRequest> {
    advance_time(world, dt);
    run_system_once(world, systems::advance_wave_controllers);
    drain_messages::<SpawnRequest>(world)
}

fn report(world: &mut World, wave: Entity, outcome: MemberOutcome) {
    world.write_message(MemberReport { wave, outcome });
}

#[test]
fn started_wave_has_tracker_sized_before_spawning() {
    let mut world = wave_world();
    let wave = start(&mut world, WavePattern::Formation(FormationPattern::new(3, 1.0, 0.5)), 1.0);

    let tracker = world.get::<CompletionTracker>(wave).unwrap();
    assert_eq!(tracker.expected(), 5);
    assert!(world.get::<WaveController>(wave).unwrap().is_running());
}

#[test]
fn spawn_requests_carry_the_tracked_wave() {
    let mut world = wave_world();
    let wave = start(&mut world, WavePattern::Formation(FormationPattern::new(2, 1.0, 0.5)), 0.0);

    let mut requests = Vec::new();
    for _ in 0..4 {
        requests.extend(tick(&mut world, 0.25));
    }
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.wave == Some(wave)));
    assert!(!world.get::<WaveController>(wave).unwrap().is_running());
}

#[test]
fn asteroid_field_requests_are_untracked_and_stop_despawns_it() {
    let mut world = wave_world();
    let field = AsteroidFieldPattern::new(3, (-7.0, 7.0), (0.5, 1.0), 3);
    let wave = start(&mut world, WavePattern::AsteroidField(field), 0.0);
    assert!(world.get::<CompletionTracker>(wave).is_none());

    let mut requests = Vec::new();
    for _ in 0..20 {
        requests.extend(tick(&mut world, 0.25));
    }
    assert!(requests.len() >= 5);
    assert!(requests.iter().all(|r| r.wave.is_none()));

    world.get_mut::<WaveController>(wave).unwrap().stop_wave();
    assert!(tick(&mut world, 5.0).is_empty());
    assert!(world.get_entity(wave).is_err());
}

#[test]
fn full_clear_signals_once_and_retires_the_wave() {
    let mut world = wave_world();
    let wave = start(&mut world, WavePattern::Sinusoidal(SinusoidalPattern::new(2, 0.25)), 0.0);
    for _ in 0..3 {
        tick(&mut world, 0.25);
    }

    for _ in 0..2 {
        report(&mut world, wave, MemberOutcome::Killed);
        report(&mut world, wave, MemberOutcome::Destroyed);
    }
    run_system_once(&mut world, systems::process_member_reports);

    let completed = drain_messages::<WaveCompleted>(&mut world);
    assert_eq!(completed, vec![WaveCompleted { wave, fully_cleared: true }]);
    assert!(world.get_entity(wave).is_err());

    // Stragglers for a retired wave are dropped, not double-counted.
    report(&mut world, wave, MemberOutcome::Destroyed);
    run_system_once(&mut world, systems::process_member_reports);
    assert!(drain_messages::<WaveCompleted>(&mut world).is_empty());
}

#[test]
fn escaped_member_makes_completion_partial() {
    let mut world = wave_world();
    let wave = start(&mut world, WavePattern::Sinusoidal(SinusoidalPattern::new(3, 0.25)), 0.0);
    for _ in 0..4 {
        tick(&mut world, 0.25);
    }

    report(&mut world, wave, MemberOutcome::Killed);
    report(&mut world, wave, MemberOutcome::Destroyed);
    report(&mut world, wave, MemberOutcome::Destroyed);
    run_system_once(&mut world, systems::process_member_reports);
    assert!(drain_messages::<WaveCompleted>(&mut world).is_empty());

    report(&mut world, wave, MemberOutcome::Killed);
    report(&mut world, wave, MemberOutcome::Destroyed);
    run_system_once(&mut world, systems::process_member_reports);
    assert_eq!(
        drain_messages::<WaveCompleted>(&mut world),
        vec![WaveCompleted { wave, fully_cleared: false }]
    );
}

#[test]
fn departing_members_report_destroyed_exactly_once() {
    let mut world = wave_world();
    let wave = world.spawn_empty().id();
    let member = world.spawn((WaveMember { wave }, PendingDespawn)).id();
    let bystander = world.spawn(WaveMember { wave }).id();

    run_system_once(&mut world, systems::report_departed_members);
    run_system_once(&mut world, despawn_marked);
    run_system_once(&mut world, systems::report_departed_members);

    assert_eq!(
        drain_messages::<MemberReport>(&mut world),
        vec![MemberReport { wave, outcome: MemberOutcome::Destroyed }]
    );
    assert!(world.get_entity(member).is_err());
    assert!(world.get_entity(bystander).is_ok());
}

// -----------------------------------------------------------------------------
// Height variation
// -----------------------------------------------------------------------------

fn spawn_heights(controller: &mut WaveController, seed: u64) -> Vec<f32> {
    let mut rng = rng(seed);
    let mut out = Vec::new();
    for _ in 0..16 {
        if controller.advance(0.25, &mut rng, &mut out) == Progress::Finished {
            break;
        }
    }
    out.iter().map(|o| o.position.y).collect()
}

#[test]
fn wave_members_share_one_height_offset() {
    let origin = Vec3::new(0.0, 8.0, 1.0);
    for seed in 0..20 {
        let pattern = WavePattern::Formation(FormationPattern::new(3, 1.0, 0.25));
        let mut controller = WaveController::new(pattern, 0.0, origin).with_height_variation(1.0);
        controller.start_wave();

        let heights = spawn_heights(&mut controller, seed);
        assert_eq!(heights.len(), 5);
        assert!(heights.iter().all(|&y| y == heights[0]), "seed {seed}: {heights:?}");
        assert!((heights[0] - origin.y).abs() <= 1.0, "seed {seed}: {}", heights[0]);
    }
}

#[test]
fn height_offset_is_drawn_before_the_start_delay() {
    let pattern = WavePattern::Sinusoidal(SinusoidalPattern::new(2, 0.5));
    let mut controller = WaveController::new(pattern, 1.0, Vec3::ZERO).with_height_variation(2.0);
    controller.start_wave();
    assert_eq!(controller.height_offset(), None);

    let mut out = Vec::new();
    controller.advance(0.25, &mut rng(4), &mut out);
    assert!(out.is_empty());
    let offset = controller.height_offset().unwrap();
    assert!((-2.0..=2.0).contains(&offset));
}

#[test]
fn zero_variation_keeps_the_origin_height() {
    let pattern = WavePattern::Sinusoidal(SinusoidalPattern::new(3, 0.25));
    let mut controller = WaveController::new(pattern, 0.0, Vec3::new(1.0, 6.5, 1.0));
    controller.start_wave();

    let heights = spawn_heights(&mut controller, 3);
    assert_eq!(heights, vec![6.5; 3]);
}

// -----------------------------------------------------------------------------
// Despawn races
// -----------------------------------------------------------------------------

#[test]
fn stopped_wave_completing_in_the_same_frame_is_removed_once() {
    let mut world = wave_world();
    let wave = start(&mut world, WavePattern::Sinusoidal(SinusoidalPattern::new(2, 1.0)), 0.0);
    assert_eq!(tick(&mut world, 0.25).len(), 1);

    // Both the cancelled schedule and the completed tracker retire the wave.
    world.entity_mut(wave).insert(CompletionTracker::new(1));
    world.get_mut::<WaveController>(wave).unwrap().stop_wave();
    report(&mut world, wave, MemberOutcome::Killed);
    report(&mut world, wave, MemberOutcome::Destroyed);

    let mut schedule = Schedule::default();
    schedule.add_systems((systems::advance_wave_controllers, systems::process_member_reports));
    advance_time(&mut world, 0.25);
    schedule.run(&mut world);

    assert!(world.get_entity(wave).is_err());
    assert_eq!(
        drain_messages::<WaveCompleted>(&mut world),
        vec![WaveCompleted { wave, fully_cleared: true }]
    );
}
