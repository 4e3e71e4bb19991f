//! Systems driving controllers and trackers once per frame.

use bevy::prelude::*;

use crate::common::cleanup::PendingDespawn;
use crate::common::rng::GameRng;

use super::controller::{Progress, WaveController};
use super::messages::{MemberOutcome, MemberReport, SpawnRequest, WaveCompleted};
use super::patterns::{SpawnOrder, WavePattern};
use super::tracker::{CompletionTracker, WaveMember};

/// Spawn a wave entity and start its schedule.
pub fn start_wave(commands: &mut Commands, pattern: WavePattern, start_delay: f32, origin: Vec3) -> Entity {
    launch_wave(commands, WaveController::new(pattern, start_delay, origin))
}

/// Spawn a wave entity for a configured controller and start it.
///
/// Finite patterns get a `CompletionTracker` sized before any member exists.
pub fn launch_wave(commands: &mut Commands, mut controller: WaveController) -> Entity {
    let label = controller.label();
    let expected = controller.expected_count();
    controller.start_wave();

    let mut wave = commands.spawn((Name::new(format!("Wave({label})")), controller));
    if let Some(expected) = expected {
        wave.insert(CompletionTracker::new(expected));
    }

    let id = wave.id();
    info!("Started {label} wave {id:?} (expecting {expected:?})");
    id
}

/// Host tick for every sequencing task.
pub fn advance_wave_controllers(
    mut commands: Commands,
    time: Res<Time>,
    mut rng: ResMut<GameRng>,
    mut q: Query<(Entity, &mut WaveController, Option<&CompletionTracker>)>,
    mut requests: MessageWriter<SpawnRequest>,
    mut orders: Local<Vec<SpawnOrder>>,
) {
    let dt = time.delta_secs();

    for (wave, mut controller, tracker) in &mut q {
        orders.clear();
        let progress = controller.advance(dt, &mut rng.0, &mut orders);

        let tracked = tracker.map(|_| wave);
        for order in orders.drain(..) {
            requests.write(SpawnRequest { wave: tracked, order });
        }

        match progress {
            Progress::Finished => {
                debug!("{} wave {wave:?} finished its schedule", controller.label());
                match tracker {
                    Some(tracker) if tracker.expected() != controller.spawned() => {
                        error!(
                            "{} wave {wave:?} spawned {} members but expects {}",
                            controller.label(),
                            controller.spawned(),
                            tracker.expected()
                        );
                        debug_assert!(false, "spawn count does not match tracker expectation");
                    }
                    Some(_) => {}
                    None => {
                        commands.entity(wave).try_despawn();
                    }
                }
            }
            Progress::Cancelled => {
                info!("{} wave {wave:?} stopped after {} spawns", controller.label(), controller.spawned());
                commands.entity(wave).try_despawn();
            }
            Progress::Idle | Progress::Running => {}
        }
    }
}

/// Apply member reports to trackers, in arrival order.
pub fn process_member_reports(
    mut commands: Commands,
    mut reports: MessageReader<MemberReport>,
    mut q: Query<&mut CompletionTracker>,
    mut completed: MessageWriter<WaveCompleted>,
) {
    for report in reports.read() {
        let Ok(mut tracker) = q.get_mut(report.wave) else {
            // Stopped waves are despawned with members still out.
            debug!("Dropping {:?} report for wave {:?} that no longer exists", report.outcome, report.wave);
            continue;
        };

        let result = match report.outcome {
            MemberOutcome::Killed => tracker.on_killed().map(|()| None),
            MemberOutcome::Destroyed => tracker.on_destroyed(),
        };

        match result {
            Ok(Some(outcome)) => {
                info!(
                    "Wave {:?} completed: {}/{} killed",
                    report.wave,
                    tracker.killed(),
                    tracker.expected()
                );
                completed.write(WaveCompleted { wave: report.wave, fully_cleared: outcome.fully_cleared });
                commands.entity(report.wave).try_despawn();
            }
            Ok(None) => {}
            Err(err) => {
                error!("Wave {:?} tracker defect: {err}", report.wave);
                debug_assert!(false, "wave tracker defect: {err}");
            }
        }
    }
}

/// Every departing member reports `Destroyed` exactly once, just before despawn.
pub fn report_departed_members(
    q: Query<&WaveMember, With<PendingDespawn>>,
    mut reports: MessageWriter<MemberReport>,
) {
    for member in &q {
        reports.write(MemberReport { wave: member.wave, outcome: MemberOutcome::Destroyed });
    }
}
