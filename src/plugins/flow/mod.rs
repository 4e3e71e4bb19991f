//! Game flow: waves until the budget runs out, then the boss.
//!
//! ```text
//!   SpawningWaves ──(budget spent, wave done)──> TransitioningToBoss(delay)
//!        │                                              │
//!        │                                              v
//!        └─────────(PlayerDestroyed)──> Ended <──── BossFight
//!                                               (BossDefeated / PlayerDestroyed)
//! ```
//!
//! The coordinator polls `WaveController::is_running` rather than listening
//! for completion, so the next wave starts once the previous one has finished
//! spawning even while its members are still on the field.

use bevy::prelude::*;
use chrono::Utc;
use rand::Rng;

use crate::common::rng::GameRng;
use crate::common::score::Score;
use crate::common::state::GameState;
use crate::common::tunables::{Tunables, plane_point};
use crate::plugins::boss::{BossDefeated, spawn_boss};
use crate::plugins::highscores::{Highscore, HighscoreFile, Highscores, save_highscores};
use crate::plugins::player::{MAX_LEVEL, Player, PlayerDestroyed, PlayerStatus};
use crate::plugins::powerup::spawn_powerup;
use crate::plugins::waves::patterns::AsteroidFieldPattern;
use crate::plugins::waves::{WaveCompleted, WaveController, WavePattern, WaveSystems, launch_wave, start_wave};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowPhase {
    SpawningWaves,
    TransitioningToBoss { remaining: f32 },
    BossFight,
    Ended { won: bool },
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameFlow {
    pub phase: FlowPhase,
    /// Enemy waves still to start after the current one.
    pub waves_remaining: u32,
    pub enemy_wave: Option<Entity>,
    pub asteroid_field: Option<Entity>,
}

impl Default for GameFlow {
    fn default() -> Self {
        Self { phase: FlowPhase::SpawningWaves, waves_remaining: 0, enemy_wave: None, asteroid_field: None }
    }
}

impl GameFlow {
    #[inline]
    pub fn is_over(&self) -> bool {
        matches!(self.phase, FlowPhase::Ended { .. })
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<GameFlow>()
        .add_systems(OnEnter(GameState::InGame), begin_session)
        .add_systems(
            Update,
            (advance_flow, reward_cleared_waves, end_game)
                .chain()
                .after(WaveSystems)
                .run_if(in_state(GameState::InGame)),
        );
}

/// Start a random enemy wave from the configured templates.
fn start_random_wave(commands: &mut Commands, tunables: &Tunables, rng: &mut GameRng) -> Option<Entity> {
    let templates = &tunables.waves.templates;
    if templates.is_empty() {
        warn!("No wave templates configured");
        return None;
    }
    let template = &templates[rng.0.random_range(0..templates.len())];
    let controller = WaveController::new(
        WavePattern::from_config(&template.pattern),
        template.start_delay,
        plane_point(template.origin),
    )
    .with_height_variation(tunables.waves.height_variation);
    Some(launch_wave(commands, controller))
}

fn begin_session(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut score: ResMut<Score>,
    mut flow: ResMut<GameFlow>,
) {
    *score = Score::default();
    let budget = tunables.waves.budget;

    // Normal mode has no field during the boss, so an empty budget skips it.
    let field = &tunables.waves.asteroid_field;
    let asteroid_field = (budget > 0 || tunables.difficulty.is_hard()).then(|| {
        start_wave(
            &mut commands,
            WavePattern::AsteroidField(AsteroidFieldPattern::from_tunables(field)),
            field.start_delay,
            plane_point((0.0, field.spawn_y)),
        )
    });

    *flow = if budget == 0 {
        GameFlow {
            phase: FlowPhase::TransitioningToBoss { remaining: tunables.boss.delay },
            waves_remaining: 0,
            enemy_wave: None,
            asteroid_field,
        }
    } else {
        GameFlow {
            phase: FlowPhase::SpawningWaves,
            waves_remaining: budget - 1,
            enemy_wave: start_random_wave(&mut commands, &tunables, &mut rng),
            asteroid_field,
        }
    };
    info!("Session started ({:?}, {budget} waves before the boss)", tunables.difficulty);
}

fn advance_flow(
    mut commands: Commands,
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut flow: ResMut<GameFlow>,
    mut q_waves: Query<&mut WaveController>,
) {
    match flow.phase {
        FlowPhase::SpawningWaves => {
            let running = flow
                .enemy_wave
                .and_then(|wave| q_waves.get(wave).ok())
                .is_some_and(|controller| controller.is_running());
            if running {
                return;
            }

            if flow.waves_remaining > 0 {
                flow.waves_remaining -= 1;
                flow.enemy_wave = start_random_wave(&mut commands, &tunables, &mut rng);
                return;
            }

            if !tunables.difficulty.is_hard()
                && let Some(field) = flow.asteroid_field.take()
                && let Ok(mut controller) = q_waves.get_mut(field)
            {
                controller.stop_wave();
            }
            info!("Wave budget spent, boss incoming");
            flow.phase = FlowPhase::TransitioningToBoss { remaining: tunables.boss.delay };
        }
        FlowPhase::TransitioningToBoss { remaining } => {
            let remaining = remaining - time.delta_secs();
            if remaining > 0.0 {
                flow.phase = FlowPhase::TransitioningToBoss { remaining };
                return;
            }
            spawn_boss(&mut commands, &tunables);
            flow.phase = FlowPhase::BossFight;
        }
        FlowPhase::BossFight | FlowPhase::Ended { .. } => {}
    }
}

fn reward_cleared_waves(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut score: ResMut<Score>,
    mut completed: MessageReader<WaveCompleted>,
    q_player: Query<&PlayerStatus, With<Player>>,
) {
    for done in completed.read() {
        if !done.fully_cleared {
            continue;
        }
        score.double();
        debug!("Wave {:?} fully cleared, score doubled to {}", done.wave, score.0);

        if q_player.single().is_ok_and(|status| status.level < MAX_LEVEL) {
            spawn_powerup(&mut commands, &tunables.powerup);
            info!("A powerup has been created!");
        }
    }
}

fn end_game(
    mut flow: ResMut<GameFlow>,
    tunables: Res<Tunables>,
    score: Res<Score>,
    mut highscores: ResMut<Highscores>,
    highscore_file: Option<Res<HighscoreFile>>,
    mut boss_defeated: MessageReader<BossDefeated>,
    mut player_destroyed: MessageReader<PlayerDestroyed>,
    mut q_waves: Query<&mut WaveController>,
    mut q_player: Query<&mut PlayerStatus, With<Player>>,
) {
    let won = boss_defeated.read().count() > 0;
    let lost = player_destroyed.read().count() > 0;
    if flow.is_over() || !(won || lost) {
        return;
    }

    flow.phase = FlowPhase::Ended { won };
    for mut controller in &mut q_waves {
        controller.stop_wave();
    }
    for mut status in &mut q_player {
        status.controllable = false;
    }

    if won {
        info!("Boss defeated, final score {}", score.0);
    } else {
        info!("Player destroyed, final score {}", score.0);
    }

    let rank = highscores.record(tunables.difficulty, Highscore::new(score.0, Utc::now()));
    info!("Score ranked #{} on {:?}", rank + 1, tunables.difficulty);
    if let Some(file) = highscore_file
        && let Err(err) = save_highscores(&file.0, &highscores)
    {
        warn!("{err}");
    }
}
