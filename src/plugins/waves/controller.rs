//! Wave controller: owns one sequencing task and its running flag.

use bevy::prelude::*;
use rand::Rng;

use super::patterns::{SpawnOrder, WavePattern};
use super::task::{SequenceTask, TaskStatus};

/// What a controller did during one `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// No task is attached.
    Idle,
    Running,
    /// The schedule ran to its end this tick.
    Finished,
    /// A stop request was honoured at this resume point.
    Cancelled,
}

#[derive(Component, Debug, Clone)]
pub struct WaveController {
    pattern: WavePattern,
    start_delay: f32,
    origin: Vec3,
    height_variation: f32,
    running: bool,
    task: Option<SequenceTask>,
    spawned: u32,
}

impl WaveController {
    pub fn new(pattern: WavePattern, start_delay: f32, origin: Vec3) -> Self {
        Self { pattern, start_delay, origin, height_variation: 0.0, running: false, task: None, spawned: 0 }
    }

    /// Every run of the schedule spawns at one random height within `±h` of the origin.
    pub fn with_height_variation(mut self, h: f32) -> Self {
        self.height_variation = h.max(0.0);
        self
    }

    /// Vertical offset of the current run, once its task has started advancing.
    #[inline]
    pub fn height_offset(&self) -> Option<f32> {
        self.task.as_ref().and_then(SequenceTask::height_offset)
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    #[inline]
    pub fn expected_count(&self) -> Option<u32> {
        self.pattern.expected_count()
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        self.pattern.label()
    }

    /// Launch the schedule. No-op while already running.
    pub fn start_wave(&mut self) {
        if self.running {
            return;
        }
        self.task = Some(
            SequenceTask::new(self.pattern.clone(), self.start_delay).with_height_variation(self.height_variation),
        );
        self.running = true;
    }

    /// Request cancellation; honoured at the task's next resume point.
    /// No-op while not running.
    pub fn stop_wave(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        if let Some(task) = self.task.as_mut() {
            task.cancel();
        }
    }

    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R, out: &mut Vec<SpawnOrder>) -> Progress {
        let Some(task) = self.task.as_mut() else {
            return Progress::Idle;
        };

        let before = out.len();
        let status = task.advance(dt, self.origin, rng, out);
        self.spawned += (out.len() - before) as u32;

        match status {
            TaskStatus::Suspended => Progress::Running,
            TaskStatus::Finished => {
                self.task = None;
                self.running = false;
                Progress::Finished
            }
            TaskStatus::Cancelled => {
                self.task = None;
                Progress::Cancelled
            }
        }
    }
}
