//! Sequencing task: a start delay followed by a pattern, driven by host ticks.
//!
//! The task is suspended between resumes. Each `advance` consumes elapsed time
//! from the current wait; whenever the wait runs out the pattern is resumed and
//! the leftover time carries into the next wait, so schedules do not drift with
//! frame timing. Cancellation is a flag checked before any resume.
//!
//! Enemy waves shift their whole schedule vertically by one offset drawn on
//! the first advance, so every member of a wave shares the same height.

use bevy::prelude::*;
use rand::Rng;

use super::patterns::{SpawnOrder, Step, WavePattern};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Suspended,
    Finished,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct SequenceTask {
    pattern: WavePattern,
    wait: f32,
    height_variation: f32,
    height_offset: Option<f32>,
    cancelled: bool,
    finished: bool,
}

impl SequenceTask {
    pub fn new(pattern: WavePattern, start_delay: f32) -> Self {
        Self {
            pattern,
            wait: start_delay.max(0.0),
            height_variation: 0.0,
            height_offset: None,
            cancelled: false,
            finished: false,
        }
    }

    /// Offset the spawn origin by a value drawn once from `[-h, h]`.
    pub fn with_height_variation(mut self, h: f32) -> Self {
        self.height_variation = h.max(0.0);
        self
    }

    /// `None` until the task has been advanced once.
    #[inline]
    pub fn height_offset(&self) -> Option<f32> {
        self.height_offset
    }

    #[inline]
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        origin: Vec3,
        rng: &mut R,
        out: &mut Vec<SpawnOrder>,
    ) -> TaskStatus {
        if self.cancelled {
            return TaskStatus::Cancelled;
        }
        if self.finished {
            return TaskStatus::Finished;
        }

        let h = self.height_variation;
        let offset = *self
            .height_offset
            .get_or_insert_with(|| if h > 0.0 { rng.random_range(-h..=h) } else { 0.0 });
        let origin = origin + Vec3::Y * offset;

        self.wait -= dt;
        while self.wait <= 0.0 {
            match self.pattern.resume(origin, rng, out) {
                Step::Wait(secs) => {
                    debug_assert!(secs >= 0.0, "negative wait in {} schedule", self.pattern.label());
                    self.wait += secs.max(0.0);
                }
                Step::Done => {
                    self.finished = true;
                    return TaskStatus::Finished;
                }
            }
        }
        TaskStatus::Suspended
    }
}
