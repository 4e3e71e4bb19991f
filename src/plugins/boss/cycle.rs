//! Boss vulnerability cycle.
//!
//! ```text
//!  Waiting(delay) ──> Vulnerable(n alive) ──(all destroyed)──> CoreExposed(core_time)
//!       ^                                                            │
//!       └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the exposed core takes damage. Weak points destroyed outside the
//! `Vulnerable` phase do not count towards exposing it.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CyclePhase {
    Waiting { remaining: f32 },
    Vulnerable { alive: u32 },
    CoreExposed { remaining: f32 },
}

/// What the boss systems must do in response to a cycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEvent {
    SpawnVulnerabilities,
    ExposeCore,
    HideCore,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct VulnerabilityCycle {
    phase: CyclePhase,
    delay: f32,
    core_time: f32,
    count: u32,
}

impl VulnerabilityCycle {
    pub fn new(delay: f32, core_time: f32, count: u32) -> Self {
        debug_assert!(count > 0, "a boss needs at least one vulnerability");
        Self { phase: CyclePhase::Waiting { remaining: delay }, delay, core_time, count }
    }

    #[inline]
    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    #[inline]
    pub fn core_exposed(&self) -> bool {
        matches!(self.phase, CyclePhase::CoreExposed { .. })
    }

    pub fn tick(&mut self, dt: f32) -> Option<CycleEvent> {
        match &mut self.phase {
            CyclePhase::Waiting { remaining } => {
                *remaining -= dt;
                if *remaining > 0.0 {
                    return None;
                }
                self.phase = CyclePhase::Vulnerable { alive: self.count };
                Some(CycleEvent::SpawnVulnerabilities)
            }
            CyclePhase::CoreExposed { remaining } => {
                *remaining -= dt;
                if *remaining > 0.0 {
                    return None;
                }
                self.phase = CyclePhase::Waiting { remaining: self.delay };
                Some(CycleEvent::HideCore)
            }
            CyclePhase::Vulnerable { .. } => None,
        }
    }

    pub fn vulnerability_destroyed(&mut self) -> Option<CycleEvent> {
        let CyclePhase::Vulnerable { alive } = &mut self.phase else {
            return None;
        };
        *alive = alive.saturating_sub(1);
        if *alive > 0 {
            return None;
        }
        self.phase = CyclePhase::CoreExposed { remaining: self.core_time };
        Some(CycleEvent::ExposeCore)
    }
}
