//! Debounced build triggering for watch mode.
//!
//! File changes arrive in bursts (an editor saving several files, a `git
//! checkout`), so a build starts only once changes have been quiet for the
//! debounce period. At most one build runs at a time:
//!
//! ```text
//!            change                 deadline passed
//!   Idle ─────────────► Debouncing ─────────────────► Building
//!    ▲                   ▲   │ change: re-arm           │  │
//!    │                   │   └──────────┘               │  │ change: arm pending
//!    │                   └──── finished, pending armed ─┘  │
//!    └──────────────────────── finished, nothing pending ──┘
//! ```
//!
//! A pending deadline that expires while the build is still running is
//! dropped. There is no queue and a running build is never cancelled.
//!
//! The state machine is pure: time is passed in, so tests drive it with
//! synthetic instants.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    Debouncing { deadline: Instant },
    Building { pending: Option<Instant> },
}

/// What the caller should do after feeding an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    None,
    StartBuild,
}

#[derive(Debug, Clone)]
pub struct BuildTrigger {
    debounce: Duration,
    state: TriggerState,
}

impl BuildTrigger {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            state: TriggerState::Idle,
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn is_building(&self) -> bool {
        matches!(self.state, TriggerState::Building { .. })
    }

    /// A watched file changed at `now`.
    pub fn on_change(&mut self, now: Instant) {
        let deadline = now + self.debounce;
        self.state = match self.state {
            TriggerState::Idle | TriggerState::Debouncing { .. } => {
                TriggerState::Debouncing { deadline }
            }
            TriggerState::Building { .. } => TriggerState::Building {
                pending: Some(deadline),
            },
        };
    }

    /// Time passed; returns [`TriggerAction::StartBuild`] when a build is due.
    pub fn on_tick(&mut self, now: Instant) -> TriggerAction {
        match self.state {
            TriggerState::Debouncing { deadline } if now >= deadline => {
                self.state = TriggerState::Building { pending: None };
                TriggerAction::StartBuild
            }
            TriggerState::Building {
                pending: Some(deadline),
            } if now >= deadline => {
                tracing::debug!("change settled during a running build, dropping it");
                self.state = TriggerState::Building { pending: None };
                TriggerAction::None
            }
            _ => TriggerAction::None,
        }
    }

    /// Kick off a build immediately, bypassing the debounce.
    ///
    /// Returns false if a build is already running.
    pub fn start_now(&mut self) -> bool {
        if self.is_building() {
            return false;
        }
        self.state = TriggerState::Building { pending: None };
        true
    }

    /// The running build completed at `now`.
    ///
    /// A pending deadline still in the future carries over; one that has
    /// already passed is dropped.
    pub fn on_build_finished(&mut self, now: Instant) {
        self.state = match self.state {
            TriggerState::Building {
                pending: Some(deadline),
            } if deadline > now => TriggerState::Debouncing { deadline },
            _ => TriggerState::Idle,
        };
    }
}
