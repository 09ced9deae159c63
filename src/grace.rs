//! Grace-period arbitration.
//!
//! `Idle -> Active` forgives one obstacle contact while the agent is dodging.
//! The transition is gated by a per-run budget and a cooldown measured from
//! the previous trigger. `Active -> Idle` happens when the window runs out or
//! on reset.

use tracing::debug;

use crate::config::EngineConfig;
use crate::types::{ActionContext, Seconds};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GraceState {
    pub active: bool,
    /// Time left in the active window; zero while idle.
    pub remaining: Seconds,
    pub uses_this_run: u32,
    /// `None` until the first trigger of the run.
    pub last_trigger_time: Option<Seconds>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Refusal {
    Disabled,
    Cooldown,
    NotDodging,
    BudgetExhausted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GraceDecision {
    /// `Idle -> Active` fired; one use consumed.
    Granted,
    /// Already active; the contact falls inside the open window.
    WithinWindow,
    Refused(Refusal),
}

pub struct GraceArbiter {
    enabled: bool,
    window: Seconds,
    cooldown: Seconds,
    max_per_run: u32,
    state: GraceState,
}

impl GraceArbiter {
    pub fn new(cfg: &EngineConfig) -> Self {
        Self {
            enabled: cfg.enable_grace_period,
            window: cfg.vertical_grace_time,
            cooldown: cfg.grace_cooldown,
            max_per_run: cfg.max_grace_periods_per_run,
            state: GraceState::default(),
        }
    }

    pub fn state(&self) -> GraceState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Advance the active window. Called once per tick before any contact is resolved.
    pub fn tick(&mut self, dt: Seconds) {
        if !self.state.active {
            return;
        }
        self.state.remaining -= dt;
        if self.state.remaining <= 0.0 {
            self.state.active = false;
            self.state.remaining = 0.0;
            debug!("grace window closed");
        }
    }

    fn budget_left(&self) -> bool {
        self.max_per_run == 0 || self.state.uses_this_run < self.max_per_run
    }

    fn cooled_down(&self, now: Seconds) -> bool {
        match self.state.last_trigger_time {
            Some(last) => now - last >= self.cooldown,
            None => true,
        }
    }

    /// Arbitrate one obstacle contact.
    pub fn arbitrate(&mut self, now: Seconds, action: ActionContext) -> GraceDecision {
        if !self.enabled {
            return GraceDecision::Refused(Refusal::Disabled);
        }
        if self.state.active {
            return GraceDecision::WithinWindow;
        }
        let refusal = if !self.cooled_down(now) {
            Some(Refusal::Cooldown)
        } else if !action.is_dodging() {
            Some(Refusal::NotDodging)
        } else if !self.budget_left() {
            Some(Refusal::BudgetExhausted)
        } else {
            None
        };
        if let Some(reason) = refusal {
            debug!(?reason, uses = self.state.uses_this_run, "grace refused");
            return GraceDecision::Refused(reason);
        }

        self.state.active = true;
        self.state.remaining = self.window;
        self.state.uses_this_run += 1;
        self.state.last_trigger_time = Some(now);
        debug!(uses = self.state.uses_this_run, window = self.window, "grace granted");
        GraceDecision::Granted
    }

    pub fn reset(&mut self) {
        self.state = GraceState::default();
    }
}
