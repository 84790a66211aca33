//! Session controller
//!
//! Owns the single active countdown and the log of completed sessions.
//! The surface and ticker are borrowed per call; the controller never holds
//! on to either.
//!
//! Starting while a countdown is running cancels the running one first. The
//! superseded session is dropped, not logged.

use super::countdown::{Countdown, CountdownStep};
use super::planner::{SessionId, SessionPlan, SessionPlanner};
use super::record::{Session, SessionLog};
use super::ticker::{Ticker, TimerHandle};
use crate::clock::{Clock, SystemClock, Timestamp};
use crate::settings::Settings;
use crate::surface::GameSurface;

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not the active timer (stale or unknown)
    Ignored,
    /// Seconds left after this tick
    Counting(u32),
    /// The countdown finished and the session was logged
    Completed,
}

/// The active countdown and its bookkeeping
#[derive(Debug)]
struct ActiveSession {
    countdown: Countdown,
    timer: TimerHandle,
    started_at: Timestamp,
}

pub struct SessionController<C: Clock = SystemClock> {
    planner: SessionPlanner,
    clock: C,
    tick_interval_ms: u32,
    session_id: Option<SessionId>,
    remaining: u32,
    active: Option<ActiveSession>,
    log: SessionLog,
    revision: u64,
}

impl SessionController<SystemClock> {
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self::with_clock(seed, settings, SystemClock)
    }
}

impl<C: Clock> SessionController<C> {
    pub fn with_clock(seed: u64, settings: &Settings, clock: C) -> Self {
        Self {
            planner: SessionPlanner::new(seed, settings),
            clock,
            tick_interval_ms: settings.tick_interval_ms,
            session_id: None,
            remaining: 0,
            active: None,
            log: SessionLog::new(),
            revision: 0,
        }
    }

    /// Id of the current (or most recent) session
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Seconds left, as displayed
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_timer(&self) -> Option<TimerHandle> {
        self.active.as_ref().map(|a| a.timer)
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Bumped on every change a view would show
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Start a session with randomized parameters.
    /// Returns false (and changes nothing) if the surface is not ready.
    pub fn start_session(&mut self, surface: &mut GameSurface, ticker: &mut dyn Ticker) -> bool {
        if !surface.is_ready() {
            log::debug!("Start ignored: surface is {:?}", surface.state());
            return false;
        }
        let plan = self.planner.next_plan();
        self.start_planned(plan, surface, ticker)
    }

    /// Start a session with the given parameters
    pub fn start_planned(
        &mut self,
        plan: SessionPlan,
        surface: &mut GameSurface,
        ticker: &mut dyn Ticker,
    ) -> bool {
        if !surface.is_ready() {
            log::debug!("Start ignored: surface is {:?}", surface.state());
            return false;
        }

        if let Some(previous) = self.active.take() {
            ticker.clear_interval(previous.timer);
            log::info!(
                "Session {} superseded with {}s left",
                previous.countdown.id(),
                previous.countdown.remaining()
            );
        }

        let started_at = self.clock.now();

        if surface.is_paused() {
            surface.resume();
        }
        surface.set_entity_velocity(plan.velocity);
        surface.play_cue(true, 1.0);

        let timer = ticker.start_interval(self.tick_interval_ms);
        log::info!(
            "Session {} started: {}s, velocity ({}, {})",
            plan.id,
            plan.duration_secs,
            plan.velocity.x,
            plan.velocity.y
        );

        self.session_id = Some(plan.id.clone());
        self.remaining = plan.duration_secs;
        self.active = Some(ActiveSession {
            countdown: Countdown::new(plan.id, plan.duration_secs),
            timer,
            started_at,
        });
        self.revision += 1;
        true
    }

    /// Handle one firing of `handle`
    pub fn on_tick(
        &mut self,
        handle: TimerHandle,
        surface: &mut GameSurface,
        ticker: &mut dyn Ticker,
    ) -> TickOutcome {
        let Some(active) = self.active.as_mut() else {
            log::debug!("Tick {:?} with no active session", handle);
            return TickOutcome::Ignored;
        };
        if active.timer != handle {
            log::debug!("Stale tick {:?} (active {:?})", handle, active.timer);
            return TickOutcome::Ignored;
        }

        match active.countdown.tick() {
            CountdownStep::Running(left) => {
                self.remaining = left;
                self.revision += 1;
                TickOutcome::Counting(left)
            }
            CountdownStep::Expired => {
                self.finish(surface, ticker);
                TickOutcome::Completed
            }
        }
    }

    fn finish(&mut self, surface: &mut GameSurface, ticker: &mut dyn Ticker) {
        let Some(active) = self.active.take() else {
            return;
        };
        ticker.clear_interval(active.timer);

        let mut ended_at = self.clock.now();
        if ended_at <= active.started_at {
            log::warn!("Wall clock went backwards during a session");
            ended_at = Timestamp::from_millis(active.started_at.as_millis() + 1.0);
        }

        let session = Session {
            id: active.countdown.into_id(),
            started_at: active.started_at,
            ended_at,
        };
        log::info!("Session complete: {}", session);
        self.log.push(session);
        self.remaining = 0;
        self.revision += 1;

        surface.pause();
        surface.stop_entity();
        surface.stop_cue();
    }

    /// Cancel any running countdown without logging it (unmount)
    pub fn shutdown(&mut self, ticker: &mut dyn Ticker) {
        if let Some(active) = self.active.take() {
            ticker.clear_interval(active.timer);
            log::info!("Session {} cancelled on shutdown", active.countdown.id());
            self.revision += 1;
        }
    }
}
