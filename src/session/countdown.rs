//! Per-second countdown

use super::planner::SessionId;

/// Result of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Still counting; seconds left
    Running(u32),
    /// Reached zero on this tick
    Expired,
}

/// Remaining time of the active session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    id: SessionId,
    remaining: u32,
}

impl Countdown {
    pub fn new(id: SessionId, seconds: u32) -> Self {
        Self {
            id,
            remaining: seconds,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Take one second off. The tick that leaves nothing is `Expired`.
    pub fn tick(&mut self) -> CountdownStep {
        if self.remaining <= 1 {
            self.remaining = 0;
            CountdownStep::Expired
        } else {
            self.remaining -= 1;
            CountdownStep::Running(self.remaining)
        }
    }

    pub fn into_id(self) -> SessionId {
        self.id
    }
}
