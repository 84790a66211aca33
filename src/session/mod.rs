//! Timed sessions
//!
//! One countdown at a time. When it runs out the session is recorded in an
//! append-only log and the surface is brought to rest.

pub mod controller;
pub mod countdown;
pub mod planner;
pub mod record;
pub mod ticker;

pub use controller::{SessionController, TickOutcome};
pub use countdown::{Countdown, CountdownStep};
pub use planner::{SessionId, SessionPlan, SessionPlanner};
pub use record::{Session, SessionLog};
pub use ticker::{ManualTicker, Ticker, TimerHandle};
