//! Randomized session parameters
//!
//! Each start draws a display id, a whole-second duration and a launch
//! velocity from one seeded generator, so a run is reproducible from its seed.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Characters used in session ids
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
/// Session id length
pub const SESSION_ID_LEN: usize = 6;

/// Opaque display label for a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fresh random id
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id = (0..SESSION_ID_LEN)
            .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
            .collect();
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameters for one session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub id: SessionId,
    pub duration_secs: u32,
    pub velocity: Vec2,
}

impl SessionPlan {
    /// A plan with a fixed duration and a still ball
    pub fn fixed(id: &str, duration_secs: u32) -> Self {
        Self {
            id: SessionId::from(id),
            duration_secs,
            velocity: Vec2::ZERO,
        }
    }
}

/// Draws session plans
#[derive(Debug, Clone)]
pub struct SessionPlanner {
    rng: Pcg32,
    min_secs: u32,
    max_secs: u32,
    speed_limit: i32,
}

impl SessionPlanner {
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            min_secs: settings.min_session_secs,
            max_secs: settings.max_session_secs.max(settings.min_session_secs),
            speed_limit: settings.launch_speed_limit().max(0),
        }
    }

    pub fn next_plan(&mut self) -> SessionPlan {
        let id = SessionId::random(&mut self.rng);
        let duration_secs = self.rng.random_range(self.min_secs..=self.max_secs);
        let limit = self.speed_limit;
        let velocity = Vec2::new(
            self.rng.random_range(-limit..=limit) as f32,
            self.rng.random_range(-limit..=limit) as f32,
        );
        SessionPlan {
            id,
            duration_secs,
            velocity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_seed_same_plans() {
        let settings = Settings::default();
        let mut a = SessionPlanner::new(42, &settings);
        let mut b = SessionPlanner::new(42, &settings);
        for _ in 0..10 {
            assert_eq!(a.next_plan(), b.next_plan());
        }
    }

    #[test]
    fn test_id_shape() {
        let mut planner = SessionPlanner::new(7, &Settings::default());
        let plan = planner.next_plan();
        assert_eq!(plan.id.as_str().len(), SESSION_ID_LEN);
        assert!(plan
            .id
            .as_str()
            .bytes()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_custom_range() {
        let mut settings = Settings::default();
        settings.min_session_secs = 3;
        settings.max_session_secs = 3;
        let mut planner = SessionPlanner::new(1, &settings);
        assert_eq!(planner.next_plan().duration_secs, 3);
    }

    proptest! {
        #[test]
        fn prop_plan_within_policy(seed in any::<u64>()) {
            let mut planner = SessionPlanner::new(seed, &Settings::default());
            for _ in 0..20 {
                let plan = planner.next_plan();
                prop_assert!((1..=50).contains(&plan.duration_secs));
                prop_assert!(plan.velocity.x.abs() <= 300.0);
                prop_assert!(plan.velocity.y.abs() <= 300.0);
                prop_assert_eq!(plan.velocity.x.fract(), 0.0);
            }
        }
    }
}
