//! Completed sessions

use std::fmt;

use serde::{Deserialize, Serialize};

use super::planner::SessionId;
use crate::clock::Timestamp;

/// One finished countdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
}

impl Session {
    pub fn duration_ms(&self) -> f64 {
        self.ended_at.millis_since(self.started_at)
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - Start: {} - End: {}",
            self.id, self.started_at, self.ended_at
        )
    }
}

/// Append-only, in completion order
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionLog {
    entries: Vec<Session>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, session: Session) {
        self.entries.push(session);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Session> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Session> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Session] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a SessionLog {
    type Item = &'a Session;
    type IntoIter = std::slice::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str, start: f64, end: f64) -> Session {
        Session {
            id: SessionId::from(id),
            started_at: Timestamp(start),
            ended_at: Timestamp(end),
        }
    }

    #[test]
    fn test_display() {
        // 00:00:01 and 00:00:04 UTC
        let s = session("k3x9qa", 1_000.0, 4_000.0);
        assert_eq!(s.to_string(), "k3x9qa - Start: 00:00:01 - End: 00:00:04");
        assert_eq!(s.duration_ms(), 3_000.0);
    }

    #[test]
    fn test_log_keeps_insertion_order() {
        let mut log = SessionLog::new();
        assert!(log.is_empty());
        log.push(session("a", 0.0, 1.0));
        log.push(session("b", 2.0, 3.0));
        let ids: Vec<_> = log.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(log.last().map(|s| s.id.as_str()), Some("b"));
        assert_eq!(log.len(), 2);
    }
}
