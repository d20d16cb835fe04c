use std::collections::HashMap;
use std::sync::{RwLock, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;
const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Anonymous sessions handed out silently to every client. A session is the
/// precondition for touching the store; it carries no identity.
///
/// Sessions expire after `ttl` without use, and at most `max_sessions` are
/// held; minting past the cap evicts the least recently used one.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, DateTime<Utc>>>,
    ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_limits(Duration::seconds(DEFAULT_TTL_SECS), DEFAULT_MAX_SESSIONS)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_live(&self, last_seen: &DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - *last_seen < self.ttl
    }

    /// Mint a fresh session token.
    pub fn establish(&self) -> String {
        let token = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut sessions = self.write();

        sessions.retain(|_, last_seen| self.is_live(last_seen, now));
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, last_seen)| **last_seen)
                .map(|(token, _)| token.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
            log::debug!("evicted least recently used anonymous session");
        }

        sessions.insert(token.clone(), now);
        log::debug!("anonymous session established");
        token
    }

    /// Whether `token` names a live session. A hit refreshes its expiry; an
    /// expired token is dropped.
    pub fn is_valid(&self, token: &str) -> bool {
        let now = Utc::now();
        let mut sessions = self.write();
        match sessions.get_mut(token) {
            Some(last_seen) if self.is_live(last_seen, now) => {
                *last_seen = now;
                true
            }
            Some(_) => {
                sessions.remove(token);
                false
            }
            None => false,
        }
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.write();
        let before = sessions.len();
        sessions.retain(|_, last_seen| self.is_live(last_seen, now));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        match self.sessions.read() {
            Ok(sessions) => sessions.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn established_tokens_validate_and_others_do_not() {
        let registry = SessionRegistry::new();
        let a = registry.establish();
        let b = registry.establish();

        assert_ne!(a, b);
        assert!(registry.is_valid(&a));
        assert!(registry.is_valid(&b));
        assert!(!registry.is_valid("forged"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn idle_sessions_expire_and_are_pruned() {
        let registry = SessionRegistry::with_limits(Duration::milliseconds(20), 100);
        let stale = registry.establish();
        let other = registry.establish();
        std::thread::sleep(std::time::Duration::from_millis(40));

        assert!(!registry.is_valid(&stale));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.prune(), 1);
        assert!(registry.is_empty());
        assert!(!registry.is_valid(&other));
    }

    #[test]
    fn minting_past_the_cap_evicts_the_least_recently_used() {
        let registry = SessionRegistry::with_limits(Duration::hours(1), 3);
        let first = registry.establish();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = registry.establish();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let third = registry.establish();
        std::thread::sleep(std::time::Duration::from_millis(2));
        // Touching the first makes the second the oldest.
        assert!(registry.is_valid(&first));
        std::thread::sleep(std::time::Duration::from_millis(2));

        let fourth = registry.establish();

        assert_eq!(registry.len(), 3);
        assert!(!registry.is_valid(&second));
        assert!(registry.is_valid(&first));
        assert!(registry.is_valid(&third));
        assert!(registry.is_valid(&fourth));

        for _ in 0..50 {
            registry.establish();
        }
        assert_eq!(registry.len(), 3);
    }
}
