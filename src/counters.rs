use crate::models::{SessionStatus, SiteData, UserSession};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitOutcome {
    pub count: u64,
    pub counted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub count: u64,
    pub liked: bool,
}

impl SiteData {
    /// The session's flags, or the first-visit default for unknown and expired sessions.
    pub fn session_status(&self, session_id: &str, now: DateTime<Utc>) -> SessionStatus {
        match self.sessions.get(session_id) {
            Some(session) if session.expires_at > now => SessionStatus {
                has_visited: session.has_visited,
                has_liked: session.has_liked,
            },
            _ => SessionStatus::FIRST_VISIT,
        }
    }

    /// Counts a visit unless this session was already counted.
    pub fn record_visit(&mut self, session_id: &str, now: DateTime<Utc>, max_age: Duration) -> VisitOutcome {
        let session = self.touch_session(session_id, now, max_age);
        if session.has_visited {
            return VisitOutcome {
                count: self.visitors,
                counted: false,
            };
        }
        session.has_visited = true;
        self.visitors = self.visitors.saturating_add(1);
        VisitOutcome {
            count: self.visitors,
            counted: true,
        }
    }

    pub fn toggle_like(&mut self, session_id: &str, now: DateTime<Utc>, max_age: Duration) -> LikeOutcome {
        let session = self.touch_session(session_id, now, max_age);
        session.has_liked = !session.has_liked;
        let liked = session.has_liked;
        self.likes = if liked {
            self.likes.saturating_add(1)
        } else {
            self.likes.saturating_sub(1)
        };
        LikeOutcome {
            count: self.likes,
            liked,
        }
    }

    /// Drops expired sessions, returning how many were removed.
    pub fn prune_sessions(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.expires_at > now);
        before - self.sessions.len()
    }

    fn touch_session(&mut self, session_id: &str, now: DateTime<Utc>, max_age: Duration) -> &mut UserSession {
        let fresh = UserSession {
            has_visited: false,
            has_liked: false,
            created_at: now,
            updated_at: now,
            expires_at: now + max_age,
        };
        let session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| fresh.clone());
        if session.expires_at <= now {
            *session = fresh;
        }
        session.updated_at = now;
        session.expires_at = now + max_age;
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, hour, 0, 0).unwrap()
    }

    fn day() -> Duration {
        Duration::hours(24)
    }

    #[test]
    fn visit_is_counted_once_per_session() {
        let mut data = SiteData::default();

        let first = data.record_visit("abc", at(1), day());
        assert_eq!(first, VisitOutcome { count: 1, counted: true });

        let again = data.record_visit("abc", at(2), day());
        assert_eq!(again, VisitOutcome { count: 1, counted: false });

        let other = data.record_visit("def", at(2), day());
        assert_eq!(other, VisitOutcome { count: 2, counted: true });
    }

    #[test]
    fn toggle_like_flips_and_never_underflows() {
        let mut data = SiteData::default();

        assert_eq!(
            data.toggle_like("abc", at(1), day()),
            LikeOutcome { count: 1, liked: true }
        );
        assert_eq!(
            data.toggle_like("abc", at(1), day()),
            LikeOutcome { count: 0, liked: false }
        );

        data.likes = 0;
        data.sessions.get_mut("abc").unwrap().has_liked = true;
        assert_eq!(
            data.toggle_like("abc", at(2), day()),
            LikeOutcome { count: 0, liked: false }
        );
    }

    #[test]
    fn session_status_reflects_activity_until_expiry() {
        let mut data = SiteData::default();
        assert_eq!(data.session_status("abc", at(1)), SessionStatus::FIRST_VISIT);

        data.record_visit("abc", at(1), Duration::hours(2));
        data.toggle_like("abc", at(1), Duration::hours(2));
        assert_eq!(
            data.session_status("abc", at(2)),
            SessionStatus {
                has_visited: true,
                has_liked: true
            }
        );
        assert_eq!(data.session_status("abc", at(3)), SessionStatus::FIRST_VISIT);
    }

    #[test]
    fn expired_session_counts_as_new_visitor() {
        let mut data = SiteData::default();
        data.record_visit("abc", at(1), Duration::hours(1));

        let outcome = data.record_visit("abc", at(5), Duration::hours(1));
        assert!(outcome.counted);
        assert_eq!(outcome.count, 2);
        assert_eq!(data.sessions["abc"].created_at, at(5));
    }

    #[test]
    fn prune_removes_only_expired_sessions() {
        let mut data = SiteData::default();
        data.record_visit("old", at(1), Duration::hours(1));
        data.record_visit("new", at(4), Duration::hours(1));

        assert_eq!(data.prune_sessions(at(4)), 1);
        assert!(data.sessions.contains_key("new"));
        assert!(!data.sessions.contains_key("old"));
    }
}
