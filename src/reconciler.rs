use crate::api::CounterApi;
use crate::likes::LikeWidget;
use crate::models::SessionStatus;
use crate::visitor::VisitorWidget;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The server answered and its status was applied.
    Confirmed(SessionStatus),
    /// The session fetch failed; both widgets were told "first visit, not liked".
    Fallback,
}

impl SessionOutcome {
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionOutcome::Confirmed(status) => *status,
            SessionOutcome::Fallback => SessionStatus::FIRST_VISIT,
        }
    }
}

/// Fetches the session status once and pushes it into both widgets.
///
/// A failed fetch is not retried. It falls back to treating the visitor as new, which can
/// count one visitor twice but never silently drops a first visit.
pub async fn reconcile<A: CounterApi>(
    api: &A,
    visitor: &VisitorWidget<A>,
    likes: &LikeWidget<A>,
) -> SessionOutcome {
    let outcome = match api.fetch_session_status().await {
        Ok(status) => {
            info!(
                has_visited = status.has_visited,
                has_liked = status.has_liked,
                "session status received"
            );
            SessionOutcome::Confirmed(status)
        }
        Err(err) => {
            warn!("session status unavailable, assuming first visit: {err}");
            SessionOutcome::Fallback
        }
    };

    let status = outcome.status();
    visitor.apply_session_status(status.has_visited).await;
    likes.apply_session_status(status.has_liked);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::models::CounterValue;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    struct Fixture {
        api: Arc<MockApi>,
        visitor: VisitorWidget<MockApi>,
        likes: LikeWidget<MockApi>,
    }

    fn fixture(session: SessionStatus) -> Fixture {
        let api = Arc::new(MockApi::new(100, 7, session));
        Fixture {
            visitor: VisitorWidget::new(Arc::clone(&api)),
            likes: LikeWidget::new(Arc::clone(&api)),
            api,
        }
    }

    #[tokio::test]
    async fn new_visitor_is_counted_and_heart_stays_empty() {
        let f = fixture(SessionStatus::FIRST_VISIT);

        let outcome = reconcile(f.api.as_ref(), &f.visitor, &f.likes).await;

        assert_eq!(outcome, SessionOutcome::Confirmed(SessionStatus::FIRST_VISIT));
        assert_eq!(f.api.increments.load(Ordering::SeqCst), 1);
        assert_eq!(f.api.toggles.load(Ordering::SeqCst), 0);
        assert_eq!(f.visitor.display(), CounterValue::Count(101));
        assert!(!f.likes.view().liked);
    }

    #[tokio::test]
    async fn returning_liker_gets_filled_heart_without_toggle() {
        let status = SessionStatus {
            has_visited: true,
            has_liked: true,
        };
        let f = fixture(status);

        let outcome = reconcile(f.api.as_ref(), &f.visitor, &f.likes).await;

        assert_eq!(outcome, SessionOutcome::Confirmed(status));
        assert_eq!(f.api.increments.load(Ordering::SeqCst), 0);
        assert_eq!(f.api.toggles.load(Ordering::SeqCst), 0);
        assert!(f.likes.view().liked);
        assert_eq!(f.visitor.display(), CounterValue::Loading);
    }

    #[tokio::test]
    async fn failed_session_fetch_falls_back_to_first_visit() {
        let f = fixture(SessionStatus {
            has_visited: true,
            has_liked: true,
        });
        f.api.fail_session.store(true, Ordering::SeqCst);
        f.likes.toggle().await;

        let outcome = reconcile(f.api.as_ref(), &f.visitor, &f.likes).await;

        assert_eq!(outcome, SessionOutcome::Fallback);
        assert_eq!(f.api.session_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(f.api.increments.load(Ordering::SeqCst), 1);
        assert!(!f.likes.view().liked);
        assert!(!f.visitor.display().is_loading());
    }

    fn held_likes(
        session: SessionStatus,
    ) -> (Arc<MockApi>, VisitorWidget<MockApi>, Arc<LikeWidget<MockApi>>) {
        let api = Arc::new(MockApi::new(100, 7, session));
        api.hold_likes.store(true, Ordering::SeqCst);
        let visitor = VisitorWidget::new(Arc::clone(&api));
        let likes = Arc::new(LikeWidget::new(Arc::clone(&api)));
        (api, visitor, likes)
    }

    #[tokio::test]
    async fn session_landing_during_refresh_keeps_both_results() {
        let status = SessionStatus {
            has_visited: true,
            has_liked: true,
        };
        let (api, visitor, likes) = held_likes(status);
        let refresh = tokio::spawn({
            let likes = Arc::clone(&likes);
            async move { likes.refresh().await }
        });
        while api.like_fetches.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        reconcile(api.as_ref(), &visitor, &likes).await;
        assert!(likes.view().liked);
        assert_eq!(likes.view().count, CounterValue::Loading);

        api.release.notify_one();
        assert_eq!(refresh.await.unwrap(), CounterValue::Count(7));
        assert!(likes.view().liked);
        assert_eq!(likes.view().count, CounterValue::Count(7));
    }

    #[tokio::test]
    async fn session_landing_during_toggle_wins_over_optimistic_flip() {
        let (api, visitor, likes) = held_likes(SessionStatus::default());
        let toggle = tokio::spawn({
            let likes = Arc::clone(&likes);
            async move { likes.toggle().await }
        });
        while api.toggles.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(likes.view().liked);

        let outcome = reconcile(api.as_ref(), &visitor, &likes).await;
        assert_eq!(outcome, SessionOutcome::Confirmed(SessionStatus::default()));
        assert!(!likes.view().liked);

        api.release.notify_one();
        let view = toggle.await.unwrap();
        assert!(!view.liked);
        assert_eq!(view.count, CounterValue::Count(8));
        assert_eq!(api.increments.load(Ordering::SeqCst), 1);
    }
}
