use crate::api::CounterApi;
use crate::models::CounterValue;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::{info, warn};

/// The visitor counter board.
///
/// Shows [`CounterValue::Loading`] until the first refresh resolves. The session reconciler
/// decides, exactly once, whether this page load counts as a new visit.
pub struct VisitorWidget<A> {
    api: Arc<A>,
    display: watch::Sender<CounterValue>,
    session_applied: AtomicBool,
}

impl<A: CounterApi> VisitorWidget<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (display, _) = watch::channel(CounterValue::Loading);
        Self {
            api,
            display,
            session_applied: AtomicBool::new(false),
        }
    }

    pub fn display(&self) -> CounterValue {
        *self.display.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<CounterValue> {
        self.display.subscribe()
    }

    /// Re-reads the count. A failed fetch shows the error marker.
    pub async fn refresh(&self) -> CounterValue {
        let value = self.api.fetch_visitor_count().await;
        self.display.send_replace(value);
        value
    }

    /// Counts this visit when the server says the visitor is new.
    ///
    /// Returns `false` without doing anything if a session status was already applied.
    pub async fn apply_session_status(&self, has_visited_before: bool) -> bool {
        if self.session_applied.swap(true, Ordering::SeqCst) {
            warn!("visitor session status already applied, ignoring");
            return false;
        }
        if has_visited_before {
            return true;
        }

        let value = self.api.increment_visitor_count().await;
        info!(count = %value, "first visit counted");
        self.display.send_replace(value);
        true
    }
}
