use crate::api::CounterApi;
use crate::models::CounterValue;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

const HEART_COLOR: &str = "#e74c3c";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartIcon {
    Filled,
    Outline,
}

impl HeartIcon {
    pub fn fill(&self) -> &'static str {
        match self {
            HeartIcon::Filled => HEART_COLOR,
            HeartIcon::Outline => "none",
        }
    }

    pub fn stroke(&self) -> &'static str {
        HEART_COLOR
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LikeView {
    pub count: CounterValue,
    pub liked: bool,
}

impl LikeView {
    pub fn heart(&self) -> HeartIcon {
        if self.liked {
            HeartIcon::Filled
        } else {
            HeartIcon::Outline
        }
    }
}

/// The like button and its counter.
///
/// `liked` is local and optimistic; `count` always comes from the server. Until the session
/// status arrives, `liked` is provisional and gets overwritten by the server's answer.
pub struct LikeWidget<A> {
    api: Arc<A>,
    view: watch::Sender<LikeView>,
    session_applied: AtomicBool,
    /// Bumped by every toggle and by the session correction, always under the view lock.
    epoch: AtomicU64,
    /// Last `liked` the server is known to hold; a failed toggle falls back to it.
    confirmed: AtomicBool,
}

impl<A: CounterApi> LikeWidget<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (view, _) = watch::channel(LikeView::default());
        Self {
            api,
            view,
            session_applied: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            confirmed: AtomicBool::new(false),
        }
    }

    pub fn view(&self) -> LikeView {
        *self.view.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LikeView> {
        self.view.subscribe()
    }

    /// Re-reads the like count. Never touches `liked`.
    pub async fn refresh(&self) -> CounterValue {
        let count = self.api.fetch_like_count().await;
        self.view.send_modify(|view| view.count = count);
        count
    }

    /// Flips the heart right away, then asks the server to flip the like.
    ///
    /// If the server call fails the heart goes back to the last state the server confirmed,
    /// unless a later toggle or the session status has taken ownership of `liked` in the
    /// meantime.
    pub async fn toggle(&self) -> LikeView {
        let mut liked = false;
        let mut epoch = 0;
        self.view.send_modify(|view| {
            view.liked = !view.liked;
            liked = view.liked;
            epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        });
        debug!(liked, "like toggled locally");

        let count = self.api.toggle_like().await;
        let mut reverted = false;
        self.view.send_modify(|view| {
            view.count = count;
            if !count.is_error() {
                self.confirmed.store(liked, Ordering::SeqCst);
            } else if self.epoch.load(Ordering::SeqCst) == epoch {
                view.liked = self.confirmed.load(Ordering::SeqCst);
                reverted = true;
            }
        });
        if reverted {
            warn!("like toggle failed, reverted heart");
        } else if count.is_error() {
            warn!("like toggle failed, heart already superseded");
        }
        self.view()
    }

    /// Aligns the heart with the server's record of whether this visitor liked the page.
    ///
    /// No network call is made. Returns `false` if a session status was already applied.
    pub fn apply_session_status(&self, has_liked_before: bool) -> bool {
        if self.session_applied.swap(true, Ordering::SeqCst) {
            warn!("like session status already applied, ignoring");
            return false;
        }
        let changed = self.view.send_if_modified(|view| {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            self.confirmed.store(has_liked_before, Ordering::SeqCst);
            if view.liked == has_liked_before {
                return false;
            }
            view.liked = has_liked_before;
            true
        });
        if changed {
            info!(liked = has_liked_before, "heart corrected from session");
        }
        true
    }
}
