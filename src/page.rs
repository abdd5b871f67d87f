use crate::api::CounterApi;
use crate::contact::ContactForm;
use crate::likes::LikeWidget;
use crate::poller::PollHandle;
use crate::reconciler::{SessionOutcome, reconcile};
use crate::visitor::VisitorWidget;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// One page load: the counter widgets, their pollers and the session reconciliation.
///
/// Dropping the page stops the pollers and abandons a pending reconciliation.
pub struct Page<A: CounterApi> {
    visitor: Arc<VisitorWidget<A>>,
    likes: Arc<LikeWidget<A>>,
    contact: ContactForm<A>,
    pollers: Vec<PollHandle>,
    session: Option<JoinHandle<SessionOutcome>>,
}

impl<A: CounterApi> Page<A> {
    /// Renders the widgets in their provisional state, starts both pollers, then fetches the
    /// session status in the background. Must be called inside a Tokio runtime.
    pub fn mount(api: Arc<A>, poll_interval: Duration) -> Self {
        let visitor = Arc::new(VisitorWidget::new(Arc::clone(&api)));
        let likes = Arc::new(LikeWidget::new(Arc::clone(&api)));
        let contact = ContactForm::new(Arc::clone(&api));

        let pollers = vec![
            PollHandle::spawn("visitor-count", poll_interval, {
                let visitor = Arc::clone(&visitor);
                move || {
                    let visitor = Arc::clone(&visitor);
                    async move {
                        visitor.refresh().await;
                    }
                }
            }),
            PollHandle::spawn("like-count", poll_interval, {
                let likes = Arc::clone(&likes);
                move || {
                    let likes = Arc::clone(&likes);
                    async move {
                        likes.refresh().await;
                    }
                }
            }),
        ];

        let session = tokio::spawn({
            let visitor = Arc::clone(&visitor);
            let likes = Arc::clone(&likes);
            async move { reconcile(api.as_ref(), &visitor, &likes).await }
        });

        info!(?poll_interval, "page mounted");
        Self {
            visitor,
            likes,
            contact,
            pollers,
            session: Some(session),
        }
    }

    pub fn visitor(&self) -> &Arc<VisitorWidget<A>> {
        &self.visitor
    }

    pub fn likes(&self) -> &Arc<LikeWidget<A>> {
        &self.likes
    }

    pub fn contact(&self) -> &ContactForm<A> {
        &self.contact
    }

    /// Waits for the session reconciliation. Yields the outcome once; later calls return `None`.
    pub async fn session_settled(&mut self) -> Option<SessionOutcome> {
        let handle = self.session.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                error!("session reconciliation did not finish: {err}");
                None
            }
        }
    }

    pub fn unmount(mut self) {
        for poller in &self.pollers {
            poller.cancel();
        }
        if let Some(session) = self.session.take() {
            session.abort();
        }
        info!("page unmounted");
    }
}

impl<A: CounterApi> Drop for Page<A> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.abort();
        }
    }
}
