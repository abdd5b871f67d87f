use crate::api::CounterApi;
use crate::models::ContactRequest;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// The status line under the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContactStatus {
    #[default]
    Idle,
    Sending,
    Sent,
    Failed,
    Invalid(&'static str),
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactStatus::Idle => Ok(()),
            ContactStatus::Sending => f.write_str("Sending..."),
            ContactStatus::Sent => f.write_str("Sent!"),
            ContactStatus::Failed => f.write_str("Error sending message."),
            ContactStatus::Invalid(reason) => write!(f, "Please check the form: {reason}."),
        }
    }
}

pub struct ContactForm<A> {
    api: Arc<A>,
    status: watch::Sender<ContactStatus>,
}

impl<A: CounterApi> ContactForm<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (status, _) = watch::channel(ContactStatus::Idle);
        Self { api, status }
    }

    pub fn status(&self) -> ContactStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ContactStatus> {
        self.status.subscribe()
    }

    /// Sends the message once. There is no retry; the status line reports the result.
    pub async fn submit(&self, request: &ContactRequest) -> ContactStatus {
        if let Err(reason) = request.validate() {
            self.status.send_replace(ContactStatus::Invalid(reason));
            return ContactStatus::Invalid(reason);
        }

        self.status.send_replace(ContactStatus::Sending);
        let status = match self.api.send_contact(request).await {
            Ok(()) => {
                info!(email = %request.email, "contact message sent");
                ContactStatus::Sent
            }
            Err(err) => {
                warn!("contact message failed: {err}");
                ContactStatus::Failed
            }
        };
        self.status.send_replace(status.clone());
        status
    }

    /// Clears the status line, as closing the form does.
    pub fn reset(&self) {
        self.status.send_replace(ContactStatus::Idle);
    }
}
