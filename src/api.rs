use crate::errors::ApiError;
use crate::models::{ContactRequest, CountResponse, CounterValue, SessionEnvelope, SessionStatus};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::{debug, warn};

/// The remote counter API as the page widgets see it.
///
/// Count operations never fail: any transport, status or decoding problem is reported as
/// [`CounterValue::Error`] because the result only ever feeds display text. The session and
/// contact calls hand their errors back so the caller can pick a fallback.
pub trait CounterApi: Send + Sync + 'static {
    fn fetch_visitor_count(&self) -> impl Future<Output = CounterValue> + Send;

    /// Counts the caller as a visitor. Invoke at most once per visitor; the reconciler enforces it.
    fn increment_visitor_count(&self) -> impl Future<Output = CounterValue> + Send;

    fn fetch_like_count(&self) -> impl Future<Output = CounterValue> + Send;

    /// Flips the caller's like and returns the new aggregate.
    fn toggle_like(&self) -> impl Future<Output = CounterValue> + Send;

    fn fetch_session_status(&self) -> impl Future<Output = Result<SessionStatus, ApiError>> + Send;

    fn send_contact(
        &self,
        request: &ContactRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// [`CounterApi`] over HTTP. The client keeps a cookie store so the server's session cookie
/// travels with every request.
#[derive(Debug, Clone)]
pub struct HttpCounterApi {
    client: Client,
    base_url: String,
}

impl HttpCounterApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn request_json<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T, ApiError> {
        let response = self.client.request(method, self.url(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn count(&self, method: Method, path: &str) -> CounterValue {
        match self.request_json::<CountResponse>(method, path).await {
            Ok(response) => {
                debug!(path, count = response.count, "counter fetched");
                CounterValue::Count(response.count)
            }
            Err(err) => {
                warn!(path, "counter request failed: {err}");
                CounterValue::Error
            }
        }
    }
}

impl CounterApi for HttpCounterApi {
    async fn fetch_visitor_count(&self) -> CounterValue {
        self.count(Method::GET, "/getVisitorCount").await
    }

    async fn increment_visitor_count(&self) -> CounterValue {
        self.count(Method::POST, "/incrementVisitorCount").await
    }

    async fn fetch_like_count(&self) -> CounterValue {
        self.count(Method::GET, "/getLikeCount").await
    }

    async fn toggle_like(&self) -> CounterValue {
        self.count(Method::POST, "/toggleLike").await
    }

    async fn fetch_session_status(&self) -> Result<SessionStatus, ApiError> {
        let envelope: SessionEnvelope = self.request_json(Method::GET, "/session").await?;
        Ok(envelope.into())
    }

    async fn send_contact(&self, request: &ContactRequest) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/contact"))
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// In-memory stand-in for the counter API that behaves like a single-session server and
    /// records how often each operation was called.
    ///
    /// With `hold_likes` set, like fetches and toggles stay in flight until `release` is
    /// notified once per held call.
    #[derive(Default)]
    pub struct MockApi {
        state: Mutex<MockState>,
        pub hold_likes: AtomicBool,
        pub release: Notify,
        pub fail_counts: AtomicBool,
        pub fail_toggle: AtomicBool,
        pub fail_session: AtomicBool,
        pub fail_contact: AtomicBool,
        pub visitor_fetches: AtomicUsize,
        pub increments: AtomicUsize,
        pub like_fetches: AtomicUsize,
        pub toggles: AtomicUsize,
        pub session_fetches: AtomicUsize,
        pub contacts: AtomicUsize,
    }

    #[derive(Default)]
    struct MockState {
        visitors: u64,
        likes: u64,
        session: SessionStatus,
    }

    impl MockApi {
        pub fn new(visitors: u64, likes: u64, session: SessionStatus) -> Self {
            let api = Self::default();
            {
                let mut state = api.state.lock().unwrap();
                state.visitors = visitors;
                state.likes = likes;
                state.session = session;
            }
            api
        }

        pub fn likes(&self) -> u64 {
            self.state.lock().unwrap().likes
        }

        pub fn has_liked(&self) -> bool {
            self.state.lock().unwrap().session.has_liked
        }

        async fn held(&self) {
            if self.hold_likes.load(Ordering::SeqCst) {
                self.release.notified().await;
            }
        }
    }

    impl CounterApi for MockApi {
        async fn fetch_visitor_count(&self) -> CounterValue {
            self.visitor_fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_counts.load(Ordering::SeqCst) {
                return CounterValue::Error;
            }
            CounterValue::Count(self.state.lock().unwrap().visitors)
        }

        async fn increment_visitor_count(&self) -> CounterValue {
            self.increments.fetch_add(1, Ordering::SeqCst);
            if self.fail_counts.load(Ordering::SeqCst) {
                return CounterValue::Error;
            }
            let mut state = self.state.lock().unwrap();
            if !state.session.has_visited {
                state.visitors += 1;
                state.session.has_visited = true;
            }
            CounterValue::Count(state.visitors)
        }

        async fn fetch_like_count(&self) -> CounterValue {
            self.like_fetches.fetch_add(1, Ordering::SeqCst);
            self.held().await;
            if self.fail_counts.load(Ordering::SeqCst) {
                return CounterValue::Error;
            }
            CounterValue::Count(self.state.lock().unwrap().likes)
        }

        async fn toggle_like(&self) -> CounterValue {
            self.toggles.fetch_add(1, Ordering::SeqCst);
            self.held().await;
            if self.fail_toggle.load(Ordering::SeqCst) {
                return CounterValue::Error;
            }
            let mut state = self.state.lock().unwrap();
            if state.session.has_liked {
                state.likes = state.likes.saturating_sub(1);
            } else {
                state.likes += 1;
            }
            state.session.has_liked = !state.session.has_liked;
            CounterValue::Count(state.likes)
        }

        async fn fetch_session_status(&self) -> Result<SessionStatus, ApiError> {
            self.session_fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_session.load(Ordering::SeqCst) {
                let err = serde_json::from_str::<SessionStatus>("{}").unwrap_err();
                return Err(ApiError::Decode(err));
            }
            Ok(self.state.lock().unwrap().session)
        }

        async fn send_contact(&self, _request: &ContactRequest) -> Result<(), ApiError> {
            self.contacts.fetch_add(1, Ordering::SeqCst);
            if self.fail_contact.load(Ordering::SeqCst) {
                return Err(ApiError::Status(reqwest::StatusCode::BAD_REQUEST));
            }
            Ok(())
        }
    }
}
