pub mod api;
pub mod app;
pub mod config;
pub mod contact;
pub mod counters;
pub mod errors;
pub mod handlers;
pub mod likes;
pub mod models;
pub mod page;
pub mod poller;
pub mod recaptcha;
pub mod reconciler;
pub mod session;
pub mod state;
pub mod storage;
pub mod visitor;

pub use api::{CounterApi, HttpCounterApi};
pub use app::router;
pub use config::{ClientConfig, ServerConfig};
pub use page::Page;
pub use state::AppState;
pub use storage::load_data;
