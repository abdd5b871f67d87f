//! Mounts the resume page's counter widgets against a running API and logs what they display.

use resume_site::{ClientConfig, HttpCounterApi, Page};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = ClientConfig::from_env()?;
    let api = Arc::new(HttpCounterApi::new(&config.base_url)?);
    info!(base_url = api.base_url(), "mounting page");

    let mut page = Page::mount(api, config.poll_interval);
    let mut visitors = page.visitor().subscribe();
    let mut likes = page.likes().subscribe();

    if let Some(outcome) = page.session_settled().await {
        info!(?outcome, "session reconciled");
    }

    loop {
        tokio::select! {
            changed = visitors.changed() => {
                if changed.is_err() {
                    break;
                }
                let value = *visitors.borrow_and_update();
                info!(visitors = %value, "visitor board updated");
            }
            changed = likes.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = *likes.borrow_and_update();
                let heart = view.heart();
                info!(
                    likes = %view.count,
                    fill = heart.fill(),
                    stroke = heart.stroke(),
                    "like board updated"
                );
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    warn!("failed to listen for shutdown signal: {err}");
                }
                break;
            }
        }
    }

    page.unmount();
    Ok(())
}
