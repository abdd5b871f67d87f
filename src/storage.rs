use crate::errors::AppError;
use crate::models::SiteData;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

pub async fn load_data(path: &Path) -> SiteData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<SiteData>(&bytes) {
            Ok(data) => {
                info!(
                    visitors = data.visitors,
                    likes = data.likes,
                    sessions = data.sessions.len(),
                    "loaded site data"
                );
                data
            }
            Err(err) => {
                error!("failed to parse data file: {err}");
                SiteData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => SiteData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            SiteData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &SiteData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(|err| {
        error!("failed to write data file: {err}");
        AppError::internal(err)
    })?;
    Ok(())
}
