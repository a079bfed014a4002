use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use zarigani_db::CatalogStore;

#[derive(Clone)]
pub struct HealthState {
    pub store: Arc<CatalogStore>,
    pub images_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub loaded: bool,
    pub age_secs: Option<u64>,
    pub ttl_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub images: HealthCheck,
    pub cache: CacheStatus,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = catalog_check(&state.store).await;
    let images = images_check(&state.images_dir).await;
    let ready = catalog.status == "ready" && images.status == "ready";

    let cached_at = state.store.cached_at().await;
    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "zarigani-server runtime initialized".to_string(),
        },
        catalog,
        images,
        cache: CacheStatus {
            loaded: cached_at.is_some(),
            age_secs: cached_at.map(|loaded_at| loaded_at.elapsed().as_secs()),
            ttl_secs: state.store.ttl().as_secs(),
        },
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn catalog_check(store: &CatalogStore) -> HealthCheck {
    match store.load_catalog(false).await {
        Ok(catalog) => HealthCheck {
            status: "ready",
            detail: format!("{} images in catalog", catalog.len()),
        },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("catalog load failed: {error}") }
        }
    }
}

async fn images_check(images_dir: &std::path::Path) -> HealthCheck {
    match tokio::fs::metadata(images_dir).await {
        Ok(metadata) if metadata.is_dir() => {
            HealthCheck { status: "ready", detail: "image directory present".to_string() }
        }
        Ok(_) => HealthCheck {
            status: "degraded",
            detail: format!("`{}` is not a directory", images_dir.display()),
        },
        Err(error) => HealthCheck {
            status: "degraded",
            detail: format!("image directory unavailable: {error}"),
        },
    }
}
