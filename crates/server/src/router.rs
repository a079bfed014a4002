use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, request::Parts, HeaderName, HeaderValue, Method},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::api::{self, ApiState};
use crate::bootstrap::Application;
use crate::health::{self, HealthState};
use crate::slack::{self, LandingPage};

/// Room for the multipart framing and text fields around an upload at the size limit.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

pub fn build(app: &Application) -> Router {
    let server = &app.config.server;
    let catalog = &app.config.catalog;

    let mut router = Router::new()
        .merge(api::router(ApiState {
            mutations: Arc::clone(&app.mutations),
            orchestrator: Arc::clone(&app.orchestrator),
        }))
        .merge(health::router(HealthState {
            store: Arc::clone(&app.store),
            images_dir: catalog.images_dir.clone(),
        }))
        .merge(slack::landing_router(LandingPage::new(
            app.config.slack.app_id.clone(),
            app.config.slack.install_url.clone(),
        )));

    if let Some(state) = &app.slack {
        router = router.merge(slack::router(state.clone()));
    }

    router = router.nest_service("/public/images", ServeDir::new(&catalog.images_dir));
    if let Some(static_dir) = &server.static_dir {
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    let body_limit = catalog.max_file_size_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(usize::try_from(body_limit).unwrap_or(usize::MAX)))
        .layer(cors_layer(&server.allowed_origin_hosts))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_hosts: &[String]) -> CorsLayer {
    let allowed_hosts = allowed_hosts.to_vec();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _: &Parts| {
            origin.to_str().ok().and_then(origin_host).is_some_and(|host| {
                allowed_hosts.iter().any(|allowed| allowed.eq_ignore_ascii_case(host))
            })
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
            Method::HEAD,
        ])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Host part of an `Origin` header value such as `http://localhost:4200`.
fn origin_host(origin: &str) -> Option<&str> {
    let rest = origin.split_once("://").map_or(origin, |(_, rest)| rest);
    let host = match rest.strip_prefix('[') {
        Some(bracketed) => bracketed.split(']').next()?,
        None => rest.split([':', '/']).next()?,
    };
    (!host.is_empty()).then_some(host)
}
