use std::sync::Arc;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tera::{Context, Tera};
use tracing::{error, info, warn};
use uuid::Uuid;
use zarigani_slack::events::parse_event_payload;
use zarigani_slack::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use zarigani_slack::{
    verify_signature, EventContext, EventDispatcher, SignatureError, SlackEnvelope, SlackEvent,
    SlashCommandPayload,
};

pub const RETRY_NUM_HEADER: &str = "x-slack-retry-num";
pub const PAGE_TITLE: &str = "ザリガニねこシミュレーター";

const MAX_SLACK_BODY_BYTES: usize = 1024 * 1024;
const LANDING_TEMPLATE: &str = "slack/index.html";

#[derive(Clone)]
pub struct SlackState {
    pub signing_secret: Arc<SecretString>,
    pub dispatcher: Arc<EventDispatcher>,
}

impl SlackState {
    pub fn new(signing_secret: SecretString, dispatcher: EventDispatcher) -> Self {
        Self { signing_secret: Arc::new(signing_secret), dispatcher: Arc::new(dispatcher) }
    }
}

/// Events API and `/zc` endpoints. Every request must carry a valid Slack signature.
pub fn router(state: SlackState) -> Router {
    Router::new()
        .route("/slack/events", post(events))
        .route("/slack/zc", post(slash_command))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_signature))
        .with_state(state)
}

async fn require_signature(
    State(state): State<SlackState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_SLACK_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(
                event_name = "slack.request.unreadable",
                error = %error,
                "slack request body could not be read"
            );
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    if let Err(error) = check_signature(&state, &parts.headers, &bytes) {
        warn!(
            event_name = "slack.request.signature_rejected",
            path = %parts.uri.path(),
            error = %error,
            "slack request signature rejected"
        );
        return StatusCode::UNAUTHORIZED.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn check_signature(
    state: &SlackState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), SignatureError> {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
    let timestamp = header(TIMESTAMP_HEADER).ok_or(SignatureError::Malformed)?;
    let signature = header(SIGNATURE_HEADER).ok_or(SignatureError::Malformed)?;
    verify_signature(
        state.signing_secret.expose_secret(),
        timestamp,
        body,
        signature,
        Utc::now().timestamp(),
    )
}

async fn events(State(state): State<SlackState>, headers: HeaderMap, body: Bytes) -> Response {
    let envelope = match parse_event_payload(&body) {
        Ok(envelope) => envelope,
        Err(error) => {
            warn!(event_name = "slack.event.unparsable", error = %error, "bad slack event payload");
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": error.to_string() })))
                .into_response();
        }
    };

    if let SlackEvent::UrlVerification { challenge } = &envelope.event {
        info!(event_name = "slack.url_verification", "answering slack url verification");
        return Json(json!({ "challenge": challenge })).into_response();
    }

    if let Some(retry) = headers.get(RETRY_NUM_HEADER) {
        info!(
            event_name = "slack.event.retry_ignored",
            envelope_id = %envelope.envelope_id,
            retry_num = ?retry,
            "ignoring slack retry delivery"
        );
        return StatusCode::OK.into_response();
    }

    spawn_dispatch(Arc::clone(&state.dispatcher), envelope);
    StatusCode::OK.into_response()
}

async fn slash_command(
    State(state): State<SlackState>,
    Form(payload): Form<SlashCommandPayload>,
) -> StatusCode {
    let envelope = SlackEnvelope {
        envelope_id: payload.trigger_id.clone(),
        event: SlackEvent::SlashCommand(payload),
    };
    spawn_dispatch(Arc::clone(&state.dispatcher), envelope);
    StatusCode::OK
}

/// Slack expects an acknowledgement within three seconds, so replies are produced after
/// the response has been sent.
fn spawn_dispatch(dispatcher: Arc<EventDispatcher>, envelope: SlackEnvelope) {
    let ctx = EventContext { correlation_id: Uuid::new_v4().to_string() };
    tokio::spawn(async move {
        if let Err(error) = dispatcher.dispatch(&envelope, &ctx).await {
            error!(
                event_name = "slack.dispatch.failed",
                correlation_id = %ctx.correlation_id,
                envelope_id = %envelope.envelope_id,
                error = %error,
                "slack event could not be answered"
            );
        }
    });
}

#[derive(Clone)]
pub struct LandingPage {
    templates: Arc<Tera>,
    app_id: Option<String>,
    install_url: Option<String>,
}

impl LandingPage {
    pub fn new(app_id: Option<String>, install_url: Option<String>) -> Self {
        Self { templates: init_templates(), app_id, install_url }
    }
}

fn init_templates() -> Arc<Tera> {
    let mut tera = Tera::default();
    if let Err(error) =
        tera.add_raw_template(LANDING_TEMPLATE, include_str!("../../../templates/slack/index.html"))
    {
        warn!(error = %error, "failed to register slack landing template");
    }
    Arc::new(tera)
}

pub fn landing_router(page: LandingPage) -> Router {
    Router::new().route("/slack", get(landing)).with_state(page)
}

async fn landing(
    State(page): State<LandingPage>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let mut context = Context::new();
    context.insert("title", PAGE_TITLE);
    context.insert("app_id", &page.app_id);
    context.insert("install_url", &page.install_url);

    page.templates.render(LANDING_TEMPLATE, &context).map(Html).map_err(|error| {
        error!(event_name = "slack.landing.render_failed", error = ?error, "landing page render failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Html("<h1>Template Error</h1>".to_owned()))
    })
}
