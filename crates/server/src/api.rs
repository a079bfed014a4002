//! JSON API used by the web client and the admin tool.
//!
//! Catalog administration is gated by the shared credential, passed as the `credential`
//! query parameter (reads and deletes), a multipart field (uploads) or a JSON field
//! (tag updates). Failures are rendered as `{"error": message}` with the status decided by
//! [`InterfaceError`].

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;
use zarigani_agent::{ChatReply, ReplyChannel, ReplyOrchestrator};
use zarigani_core::errors::{CatalogError, InterfaceError, ValidationError};
use zarigani_core::ImageId;
use zarigani_db::{CatalogMutations, UploadedImage};

pub const GREETING: &str = "なな子プロジェクト ザリガニねこシミュレーター";
pub const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct ApiState {
    pub mutations: Arc<CatalogMutations>,
    pub orchestrator: Arc<ReplyOrchestrator>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api", get(greeting))
        .route("/api/chat", post(chat))
        .route("/api/image/get-file-names", get(file_names))
        .route("/api/images", get(list_images).post(upload_image))
        .route("/api/images/{id}", get(get_image).patch(update_image).delete(delete_image))
        .with_state(state)
}

#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl ApiError {
    fn catalog(error: CatalogError, correlation_id: &str) -> Self {
        if matches!(
            error,
            CatalogError::Io { .. } | CatalogError::Parse { .. } | CatalogError::Serialize(_)
        ) {
            error!(
                event_name = "api.catalog.failed",
                correlation_id,
                error = %error,
                "catalog operation failed"
            );
        }
        Self(error.into_interface(correlation_id))
    }

    fn bad_request(message: impl Into<String>, correlation_id: &str) -> Self {
        Self(InterfaceError::BadRequest {
            message: message.into(),
            correlation_id: correlation_id.to_owned(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = self.0.user_message();
        if status.is_client_error() {
            warn!(
                event_name = "api.request.rejected",
                correlation_id = self.0.correlation_id(),
                status = status.as_u16(),
                reason = %message,
                "request rejected"
            );
        }

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        if let Ok(value) = HeaderValue::from_str(self.0.correlation_id()) {
            response.headers_mut().insert(CORRELATION_HEADER, value);
        }
        response
    }
}

fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

fn parse_image_id(raw: &str) -> Result<ImageId, CatalogError> {
    raw.trim()
        .parse::<u64>()
        .map(ImageId)
        .map_err(|_| ValidationError::InvalidImageId(raw.to_owned()).into())
}

async fn greeting() -> &'static str {
    GREETING
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    input_text: String,
}

async fn chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> Json<ChatReply> {
    let correlation_id = new_correlation_id();
    let reply = state.orchestrator.chat(ReplyChannel::Web, &request.input_text, &correlation_id).await;
    info!(
        event_name = "api.chat.answered",
        correlation_id = %correlation_id,
        generated = reply.generated,
        has_image = reply.image_file_name.is_some(),
        "chat answered"
    );
    Json(reply)
}

async fn file_names(State(state): State<ApiState>) -> Result<Json<Vec<String>>, ApiError> {
    let correlation_id = new_correlation_id();
    state
        .mutations
        .repository()
        .list_file_names()
        .await
        .map(Json)
        .map_err(|error| ApiError::catalog(error, &correlation_id))
}

#[derive(Debug, Default, Deserialize)]
struct CredentialQuery {
    #[serde(default)]
    credential: String,
}

async fn list_images(
    State(state): State<ApiState>,
    Query(query): Query<CredentialQuery>,
) -> Result<Json<Value>, ApiError> {
    let correlation_id = new_correlation_id();
    let catalog = state
        .mutations
        .list(&query.credential)
        .await
        .map_err(|error| ApiError::catalog(error, &correlation_id))?;
    Ok(Json(json!({ "results": &*catalog })))
}

async fn get_image(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<CredentialQuery>,
) -> Result<Json<Value>, ApiError> {
    let correlation_id = new_correlation_id();
    let fail = |error| ApiError::catalog(error, &correlation_id);

    state.mutations.authorize(&query.credential).map_err(fail)?;
    let id = parse_image_id(&id).map_err(fail)?;
    let record = state.mutations.get(&query.credential, id).await.map_err(fail)?;
    Ok(Json(json!({ "result": record })))
}

#[derive(Debug, Default)]
struct UploadForm {
    credential: String,
    tags: Vec<String>,
    file: Option<UploadedImage>,
}

async fn read_upload_form(multipart: &mut Multipart) -> Result<UploadForm, MultipartError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "file" => {
                let content_type =
                    field.content_type().unwrap_or("application/octet-stream").to_owned();
                let bytes = field.bytes().await?;
                form.file = Some(UploadedImage { content_type, bytes: bytes.to_vec() });
            }
            "credential" => form.credential = field.text().await?,
            "tags" | "tags[]" => form.tags.push(field.text().await?),
            _ => {}
        }
    }
    Ok(form)
}

async fn upload_image(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let correlation_id = new_correlation_id();
    let form = read_upload_form(&mut multipart)
        .await
        .map_err(|error| ApiError::bad_request(error.body_text(), &correlation_id))?;

    state
        .mutations
        .authorize(&form.credential)
        .map_err(|error| ApiError::catalog(error, &correlation_id))?;
    let image = form
        .file
        .ok_or_else(|| ApiError::bad_request("the `file` field is required", &correlation_id))?;

    let record = state
        .mutations
        .upload(&form.credential, image, form.tags, Utc::now())
        .await
        .map_err(|error| ApiError::catalog(error, &correlation_id))?;

    info!(
        event_name = "api.images.uploaded",
        correlation_id = %correlation_id,
        image_id = %record.id,
        file_name = %record.file_name,
        "image uploaded"
    );
    Ok((StatusCode::CREATED, Json(json!({ "result": record }))))
}

#[derive(Debug, Deserialize)]
struct UpdateTagsRequest {
    #[serde(default)]
    credential: String,
    #[serde(default)]
    tags: Vec<String>,
}

async fn update_image(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTagsRequest>,
) -> Result<Json<Value>, ApiError> {
    let correlation_id = new_correlation_id();
    let fail = |error| ApiError::catalog(error, &correlation_id);

    state.mutations.authorize(&request.credential).map_err(fail)?;
    let id = parse_image_id(&id).map_err(fail)?;
    let record =
        state.mutations.update_tags(&request.credential, id, request.tags).await.map_err(fail)?;

    info!(
        event_name = "api.images.updated",
        correlation_id = %correlation_id,
        image_id = %record.id,
        "image tags updated"
    );
    Ok(Json(json!({ "result": record })))
}

async fn delete_image(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<CredentialQuery>,
) -> Result<Json<Value>, ApiError> {
    let correlation_id = new_correlation_id();
    let fail = |error| ApiError::catalog(error, &correlation_id);

    state.mutations.authorize(&query.credential).map_err(fail)?;
    let id = parse_image_id(&id).map_err(fail)?;
    let record = state.mutations.remove(&query.credential, id).await.map_err(fail)?;

    info!(
        event_name = "api.images.deleted",
        correlation_id = %correlation_id,
        image_id = %record.id,
        file_name = %record.file_name,
        "image deleted"
    );
    Ok(Json(json!({ "result": record })))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::GREETING;
    use crate::router;
    use crate::test_support::{TestApp, CREDENTIAL};

    const BOUNDARY: &str = "zarigani-boundary";

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.oneshot(request).await.expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, body.to_vec())
    }

    async fn send_json(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(router, request).await;
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn multipart_upload(credential: &str, tags: &[&str], file: Option<(&str, &[u8])>) -> Request<Body> {
        let mut body = Vec::new();
        let mut text_field = |name: &str, value: &str| {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        };
        text_field("credential", credential);
        for tag in tags {
            text_field("tags", tag);
        }
        if let Some((content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/images")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .expect("request")
    }

    #[tokio::test]
    async fn greeting_is_plain_text() {
        let app = TestApp::new(None);

        let (status, body) = send(router::build(&app.app), get("/api")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).expect("utf8"), GREETING);
    }

    #[tokio::test]
    async fn chat_returns_reply_and_catalog_image() {
        let app = TestApp::new(Some("喜\n今日は良い日"));

        let (status, body) = send_json(
            router::build(&app.app),
            json_request(Method::POST, "/api/chat", json!({ "input_text": "こんにちは" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["output_text"], "今日は良い日");
        assert_eq!(body["image_file_name"], "2024-01-01-09-00-00.png");
    }

    #[tokio::test]
    async fn chat_apologises_when_generator_fails() {
        let app = TestApp::new(None);

        let (status, body) = send_json(
            router::build(&app.app),
            json_request(Method::POST, "/api/chat", json!({ "input_text": "こんにちは" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["output_text"], zarigani_agent::reply::APOLOGY_TEXT);
        assert!(body["image_file_name"].is_string());
    }

    #[tokio::test]
    async fn file_names_are_public() {
        let app = TestApp::new(None);

        let (status, body) =
            send_json(router::build(&app.app), get("/api/image/get-file-names")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["2024-01-01-09-00-00.png", "2024-01-02-09-00-00.jpg"]));
    }

    #[tokio::test]
    async fn listing_requires_the_credential() {
        let app = TestApp::new(None);

        let (denied, error) =
            send_json(router::build(&app.app), get("/api/images?credential=nope")).await;
        let (missing, _) = send_json(router::build(&app.app), get("/api/images")).await;
        let (status, body) = send_json(
            router::build(&app.app),
            get(&format!("/api/images?credential={CREDENTIAL}")),
        )
        .await;

        assert_eq!(denied, StatusCode::UNAUTHORIZED);
        assert_eq!(error, json!({ "error": "Invalid Credential" }));
        assert_eq!(missing, StatusCode::UNAUTHORIZED);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn single_image_lookup_maps_missing_and_malformed_ids() {
        let app = TestApp::new(None);

        let (found, body) = send_json(
            router::build(&app.app),
            get(&format!("/api/images/2?credential={CREDENTIAL}")),
        )
        .await;
        let (missing, _) = send_json(
            router::build(&app.app),
            get(&format!("/api/images/99?credential={CREDENTIAL}")),
        )
        .await;
        let (malformed, _) = send_json(
            router::build(&app.app),
            get(&format!("/api/images/abc?credential={CREDENTIAL}")),
        )
        .await;

        assert_eq!(found, StatusCode::OK);
        assert_eq!(body["result"]["tags"], json!(["play"]));
        assert_eq!(missing, StatusCode::NOT_FOUND);
        assert_eq!(malformed, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_stores_image_and_record() {
        let app = TestApp::new(None);

        let (status, body) = send_json(
            router::build(&app.app),
            multipart_upload(CREDENTIAL, &["哀", "rain"], Some(("image/gif", b"GIF89a"))),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["result"]["id"], 3);
        assert_eq!(body["result"]["tags"], json!(["哀", "rain"]));
        let file_name = body["result"]["file_name"].as_str().expect("file name");
        assert!(file_name.ends_with(".gif"));
        assert!(app.dir.path().join("images").join(file_name).is_file());
    }

    #[tokio::test]
    async fn upload_validation_failures_are_bad_requests() {
        let app = TestApp::new(None);

        let (denied, _) = send_json(
            router::build(&app.app),
            multipart_upload("nope", &["x"], Some(("image/png", b"png"))),
        )
        .await;
        let (no_tags, _) = send_json(
            router::build(&app.app),
            multipart_upload(CREDENTIAL, &[], Some(("image/png", b"png"))),
        )
        .await;
        let (bad_type, body) = send_json(
            router::build(&app.app),
            multipart_upload(CREDENTIAL, &["x"], Some(("text/plain", b"hello"))),
        )
        .await;
        let (no_file, _) =
            send_json(router::build(&app.app), multipart_upload(CREDENTIAL, &["x"], None)).await;

        assert_eq!(denied, StatusCode::UNAUTHORIZED);
        assert_eq!(no_tags, StatusCode::BAD_REQUEST);
        assert_eq!(bad_type, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().expect("message").contains("text/plain"));
        assert_eq!(no_file, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patch_replaces_tags() {
        let app = TestApp::new(None);

        let (status, body) = send_json(
            router::build(&app.app),
            json_request(
                Method::PATCH,
                "/api/images/1",
                json!({ "credential": CREDENTIAL, "tags": ["楽", "sun"] }),
            ),
        )
        .await;
        let (blank, _) = send_json(
            router::build(&app.app),
            json_request(
                Method::PATCH,
                "/api/images/1",
                json!({ "credential": CREDENTIAL, "tags": [" "] }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["tags"], json!(["楽", "sun"]));
        assert_eq!(blank, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_removes_record_and_file() {
        let app = TestApp::new(None);
        let image_path = app.dir.path().join("images/2024-01-02-09-00-00.jpg");

        let delete = Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/images/2?credential={CREDENTIAL}"))
            .body(Body::empty())
            .expect("request");
        let (status, body) = send_json(router::build(&app.app), delete).await;
        let (_, names) = send_json(router::build(&app.app), get("/api/image/get-file-names")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["id"], 2);
        assert!(!image_path.exists());
        assert_eq!(names, json!(["2024-01-01-09-00-00.png"]));
    }

    #[tokio::test]
    async fn error_responses_carry_a_correlation_id() {
        let app = TestApp::new(None);

        let response = router::build(&app.app)
            .oneshot(get("/api/images/5"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(super::CORRELATION_HEADER));
    }
}
