//! `POST /classify-country`: multipart image upload in, classification out.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use futures::FutureExt;
use tracing::info;

use geoclass_core::ClassificationResponse;
use geoclass_media::{too_large_message, validate_upload, NO_FILE_MESSAGE};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

struct Upload {
    data: Bytes,
    content_type: Option<String>,
    file_name: Option<String>,
}

/// Validation failures are 400s and never reach the pipeline. Once the
/// pipeline runs, its outcome is always a 200 unless a stage panics.
/// The pipeline runs inside this future, so a client abort cancels both
/// upstream calls.
pub async fn classify_country(
    State(state): State<GatewayState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ClassificationResponse>, ApiError> {
    let Ok(mut multipart) = multipart else {
        return Err(ApiError::BadRequest(NO_FILE_MESSAGE.into()));
    };

    let upload = read_file_field(&mut multipart, state.max_upload_bytes)
        .await?
        .ok_or_else(|| ApiError::BadRequest(NO_FILE_MESSAGE.into()))?;

    let image = validate_upload(
        upload.data,
        upload.content_type.as_deref(),
        upload.file_name.as_deref(),
        state.max_upload_bytes,
    )?;

    info!(
        file = image.file_name.as_deref().unwrap_or("-"),
        mime = %image.mime_type,
        bytes = image.data.len(),
        "Classifying upload"
    );

    // A panic inside a stage becomes a 500, not a dropped connection.
    let response = AssertUnwindSafe(state.pipeline.classify(&image))
        .catch_unwind()
        .await
        .map_err(|panic| ApiError::Internal(panic_message(panic.as_ref())))?;

    Ok(Json(response))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str));
    match detail {
        Some(detail) => format!("pipeline panicked: {detail}"),
        None => "pipeline panicked".to_string(),
    }
}

/// First field named `file`; other fields are skipped.
async fn read_file_field(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<Option<Upload>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.map_err(|e| multipart_error(e, max_bytes))?;
        return Ok(Some(Upload {
            data,
            content_type,
            file_name,
        }));
    }
    Ok(None)
}

/// Bodies past the router limit surface here; report them like any oversized file.
fn multipart_error(err: MultipartError, max_bytes: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::BadRequest(too_large_message(max_bytes))
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{build_router, CredentialStatus};

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::Result as AnyResult;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request},
        Router,
    };
    use geoclass_core::{DescriptionService, ImageInput};
    use geoclass_media::{MAX_UPLOAD_BYTES, NOT_IMAGE_MESSAGE, TOO_LARGE_MESSAGE};
    use geoclass_pipeline::ClassificationPipeline;
    use geoclass_reasoning::{MockDescriber, MockReasoner};
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "geoclass-test-boundary";
    const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

    fn app_with(describer: impl DescriptionService + 'static, reply: &str) -> Router {
        let pipeline =
            ClassificationPipeline::new(Arc::new(describer), Arc::new(MockReasoner::new(reply)));
        build_router(GatewayState::new(pipeline, CredentialStatus::default()))
    }

    fn app() -> Router {
        app_with(
            MockDescriber::new("Red brick houses with German shop signs"),
            r#"{"predicted_country":"Germany","confidence":"high","rationale":["German signs"]}"#,
        )
    }

    fn jpeg(len: usize) -> Vec<u8> {
        let mut data = vec![0u8; len.max(JPEG_MAGIC.len())];
        data[..JPEG_MAGIC.len()].copy_from_slice(&JPEG_MAGIC);
        data
    }

    fn multipart_request(uri: &str, field: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"street.jpg\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn classifies_uploaded_image() {
        for uri in ["/classify-country/", "/classify-country"] {
            let (status, body) =
                send(app(), multipart_request(uri, "file", "image/jpeg", &jpeg(256))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["country"], "Germany");
            assert_eq!(body["confidence"], 85);
            assert_eq!(body["explanation"], "German signs");
            assert!(body["features"].as_str().unwrap().contains("Language: German"));
        }
    }

    #[tokio::test]
    async fn missing_file_field_is_400() {
        let (status, body) = send(
            app(),
            multipart_request("/classify-country/", "photo", "image/jpeg", &jpeg(16)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], NO_FILE_MESSAGE);
    }

    #[tokio::test]
    async fn non_multipart_body_is_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/classify-country/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], NO_FILE_MESSAGE);
    }

    #[tokio::test]
    async fn non_image_is_400() {
        let (status, body) = send(
            app(),
            multipart_request("/classify-country/", "file", "text/plain", b"hello"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], NOT_IMAGE_MESSAGE);
    }

    #[tokio::test]
    async fn oversized_image_is_400_without_running_pipeline() {
        // A failing describer would still yield 200; a 400 proves the pipeline never ran.
        let app = app_with(MockDescriber::failing("must not be called"), "{}");
        let (status, body) = send(
            app,
            multipart_request(
                "/classify-country/",
                "file",
                "image/jpeg",
                &jpeg(MAX_UPLOAD_BYTES + 1),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], TOO_LARGE_MESSAGE);
    }

    #[tokio::test]
    async fn body_past_router_limit_is_reported_as_too_large() {
        let (status, body) = send(
            app(),
            multipart_request(
                "/classify-country/",
                "file",
                "image/jpeg",
                &jpeg(MAX_UPLOAD_BYTES + 1024 * 1024),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], TOO_LARGE_MESSAGE);
    }

    #[tokio::test]
    async fn upstream_failures_still_return_200() {
        let app = app_with(MockDescriber::failing("model is loading"), "not json");
        let (status, body) = send(
            app,
            multipart_request("/classify-country/", "file", "image/jpeg", &jpeg(64)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["confidence"], 25);
        assert_eq!(body["features"], "Visual analysis of image features");
    }

    struct PanickingDescriber;

    #[async_trait]
    impl DescriptionService for PanickingDescriber {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn describe(&self, _image: &ImageInput) -> AnyResult<String> {
            panic!("describer bug")
        }
    }

    #[tokio::test]
    async fn pipeline_panic_is_500() {
        let app = app_with(PanickingDescriber, "{}");
        let (status, body) = send(
            app,
            multipart_request("/classify-country/", "file", "image/png", &jpeg(64)),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Classification failed");
        assert_eq!(body["details"], "pipeline panicked: describer bug");
    }

    /// Records whether `describe` was entered and whether it ran to completion.
    #[derive(Clone, Default)]
    struct SlowDescriber {
        started: Arc<AtomicBool>,
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl DescriptionService for SlowDescriber {
        fn name(&self) -> &str {
            "slow"
        }

        async fn describe(&self, _image: &ImageInput) -> AnyResult<String> {
            self.started.store(true, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok("Red brick houses with German shop signs".into())
        }
    }

    #[tokio::test]
    async fn client_abort_cancels_pipeline() {
        let describer = SlowDescriber::default();
        let app = app_with(describer.clone(), "{}");
        let request = multipart_request("/classify-country/", "file", "image/jpeg", &jpeg(64));

        // Dropping the in-flight response future is what axum does when the client goes away.
        let outcome = tokio::time::timeout(Duration::from_millis(50), app.oneshot(request)).await;
        assert!(outcome.is_err(), "request should still be in flight");
        assert!(describer.started.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!describer.finished.load(Ordering::SeqCst));
    }
}
