//! HTTP Server
//!
//! `POST /analyze` takes a multipart upload (field `file`) and answers with an
//! [`AnalysisResult`]. `GET /health` is a liveness probe.

pub mod error;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use image::ImageFormat;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::analysis::{AnalysisRequest, AnalysisResult, Analyzer};
use crate::config::ServerConfig;
use crate::storage::TempImage;

pub use error::ApiError;

/// MIME type assumed when neither the client nor the bytes say otherwise
const DEFAULT_MIME: &str = "image/jpeg";

/// State shared by all handlers
pub struct AppState {
    pub analyzer: Analyzer,
    pub upload_dir: PathBuf,
}

/// Build the service router
pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(router: Router, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Uploaded file pulled out of the multipart body
struct Upload {
    bytes: axum::body::Bytes,
    content_type: Option<String>,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        return Ok(Upload {
            bytes,
            content_type,
        });
    }

    Err(ApiError::MissingFile)
}

/// Declared `image/*` type, else sniffed from the bytes, else JPEG
fn resolve_mime(declared: Option<&str>, bytes: &[u8]) -> String {
    if let Some(declared) = declared.filter(|m| m.starts_with("image/")) {
        return declared.to_string();
    }

    image::guess_format(bytes)
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|_| DEFAULT_MIME.to_string())
}

fn temp_extension(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .and_then(|f: ImageFormat| f.extensions_str().first().copied())
        .unwrap_or("jpg")
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    let upload = read_upload(&mut multipart).await?;
    let mime_type = resolve_mime(upload.content_type.as_deref(), &upload.bytes);
    debug!("Received upload: {} bytes, {}", upload.bytes.len(), mime_type);

    // The temp file lives until the response is built
    let upload_dir = state.upload_dir.clone();
    let bytes = upload.bytes.clone();
    let (temp, image) = tokio::task::spawn_blocking(move || {
        let temp = TempImage::write(&upload_dir, &bytes, temp_extension(&bytes))
            .map_err(ApiError::Storage)?;
        let image = temp.decode().map_err(ApiError::InvalidImage)?;
        Ok::<_, ApiError>((temp, image))
    })
    .await
    .map_err(|e| ApiError::Storage(anyhow::anyhow!("upload task failed: {}", e)))??;
    debug!("Decoded {}x{} upload from {:?}", image.width(), image.height(), temp.path());

    let result = state
        .analyzer
        .analyze(AnalysisRequest {
            image,
            bytes: upload.bytes.to_vec(),
            mime_type,
        })
        .await?;

    drop(temp);
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::pipeline::tests::{FixedDetector, ScriptedGenerator};
    use crate::vision::Detection;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use image::{DynamicImage, Rgb, RgbImage};
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "lingolensboundary";

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([200, 100, 50])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn multipart_body(field: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"upload\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn analyze_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn app(
        detections: Vec<Detection>,
        generator: ScriptedGenerator,
        upload_dir: PathBuf,
    ) -> (Router, Arc<ScriptedGenerator>) {
        let generator = Arc::new(generator);
        let analyzer = Analyzer::new(
            Arc::new(FixedDetector(vec![detections])),
            generator.clone(),
            generator.clone(),
            0.65,
        );
        let state = Arc::new(AppState {
            analyzer,
            upload_dir,
        });
        (router(state, &ServerConfig::default()), generator)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_known_object() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator {
            text_reply: Some("It wags its tail, plays fetch.".to_string()),
            ..Default::default()
        };
        let (app, _) = app(vec![Detection::new("dog", 0.9)], generator, dir.path().into());

        let response = app
            .oneshot(analyze_request(multipart_body("file", "image/png", &png_bytes())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body,
            serde_json::json!({
                "object": "dog",
                "chinese": "狗",
                "pinyin": "gǒu",
                "sentence": "It wags its tail, plays fetch.",
                "source": "YOLO+Gemini(Text)"
            })
        );

        // Upload temp file is gone
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_fallback_sends_image_type() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ScriptedGenerator {
            vision_reply: Some(
                "{\"object\":\"bicycle\",\"chinese\":\"自行车\",\"pinyin\":\"zìxíngchē\",\"sentence\":\"ride to school\"}"
                    .to_string(),
            ),
            ..Default::default()
        };
        let (app, generator) = app(vec![], generator, dir.path().into());
        let png = png_bytes();

        let response = app
            .oneshot(analyze_request(multipart_body(
                "file",
                "application/octet-stream",
                &png,
            )))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["object"], "bicycle");
        assert_eq!(body["source"], "Gemini Vision Fallback");

        assert_eq!(
            generator.vision_calls.lock().as_slice(),
            &[(png.len(), "image/png".to_string())]
        );
    }

    #[tokio::test]
    async fn test_analyze_missing_file_field() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(vec![], ScriptedGenerator::default(), dir.path().into());

        let response = app
            .oneshot(analyze_request(multipart_body("photo", "image/png", &png_bytes())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "missing multipart field 'file'");
    }

    #[tokio::test]
    async fn test_analyze_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let (app, generator) = app(vec![], ScriptedGenerator::default(), dir.path().into());

        let response = app
            .oneshot(analyze_request(multipart_body("file", "image/jpeg", b"hello")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(generator.vision_calls.lock().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_upstream_failure_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(
            vec![Detection::new("cup", 0.95)],
            ScriptedGenerator::default(),
            dir.path().into(),
        );

        let response = app
            .oneshot(analyze_request(multipart_body("file", "image/png", &png_bytes())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Gemini response contained no text");
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(vec![], ScriptedGenerator::default(), dir.path().into());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, serde_json::json!({"status": "ok"}));
    }

    #[test]
    fn test_resolve_mime() {
        let png = png_bytes();
        assert_eq!(resolve_mime(Some("image/webp"), &png), "image/webp");
        assert_eq!(resolve_mime(Some("text/plain"), &png), "image/png");
        assert_eq!(resolve_mime(None, b"???"), "image/jpeg");
    }

    #[test]
    fn test_temp_extension() {
        assert_eq!(temp_extension(&png_bytes()), "png");
        assert_eq!(temp_extension(b"???"), "jpg");
    }
}
