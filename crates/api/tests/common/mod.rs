#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use ott_api::auth::jwt::{generate_access_token, JwtConfig};
use ott_api::config::{ServerConfig, UploadConfig};
use ott_api::router::build_app_router;
use ott_api::state::AppState;
use ott_core::roles::{ROLE_ADMIN, ROLE_USER};
use ott_core::types::DbId;
use ott_db::Datastore;
use serde_json::Value;
use tower::ServiceExt;

/// Upload limits small enough to trip in tests.
pub const MAX_IMAGE_BYTES: u64 = 1024;
pub const MAX_VIDEO_BYTES: u64 = 4096;

/// Router over a fresh memory datastore plus handles for assertions.
pub struct TestApp {
    pub router: Router,
    pub datastore: Datastore,
    pub config: Arc<ServerConfig>,
    upload_dir: tempfile::TempDir,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(upload_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        upload: UploadConfig {
            dir: upload_dir.to_path_buf(),
            max_image_bytes: MAX_IMAGE_BYTES,
            max_video_bytes: MAX_VIDEO_BYTES,
        },
        admin: None,
    }
}

/// Build the full application router, with all middleware layers, over an
/// empty in-memory datastore.
pub fn build_test_app() -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let config = Arc::new(test_config(upload_dir.path()));
    let datastore = Datastore::memory();
    let router = build_app_router(AppState {
        datastore: datastore.clone(),
        config: Arc::clone(&config),
    });
    TestApp {
        router,
        datastore,
        config,
        upload_dir,
    }
}

impl TestApp {
    pub fn upload_dir(&self) -> &Path {
        self.upload_dir.path()
    }

    /// Files currently in the upload directory.
    pub fn stored_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.upload_dir())
            .map(|entries| entries.map(|e| e.unwrap().path()).collect())
            .unwrap_or_default()
    }

    /// Whether a stored `uploads/...` path exists on disk.
    pub fn exists(&self, stored: &str) -> bool {
        self.upload_dir()
            .join(stored.trim_start_matches("uploads/"))
            .exists()
    }

    pub fn admin_token(&self) -> String {
        generate_access_token(1, ROLE_ADMIN, &self.config.jwt).unwrap()
    }

    pub fn user_token(&self, user_id: DbId) -> String {
        generate_access_token(user_id, ROLE_USER, &self.config.jwt).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(request(Method::GET, uri, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(request(Method::DELETE, uri, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.send(
            request(method, uri, token)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        parts: &[Part<'_>],
    ) -> Response {
        let (content_type, body) = multipart_body(parts);
        self.send(
            request(method, uri, token)
                .header(CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

/// Read the response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

impl<'a> Part<'a> {
    pub fn image(name: &'a str) -> Self {
        Part::File {
            name,
            filename: "picture.png",
            content_type: "image/png",
            bytes: b"\x89PNG fake image bytes",
        }
    }

    pub fn video(name: &'a str) -> Self {
        Part::File {
            name,
            filename: "clip.mp4",
            content_type: "video/mp4",
            bytes: b"fake video bytes",
        }
    }
}

const BOUNDARY: &str = "ott-test-boundary";

pub fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
