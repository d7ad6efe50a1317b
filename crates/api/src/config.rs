use std::path::PathBuf;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for in-flight requests to finish after a shutdown
    /// signal (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    pub upload: UploadConfig,
    /// Admin account ensured at startup, if configured.
    pub admin: Option<AdminBootstrap>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            upload: UploadConfig::from_env(),
            admin: AdminBootstrap::from_env(),
        }
    }
}

/// Where uploads are written and how large they may be.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory files are written to and served from at `/uploads`.
    pub dir: PathBuf,
    pub max_image_bytes: u64,
    pub max_video_bytes: u64,
}

/// 5 MiB.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
/// 500 MiB.
pub const DEFAULT_MAX_VIDEO_BYTES: u64 = 500 * 1024 * 1024;

impl UploadConfig {
    /// | Env Var           | Default     |
    /// |-------------------|-------------|
    /// | `UPLOAD_DIR`      | `uploads`   |
    /// | `MAX_IMAGE_BYTES` | `5242880`   |
    /// | `MAX_VIDEO_BYTES` | `524288000` |
    pub fn from_env() -> Self {
        let dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into());

        let max_image_bytes: u64 = std::env::var("MAX_IMAGE_BYTES")
            .map(|v| v.parse().expect("MAX_IMAGE_BYTES must be a valid u64"))
            .unwrap_or(DEFAULT_MAX_IMAGE_BYTES);

        let max_video_bytes: u64 = std::env::var("MAX_VIDEO_BYTES")
            .map(|v| v.parse().expect("MAX_VIDEO_BYTES must be a valid u64"))
            .unwrap_or(DEFAULT_MAX_VIDEO_BYTES);

        Self {
            dir: PathBuf::from(dir),
            max_image_bytes,
            max_video_bytes,
        }
    }

    /// Largest request body the server accepts: a few files plus form text.
    pub fn body_limit(&self) -> usize {
        let largest = self.max_video_bytes.max(self.max_image_bytes);
        usize::try_from(largest.saturating_mul(2)).unwrap_or(usize::MAX)
    }
}

/// Credentials of the admin account created at startup.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

impl AdminBootstrap {
    /// `ADMIN_EMAIL` and `ADMIN_PASSWORD`; `None` unless both are set.
    ///
    /// # Panics
    ///
    /// Panics if only one of the two is set.
    pub fn from_env() -> Option<Self> {
        let email = std::env::var("ADMIN_EMAIL").ok().filter(|v| !v.is_empty());
        let password = std::env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty());
        match (email, password) {
            (Some(email), Some(password)) => Some(Self { email, password }),
            (None, None) => None,
            _ => panic!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together"),
        }
    }
}
