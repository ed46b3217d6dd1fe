//! Verb + path request dispatch onto snapshot operations.
//!
//! # Contract
//! - `GET /health` answers without touching the store.
//! - `GET /data`, `PUT /data`, `DELETE /data` map to fetch, replace and
//!   clear.
//! - Validation failures map to 400, store failures to 500.
//! - Every response carries permissive CORS headers.

use crate::config::ApiConfig;
use log::{error, info, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;
use taskorg_core::db::open_db;
use taskorg_core::{
    SnapshotService, SnapshotServiceError, SnapshotServiceResult, SqliteSnapshotRepository,
};

const DATA_PATH: &str = "/data";
const HEALTH_PATH: &str = "/health";

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET,PUT,DELETE,OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// Request verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Delete,
    Options,
    Other(String),
}

impl Method {
    /// Parses an HTTP method token (case-sensitive).
    pub fn parse(raw: &str) -> Self {
        match raw {
            "GET" => Self::Get,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            other => Self::Other(other.to_string()),
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Other(raw) => raw,
        }
    }
}

/// Transport-neutral request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    /// Request target; query string and fragment are ignored for routing.
    pub path: String,
    /// Raw UTF-8 body, if any.
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Transport-neutral response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    /// JSON text, absent for 204 responses.
    pub body: Option<String>,
}

impl ApiResponse {
    fn json(status: u16, payload: &impl Serialize) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => {
                let mut headers = cors_headers();
                headers.push(("Content-Type", "application/json".to_string()));
                Self {
                    status,
                    headers,
                    body: Some(body),
                }
            }
            Err(err) => {
                error!(
                    "event=api_encode module=api status=error error={}",
                    err
                );
                Self {
                    status: 500,
                    headers: cors_headers(),
                    body: None,
                }
            }
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, &json!({ "error": message.into() }))
    }

    fn internal_error(details: impl Into<String>) -> Self {
        Self::json(
            500,
            &json!({ "error": "Internal server error", "details": details.into() }),
        )
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            headers: cors_headers(),
            body: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body as JSON, if present and valid.
    pub fn body_json(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_str(body).ok())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Request dispatcher bound to one configuration.
pub struct TaskOrgApi {
    config: ApiConfig,
}

impl TaskOrgApi {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Routes one request and always returns a response.
    pub fn dispatch(&self, request: &ApiRequest) -> ApiResponse {
        let started_at = Instant::now();
        let path = route_path(&request.path);

        let response = match (&request.method, path) {
            (Method::Options, _) => ApiResponse::no_content(),
            (Method::Get, HEALTH_PATH) => ApiResponse::json(200, &json!({ "status": "ok" })),
            (Method::Get, DATA_PATH) => self.fetch(),
            (Method::Put, DATA_PATH) => self.replace(request.body.as_deref()),
            (Method::Delete, DATA_PATH) => self.clear(),
            (Method::Get | Method::Put | Method::Delete, _) => {
                ApiResponse::error(404, "Not found")
            }
            (Method::Other(_), _) => ApiResponse::error(501, "Unsupported method"),
        };

        info!(
            "event=api_request module=api status={} method={} path={} http_status={} duration_ms={}",
            if response.is_success() { "ok" } else { "error" },
            request.method.as_str(),
            path,
            response.status,
            started_at.elapsed().as_millis()
        );
        response
    }

    fn fetch(&self) -> ApiResponse {
        match self.with_service(|service| service.fetch_all()) {
            Ok(view) => ApiResponse::json(200, &view),
            Err(response) => response,
        }
    }

    fn replace(&self, body: Option<&str>) -> ApiResponse {
        let raw = body.map(str::trim).filter(|text| !text.is_empty()).unwrap_or("{}");
        let payload: Value = match serde_json::from_str(raw) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(
                    "event=api_decode module=api status=error line={} column={}",
                    err.line(),
                    err.column()
                );
                return ApiResponse::error(400, "Invalid JSON payload");
            }
        };

        match self.with_service(|service| service.replace_all(&payload)) {
            Ok(view) => ApiResponse::json(200, &view),
            Err(response) => response,
        }
    }

    fn clear(&self) -> ApiResponse {
        match self.with_service(|service| service.clear_all()) {
            Ok(()) => ApiResponse::no_content(),
            Err(response) => response,
        }
    }

    fn with_service<T>(
        &self,
        op: impl FnOnce(&SnapshotService<SqliteSnapshotRepository<'_>>) -> SnapshotServiceResult<T>,
    ) -> Result<T, ApiResponse> {
        let conn = open_db(&self.config.db_path)
            .map_err(|err| ApiResponse::internal_error(format!("database open failed: {err}")))?;
        let repo = SqliteSnapshotRepository::try_new(&conn)
            .map_err(|err| ApiResponse::internal_error(format!("repository init failed: {err}")))?;
        let service = SnapshotService::new(repo);

        op(&service).map_err(|err| match err {
            SnapshotServiceError::Validation(err) => ApiResponse::error(400, err.to_string()),
            SnapshotServiceError::Store(err) => ApiResponse::internal_error(err.to_string()),
        })
    }
}

fn route_path(target: &str) -> &str {
    target.split(['?', '#']).next().unwrap_or(target)
}

fn cors_headers() -> Vec<(&'static str, String)> {
    CORS_HEADERS
        .iter()
        .map(|(name, value)| (*name, (*value).to_string()))
        .collect()
}
