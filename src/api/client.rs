//! HTTP client shared by every domain machine.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::endpoints::{AttendanceApi, AuthApi, ChatApi, DashboardApi, LeaveApi, ProjectsApi, TaskApi};
use crate::config::ApiConfig;
use crate::error::{PortalError, Result};
use crate::normalized::extract_error_message;
use crate::session::SessionHolder;

/// Whether a call needs the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Required,
    Public,
}

/// One outgoing request, before the token is attached.
#[derive(Debug)]
pub struct Call<'a> {
    method: Method,
    path: &'a str,
    auth: Auth,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl<'a> Call<'a> {
    pub fn new(method: Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            auth: Auth::Required,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: &'a str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &'a str) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: &'a str) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn public(mut self) -> Self {
        self.auth = Auth::Public;
        self
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// HTTP client for the HRMS backend.
///
/// Every request reads the bearer token from the injected [`SessionHolder`],
/// and every 401 response ends that session before the error reaches the
/// caller.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use hrms_portal::api::ApiClient;
/// use hrms_portal::session::{MemoryStorage, SessionHolder};
///
/// # async fn example() -> hrms_portal::Result<()> {
/// let session = SessionHolder::new(Arc::new(MemoryStorage::new()), "hrms.session");
/// let client = ApiClient::new("https://api.manahrms.com/api/v1", session)?;
///
/// let today = client.attendance().today().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    session: SessionHolder,
}

impl ApiClient {
    pub fn new(base_url: impl AsRef<str>, session: SessionHolder) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new(), session)
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        http: reqwest::Client,
        session: SessionHolder,
    ) -> Result<Self> {
        Ok(Self {
            base_url: directory_url(base_url.as_ref())?,
            http,
            session,
        })
    }

    /// Build a client with the configured base URL and request timeout.
    pub fn from_config(config: &ApiConfig, session: SessionHolder) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Self::with_client(&config.base_url, http, session)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &SessionHolder {
        &self.session
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn dashboard(&self) -> DashboardApi<'_> {
        DashboardApi::new(self)
    }

    pub fn attendance(&self) -> AttendanceApi<'_> {
        AttendanceApi::new(self)
    }

    pub fn leave(&self) -> LeaveApi<'_> {
        LeaveApi::new(self)
    }

    pub fn tasks(&self) -> TaskApi<'_> {
        TaskApi::new(self)
    }

    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi::new(self)
    }

    pub fn chat(&self) -> ChatApi<'_> {
        ChatApi::new(self)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request pipeline
    // ─────────────────────────────────────────────────────────────────────────

    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send one request and return the parsed body.
    ///
    /// Exactly one HTTP round-trip; nothing is retried.
    pub async fn send(&self, call: Call<'_>) -> Result<Value> {
        let token = self.session.token();
        if call.auth == Auth::Required && token.is_none() {
            return Err(PortalError::NotAuthenticated);
        }

        let url = self.url(call.path)?;
        debug!(name: "api.request", method = %call.method, path = call.path, "Sending request");

        let mut request = self.http.request(call.method.clone(), url);
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }
        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = parse_body(&text);

        info!(
            name: "api.response",
            method = %call.method,
            path = call.path,
            status = status.as_u16(),
            "Received response"
        );

        if status == StatusCode::UNAUTHORIZED {
            self.session.expire().await;
            return Err(match call.auth {
                Auth::Required => PortalError::SessionExpired,
                Auth::Public => transport_error(status, &body),
            });
        }
        if !status.is_success() {
            return Err(transport_error(status, &body));
        }
        Ok(body)
    }
}

/// Base URLs are treated as directories so relative joins keep their path.
fn directory_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }
}

/// Empty bodies read as `null`; non-JSON bodies are kept as a string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn transport_error(status: StatusCode, body: &Value) -> PortalError {
    let message = extract_error_message(body)
        .or_else(|| {
            body.as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty() && s.len() < 200)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
    PortalError::Transport {
        status: Some(status.as_u16()),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;
    use serde_json::json;
    use std::sync::Arc;

    fn client(base: &str) -> ApiClient {
        let session = SessionHolder::new(Arc::new(MemoryStorage::new()), "k");
        ApiClient::new(base, session).unwrap()
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = client("https://api.manahrms.com/api/v1");
        assert_eq!(
            client.url("/auth/login").unwrap().as_str(),
            "https://api.manahrms.com/api/v1/auth/login"
        );
        assert_eq!(
            client.url("tasks/42").unwrap().as_str(),
            "https://api.manahrms.com/api/v1/tasks/42"
        );
    }

    #[test]
    fn test_parse_body_variants() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_body("09:00"), json!("09:00"));
    }

    #[test]
    fn test_transport_error_message_priority() {
        let err = transport_error(
            StatusCode::BAD_REQUEST,
            &json!({"detail": "d", "error": "e"}),
        );
        assert_eq!(err.to_string(), "e");

        let err = transport_error(StatusCode::INTERNAL_SERVER_ERROR, &Value::Null);
        assert_eq!(err.to_string(), "Request failed with status code 500");
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_required_call_without_token_is_rejected() {
        let client = client("http://127.0.0.1:9");
        let err = client.send(Call::get("auth/me")).await.unwrap_err();
        assert!(matches!(err, PortalError::NotAuthenticated));
    }
}
