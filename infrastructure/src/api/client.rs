//! HTTP adapter for the backend API port.
//!
//! Auth, session, parts, and summary endpoints. The bearer token is read
//! from the credential store on every call; `login` is the only place a
//! token is written and `logout` the only place it is cleared.

use async_trait::async_trait;
use detect_application::{ApiError, BackendApi, CredentialStore};
use detect_domain::{
    CreatedSession, PartPrediction, RepairSummary, SessionDetail, SessionSummary, UserProfile,
};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Fallback detail for error bodies that do not carry one.
const DEFAULT_ERROR_DETAIL: &str = "An error occurred";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// reqwest-backed implementation of the backend API port.
pub struct HttpBackendApi {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpBackendApi {
    pub fn new(
        base_url: Url,
        credentials: Arc<dyn CredentialStore>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Request(e.to_string()))
    }

    fn bearer(&self) -> Result<String, ApiError> {
        self.credentials.token().ok_or(ApiError::Unauthorized)
    }

    /// Map a non-success response to an error, extracting the backend's
    /// `detail` field when the body carries one.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        let detail = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("detail")
                    .and_then(|d| d.as_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| DEFAULT_ERROR_DETAIL.to_string());
        Err(ApiError::Backend {
            status: status.as_u16(),
            detail,
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get_authed<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .get(self.url(path)?)
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::decode(Self::check(response).await?).await
    }
}

#[async_trait]
impl BackendApi for HttpBackendApi {
    async fn register(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
        let response = self
            .http
            .post(self.url("auth/register")?)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let profile: UserProfile = Self::decode(Self::check(response).await?).await?;
        info!(user_id = profile.id, "account registered");
        Ok(profile)
    }

    async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        // OAuth2 password grant: the backend reads form fields, not JSON.
        let form = [
            ("username", email),
            ("password", password),
            ("grant_type", "password"),
        ];
        let response = self
            .http
            .post(self.url("auth/login")?)
            .form(&form)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let token: TokenResponse = Self::decode(Self::check(response).await?).await?;
        self.credentials.store(&token.access_token);
        info!("logged in");
        Ok(())
    }

    async fn logout(&self) {
        // Purely local: the backend has no logout endpoint, sessions end
        // when the token is forgotten.
        self.credentials.clear();
        info!("logged out");
    }

    async fn me(&self) -> Result<UserProfile, ApiError> {
        self.get_authed("auth/me").await
    }

    async fn create_session(&self, input_text: Option<&str>) -> Result<CreatedSession, ApiError> {
        let response = self
            .http
            .post(self.url("sessions")?)
            .bearer_auth(self.bearer()?)
            .json(&json!({ "input_text": input_text }))
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::decode(Self::check(response).await?).await
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        self.get_authed("sessions").await
    }

    async fn session_detail(&self, session_id: i64) -> Result<SessionDetail, ApiError> {
        self.get_authed(&format!("sessions/{}", session_id)).await
    }

    async fn predict_parts(&self, session_id: i64) -> Result<Vec<PartPrediction>, ApiError> {
        debug!(session_id, "requesting parts prediction");
        let response = self
            .http
            .post(self.url("predict-parts")?)
            .query(&[("session_id", session_id)])
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::decode(Self::check(response).await?).await
    }

    async fn summarize_order(
        &self,
        session_id: i64,
        notes: Option<&str>,
    ) -> Result<RepairSummary, ApiError> {
        let mut request = self
            .http
            .post(self.url("summarize-order")?)
            .query(&[("session_id", session_id)])
            .bearer_auth(self.bearer()?);
        if let Some(notes) = notes {
            request = request.query(&[("notes", notes)]);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Self::decode(Self::check(response).await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detect_application::MemoryCredentialStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a loopback socket and capture the
    /// raw request for assertions.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (Url, tokio::sync::oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send(request);
        });
        (Url::parse(&format!("http://{}/", addr)).unwrap(), rx)
    }

    /// Read one HTTP request: headers, then as many body bytes as
    /// Content-Length announces.
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if raw.len() >= header_end + 4 + content_length {
                    return text.to_string();
                }
            }
            if n == 0 {
                return text.to_string();
            }
        }
    }

    fn client(base: Url, store: Arc<MemoryCredentialStore>) -> HttpBackendApi {
        HttpBackendApi::new(base, store, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn login_posts_form_fields_and_stores_the_token() {
        let (base, request) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"access_token": "tok-1", "token_type": "bearer"}"#,
        )
        .await;
        let store = Arc::new(MemoryCredentialStore::new());
        let api = client(base, Arc::clone(&store));

        api.login("mech@example.com", "hunter2").await.unwrap();

        let raw = request.await.unwrap();
        assert!(raw.starts_with("POST /auth/login"));
        assert!(raw.contains("username=mech%40example.com"));
        assert!(raw.contains("password=hunter2"));
        assert!(raw.contains("grant_type=password"));
        assert_eq!(store.token().as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn list_sessions_sends_bearer_and_decodes() {
        let (base, request) = serve_once(
            "HTTP/1.1 200 OK",
            r#"[{"session_id": 3, "input_text": "rattle", "created_at": "2026-08-01T10:00:00"}]"#,
        )
        .await;
        let api = client(base, Arc::new(MemoryCredentialStore::with_token("tok-1")));

        let sessions = api.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, 3);
        assert_eq!(sessions[0].input_text.as_deref(), Some("rattle"));

        let raw = request.await.unwrap();
        assert!(raw.starts_with("GET /sessions"));
        assert!(raw.contains("authorization: Bearer tok-1") || raw.contains("Authorization: Bearer tok-1"));
    }

    #[tokio::test]
    async fn backend_detail_is_extracted_from_error_bodies() {
        let (base, _request) = serve_once(
            "HTTP/1.1 404 Not Found",
            r#"{"detail": "Session not found"}"#,
        )
        .await;
        let api = client(base, Arc::new(MemoryCredentialStore::with_token("tok-1")));

        let err = api.session_detail(99).await.unwrap_err();
        match err {
            ApiError::Backend { status, detail } => {
                assert_eq!(status, 404);
                assert_eq!(detail, "Session not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn unauthorized_maps_to_its_own_variant() {
        let (base, _request) = serve_once("HTTP/1.1 401 Unauthorized", r#"{"detail": "nope"}"#).await;
        let api = client(base, Arc::new(MemoryCredentialStore::with_token("stale")));

        let err = api.me().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn authed_calls_refuse_to_run_without_a_token() {
        // Unroutable base: the token check fires before any request.
        let base = Url::parse("http://127.0.0.1:1/").unwrap();
        let api = client(base, Arc::new(MemoryCredentialStore::new()));

        let err = api.list_sessions().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn predict_parts_passes_session_id_as_query() {
        let (base, request) = serve_once(
            "HTTP/1.1 200 OK",
            r#"[{"name": "Spark plug", "confidence": 0.92, "price": "12.50", "id": 5}]"#,
        )
        .await;
        let api = client(base, Arc::new(MemoryCredentialStore::with_token("tok-1")));

        let parts = api.predict_parts(8).await.unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name, "Spark plug");

        let raw = request.await.unwrap();
        assert!(raw.starts_with("POST /predict-parts?session_id=8"));
    }
}
