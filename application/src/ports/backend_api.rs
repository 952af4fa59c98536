//! Backend REST API port
//!
//! Defines the interface for the Detect Auto REST endpoints (auth,
//! sessions, parts prediction, repair summaries). The reqwest adapter
//! lives in the infrastructure layer.

use async_trait::async_trait;
use detect_domain::{
    CreatedSession, PartPrediction, RepairSummary, SessionDetail, SessionSummary, UserProfile,
};
use thiserror::Error;

/// Errors from REST operations against the backend.
#[derive(Error, Debug)]
pub enum ApiError {
    /// 401 from the backend — the stored token is missing or stale.
    #[error("Not authenticated — run `detect-auto login` first")]
    Unauthorized,

    /// Non-2xx response; `detail` is the backend's error message when it
    /// sent one.
    #[error("Backend error ({status}): {detail}")]
    Backend { status: u16, detail: String },

    /// The request never got a response (network, DNS, timeout).
    #[error("Request failed: {0}")]
    Request(String),

    /// The response body did not match the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),
}

/// REST operations exposed by the Detect Auto backend.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Create an account.
    async fn register(&self, email: &str, password: &str) -> Result<UserProfile, ApiError>;

    /// Exchange credentials for a bearer token. The adapter persists the
    /// token in the credential store on success.
    async fn login(&self, email: &str, password: &str) -> Result<(), ApiError>;

    /// Forget the stored token. Local only; the backend keeps no session
    /// state beyond token validity.
    async fn logout(&self);

    /// Fetch the authenticated user's profile.
    async fn me(&self) -> Result<UserProfile, ApiError>;

    /// Create a diagnostic session, optionally seeded with an initial
    /// complaint.
    async fn create_session(&self, input_text: Option<&str>) -> Result<CreatedSession, ApiError>;

    /// List the user's sessions, newest first.
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError>;

    /// Fetch one session with its stored results, parts, and summary.
    async fn session_detail(&self, session_id: i64) -> Result<SessionDetail, ApiError>;

    /// Run parts prediction over the session's diagnostic result.
    async fn predict_parts(&self, session_id: i64) -> Result<Vec<PartPrediction>, ApiError>;

    /// Generate a repair-order summary, optionally with technician notes.
    async fn summarize_order(
        &self,
        session_id: i64,
        notes: Option<&str>,
    ) -> Result<RepairSummary, ApiError>;
}
