//! Session flows over the backend API.
//!
//! Thin orchestration: each method is one backend call plus logging. Kept
//! as a use case so the presentation layer depends on ports, not adapters.

use crate::ports::backend_api::{ApiError, BackendApi};
use detect_domain::{
    CreatedSession, PartPrediction, RepairSummary, SessionDetail, SessionSummary,
};
use std::sync::Arc;
use tracing::info;

/// Session, parts-prediction, and repair-summary flows.
pub struct SessionService {
    api: Arc<dyn BackendApi>,
}

impl SessionService {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }

    /// Create a diagnostic session, optionally seeded with the initial
    /// complaint text.
    pub async fn create_session(
        &self,
        input_text: Option<&str>,
    ) -> Result<CreatedSession, ApiError> {
        let session = self.api.create_session(input_text).await?;
        info!(session_id = session.id, "session created");
        Ok(session)
    }

    /// List the user's sessions, newest first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        self.api.list_sessions().await
    }

    /// Fetch one session with stored results, parts, and summary.
    pub async fn session_detail(&self, session_id: i64) -> Result<SessionDetail, ApiError> {
        self.api.session_detail(session_id).await
    }

    /// Run parts prediction for a session. Requires at least one stored
    /// diagnostic result; the backend rejects sessions without one.
    pub async fn predict_parts(&self, session_id: i64) -> Result<Vec<PartPrediction>, ApiError> {
        let parts = self.api.predict_parts(session_id).await?;
        info!(session_id, count = parts.len(), "parts predicted");
        Ok(parts)
    }

    /// Generate a repair-order summary, optionally with technician notes.
    pub async fn summarize_order(
        &self,
        session_id: i64,
        notes: Option<&str>,
    ) -> Result<RepairSummary, ApiError> {
        let summary = self.api.summarize_order(session_id, notes).await?;
        info!(session_id, bytes = summary.summary_text.len(), "repair summary generated");
        Ok(summary)
    }
}
