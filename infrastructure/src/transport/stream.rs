//! Connection factory for the diagnostic streaming endpoint.
//!
//! Owns at most one live connection. Connecting while one is live returns
//! the existing handle instead of silently dropping the request, and the
//! credential check happens before any network operation.

use crate::transport::connection::WsConnection;
use crate::transport::error::{Result, TransportError};
use async_trait::async_trait;
use detect_application::{CredentialStore, DiagnosticStream, StreamConnection, StreamError};
use std::sync::{Arc, Mutex as StdMutex};
use tracing::{info, warn};
use url::Url;

/// WebSocket-backed implementation of the streaming port.
pub struct WsDiagnosticStream {
    ws_base: Url,
    credentials: Arc<dyn CredentialStore>,
    current: StdMutex<Option<Arc<WsConnection>>>,
}

impl WsDiagnosticStream {
    pub fn new(ws_base: Url, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            ws_base,
            credentials,
            current: StdMutex::new(None),
        }
    }

    /// Endpoint for one session, with the bearer token as a query parameter.
    fn endpoint(&self, session_id: i64, token: &str) -> Result<Url> {
        let mut url = self
            .ws_base
            .join(&format!("ws/diagnostics/{}", session_id))
            .map_err(TransportError::InvalidEndpoint)?;
        url.query_pairs_mut().append_pair("token", token);
        Ok(url)
    }

    /// The current connection, if it is still live.
    fn live_connection(&self) -> Option<Arc<WsConnection>> {
        let guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().filter(|c| c.state().is_live()).cloned()
    }
}

#[async_trait]
impl DiagnosticStream for WsDiagnosticStream {
    async fn connect(
        &self,
        session_id: i64,
    ) -> std::result::Result<Arc<dyn StreamConnection>, StreamError> {
        if let Some(existing) = self.live_connection() {
            warn!(
                session_id,
                existing_session = existing.session_id(),
                "connect requested while a connection is live; returning the existing handle"
            );
            return Ok(existing);
        }

        let token = self
            .credentials
            .token()
            .ok_or(StreamError::MissingCredential)?;
        let endpoint = self.endpoint(session_id, &token).map_err(StreamError::from)?;

        let connection = WsConnection::establish(endpoint.as_str(), session_id)
            .await
            .map_err(StreamError::from)?;
        info!(session_id, "diagnostic stream established");

        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::clone(&connection));
        Ok(connection)
    }
}
