//! Session domain entities
//!
//! Shapes mirror the backend's JSON responses. Timestamps stay as the
//! ISO-8601 strings the backend emits; the client only displays them.

use serde::{Deserialize, Serialize};

/// A row in the user's session list (Entity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: i64,
    pub input_text: Option<String>,
    pub created_at: String,
}

/// A freshly created diagnostic session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSession {
    pub id: i64,
    pub user_id: i64,
    pub input_text: Option<String>,
    pub created_at: String,
}

/// The authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub created_at: String,
}

/// One stored exchange within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub input_message: Option<String>,
    pub output_text: String,
}

/// A predicted replacement part with model confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartPrediction {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub confidence: f64,
    #[serde(default)]
    pub price: Option<String>,
}

impl PartPrediction {
    /// Confidence as a percentage clamped to 0..=100 for display.
    pub fn confidence_percent(&self) -> f64 {
        (self.confidence * 100.0).clamp(0.0, 100.0)
    }
}

/// Full session detail, including stored results and predictions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
    pub session_id: i64,
    pub input_text: Option<String>,
    #[serde(default)]
    pub diagnostic_results: Vec<DiagnosticResult>,
    #[serde(default)]
    pub parts: Vec<PartPrediction>,
    #[serde(default)]
    pub summary: Option<String>,
    pub created_at: String,
}

/// A generated repair-order summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairSummary {
    pub id: i64,
    pub session_id: i64,
    pub summary_text: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_prediction_deserializes_backend_shape() {
        let json = serde_json::json!({
            "id": 12,
            "name": "Crankshaft bearing",
            "confidence": 0.87,
            "price": "$45-$80"
        });
        let part: PartPrediction = serde_json::from_value(json).unwrap();
        assert_eq!(part.name, "Crankshaft bearing");
        assert!((part.confidence_percent() - 87.0).abs() < f64::EPSILON);
    }

    #[test]
    fn part_prediction_tolerates_missing_optionals() {
        let json = serde_json::json!({ "name": "Spark plug", "confidence": 1.4 });
        let part: PartPrediction = serde_json::from_value(json).unwrap();
        assert_eq!(part.id, None);
        assert_eq!(part.price, None);
        // Out-of-range confidence is clamped for display
        assert_eq!(part.confidence_percent(), 100.0);
    }

    #[test]
    fn session_detail_defaults_empty_collections() {
        let json = serde_json::json!({
            "session_id": 3,
            "input_text": "engine knocking",
            "created_at": "2026-08-01T12:00:00"
        });
        let detail: SessionDetail = serde_json::from_value(json).unwrap();
        assert!(detail.diagnostic_results.is_empty());
        assert!(detail.parts.is_empty());
        assert!(detail.summary.is_none());
    }
}
