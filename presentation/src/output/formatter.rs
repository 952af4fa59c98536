//! Console output formatter for backend data

use colored::Colorize;
use detect_domain::{
    PartPrediction, RepairSummary, SessionDetail, SessionSummary, UserProfile,
};

/// Formats backend data for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the session list, one row per session.
    pub fn format_sessions(sessions: &[SessionSummary]) -> String {
        if sessions.is_empty() {
            return format!("{}\n", "No sessions yet — start one with `detect-auto chat`.".dimmed());
        }

        let mut output = String::new();
        output.push_str(&format!(
            "{:>6}  {:<19}  {}\n",
            "ID".cyan().bold(),
            "Created".cyan().bold(),
            "Complaint".cyan().bold()
        ));
        for session in sessions {
            output.push_str(&format!(
                "{:>6}  {:<19}  {}\n",
                session.session_id,
                Self::short_timestamp(&session.created_at),
                session.input_text.as_deref().unwrap_or("-")
            ));
        }
        output
    }

    /// Format one session with its stored results, parts, and summary.
    pub fn format_session_detail(detail: &SessionDetail) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} {}\n",
            "Session".cyan().bold(),
            detail.session_id
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Created:".cyan().bold(),
            Self::short_timestamp(&detail.created_at)
        ));
        if let Some(input) = &detail.input_text {
            output.push_str(&format!("{} {}\n", "Complaint:".cyan().bold(), input));
        }

        for result in &detail.diagnostic_results {
            output.push('\n');
            if let Some(message) = &result.input_message {
                output.push_str(&format!("{} {}\n", "You:".bold(), message));
            }
            output.push_str(&format!(
                "{} {}\n",
                "Assistant:".green().bold(),
                result.output_text
            ));
        }

        if !detail.parts.is_empty() {
            output.push('\n');
            output.push_str(&Self::format_parts(&detail.parts));
        }

        if let Some(summary) = &detail.summary {
            output.push('\n');
            output.push_str(&format!("{}\n{}\n", "Repair summary:".yellow().bold(), summary));
        }

        output
    }

    /// Format predicted parts as a table with confidence and price.
    pub fn format_parts(parts: &[PartPrediction]) -> String {
        if parts.is_empty() {
            return format!("{}\n", "No parts predicted for this session.".dimmed());
        }

        let mut output = String::new();
        output.push_str(&format!("{}\n", "Predicted parts:".yellow().bold()));
        for part in parts {
            let price = part.price.as_deref().unwrap_or("n/a");
            output.push_str(&format!(
                "  {:<30} {:>5.1}%  {}\n",
                part.name,
                part.confidence_percent(),
                price
            ));
        }
        output
    }

    /// Format a generated repair-order summary.
    pub fn format_summary(summary: &RepairSummary) -> String {
        format!(
            "{}\n{}\n\n{}\n",
            format!("Repair order for session {}", summary.session_id)
                .yellow()
                .bold(),
            Self::short_timestamp(&summary.created_at).dimmed(),
            summary.summary_text
        )
    }

    /// Format the authenticated user's profile.
    pub fn format_profile(profile: &UserProfile) -> String {
        format!(
            "{} {}\n{} {}\n{} {}\n",
            "Email:".cyan().bold(),
            profile.email,
            "User ID:".cyan().bold(),
            profile.id,
            "Registered:".cyan().bold(),
            Self::short_timestamp(&profile.created_at)
        )
    }

    /// Format as JSON (for scripting).
    pub fn format_json<T: serde::Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Trim an ISO-8601 timestamp down to `YYYY-MM-DD HH:MM` for display.
    fn short_timestamp(raw: &str) -> String {
        let trimmed: String = raw.chars().take(16).collect();
        trimmed.replace('T', " ")
    }
}
