//! Spinner shown while waiting for the first streamed fragment

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner that runs between sending a message and the first chunk of the
/// reply. Cleared as soon as streamed text starts printing.
pub struct StreamProgress {
    bar: ProgressBar,
}

impl StreamProgress {
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Remove the spinner line entirely.
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}
