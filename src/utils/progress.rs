//! Progress bars for the extract and convert commands

use indicatif::{ProgressBar, ProgressStyle};

/// Band or stage counter drawn with indicatif
pub struct ProgressTracker {
    bar: ProgressBar,
}

impl ProgressTracker {
    /// Visible bar of `total` steps labelled with `description`
    pub fn new(total: u64, description: &str) -> Self {
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message(description.to_string());

        ProgressTracker {
            bar,
        }
    }

    /// Tracker that draws nothing, for library callers that run quietly
    pub fn hidden() -> Self {
        ProgressTracker {
            bar: ProgressBar::hidden(),
        }
    }

    /// Resets the step count once the amount of work is known
    pub fn set_length(&self, total: u64) {
        self.bar.set_length(total);
    }

    pub fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Completed");
    }

    pub fn set_message(&self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }
}
