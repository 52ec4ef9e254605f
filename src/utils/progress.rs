//! Progress reporting for the scenario loop
//!
//! Thin wrappers around indicatif so every long-running stage renders the
//! same bar.

use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({per_sec}) {msg}";

/// Create the bar used while exclusion scenarios run
#[must_use]
pub fn scenario_bar(total: u64, message: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap()
            .progress_chars("#>-"),
    );
    bar.set_message(message.to_string());
    bar
}

/// Finish a bar, leaving a completion message behind
pub fn finish_bar(bar: &ProgressBar, message: &str) {
    bar.finish_with_message(message.to_string());
}
