//! Progress indicators for action execution.
//!
//! Progress is disabled when stderr is not a terminal, when `--quiet` is set,
//! or when `VDM_NO_PROGRESS` is set to any value, so scripted runs stay clean.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};

fn is_progress_disabled() -> bool {
    std::env::var("VDM_NO_PROGRESS").is_ok()
}

/// A progress bar with consistent styling.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Create a progress bar over `len` units, hidden if progress is disabled.
    #[must_use]
    pub fn new(len: u64) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(len);
            bar.set_style(default_style());
            bar
        };
        Self {
            inner: bar,
        }
    }

    /// A progress bar that never draws.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    /// Set the message shown next to the bar.
    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    /// Advance the bar.
    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    /// Print a line above the bar without tearing it.
    pub fn println(&self, msg: impl AsRef<str>) {
        self.inner.println(msg);
    }

    /// Finish and remove the bar from the terminal.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn default_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
        .progress_chars("=>-")
}
