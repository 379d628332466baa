//! Batch progress display for multi-variant generation runs

use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

/// Coordinates progress display for a batch of variants
///
/// Shows one bar per variant for small batches; past `MAX_INDIVIDUAL_PROGRESS_BARS`
/// it adds a batch bar and keeps a rolling window of the most recent variants.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    variant_bars: Vec<ProgressBar>,
    /// Stores (`label`, `stage`, `stage_count`) per variant
    variant_states: Vec<(String, usize, usize)>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static STAGE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:30.cyan/blue}] {prefix}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Variants: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            variant_bars: Vec::new(),
            variant_states: Vec::new(),
        }
    }

    /// Create bars for `variant_count` variants
    pub fn initialize(&mut self, variant_count: usize) {
        if variant_count > MAX_INDIVIDUAL_PROGRESS_BARS {
            let batch_bar = ProgressBar::new(variant_count as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
        }

        for _ in 0..variant_count.min(MAX_INDIVIDUAL_PROGRESS_BARS) {
            let bar = ProgressBar::new(0);
            bar.set_style(STAGE_STYLE.clone());
            self.variant_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Begin tracking a variant that will pass through `stage_count` stages
    pub fn start_variant(&mut self, index: usize, label: &str, stage_count: usize) {
        if index >= self.variant_states.len() {
            self.variant_states.resize(index + 1, (String::new(), 0, 0));
        }
        if let Some(state) = self.variant_states.get_mut(index) {
            *state = (label.to_string(), 0, stage_count);
        }
        self.update_bars();
    }

    /// Mark one more stage of a variant as done
    pub fn advance(&mut self, index: usize) {
        if let Some(state) = self.variant_states.get_mut(index) {
            state.1 = (state.1 + 1).min(state.2);
        }
        self.update_bars();
    }

    /// Mark a variant as finished
    pub fn complete_variant(&mut self, index: usize, succeeded: bool) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }
        if let Some(state) = self.variant_states.get_mut(index) {
            let mark = if succeeded { "✓" } else { "✗" };
            state.0 = format!("{mark} {}", state.0);
            state.1 = state.2;
        }
        self.update_bars();
    }

    /// Number of variants seen so far
    pub fn tracked(&self) -> usize {
        self.variant_states.len()
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All variants generated");
        }
        let _ = self.multi_progress.clear();
    }

    // Show the most recent variants in the available bars
    fn update_bars(&self) {
        let active: Vec<&(String, usize, usize)> = self
            .variant_states
            .iter()
            .filter(|(label, _, _)| !label.is_empty())
            .collect();
        let start = active.len().saturating_sub(MAX_INDIVIDUAL_PROGRESS_BARS);
        let visible = active.get(start..).unwrap_or(&[]);

        for (bar_index, (label, stage, stages)) in visible.iter().enumerate() {
            if let Some(bar) = self.variant_bars.get(bar_index) {
                bar.set_length(*stages as u64);
                bar.set_position(*stage as u64);
                bar.set_message(format!("{stage}/{stages}"));
                bar.set_prefix(label.clone());
            }
        }

        for bar in self.variant_bars.iter().skip(visible.len()) {
            bar.set_length(0);
            bar.set_position(0);
            bar.set_message(String::new());
            bar.set_prefix(String::new());
        }
    }
}
