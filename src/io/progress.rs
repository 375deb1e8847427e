//! Multi-file progress tracking with automatic batching for large sets
//!
//! Relaxation runs have no known length, so each file shows its iteration
//! and stipple counts next to a spinner instead of a filling bar.

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::algorithm::relaxation::IterationReport;
use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;

static FILE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {prefix} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Files: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

#[derive(Clone, Debug, Default)]
struct FileState {
    name: String,
    iteration: usize,
    stipples: usize,
    finished: Option<Duration>,
}

impl FileState {
    fn message(&self) -> String {
        match self.finished {
            Some(elapsed) => format!(
                "✓ {} stipples after {} iterations ({:.1}s)",
                self.stipples,
                self.iteration,
                elapsed.as_secs_f64()
            ),
            None => format!(
                "iteration {}, {} stipples",
                self.iteration, self.stipples
            ),
        }
    }
}

/// Coordinates progress display for batch operations
///
/// Shows one line per file for the most recent files and adds a batch bar
/// when there are more files than lines
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    file_bars: Vec<ProgressBar>,
    file_states: Vec<FileState>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            file_bars: Vec::new(),
            file_states: Vec::new(),
        }
    }

    /// Initialize progress lines based on file count
    pub fn initialize(&mut self, file_count: usize) {
        // Switch to batch mode for large file sets to avoid terminal spam
        if file_count > MAX_INDIVIDUAL_PROGRESS_BARS + 1 {
            let batch_bar = ProgressBar::new(file_count as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
        }

        for _ in 0..file_count.min(MAX_INDIVIDUAL_PROGRESS_BARS) {
            let bar = ProgressBar::new_spinner();
            bar.set_style(FILE_STYLE.clone());
            self.file_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Start tracking a new file
    pub fn start_file(&mut self, index: usize, path: &Path) {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        if index >= self.file_states.len() {
            self.file_states.resize(index + 1, FileState::default());
        }
        if let Some(state) = self.file_states.get_mut(index) {
            *state = FileState {
                name,
                ..FileState::default()
            };
        }
        self.update_bars();
    }

    /// Record the outcome of one relaxation iteration
    pub fn update_iteration(&mut self, index: usize, report: &IterationReport) {
        if let Some(state) = self.file_states.get_mut(index) {
            state.iteration = report.iteration;
            state.stipples = report.stipples;
        }
        self.update_bars();
    }

    /// Mark file as completed and update batch progress
    pub fn complete_file(&mut self, index: usize, stipples: usize, elapsed: Duration) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }
        if let Some(state) = self.file_states.get_mut(index) {
            state.stipples = stipples;
            state.finished = Some(elapsed);
        }
        self.update_bars();
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All files processed");
        }
        let _ = self.multi_progress.clear();
    }

    /// Number of per-file progress lines
    pub fn line_count(&self) -> usize {
        self.file_bars.len()
    }

    /// Whether a batch bar is shown
    pub const fn is_batched(&self) -> bool {
        self.batch_bar.is_some()
    }

    // Shows the most recently started files on the available lines
    fn update_bars(&self) {
        let active: Vec<&FileState> = self
            .file_states
            .iter()
            .filter(|state| !state.name.is_empty())
            .collect();
        let start = active.len().saturating_sub(self.file_bars.len());
        let visible = active.get(start..).unwrap_or(&[]);

        for (bar_index, bar) in self.file_bars.iter().enumerate() {
            match visible.get(bar_index) {
                Some(state) => {
                    bar.set_prefix(state.name.clone());
                    bar.set_message(state.message());
                    bar.tick();
                }
                None => {
                    bar.set_prefix(String::new());
                    bar.set_message(String::new());
                }
            }
        }
    }
}
