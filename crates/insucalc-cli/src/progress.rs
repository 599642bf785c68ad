//! Terminal progress bar fed by selection progress updates.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use insucalc_core::progress::{ProgressUpdate, Stage};
use insucalc_orchestration::interfaces::ProgressReporter;

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {msg}";

/// Progress reporter drawing an `indicatif` bar on stderr.
pub struct CLIProgressReporter {
    bar: ProgressBar,
}

impl CLIProgressReporter {
    /// Create a reporter; a hidden bar is used when `quiet` is set.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new(100)
        };
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("=>-"));
        }
        Self { bar }
    }

    /// Current position of the bar, in percent.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

/// Short label for a stage.
#[must_use]
pub fn stage_label(update: &ProgressUpdate) -> String {
    match update.stage {
        Stage::Resolving => "상품 조회".to_string(),
        Stage::Expanding => "특약 전개".to_string(),
        Stage::Enriching => format!("행 조회 {}/{}", update.completed_rows, update.total_rows),
        Stage::Settled => "완료".to_string(),
    }
}

impl ProgressReporter for CLIProgressReporter {
    fn report(&self, update: &ProgressUpdate) {
        // Updates from an older selection can still arrive.
        let pos = u64::from(update.percent);
        if pos >= self.bar.position() {
            self.bar.set_position(pos);
        }
        self.bar.set_message(stage_label(update));
    }

    fn complete(&self) {
        self.bar.finish_and_clear();
    }
}
