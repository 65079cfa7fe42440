use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;
use std::sync::Arc;

use crate::output;
use crate::translation::{LanguageProgress, LanguageProgressCallback, LanguageStatus};

const BAR_TEMPLATE: &str = "{prefix:>8} [{bar:30}] {pos}/{len} {msg}";

/// One progress bar per target language, drawn on stderr.
///
/// Bars are created up front in the given order so the layout does not
/// jump around as languages start. Hidden in quiet mode.
pub struct LanguageProgressBars {
    multi: MultiProgress,
    bars: HashMap<String, ProgressBar>,
}

impl LanguageProgressBars {
    pub fn new(languages: &[String], total: usize) -> Self {
        let target = if output::is_quiet() {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        };
        Self::with_draw_target(languages, total, target)
    }

    fn with_draw_target(languages: &[String], total: usize, target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");

        let bars = languages
            .iter()
            .map(|language| {
                let bar = multi.add(ProgressBar::new(total as u64));
                bar.set_style(style.clone());
                bar.set_prefix(language.clone());
                bar.set_message("pending");
                (language.clone(), bar)
            })
            .collect();

        Self { multi, bars }
    }

    /// Applies a progress event to the matching bar.
    pub fn update(&self, progress: &LanguageProgress) {
        let Some(bar) = self.bars.get(&progress.language) else {
            return;
        };

        bar.set_length(progress.total as u64);
        bar.set_position(progress.completed as u64);

        match progress.status {
            LanguageStatus::Pending => bar.set_message("pending"),
            LanguageStatus::InProgress => bar.set_message("translating"),
            LanguageStatus::Completed => bar.finish_with_message("done"),
            LanguageStatus::Failed => bar.abandon_with_message("failed"),
        }
    }

    /// Wraps the bars in a callback for the orchestrator.
    pub fn callback(self: &Arc<Self>) -> LanguageProgressCallback {
        let bars = Arc::clone(self);
        Arc::new(move |progress: &LanguageProgress| bars.update(progress))
    }

    /// Removes unfinished bars, e.g. after cancellation.
    pub fn clear(&self) {
        for bar in self.bars.values() {
            if !bar.is_finished() {
                bar.abandon();
            }
        }
        if let Err(e) = self.multi.clear() {
            log::debug!("Failed to clear progress bars: {e}");
        }
    }

    #[cfg(test)]
    fn position(&self, language: &str) -> Option<(u64, Option<u64>)> {
        self.bars
            .get(language)
            .map(|bar| (bar.position(), bar.length()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden_bars(languages: &[&str], total: usize) -> Arc<LanguageProgressBars> {
        let languages: Vec<String> = languages.iter().map(ToString::to_string).collect();
        Arc::new(LanguageProgressBars::with_draw_target(
            &languages,
            total,
            ProgressDrawTarget::hidden(),
        ))
    }

    fn event(language: &str, completed: usize, status: LanguageStatus) -> LanguageProgress {
        LanguageProgress {
            language: language.to_string(),
            completed,
            total: 10,
            status,
        }
    }

    #[test]
    fn test_bars_start_empty() {
        let bars = hidden_bars(&["fr", "de"], 10);

        assert_eq!(bars.position("fr"), Some((0, Some(10))));
        assert_eq!(bars.position("de"), Some((0, Some(10))));
    }

    #[test]
    fn test_callback_moves_matching_bar() {
        let bars = hidden_bars(&["fr", "de"], 10);
        let callback = bars.callback();

        callback(&event("fr", 4, LanguageStatus::InProgress));

        assert_eq!(bars.position("fr"), Some((4, Some(10))));
        assert_eq!(bars.position("de"), Some((0, Some(10))));
    }

    #[test]
    fn test_terminal_status_finishes_bar() {
        let bars = hidden_bars(&["fr", "de"], 10);

        bars.update(&event("fr", 10, LanguageStatus::Completed));
        bars.update(&event("de", 0, LanguageStatus::Failed));

        assert!(bars.bars["fr"].is_finished());
        assert!(bars.bars["de"].is_finished());
    }

    #[test]
    fn test_unknown_language_is_ignored() {
        let bars = hidden_bars(&["fr"], 10);

        bars.update(&event("ja", 3, LanguageStatus::InProgress));

        assert_eq!(bars.position("fr"), Some((0, Some(10))));
        assert_eq!(bars.position("ja"), None);
    }

    #[test]
    fn test_clear_abandons_unfinished_bars() {
        let bars = hidden_bars(&["fr", "de"], 10);
        bars.update(&event("fr", 10, LanguageStatus::Completed));
        bars.update(&event("de", 3, LanguageStatus::InProgress));

        bars.clear();

        assert!(bars.bars.values().all(ProgressBar::is_finished));
        assert_eq!(bars.position("de"), Some((3, Some(10))));
    }
}
