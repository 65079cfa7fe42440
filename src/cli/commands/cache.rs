//! Cache inspection command handler.

use anyhow::Result;

use crate::cache::{CacheStats, Clock, SqliteStore, SystemClock, TranslationCache};
use crate::cli::CacheCommand;
use crate::ui::Style;

pub fn run_cache(command: &CacheCommand) -> Result<()> {
    let store = SqliteStore::new()?;
    let db_path = store.db_path().to_path_buf();
    let cache = TranslationCache::new(store);

    match command {
        CacheCommand::Stats => {
            let stats = cache.stats();
            print!("{}", render_stats(&stats, SystemClock.now_ms()));
            println!(
                "  {} {}",
                Style::label("location:"),
                Style::secondary(db_path.display())
            );
        }
        CacheCommand::Clear => {
            let removed = cache.stats().total_entries;
            cache.clear();
            crate::status!(
                "{} Removed {removed} cached translation(s)",
                Style::success("✓")
            );
        }
    }

    Ok(())
}

fn render_stats(stats: &CacheStats, now_ms: i64) -> String {
    let mut out = format!("{}\n", Style::header("Translation cache"));
    out.push_str(&format!(
        "  {} {}\n",
        Style::label("entries:"),
        Style::value(stats.total_entries)
    ));
    out.push_str(&format!(
        "  {} {}\n",
        Style::label("size:"),
        format_size(stats.approximate_size_bytes)
    ));
    if let Some(oldest) = stats.oldest_entry_timestamp {
        out.push_str(&format!(
            "  {} {}\n",
            Style::label("oldest:"),
            format_age(now_ms.saturating_sub(oldest))
        ));
    }
    out
}

fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
    }
}

fn format_age(age_ms: i64) -> String {
    let minutes = age_ms / 60_000;
    match minutes {
        m if m < 1 => "just now".to_string(),
        m if m < 60 => format!("{m} min ago"),
        m if m < 60 * 24 => format!("{} h ago", m / 60),
        m => format!("{} days ago", m / (60 * 24)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(10_000), "just now");
        assert_eq!(format_age(5 * 60_000), "5 min ago");
        assert_eq!(format_age(3 * 60 * 60_000), "3 h ago");
        assert_eq!(format_age(2 * 24 * 60 * 60_000), "2 days ago");
    }

    #[test]
    fn test_render_stats_omits_age_when_empty() {
        let stats = CacheStats {
            total_entries: 0,
            approximate_size_bytes: 2,
            oldest_entry_timestamp: None,
        };

        let out = render_stats(&stats, 0);

        assert!(out.contains("entries"));
        assert!(!out.contains("oldest"));
    }
}
