use std::fmt::Write;

use crate::tracker::stats::{HabitProgress, TrackerStats};

use super::{paint_status, progress_bar, SEPARATOR};

fn render_ranking(out: &mut String, title: &str, entries: &[HabitProgress]) {
    let _ = write!(out, "\n{title}:");
    for entry in entries {
        let _ = write!(
            out,
            "\n  {}. {} ({})",
            entry.index + 1,
            entry.name,
            entry.progress.percent
        );
    }
}

pub fn render_stats(stats: &TrackerStats, color: bool) -> String {
    let mut out = format!(
        "\n{SEPARATOR}\nSTATISTIK {:02}/{}\n{SEPARATOR}",
        stats.month, stats.year
    );
    if stats.entries.is_empty() {
        let _ = write!(out, "\nBelum ada kebiasaan.\n{SEPARATOR}");
        return out;
    }

    let _ = write!(
        out,
        "\nTotal Habits: {}\nSelesai: {}\nAktif: {}\nRata-rata progress: {}",
        stats.entries.len(),
        stats.finished,
        stats.active,
        stats.average
    );

    let _ = write!(out, "\n\nProgress per kebiasaan:");
    for entry in &stats.entries {
        let _ = write!(
            out,
            "\n  {}. [{}] {} {} {}",
            entry.index + 1,
            paint_status(entry.status, color),
            entry.name,
            progress_bar(entry.progress.percent),
            entry.progress.percent
        );
    }

    render_ranking(&mut out, "\nTop 3", &stats.top);
    render_ranking(&mut out, "\nPerlu ditingkatkan", &stats.bottom);
    let _ = write!(out, "\n{SEPARATOR}");
    out
}
