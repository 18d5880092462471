//! Text rendering for the menu and the one-shot commands. Everything returns a `String` so the
//! callers decide where it goes.

pub mod stats;

use std::fmt::Write;

use ansi_term::Colour;
use chrono::{Datelike, NaiveDate};

use crate::{
    tracker::{
        habit::{Habit, HabitStatus},
        profile::Profile,
    },
    utils::{percentage::Percentage, time::format_day},
};

pub const SEPARATOR: &str = "==================================================";

const BAR_WIDTH: u32 = 10;

pub fn render_menu() -> String {
    format!(
        "\n{SEPARATOR}\nHABIT TRACKER - MENU UTAMA\n{SEPARATOR}\n\
         1. Lihat Profil\n\
         2. Lihat Semua Kebiasaan\n\
         3. Lihat Kebiasaan Aktif\n\
         4. Lihat Kebiasaan Selesai\n\
         5. Tambah Kebiasaan Baru\n\
         6. Tandai Kebiasaan Selesai\n\
         7. Hapus Kebiasaan\n\
         8. Lihat Statistik\n\
         9. Tampilkan Pengingat\n\
         0. Keluar\n\
         {SEPARATOR}"
    )
}

pub fn render_profile(profile: &Profile, today: NaiveDate) -> String {
    format!(
        "\n{SEPARATOR}\nPROFIL PENGGUNA\n{SEPARATOR}\n\
         Nama: {}\n\
         Bergabung: {}\n\
         Total Hari: {} hari\n\
         Total Kebiasaan: {}\n\
         Selesai Minggu Ini: {}\n\
         {SEPARATOR}",
        profile.name,
        format_day(profile.join_date),
        profile.days_joined(today),
        profile.total_habits,
        profile.completed_this_week,
    )
}

/// `filled` blocks for every 10%, rounded down.
pub fn progress_bar(percent: Percentage) -> String {
    let filled = (*percent / 10).min(BAR_WIDTH) as usize;
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH as usize - filled)
    )
}

pub fn paint_status(status: HabitStatus, color: bool) -> String {
    if !color {
        return status.to_string();
    }
    match status {
        HabitStatus::Active => Colour::Yellow.paint(status.to_string()).to_string(),
        HabitStatus::Finished => Colour::Green.bold().paint(status.to_string()).to_string(),
    }
}

/// Renders habits with the number the user types to select them, i.e. position in the full list
/// plus one.
pub fn render_habits(habits: &[(usize, &Habit)], today: NaiveDate, color: bool) -> String {
    if habits.is_empty() {
        return "Tidak ada kebiasaan untuk ditampilkan.".into();
    }

    let (year, month) = (today.year(), today.month());
    let mut out = String::new();
    for (index, habit) in habits {
        let progress = habit.progress(year, month);
        let status = paint_status(habit.status(year, month), color);
        let _ = writeln!(out, "\n{}. [{status}] {}", index + 1, habit.name());
        let _ = writeln!(out, "   Target: {}x/minggu", habit.target_per_week());
        let _ = writeln!(
            out,
            "   Minggu ini: {} hari",
            habit.this_week_completions(today).len()
        );
        let _ = writeln!(
            out,
            "   Progress bulan ini: {}/{} ({})",
            progress.completions, progress.monthly_target, progress.percent
        );
        let _ = write!(
            out,
            "   Progress Bar: {} {}",
            progress_bar(progress.percent),
            progress.percent
        );
        if let Some(note) = habit.note() {
            let _ = write!(out, "\n   Catatan: {note}");
        }
    }
    out
}

/// Lists habits still waiting for today, or says that nothing is pending.
pub fn render_reminder(pending: &[&Habit]) -> String {
    if pending.is_empty() {
        return format!(
            "{SEPARATOR}\nPENGINGAT: Semua kebiasaan hari ini sudah selesai. Tidak ada yang tertunda.\n{SEPARATOR}"
        );
    }
    let mut out = format!("{SEPARATOR}\nPENGINGAT: Jangan lupa hari ini:");
    for habit in pending {
        let _ = write!(out, "\n - {}", habit.name());
    }
    let _ = write!(out, "\n{SEPARATOR}");
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{
        tracker::{
            habit::{Habit, HabitId, HabitStatus},
            profile::Profile,
        },
        utils::percentage::Percentage,
    };

    use super::{paint_status, progress_bar, render_habits, render_profile, render_reminder};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(Percentage::of(0, 1)), "░░░░░░░░░░");
        assert_eq!(progress_bar(Percentage::of(3, 35)), "░░░░░░░░░░");
        assert_eq!(progress_bar(Percentage::of(1, 4)), "██░░░░░░░░");
        assert_eq!(progress_bar(Percentage::FULL), "██████████");
    }

    #[test]
    fn test_render_habits_uses_list_numbers() {
        let today = day(2025, 4, 9);
        let mut habit = Habit::new(
            HabitId(1),
            "Read".into(),
            Some(7),
            today,
            Some("20 pages".into()),
        );
        for d in [1, 8, 9] {
            habit.mark_complete(day(2025, 4, d));
        }
        let text = render_habits(&[(4, &habit)], today, false);

        assert!(text.contains("5. [Aktif] Read"));
        assert!(text.contains("Target: 7x/minggu"));
        assert!(text.contains("Minggu ini: 2 hari"));
        assert!(text.contains("Progress bulan ini: 3/35 (9%)"));
        assert!(text.contains("Catatan: 20 pages"));
    }

    #[test]
    fn test_render_empty_habits() {
        assert_eq!(
            render_habits(&[], day(2025, 4, 9), false),
            "Tidak ada kebiasaan untuk ditampilkan."
        );
    }

    #[test]
    fn test_render_profile() {
        let mut profile = Profile::new("Adit".into(), day(2025, 4, 1));
        profile.total_habits = 8;
        profile.completed_this_week = 2;
        let text = render_profile(&profile, day(2025, 4, 9));
        assert!(text.contains("Nama: Adit"));
        assert!(text.contains("Bergabung: 2025-04-01"));
        assert!(text.contains("Total Hari: 8 hari"));
        assert!(text.contains("Total Kebiasaan: 8"));
        assert!(text.contains("Selesai Minggu Ini: 2"));
    }

    #[test]
    fn test_render_reminder() {
        let habit = Habit::new(HabitId(1), "Read".into(), None, day(2025, 4, 9), None);
        assert!(render_reminder(&[&habit]).contains(" - Read"));
        assert!(render_reminder(&[]).contains("Tidak ada yang tertunda"));
    }

    #[test]
    fn test_plain_status() {
        assert_eq!(paint_status(HabitStatus::Finished, false), "Selesai");
        assert_ne!(paint_status(HabitStatus::Finished, true), "Selesai");
    }
}
