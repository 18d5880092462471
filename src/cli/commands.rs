use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use crate::{
    tracker::Tracker,
    utils::time::{format_day, parse_day},
};

use super::{
    menu::run_interactive,
    output::{render_habits, render_profile, render_reminder, stats::render_stats},
    Args, Commands,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

fn validation_error(message: String) -> anyhow::Error {
    Args::command()
        .error(clap::error::ErrorKind::ValueValidation, message)
        .into()
}

/// Accepts `YYYY-MM-DD` as well as anything chrono-english understands, like "yesterday" or
/// "15/03/2025".
pub fn parse_day_argument(
    value: &str,
    date_style: DateStyle,
    now: DateTime<Local>,
) -> Result<NaiveDate> {
    if let Ok(day) = parse_day(value) {
        return Ok(day);
    }
    parse_date_string(value, now, date_style.into())
        .map(|v| v.date_naive())
        .map_err(|e| validation_error(format!("Failed to validate day {value:?}: {e}")))
}

/// Number typed by the user (1-based) to list index.
fn to_index(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| validation_error("Habit numbers start at 1".into()))
}

/// Runs `command` against `tracker`. Everything except [Commands::Menu] returns right away.
pub async fn process_command(command: Commands, tracker: &mut Tracker, color: bool) -> Result<()> {
    let today = tracker.today();
    match command {
        Commands::Menu => run_interactive(tracker, color).await?,
        Commands::List { filter } => {
            let habits = tracker.habits_filtered(filter, today);
            println!("{}", render_habits(&habits, today, color));
        }
        Commands::Add { name, target, note } => {
            let added = tracker.add_habit(&name, target, note).await?.name().to_string();
            println!(
                "Habit baru \"{added}\" berhasil ditambahkan sebagai nomor {}.",
                tracker.habits().len()
            );
        }
        Commands::Done {
            number,
            day,
            date_style,
        } => {
            let index = to_index(number)?;
            let day = match day {
                Some(value) => parse_day_argument(&value, date_style, tracker.now())?,
                None => today,
            };
            if !tracker.complete_habit(index, Some(day)).await? {
                return Err(validation_error(format!("There is no habit number {number}")));
            }
            println!(
                "\"{}\" ditandai selesai untuk {}.",
                tracker.habits()[index].name(),
                format_day(day)
            );
        }
        Commands::Remove { number } => {
            let index = to_index(number)?;
            let Some(removed) = tracker.delete_habit(index).await? else {
                return Err(validation_error(format!("There is no habit number {number}")));
            };
            println!("Habit \"{}\" telah dihapus.", removed.name());
        }
        Commands::Stats => {
            println!("{}", render_stats(&tracker.stats(today), color));
        }
        Commands::Profile => {
            println!("{}", render_profile(&tracker.profile(today), today));
        }
        Commands::Remind => {
            println!("{}", render_reminder(&tracker.pending_today(today)));
        }
        Commands::Rename { name } => {
            tracker.rename_profile(&name).await?;
            println!("Nama profil diubah menjadi \"{}\".", name.trim());
        }
        Commands::Reset { yes } => {
            if !yes {
                return Err(validation_error(
                    "Reset removes every habit, pass --yes to confirm".into(),
                ));
            }
            let removed = tracker.clear_all().await?;
            println!("Semua data telah dihapus ({} kebiasaan).", removed.len());
        }
    }
    Ok(())
}
