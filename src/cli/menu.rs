use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::tracker::{HabitFilter, Tracker};

use super::{
    output::{
        render_habits, render_menu, render_profile, render_reminder, stats::render_stats, SEPARATOR,
    },
    shutdown::detect_shutdown,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Profile,
    List(HabitFilter),
    Add,
    Complete,
    Delete,
    Stats,
    Reminder,
    Exit,
}

impl MenuChoice {
    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "1" => Some(Self::Profile),
            "2" => Some(Self::List(HabitFilter::All)),
            "3" => Some(Self::List(HabitFilter::Active)),
            "4" => Some(Self::List(HabitFilter::Finished)),
            "5" => Some(Self::Add),
            "6" => Some(Self::Complete),
            "7" => Some(Self::Delete),
            "8" => Some(Self::Stats),
            "9" => Some(Self::Reminder),
            "0" => Some(Self::Exit),
            _ => None,
        }
    }
}

enum PromptEvent {
    Line(Option<String>),
    Reminder,
    Shutdown,
}

/// Turns a 1-based number typed by the user into a list index.
fn parse_selection(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()?.checked_sub(1)
}

/// The interactive menu loop. Reads one line at a time from `input` and runs exactly one command
/// before prompting again.
///
/// The reminder stays armed while the main menu waits for a choice and is stopped for the
/// duration of the add/complete/delete dialogs, so a reminder is never printed in the middle of a
/// dialog.
pub struct Menu<R, W> {
    input: Lines<R>,
    output: W,
    shutdown: CancellationToken,
    color: bool,
}

impl<R: AsyncBufRead + Unpin, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W, shutdown: CancellationToken, color: bool) -> Self {
        Self {
            input: input.lines(),
            output,
            shutdown,
            color,
        }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }

    pub async fn run(&mut self, tracker: &mut Tracker) -> Result<()> {
        tracker.reminder_mut().start();
        debug!("Reminding every {:?}", tracker.reminder().period());
        let result = self.run_loop(tracker).await;
        tracker.reminder_mut().stop();
        result?;
        writeln!(self.output, "\nTerima kasih sudah menggunakan Habit Tracker!")?;
        Ok(())
    }

    async fn run_loop(&mut self, tracker: &mut Tracker) -> Result<()> {
        loop {
            writeln!(self.output, "{}", render_menu())?;
            let Some(line) = self.prompt(tracker, "Pilih menu: ").await? else {
                return Ok(());
            };
            let Some(choice) = MenuChoice::parse(&line) else {
                writeln!(self.output, "Pilihan tidak valid.")?;
                continue;
            };
            debug!("Menu choice {choice:?}");

            let keep_going = match choice {
                MenuChoice::Exit => return Ok(()),
                MenuChoice::Add | MenuChoice::Complete | MenuChoice::Delete => {
                    tracker.reminder_mut().stop();
                    let result = self.run_dialog(choice, tracker).await;
                    tracker.reminder_mut().start();
                    result?
                }
                MenuChoice::Profile => {
                    let today = tracker.today();
                    writeln!(self.output, "{}", render_profile(&tracker.profile(today), today))?;
                    true
                }
                MenuChoice::List(filter) => {
                    self.show_habits(tracker, filter)?;
                    true
                }
                MenuChoice::Stats => {
                    let stats = tracker.stats(tracker.today());
                    writeln!(self.output, "{}", render_stats(&stats, self.color))?;
                    true
                }
                MenuChoice::Reminder => {
                    self.show_reminder(tracker)?;
                    true
                }
            };
            if !keep_going {
                return Ok(());
            }
        }
    }

    /// Waits for the next line. Returns `None` when input is closed or shutdown was requested.
    async fn prompt(&mut self, tracker: &mut Tracker, prompt: &str) -> Result<Option<String>> {
        self.write_prompt(prompt)?;
        loop {
            let event = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => PromptEvent::Shutdown,
                line = self.input.next_line() => PromptEvent::Line(line?),
                _ = tracker.reminder_mut().tick() => PromptEvent::Reminder,
            };
            match event {
                PromptEvent::Line(line) => return Ok(line),
                PromptEvent::Shutdown => {
                    info!("Shutdown requested while waiting for input");
                    return Ok(None);
                }
                PromptEvent::Reminder => {
                    writeln!(self.output)?;
                    self.show_reminder(tracker)?;
                    self.write_prompt(prompt)?;
                }
            }
        }
    }

    fn write_prompt(&mut self, prompt: &str) -> Result<()> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        Ok(())
    }

    fn show_habits(&mut self, tracker: &Tracker, filter: HabitFilter) -> Result<()> {
        let today = tracker.today();
        let habits = tracker.habits_filtered(filter, today);
        writeln!(self.output, "{}", render_habits(&habits, today, self.color))?;
        Ok(())
    }

    fn show_reminder(&mut self, tracker: &Tracker) -> Result<()> {
        let pending = tracker.pending_today(tracker.today());
        writeln!(self.output, "{}", render_reminder(&pending))?;
        Ok(())
    }

    fn report_failure(&mut self, error: anyhow::Error) -> Result<()> {
        writeln!(self.output, "Gagal menyimpan data: {error}")?;
        Ok(())
    }

    /// Returns false when input ended during the dialog.
    async fn run_dialog(&mut self, choice: MenuChoice, tracker: &mut Tracker) -> Result<bool> {
        match choice {
            MenuChoice::Add => self.add_dialog(tracker).await,
            MenuChoice::Complete => self.complete_dialog(tracker).await,
            MenuChoice::Delete => self.delete_dialog(tracker).await,
            _ => Ok(true),
        }
    }

    async fn add_dialog(&mut self, tracker: &mut Tracker) -> Result<bool> {
        let Some(name) = self.prompt(tracker, "Masukkan nama kebiasaan: ").await? else {
            return Ok(false);
        };
        if name.trim().is_empty() {
            writeln!(self.output, "Nama kebiasaan tidak boleh kosong.")?;
            return Ok(true);
        }
        let Some(target) = self.prompt(tracker, "Target per minggu: ").await? else {
            return Ok(false);
        };
        let Some(note) = self.prompt(tracker, "Catatan (opsional): ").await? else {
            return Ok(false);
        };

        let target = target.trim().parse::<u32>().ok();
        let note = Some(note).filter(|v| !v.trim().is_empty());
        match tracker.add_habit(&name, target, note).await {
            Ok(habit) => {
                let message = format!(
                    "Habit baru \"{}\" berhasil ditambahkan! Target {}x/minggu.",
                    habit.name(),
                    habit.target_per_week()
                );
                writeln!(self.output, "{message}")?;
            }
            Err(e) => self.report_failure(e)?,
        }
        Ok(true)
    }

    async fn complete_dialog(&mut self, tracker: &mut Tracker) -> Result<bool> {
        self.show_habits(tracker, HabitFilter::All)?;
        if tracker.habits().is_empty() {
            return Ok(true);
        }
        let Some(line) = self.prompt(tracker, "Pilih nomor kebiasaan: ").await? else {
            return Ok(false);
        };
        let Some(index) = parse_selection(&line) else {
            writeln!(self.output, "Input tidak valid.")?;
            return Ok(true);
        };

        let today = tracker.today();
        let already_done = tracker
            .habits()
            .get(index)
            .is_some_and(|h| h.is_completed_on(today));
        match tracker.complete_habit(index, None).await {
            Ok(true) => {
                let name = tracker.habits()[index].name().to_string();
                if already_done {
                    writeln!(self.output, "\"{name}\" sudah ditandai selesai hari ini.")?;
                } else {
                    writeln!(self.output, "\"{name}\" ditandai selesai hari ini.")?;
                }
            }
            Ok(false) => writeln!(self.output, "Habit tidak ditemukan.")?,
            Err(e) => self.report_failure(e)?,
        }
        Ok(true)
    }

    async fn delete_dialog(&mut self, tracker: &mut Tracker) -> Result<bool> {
        self.show_habits(tracker, HabitFilter::All)?;
        if tracker.habits().is_empty() {
            return Ok(true);
        }
        let Some(line) = self.prompt(tracker, "Nomor habit yang ingin dihapus: ").await? else {
            return Ok(false);
        };
        let Some(index) = parse_selection(&line) else {
            writeln!(self.output, "Input tidak valid.")?;
            return Ok(true);
        };

        match tracker.delete_habit(index).await {
            Ok(Some(removed)) => {
                writeln!(self.output, "Habit \"{}\" telah dihapus.", removed.name())?
            }
            Ok(None) => writeln!(self.output, "Habit tidak ditemukan.")?,
            Err(e) => self.report_failure(e)?,
        }
        Ok(true)
    }
}

/// Runs the menu on the terminal until the user exits, input closes or Ctrl-C is pressed.
pub async fn run_interactive(tracker: &mut Tracker, color: bool) -> Result<()> {
    println!("{SEPARATOR}\n SELAMAT DATANG DI HABIT TRACKER CLI\n{SEPARATOR}");

    let shutdown = CancellationToken::new();
    let detector = tokio::spawn(detect_shutdown(shutdown.clone()));

    let mut menu = Menu::new(
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
        shutdown.clone(),
        color,
    );
    let result = menu.run(tracker).await;

    shutdown.cancel();
    let _ = detector.await;
    result
}
