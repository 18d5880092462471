pub mod commands;
pub mod menu;
pub mod output;
pub mod shutdown;

use std::{io::IsTerminal, path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{process_command, DateStyle};
use tracing::{info, level_filters::LevelFilter};

use crate::{
    storage::record_storage::JsonFileStorage,
    tracker::{
        profile::DEFAULT_PROFILE_NAME, HabitFilter, InitPolicy, StartupState, Tracker,
        TrackerConfig, DEFAULT_HABITS,
    },
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir, DATA_FILE_NAME},
        logging::{enable_logging, LOG_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "habit-tracker", version)]
#[command(about = "Track habits against weekly targets from the terminal", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default uses $XDG_STATE_HOME/habit-tracker or $HOME/.local/state/habit-tracker"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long = "name",
        global = true,
        default_value = DEFAULT_PROFILE_NAME,
        help = "Profile name used when a new data file is created"
    )]
    profile_name: String,
    #[arg(
        long = "no-seed",
        global = true,
        help = "Start with an empty list instead of the default habits when there is no data file"
    )]
    no_seed: bool,
    #[arg(
        long = "reminder-interval",
        global = true,
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds between reminders while the menu waits for input"
    )]
    reminder_interval: u64,
    #[arg(long, global = true, help = "Mirror logs to stdout")]
    log: bool,
    #[arg(long = "log-filter", global = true, help = "Log level, overrides RUST_LOG")]
    log_filter: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Open the interactive menu. This is the default")]
    Menu,
    #[command(about = "List habits with their progress for the current month")]
    List {
        #[arg(long, short, value_enum, default_value_t = HabitFilter::All)]
        filter: HabitFilter,
    },
    #[command(about = "Add a new habit")]
    Add {
        name: String,
        #[arg(long, short, help = "Target per week. Defaults to 7")]
        target: Option<u32>,
        #[arg(long, short)]
        note: Option<String>,
    },
    #[command(about = "Mark a habit as done")]
    Done {
        #[arg(help = "Habit number as shown by `list`")]
        number: usize,
        #[arg(
            long,
            short,
            help = "Day of the completion. Examples are \"2025-03-15\", \"yesterday\", \"15/03/2025\". Defaults to today"
        )]
        day: Option<String>,
        #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
        date_style: DateStyle,
    },
    #[command(about = "Delete a habit")]
    Remove {
        #[arg(help = "Habit number as shown by `list`")]
        number: usize,
    },
    #[command(about = "Show monthly statistics")]
    Stats,
    #[command(about = "Show the profile")]
    Profile,
    #[command(about = "List habits that are still pending today")]
    Remind,
    #[command(about = "Change the profile name")]
    Rename { name: String },
    #[command(about = "Delete every habit")]
    Reset {
        #[arg(long, help = "Confirm removing every habit")]
        yes: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };
    let logging_level = args
        .log_filter
        .or_else(|| args.log.then_some(LevelFilter::TRACE));
    enable_logging(LOG_PREFIX, &app_dir, logging_level, args.log)?;

    let storage = JsonFileStorage::new(app_dir.join(DATA_FILE_NAME))?;
    info!("Storing habits in {:?}", storage.path());
    let config = TrackerConfig {
        profile_name: args.profile_name,
        init_policy: if args.no_seed {
            InitPolicy::Empty
        } else {
            InitPolicy::SeedDefaults
        },
        reminder_interval: Duration::from_secs(args.reminder_interval),
    };
    let (mut tracker, state) =
        Tracker::open(Box::new(storage), Box::new(DefaultClock), config).await;
    report_startup(&state);

    let color = std::io::stdout().is_terminal();
    process_command(
        args.commands.unwrap_or(Commands::Menu),
        &mut tracker,
        color,
    )
    .await
}

fn report_startup(state: &StartupState) {
    match state {
        StartupState::Seeded { save_error: None } => {
            println!(
                "Data baru dibuat dengan {} kebiasaan bawaan.",
                DEFAULT_HABITS.len()
            );
        }
        StartupState::Seeded {
            save_error: Some(error),
        }
        | StartupState::Created {
            save_error: Some(error),
        } => {
            eprintln!("Peringatan: data awal gagal disimpan ({error}).");
            eprintln!("Perubahan akan dicoba disimpan lagi saat data berubah.");
        }
        StartupState::Recovered { error, moved_to } => {
            eprintln!("Peringatan: data kebiasaan tidak dapat dibaca ({error}).");
            eprintln!("Memulai dengan daftar kosong.");
            if let Some(path) = moved_to {
                eprintln!("File lama disimpan di {}", path.display());
            }
        }
        StartupState::Restored | StartupState::Created { save_error: None } => {}
    }
}
