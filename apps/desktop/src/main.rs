use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{ControllerError, HtmlView, RegistrationController};
use shared::{domain::StudentId, form::RegistrationForm};
use storage::{DiscardedSlot, FileKeyValueStore, StudentStore};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Student registration registry")]
struct Cli {
    /// Directory holding the registry slot (overrides settings).
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Name of the registry slot (overrides settings).
    #[arg(long)]
    storage_key: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a student.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        age: String,
        #[arg(long, default_value = "")]
        gender: String,
        #[arg(long = "course")]
        courses: Vec<String>,
    },
    /// Print the rendered list.
    List,
    /// Remove a student by id.
    Remove { id: StudentId },
    /// Remove a student by its position in the rendered list.
    RemoveAt {
        #[arg(allow_negative_numbers = true)]
        position: i64,
    },
    /// Remove every student.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings()?;
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }
    if let Some(key) = cli.storage_key {
        settings.storage_key = key;
    }

    debug!(
        data_dir = %settings.data_dir.display(),
        key = %settings.storage_key,
        "opening student registry"
    );
    let backend = FileKeyValueStore::new(&settings.data_dir);
    let store = StudentStore::with_key(backend, &settings.storage_key)
        .on_discard(|discarded| eprintln!("{}", discard_notice(discarded)));

    let assume_yes = matches!(cli.command, Command::Clear { yes: true });
    let view = HtmlView::new().with_confirm(move |prompt| assume_yes || ask(prompt));
    let mut controller = RegistrationController::new(store, view);

    let outcome = match cli.command {
        Command::Register {
            name,
            email,
            age,
            gender,
            courses,
        } => {
            let form = RegistrationForm {
                name,
                email,
                age,
                gender,
                courses,
            };
            controller.submit(&form).map(|record| {
                println!("registered id={}", record.id);
            })
        }
        Command::List => {
            controller.refresh();
            Ok(())
        }
        Command::Remove { id } => controller.remove(id).map(drop),
        Command::RemoveAt { position } => controller.remove_at(position).map(drop),
        Command::Clear { .. } => controller.clear_all().map(drop),
    };

    // Rejected or no-op actions leave the list unrendered.
    if controller.view().list_markup().is_empty() {
        controller.refresh();
    }
    print!("{}", controller.view().list_markup());
    if let Some(status) = controller.view().status() {
        eprintln!("{}", status.text);
    }

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(ControllerError::Validation(_)) => Ok(ExitCode::from(2)),
        Err(ControllerError::Storage(err)) => Err(err),
    }
}

fn discard_notice(discarded: &DiscardedSlot) -> String {
    format!(
        "warning: saved registry '{}' could not be read and is shown as empty; \
         registering or removing a student will overwrite it",
        discarded.key
    )
}

fn ask(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    if io::stderr().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
