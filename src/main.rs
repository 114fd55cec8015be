mod audio;
mod clock;
mod config;
mod models;
mod session;
mod store;
mod ui;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use crate::audio::{Chime, SilentChime, TerminalBell};
use crate::clock::SystemClock;
use crate::config::settings::{CliOverrides, Settings};
use crate::session::lifecycle::SessionController;
use crate::store::{JsonFileStore, MemoryStore, SessionStore};
use crate::ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Purpose Anchor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Focus sessions with intention, reflection and a history calendar")
        .arg(
            Arg::new("data-file")
                .long("data-file")
                .value_name("PATH")
                .help("Where session history is stored (JSON)"),
        )
        .arg(
            Arg::new("mute")
                .long("mute")
                .help("Do not ring the terminal bell when a session completes")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ephemeral")
                .long("ephemeral")
                .help("Keep sessions in memory only; nothing is written to disk")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let settings = Settings::new(CliOverrides {
        data_file: matches.get_one::<String>("data-file").map(PathBuf::from),
        mute: matches.get_flag("mute"),
        ephemeral: matches.get_flag("ephemeral"),
    })?;

    init_logging(&settings)?;

    log::info!("Starting Purpose Anchor");
    let store: Box<dyn SessionStore> = if settings.ephemeral {
        log::info!("Ephemeral mode - sessions will not be persisted");
        Box::new(MemoryStore::new())
    } else {
        let file_store = JsonFileStore::new(&settings.data_file);
        log::info!("Session history: {}", file_store.path().display());
        Box::new(file_store)
    };
    let chime: Box<dyn Chime> = if settings.mute {
        Box::new(SilentChime)
    } else {
        Box::new(TerminalBell)
    };

    let controller = SessionController::new(store, chime, Box::new(SystemClock));
    let mut app = App::new(controller);
    app.run().await?;

    log::info!("Purpose Anchor stopped");
    Ok(())
}

fn init_logging(settings: &Settings) -> Result<()> {
    if settings.debug_logs {
        // Logging to the terminal would corrupt the alternate screen
        if let Some(parent) = settings.log_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.log_file)?;

        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("purpose_anchor=debug"),
        )
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

        log::info!("=== DEBUG LOGGING ENABLED ===");
        log::info!("Writing logs to {}", settings.log_file.display());
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();
    }
    Ok(())
}
