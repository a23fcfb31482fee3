// Entry point for the localized menu demo
// Reads settings, loads the locale catalogs, and launches the terminal UI

use std::process;
use tracing::error;

// Module declarations
mod xtp_color; // Terminal color depth, menu theme, and catalog font styles
mod xtp_error; // Error taxonomy shared by all modules
mod xtp_game;  // Difficulty, player selection, and runtime settings
mod xtp_lang;  // Locale catalogs, plural rules, and number formatting
mod xtp_log;   // Session log file
mod xtp_menu;  // Menu screen widgets and locale bindings
mod xtp_play;  // Play screen loop
mod xtp_ui;    // Terminal lifecycle and the top-level loop

use xtp_error::Result;
use xtp_game::{Context, Settings};
use xtp_lang::Lang;
use xtp_ui::run as run_ui;

fn launch(settings: &Settings) -> Result<()> {
    // Catalog problems are fatal before the terminal is touched
    let lang = Lang::load(&settings.locale_dir)?;
    let locale = settings.initial_locale(&lang)?;
    let mut ctx = Context::new(lang, &locale)?;

    run_ui(settings, &mut ctx)
}

fn start() -> Result<()> {
    let settings = Settings::from_env()?;
    // keep the guard alive so buffered records are flushed on return
    let _log_guard = xtp_log::init(&settings)?;
    launch(&settings).inspect_err(|e| error!("{}", e))
}

fn main() {
    if let Err(e) = start() {
        eprintln!("xtplay: {}", e);
        process::exit(1);
    }
}
