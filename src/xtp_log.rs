// File logging
// The terminal belongs to the UI, so log records go to a per-session file only

use chrono::Local;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::xtp_error::Result;
use crate::xtp_game::Settings;

/// Log file name for a session started now, e.g. `xtplay-20261018-110000.log`
pub fn session_file_name() -> String {
    format!("xtplay-{}.log", Local::now().format("%Y%m%d-%H%M%S"))
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
/// The returned guard must live until exit or buffered records are lost.
pub fn init(settings: &Settings) -> Result<Option<WorkerGuard>> {
    let Some(dir) = &settings.log_dir else {
        return Ok(None);
    };
    fs::create_dir_all(dir)?;

    let file_name = session_file_name();
    let appender = tracing_appender::rolling::never(dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    let path: PathBuf = dir.join(&file_name);
    info!(path = %path.display(), "logging initialized");
    Ok(Some(guard))
}
