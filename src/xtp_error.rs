// Error types shared by every module
// Configuration errors abort startup; invalid-state errors abort the UI loop

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("cannot read locale directory {path}: {source}")]
    LocaleDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no locale catalogs found under {0}")]
    NoCatalogs(PathBuf),

    #[error("cannot read catalog {path}: {source}")]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed catalog {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("incomplete catalog {path}: {reason}")]
    CatalogIncomplete { path: PathBuf, reason: String },

    #[error("unknown locale '{0}'")]
    UnknownLocale(String),

    #[error("invalid value for {name}: '{value}'")]
    InvalidSetting { name: &'static str, value: String },

    /// Raised when a difficulty level outside easy/medium/hard reaches the game state
    #[error("unknown difficulty {0}")]
    InvalidDifficulty(u8),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
