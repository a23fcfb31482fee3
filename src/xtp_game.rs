// Game state and runtime settings
// Holds the difficulty levels, the player's active selection, and environment-driven settings

use directories::ProjectDirs;
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::xtp_error::{AppError, Result};
use crate::xtp_lang::{normalize_locale, Lang, MsgKey};

/// Locale used when neither the environment nor the system picks one
pub const FALLBACK_LOCALE: &str = "en_US";

/// Difficulty levels; the discriminant is the value carried by the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy = 1,
    Medium = 2,
    Hard = 3,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn level(self) -> u8 {
        self as u8
    }

    /// Catalog key of the localized difficulty label
    pub fn label_key(self) -> MsgKey {
        match self {
            Difficulty::Easy => MsgKey::Easy,
            Difficulty::Medium => MsgKey::Medium,
            Difficulty::Hard => MsgKey::Hard,
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = AppError;

    fn try_from(level: u8) -> Result<Difficulty> {
        match level {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Medium),
            3 => Ok(Difficulty::Hard),
            other => Err(AppError::InvalidDifficulty(other)),
        }
    }
}

/// What the player picked in the menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSelection {
    pub locale: String,
    pub difficulty: Difficulty,
    pub player_name: String,
}

/// Mutable state handed to menu callbacks and the play screen
#[derive(Debug)]
pub struct Context {
    pub lang: Lang,
    pub selection: ActiveSelection,
}

impl Context {
    /// Install `locale` and start from the default selection
    pub fn new(mut lang: Lang, locale: &str) -> Result<Context> {
        lang.install(locale)?;
        let player_name = lang.tr(MsgKey::NameDefault).to_string();
        Ok(Context {
            lang,
            selection: ActiveSelection {
                locale: locale.to_string(),
                difficulty: Difficulty::Easy,
                player_name,
            },
        })
    }

    /// Install a new locale and record it in the selection
    pub fn set_locale(&mut self, locale: &str) -> Result<()> {
        self.lang.install(locale)?;
        self.selection.locale = locale.to_string();
        Ok(())
    }
}

/// Settings read from the environment at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub locale_dir: PathBuf,
    pub locale: Option<String>,
    pub fps: u32,
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            locale_dir: PathBuf::from("locale"),
            locale: None,
            fps: 60,
            log_dir: None,
        }
    }
}

impl Settings {
    /// Read `XTPLAY_LOCALE_DIR`, `XTPLAY_LOCALE`, `XTPLAY_FPS` and `XTPLAY_LOG_DIR`
    pub fn from_env() -> Result<Settings> {
        Settings::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        settings.locale_dir = match lookup("XTPLAY_LOCALE_DIR") {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_locale_dir(),
        };

        settings.locale = lookup("XTPLAY_LOCALE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if let Some(raw) = lookup("XTPLAY_FPS") {
            settings.fps = match raw.trim().parse::<u32>() {
                Ok(fps) if fps > 0 => fps,
                _ => {
                    return Err(AppError::InvalidSetting {
                        name: "XTPLAY_FPS",
                        value: raw,
                    });
                }
            };
        }

        settings.log_dir = lookup("XTPLAY_LOG_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .or_else(default_log_dir);

        Ok(settings)
    }

    /// Choose the startup locale
    /// An explicitly requested locale must exist; the system locale is only a hint
    pub fn initial_locale(&self, lang: &Lang) -> Result<String> {
        if let Some(requested) = &self.locale {
            if !lang.contains(requested) {
                return Err(AppError::UnknownLocale(requested.clone()));
            }
            return Ok(requested.clone());
        }
        if let Some(system) = sys_locale::get_locale() {
            let code = normalize_locale(&system);
            if lang.contains(&code) {
                info!(locale = %code, "using system locale");
                return Ok(code);
            }
        }
        if lang.contains(FALLBACK_LOCALE) {
            return Ok(FALLBACK_LOCALE.to_string());
        }
        Ok(lang.current().to_string())
    }
}

/// `./locale` when present, otherwise `locale/` next to the executable
fn default_locale_dir() -> PathBuf {
    let local = Path::new("locale");
    if local.is_dir() {
        return local.to_path_buf();
    }
    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            let beside = dir.join("locale");
            if beside.is_dir() {
                return beside;
            }
        }
    }
    local.to_path_buf()
}

/// Per-project cache directory, e.g. ~/.cache/xtplay/logs on Linux
fn default_log_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "xhbl", "xtplay").map(|proj| proj.cache_dir().join("logs"))
}
