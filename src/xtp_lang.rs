// Multi-language support module
// Loads one TOML message catalog per locale directory and resolves typed message keys

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::xtp_error::{AppError, Result};

/// File name expected inside every `locale/<code>/` directory
pub const CATALOG_FILE: &str = "messages.toml";

/// Every plain message a catalog must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgKey {
    WindowTitle,
    WidgetFont,
    AppTitle,
    Name,
    NameDefault,
    Difficulty,
    Language,
    Play,
    Quit,
    Easy,
    Medium,
    Hard,
    InstructionBackToMenu,
    Score,
}

impl MsgKey {
    pub const ALL: [MsgKey; 14] = [
        MsgKey::WindowTitle,
        MsgKey::WidgetFont,
        MsgKey::AppTitle,
        MsgKey::Name,
        MsgKey::NameDefault,
        MsgKey::Difficulty,
        MsgKey::Language,
        MsgKey::Play,
        MsgKey::Quit,
        MsgKey::Easy,
        MsgKey::Medium,
        MsgKey::Hard,
        MsgKey::InstructionBackToMenu,
        MsgKey::Score,
    ];

    /// Catalog identifier, stable across versions
    pub fn id(self) -> &'static str {
        match self {
            MsgKey::WindowTitle => "window_title",
            MsgKey::WidgetFont => "widget_font",
            MsgKey::AppTitle => "app_title",
            MsgKey::Name => "name",
            MsgKey::NameDefault => "name_default",
            MsgKey::Difficulty => "difficulty",
            MsgKey::Language => "language",
            MsgKey::Play => "play",
            MsgKey::Quit => "quit",
            MsgKey::Easy => "easy",
            MsgKey::Medium => "medium",
            MsgKey::Hard => "hard",
            MsgKey::InstructionBackToMenu => "instruction_back_to_menu",
            MsgKey::Score => "score",
        }
    }
}

/// Messages with count-dependent forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralKey {
    GameMessage,
}

impl PluralKey {
    pub const ALL: [PluralKey; 1] = [PluralKey::GameMessage];

    /// Identifier of the singular form; catalogs key their `[plurals]` table by it
    pub fn singular_id(self) -> &'static str {
        match self {
            PluralKey::GameMessage => "game_message",
        }
    }

    pub fn plural_id(self) -> &'static str {
        match self {
            PluralKey::GameMessage => "game_message_plural",
        }
    }
}

/// Plural form selection, one variant per gettext `plural=` expression we ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluralRule {
    /// nplurals=1; plural=0 (Chinese, Japanese, ...)
    Single,
    /// nplurals=2; plural=(n != 1) (English, German, ...)
    OneOther,
    /// nplurals=3; the Russian/Ukrainian rule
    Slavic,
}

impl PluralRule {
    pub fn forms(self) -> usize {
        match self {
            PluralRule::Single => 1,
            PluralRule::OneOther => 2,
            PluralRule::Slavic => 3,
        }
    }

    /// Index of the form to use for `n`
    pub fn index(self, n: u64) -> usize {
        match self {
            PluralRule::Single => 0,
            PluralRule::OneOther => {
                if n == 1 {
                    0
                } else {
                    1
                }
            }
            PluralRule::Slavic => {
                let (m10, m100) = (n % 10, n % 100);
                if m10 == 1 && m100 != 11 {
                    0
                } else if (2..=4).contains(&m10) && !(12..=14).contains(&m100) {
                    1
                } else {
                    2
                }
            }
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    meta: CatalogMeta,
    messages: HashMap<String, String>,
    #[serde(default)]
    plurals: HashMap<String, Vec<String>>,
}

#[derive(Deserialize)]
struct CatalogMeta {
    name: String,
    plural: PluralRule,
    #[serde(default = "default_decimal_separator")]
    decimal_separator: String,
    #[serde(default = "default_group_separator")]
    group_separator: String,
}

fn default_decimal_separator() -> String {
    ".".to_string()
}

fn default_group_separator() -> String {
    ",".to_string()
}

/// A single loaded locale; immutable once built
#[derive(Debug, Clone)]
pub struct Catalog {
    pub id: String,
    pub name: String,
    pub plural: PluralRule,
    decimal_separator: String,
    group_separator: String,
    messages: HashMap<String, String>,
    plurals: HashMap<String, Vec<String>>,
}

impl Catalog {
    /// Parse and validate catalog text. `path` is only used for error reporting.
    pub fn parse(id: &str, path: &Path, text: &str) -> Result<Catalog> {
        let file: CatalogFile = toml::from_str(text).map_err(|source| AppError::CatalogParse {
            path: path.to_path_buf(),
            source,
        })?;

        let missing: Vec<&str> = MsgKey::ALL
            .iter()
            .map(|k| k.id())
            .filter(|id| !file.messages.contains_key(*id))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::CatalogIncomplete {
                path: path.to_path_buf(),
                reason: format!("missing messages: {}", missing.join(", ")),
            });
        }

        let needed = file.meta.plural.forms();
        for key in PluralKey::ALL {
            let forms = file.plurals.get(key.singular_id()).map_or(0, |f| f.len());
            if forms < needed {
                return Err(AppError::CatalogIncomplete {
                    path: path.to_path_buf(),
                    reason: format!(
                        "plural '{}' has {} form(s), rule needs {}",
                        key.singular_id(),
                        forms,
                        needed
                    ),
                });
            }
        }

        Ok(Catalog {
            id: id.to_string(),
            name: file.meta.name,
            plural: file.meta.plural,
            decimal_separator: file.meta.decimal_separator,
            group_separator: file.meta.group_separator,
            messages: file.messages,
            plurals: file.plurals,
        })
    }

    pub fn from_file(id: &str, path: &Path) -> Result<Catalog> {
        let text = fs::read_to_string(path).map_err(|source| AppError::CatalogIo {
            path: path.to_path_buf(),
            source,
        })?;
        Catalog::parse(id, path, &text)
    }

    pub fn get(&self, key: MsgKey) -> &str {
        match self.messages.get(key.id()) {
            Some(s) => s.as_str(),
            None => {
                warn!(locale = %self.id, key = key.id(), "missing message");
                key.id()
            }
        }
    }

    /// Pick the plural form for `n` and substitute `{n}`
    pub fn plural(&self, key: PluralKey, n: u64) -> String {
        let form = self
            .plurals
            .get(key.singular_id())
            .and_then(|forms| forms.get(self.plural.index(n)));
        match form {
            Some(f) => f.replace("{n}", &n.to_string()),
            None => {
                // same fallback as gettext: the untranslated ids
                warn!(locale = %self.id, key = key.singular_id(), "missing plural form");
                if n == 1 {
                    key.singular_id().to_string()
                } else {
                    key.plural_id().to_string()
                }
            }
        }
    }

    /// Render using the `#,##0.###` pattern with this locale's separators
    pub fn format_number(&self, value: f64) -> String {
        format_decimal(value, &self.decimal_separator, &self.group_separator)
    }
}

/// Format a decimal with grouped thousands and at most three fraction digits
pub fn format_decimal(value: f64, decimal_sep: &str, group_sep: &str) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let scaled = (value.abs() * 1000.0).round() as u64;
    let int_digits = (scaled / 1000).to_string();
    let frac = scaled % 1000;

    let mut out = String::new();
    if value < 0.0 && scaled > 0 {
        out.push('-');
    }
    let len = int_digits.len();
    for (i, ch) in int_digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(group_sep);
        }
        out.push(ch);
    }
    if frac > 0 {
        let digits = format!("{:03}", frac);
        out.push_str(decimal_sep);
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

/// Main language manager
/// Holds every loaded catalog plus the code of the installed one
#[derive(Debug, Clone)]
pub struct Lang {
    catalogs: BTreeMap<String, Catalog>,
    current_lang: String,
}

impl Lang {
    /// Load every immediate subdirectory of `base_dir` as a catalog keyed by directory name.
    /// The first locale (by code) is installed initially.
    pub fn load(base_dir: &Path) -> Result<Lang> {
        let entries = fs::read_dir(base_dir).map_err(|source| AppError::LocaleDir {
            path: base_dir.to_path_buf(),
            source,
        })?;

        let mut catalogs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| AppError::LocaleDir {
                path: base_dir.to_path_buf(),
                source,
            })?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let Some(id) = dir.file_name().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let file: PathBuf = dir.join(CATALOG_FILE);
            let catalog = Catalog::from_file(&id, &file)?;
            debug!(locale = %id, path = %file.display(), "loaded catalog");
            catalogs.push(catalog);
        }

        if catalogs.is_empty() {
            return Err(AppError::NoCatalogs(base_dir.to_path_buf()));
        }
        Lang::from_catalogs(catalogs).ok_or_else(|| AppError::NoCatalogs(base_dir.to_path_buf()))
    }

    /// Build from already parsed catalogs; None if the list is empty
    pub fn from_catalogs(catalogs: Vec<Catalog>) -> Option<Lang> {
        let catalogs: BTreeMap<String, Catalog> =
            catalogs.into_iter().map(|c| (c.id.clone(), c)).collect();
        let current_lang = catalogs.keys().next()?.clone();
        Some(Lang {
            catalogs,
            current_lang,
        })
    }

    /// Switch the active catalog; subsequent lookups resolve against it
    pub fn install(&mut self, locale_id: &str) -> Result<()> {
        if !self.catalogs.contains_key(locale_id) {
            return Err(AppError::UnknownLocale(locale_id.to_string()));
        }
        self.current_lang = locale_id.to_string();
        Ok(())
    }

    pub fn contains(&self, locale_id: &str) -> bool {
        self.catalogs.contains_key(locale_id)
    }

    pub fn current(&self) -> &str {
        &self.current_lang
    }

    pub fn active(&self) -> &Catalog {
        // current_lang is only ever set to a loaded key
        &self.catalogs[&self.current_lang]
    }

    pub fn catalog(&self, locale_id: &str) -> Result<&Catalog> {
        self.catalogs
            .get(locale_id)
            .ok_or_else(|| AppError::UnknownLocale(locale_id.to_string()))
    }

    /// `(code, display name)` pairs sorted by code
    pub fn locales(&self) -> Vec<(String, String)> {
        self.catalogs
            .values()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect()
    }

    pub fn tr(&self, key: MsgKey) -> &str {
        self.active().get(key)
    }

    pub fn tr_plural(&self, key: PluralKey, n: u64) -> String {
        self.active().plural(key, n)
    }

    pub fn format_number(&self, value: f64, locale_id: &str) -> Result<String> {
        Ok(self.catalog(locale_id)?.format_number(value))
    }
}

/// Normalize an OS locale tag ("de-DE", "de_DE.UTF-8") to a catalog code ("de_DE")
pub fn normalize_locale(tag: &str) -> String {
    let base = tag.split(['.', '@']).next().unwrap_or(tag);
    let mut parts = base.split(['-', '_']);
    let lang = parts.next().unwrap_or("").to_lowercase();
    match parts.next() {
        Some(region) if !region.is_empty() => format!("{}_{}", lang, region.to_uppercase()),
        _ => lang,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    pub(crate) fn shipped_locale_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("locale")
    }

    pub(crate) fn shipped() -> Lang {
        Lang::load(&shipped_locale_dir()).expect("shipped catalogs load")
    }

    fn write_catalog(root: &Path, id: &str, body: &str) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CATALOG_FILE), body).unwrap();
    }

    fn en_us_text() -> String {
        fs::read_to_string(shipped_locale_dir().join("en_US").join(CATALOG_FILE)).unwrap()
    }

    #[test]
    fn loads_every_shipped_locale() {
        let lang = shipped();
        let codes: Vec<String> = lang.locales().into_iter().map(|(c, _)| c).collect();
        assert_eq!(codes, vec!["de_DE", "en_US", "zh_CN"]);
        assert_eq!(lang.catalog("zh_CN").unwrap().name, "简体中文");
    }

    #[test]
    fn install_switches_lookups() {
        let mut lang = shipped();
        lang.install("en_US").unwrap();
        assert_eq!(lang.tr(MsgKey::Play), "Play");
        lang.install("de_DE").unwrap();
        assert_eq!(lang.tr(MsgKey::Play), "Spielen");
        assert_eq!(lang.current(), "de_DE");
    }

    #[test]
    fn install_unknown_locale_keeps_current() {
        let mut lang = shipped();
        lang.install("en_US").unwrap();
        let err = lang.install("fr_FR").unwrap_err();
        assert!(matches!(err, AppError::UnknownLocale(ref id) if id == "fr_FR"));
        assert_eq!(lang.current(), "en_US");
    }

    #[test]
    fn plural_forms_follow_catalog_rule() {
        let mut lang = shipped();
        lang.install("en_US").unwrap();
        assert_eq!(lang.tr_plural(PluralKey::GameMessage, 1), "1 enemy is waiting for you!");
        assert_eq!(lang.tr_plural(PluralKey::GameMessage, 3), "3 enemies are waiting for you!");
        lang.install("zh_CN").unwrap();
        assert_eq!(lang.tr_plural(PluralKey::GameMessage, 2), "有 2 个敌人在等着你！");
    }

    #[test]
    fn plural_rule_indices() {
        assert_eq!(PluralRule::Single.index(5), 0);
        assert_eq!(PluralRule::OneOther.index(0), 1);
        assert_eq!(PluralRule::OneOther.index(1), 0);
        let slavic: Vec<usize> = [1, 2, 5, 11, 12, 21, 22, 25, 111]
            .iter()
            .map(|n| PluralRule::Slavic.index(*n))
            .collect();
        assert_eq!(slavic, vec![0, 1, 2, 2, 2, 0, 1, 2, 2]);
    }

    #[test]
    fn numbers_use_locale_separators() {
        let lang = shipped();
        assert_eq!(lang.format_number(12345.6, "en_US").unwrap(), "12,345.6");
        assert_eq!(lang.format_number(12345.6, "de_DE").unwrap(), "12.345,6");
        assert!(lang.format_number(1.0, "xx_XX").is_err());
    }

    #[test]
    fn decimal_pattern_edges() {
        assert_eq!(format_decimal(0.0, ".", ","), "0");
        assert_eq!(format_decimal(999.0, ".", ","), "999");
        assert_eq!(format_decimal(1000.0, ".", ","), "1,000");
        assert_eq!(format_decimal(1234567.25, ".", ","), "1,234,567.25");
        assert_eq!(format_decimal(-0.1234, ".", ","), "-0.123");
        assert_eq!(format_decimal(2.5, ",", "\u{a0}"), "2,5");
    }

    #[test]
    fn files_next_to_locale_dirs_are_ignored() {
        let root = TempDir::new().unwrap();
        write_catalog(root.path(), "en_US", &en_us_text());
        fs::write(root.path().join("README.txt"), "not a locale").unwrap();
        let lang = Lang::load(root.path()).unwrap();
        assert_eq!(lang.locales().len(), 1);
        assert_eq!(lang.current(), "en_US");
    }

    #[test]
    fn directory_without_catalog_is_fatal() {
        let root = TempDir::new().unwrap();
        write_catalog(root.path(), "en_US", &en_us_text());
        fs::create_dir_all(root.path().join("fr_FR")).unwrap();
        let err = Lang::load(root.path()).unwrap_err();
        assert!(matches!(err, AppError::CatalogIo { .. }));
    }

    #[test]
    fn incomplete_catalog_is_rejected() {
        let root = TempDir::new().unwrap();
        let text = en_us_text().replace("score = \"Score\"\n", "");
        write_catalog(root.path(), "en_US", &text);
        match Lang::load(root.path()).unwrap_err() {
            AppError::CatalogIncomplete { reason, .. } => assert!(reason.contains("score")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn too_few_plural_forms_are_rejected() {
        let root = TempDir::new().unwrap();
        let text = en_us_text().replace("plural = \"one-other\"", "plural = \"slavic\"");
        write_catalog(root.path(), "ru_RU", &text);
        assert!(matches!(
            Lang::load(root.path()).unwrap_err(),
            AppError::CatalogIncomplete { .. }
        ));
    }

    #[test]
    fn malformed_catalog_is_rejected() {
        let root = TempDir::new().unwrap();
        write_catalog(root.path(), "en_US", "[meta\nname = ");
        assert!(matches!(
            Lang::load(root.path()).unwrap_err(),
            AppError::CatalogParse { .. }
        ));
    }

    #[test]
    fn empty_or_missing_root_is_fatal() {
        let root = TempDir::new().unwrap();
        assert!(matches!(Lang::load(root.path()).unwrap_err(), AppError::NoCatalogs(_)));
        let missing = root.path().join("nope");
        assert!(matches!(Lang::load(&missing).unwrap_err(), AppError::LocaleDir { .. }));
    }

    #[test]
    fn os_locale_tags_normalize() {
        assert_eq!(normalize_locale("de-DE"), "de_DE");
        assert_eq!(normalize_locale("zh_cn.UTF-8"), "zh_CN");
        assert_eq!(normalize_locale("en"), "en");
    }
}
