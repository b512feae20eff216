//! Language negotiation and the persisted language preference
//!
//! Only the preferred language tag is ever persisted. The resolved tree is
//! rebuilt from its documents every time a language is loaded.

use crate::error::I18nResult;
use crate::fallbacks::DEFAULT_LANGUAGE;
use crate::loader::validate_language;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Preference key holding the user's language tag
pub const LANGUAGE_PREFERENCE_KEY: &str = "preferredLanguage";

/// A small string key/value store, the local-storage of this application
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> I18nResult<()>;
    fn remove(&mut self, key: &str) -> I18nResult<()>;
}

/// Preferences kept only for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences(HashMap<String, String>);

impl MemoryPreferences {
    pub fn new() -> Self {
        MemoryPreferences(HashMap::new())
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> I18nResult<()> {
        self.0.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> I18nResult<()> {
        self.0.remove(key);
        Ok(())
    }
}

/// Preferences stored as a flat JSON object in a single file.
///
/// Every write rewrites the whole file. A file that cannot be parsed is
/// treated as empty and replaced on the next write.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    pub fn open(path: impl Into<PathBuf>) -> I18nResult<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring unreadable preferences in {}: {}", path.display(), e);
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };
        Ok(FilePreferences { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> I18nResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> I18nResult<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> I18nResult<()> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// Pick the language to load.
///
/// A saved preference wins. Otherwise the browser (or system) language is
/// mapped onto the supported set: `pt*` → `pt-BR`, `es*` → `es`, anything
/// else → `en`. With neither, the default language is used.
pub fn negotiate_language(saved: Option<&str>, browser: Option<&str>) -> String {
    if let Some(saved) = saved.map(str::trim).filter(|s| validate_language(s).is_ok()) {
        return saved.to_string();
    }

    match browser.map(|b| b.trim().to_lowercase()) {
        Some(browser) if browser.is_empty() => DEFAULT_LANGUAGE.to_string(),
        Some(browser) if browser.starts_with("pt") => "pt-BR".to_string(),
        Some(browser) if browser.starts_with("es") => "es".to_string(),
        Some(_) => "en".to_string(),
        None => DEFAULT_LANGUAGE.to_string(),
    }
}

/// Negotiate using the language stored in `prefs`
pub fn preferred_language(prefs: &dyn PreferenceStore, browser: Option<&str>) -> String {
    negotiate_language(prefs.get(LANGUAGE_PREFERENCE_KEY).as_deref(), browser)
}

/// The system language from `LC_ALL`, `LC_MESSAGES` or `LANG`
///
/// `pt_BR.UTF-8` is reported as `pt-BR`; `C` and `POSIX` count as unset.
pub fn system_language() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| parse_posix_locale(&value))
}

fn parse_posix_locale(value: &str) -> Option<String> {
    let tag = value.split(['.', '@']).next()?.trim();
    if tag.is_empty() || tag == "C" || tag == "POSIX" {
        return None;
    }
    Some(tag.replace('_', "-"))
}
