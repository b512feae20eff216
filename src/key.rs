//! Key normalization and namespace rewrites
//!
//! Keys are dotted paths into a [`crate::TranslationTree`]. Callers may also
//! index lists with brackets (`items[0]`), which is rewritten to the dotted
//! form before lookup.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static BRACKET_INDEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\[\]]*)\]").unwrap());

/// Rewrite bracket indexing to dotted segments.
///
/// - `items[0]` → `items.0`
/// - `tips.lists[2][1]` → `tips.lists.2.1`
/// - `home.title` → `home.title` (borrowed, unchanged)
pub fn normalize_key(key: &str) -> Cow<'_, str> {
    if !key.contains('[') {
        return Cow::Borrowed(key);
    }
    let dotted = BRACKET_INDEX.replace_all(key, ".$1");
    Cow::Owned(dotted.trim_start_matches('.').to_string())
}

/// Declared top-level sections used to build alternate lookup keys.
///
/// When a literal key misses, the resolver retries it under each section
/// (`title` → `home.title`, `tips.title`, ...) and, if the key starts with
/// the default section, without that prefix (`home.language` → `language`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    sections: Vec<String>,
    default_section: Option<String>,
}

impl Namespaces {
    /// No rewrites at all: only the literal key is tried
    pub fn none() -> Self {
        Namespaces {
            sections: Vec::new(),
            default_section: None,
        }
    }

    pub fn with_section(mut self, name: &str) -> Self {
        if !self.sections.iter().any(|s| s == name) {
            self.sections.push(name.to_string());
        }
        self
    }

    pub fn with_default_section(mut self, name: &str) -> Self {
        self.default_section = Some(name.to_string());
        self
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn default_section(&self) -> Option<&str> {
        self.default_section.as_deref()
    }

    /// All keys to try for `key`, literal key first, without duplicates
    pub fn candidates(&self, key: &str) -> Vec<String> {
        let mut candidates = vec![key.to_string()];

        for section in &self.sections {
            let prefix = format!("{}.", section);
            if !key.starts_with(&prefix) {
                push_unique(&mut candidates, format!("{}{}", prefix, key));
            }
        }

        if let Some(section) = &self.default_section {
            if let Some(stripped) = key.strip_prefix(&format!("{}.", section)) {
                push_unique(&mut candidates, stripped.to_string());
            }
        }

        candidates
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Namespaces::none()
            .with_section("home")
            .with_section("how_it_works")
            .with_section("tips")
            .with_section("accessibility")
            .with_default_section("home")
    }
}

fn push_unique(candidates: &mut Vec<String>, candidate: String) {
    if !candidates.contains(&candidate) {
        candidates.push(candidate);
    }
}
