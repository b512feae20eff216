pub mod error;
pub mod fallbacks;
pub mod key;
pub mod loader;
pub mod locale;
pub mod params;
pub mod phrases;
pub mod tree;

pub use error::{I18nError, I18nResult};
pub use fallbacks::{DEFAULT_LANGUAGE, FallbackTables, SUPPORTED_LANGUAGES};
pub use key::{Namespaces, normalize_key};
pub use loader::{
    COMMON_DOCUMENT, DirSource, DocumentSource, HOME_DOCUMENT, HttpSource, MemorySource,
    list_languages, load_document_from_file,
};
pub use locale::{
    FilePreferences, LANGUAGE_PREFERENCE_KEY, MemoryPreferences, PreferenceStore,
    negotiate_language, preferred_language, system_language,
};
pub use params::Params;
pub use phrases::PhraseCatalog;
pub use tree::{Node, TranslationTree, TranslationValue};

use tracing::{debug, warn};

/// Result of resolving a key.
///
/// A key that resolves nowhere comes back as `Text` holding the key itself,
/// so every result is displayable.
#[derive(Debug, Clone, PartialEq)]
pub enum Translated<'a> {
    Text(String),
    List(&'a [String]),
    Tree(&'a TranslationTree),
}

impl Translated<'_> {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Translated::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Translated::Text(_))
    }
}

/// Which documents ended up in the tree built by [`I18n::load`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub language: String,
    /// Documents merged over the fallback table, in merge order
    pub merged: Vec<String>,
    /// Documents the source does not have
    pub missing: Vec<String>,
    /// Documents that could not be fetched or parsed
    pub failed: Vec<String>,
}

impl LoadReport {
    /// True when only the hardcoded fallback table is in use
    pub fn is_fallback_only(&self) -> bool {
        self.merged.is_empty()
    }
}

/// Translation context: the active language and its merged tree.
///
/// The tree is rebuilt from scratch by every [`I18n::load`]; resolution
/// only ever reads it.
pub struct I18n {
    language: String,
    // Fallback table merged with "common" then "home", top-level overwrite
    tree: TranslationTree,
    fallbacks: FallbackTables,
    namespaces: Namespaces,
}

impl I18n {
    /// Context for the default language, holding only its fallback table
    pub fn new() -> Self {
        let fallbacks = FallbackTables::builtin();
        I18n {
            language: DEFAULT_LANGUAGE.to_string(),
            tree: fallbacks.tree_for(DEFAULT_LANGUAGE),
            fallbacks,
            namespaces: Namespaces::default(),
        }
    }

    /// Replace the fallback tables; the active tree is reset to the new table
    pub fn with_fallbacks(&mut self, fallbacks: FallbackTables) -> &mut Self {
        self.tree = fallbacks.tree_for(&self.language);
        self.fallbacks = fallbacks;
        self
    }

    pub fn with_namespaces(&mut self, namespaces: Namespaces) -> &mut Self {
        self.namespaces = namespaces;
        self
    }

    pub fn current_language(&self) -> &str {
        &self.language
    }

    /// Value for the `lang` attribute of rendered documents
    pub fn document_lang(&self) -> &str {
        &self.language
    }

    pub fn tree(&self) -> &TranslationTree {
        &self.tree
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// Rebuild the tree for `lang` and make it the active language.
    ///
    /// The fallback table comes first, then the `common` document, then the
    /// `home` document. A document that is missing or broken is skipped; this
    /// never fails.
    pub async fn load(&mut self, lang: &str, source: &dyn DocumentSource) -> LoadReport {
        let mut tree = self.fallbacks.tree_for(lang);
        let mut report = LoadReport {
            language: lang.to_string(),
            ..LoadReport::default()
        };

        for document in [COMMON_DOCUMENT, HOME_DOCUMENT] {
            match source.fetch(lang, document).await {
                Ok(Some(fetched)) => {
                    tree.merge_shallow(fetched);
                    report.merged.push(document.to_string());
                }
                Ok(None) => {
                    debug!(
                        "No '{}' translations for '{}' in {}",
                        document,
                        lang,
                        source.describe()
                    );
                    report.missing.push(document.to_string());
                }
                Err(e) => {
                    warn!(
                        "Failed to load '{}' translations for '{}' from {}: {}",
                        document,
                        lang,
                        source.describe(),
                        e
                    );
                    report.failed.push(document.to_string());
                }
            }
        }

        self.language = lang.to_string();
        self.tree = tree;
        report
    }

    /// Load `lang` and remember it as the preferred language
    pub async fn switch_language(
        &mut self,
        lang: &str,
        source: &dyn DocumentSource,
        prefs: &mut dyn PreferenceStore,
    ) -> LoadReport {
        let report = self.load(lang, source).await;
        if let Err(e) = prefs.set(LANGUAGE_PREFERENCE_KEY, lang) {
            warn!("Could not save language preference '{}': {}", lang, e);
        }
        report
    }

    /// Find the value behind `key` without degrading to the key.
    ///
    /// Tries the key and its namespace rewrites against the active tree, then
    /// the same candidates against the fallback table of the language.
    pub fn resolve(&self, key: &str) -> Option<Node<'_>> {
        let key = normalize_key(key);
        let candidates = self.namespaces.candidates(&key);

        if let Some(node) = find_first(&self.tree, &candidates) {
            return Some(node);
        }

        let fallback = self.fallbacks.get_or_default(&self.language)?;
        let node = find_first(fallback, &candidates)?;
        debug!(
            "Translation key '{}' resolved from the fallback table of '{}'",
            key, self.language
        );
        Some(node)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.resolve(key).is_some()
    }

    pub fn t(&self, key: &str) -> Translated<'_> {
        self.t_with(key, &Params::new())
    }

    /// Resolve `key`, substituting `params` into string results.
    ///
    /// Lists and trees are returned as-is; a key that resolves nowhere is
    /// returned unchanged as text.
    pub fn t_with(&self, key: &str, params: &Params) -> Translated<'_> {
        match self.resolve(key) {
            Some(Node::Text(text)) => Translated::Text(params.substitute(text)),
            Some(Node::List(items)) => Translated::List(items),
            Some(Node::Tree(tree)) => Translated::Tree(tree),
            None => {
                debug!(
                    "Missing translation key '{}' for '{}', returning the key",
                    key, self.language
                );
                Translated::Text(key.to_string())
            }
        }
    }

    /// Like [`I18n::t_with`], but always a string: lists and trees give the key
    pub fn text(&self, key: &str, params: &Params) -> String {
        match self.t_with(key, params) {
            Translated::Text(text) => text,
            _ => key.to_string(),
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        I18n::new()
    }
}

fn find_first<'a>(tree: &'a TranslationTree, candidates: &[String]) -> Option<Node<'a>> {
    candidates.iter().find_map(|candidate| tree.lookup(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_document(
                "en",
                COMMON_DOCUMENT,
                json!({
                    "language": "English (common)",
                    "nav": {"tips": "Tips"},
                    "home": {"title": "From common"}
                }),
            )
            .with_document(
                "en",
                HOME_DOCUMENT,
                json!({
                    "home": {"title": "Detect Fake News with AI (fetched)", "greeting": "Hello {name}"},
                    "how_it_works": {"steps": ["Paste Text", "Automatic Analysis", "Get Results"]},
                    "tips": {"title": "Tips to Identify Fake News"},
                    "items": ["zero", "one"]
                }),
            )
            .with_document("es", HOME_DOCUMENT, json!({"home": {"title": "Detecta (es)"}}))
    }

    async fn loaded(lang: &str) -> I18n {
        let mut i18n = I18n::new();
        i18n.load(lang, &source()).await;
        i18n
    }

    #[test]
    fn test_new_uses_default_language_fallback() {
        let i18n = I18n::new();
        assert_eq!(i18n.current_language(), "pt-BR");
        assert_eq!(
            i18n.t("home.title"),
            Translated::Text("Detecte Fake News com IA".to_string())
        );
    }

    #[tokio::test]
    async fn test_nested_key_and_params() {
        let i18n = loaded("en").await;
        assert_eq!(
            i18n.text("home.greeting", &Params::new().with("name", "Ana")),
            "Hello Ana"
        );
        assert_eq!(i18n.text("home.greeting", &Params::new()), "Hello {name}");
        assert_eq!(i18n.text("nav.tips", &Params::new()), "Tips");
    }

    #[tokio::test]
    async fn test_missing_key_returns_key() {
        let i18n = loaded("en").await;
        assert_eq!(
            i18n.t("does.not.exist"),
            Translated::Text("does.not.exist".to_string())
        );
        assert!(!i18n.has_key("does.not.exist"));
    }

    #[tokio::test]
    async fn test_home_document_wins_over_fallback_and_common() {
        let mut i18n = I18n::new();
        let report = i18n.load("en", &source()).await;
        assert_eq!(report.merged, vec!["common", "home"]);
        assert!(!report.is_fallback_only());
        assert_eq!(
            i18n.t("home.title").as_text(),
            Some("Detect Fake News with AI (fetched)")
        );
        // common overwrote the fallback's top-level "language"
        assert_eq!(i18n.t("language").as_text(), Some("English (common)"));
    }

    #[tokio::test]
    async fn test_shallow_merge_drops_fallback_members() {
        let i18n = loaded("en").await;
        // "home" from the fetched document replaced the fallback's "home" entirely,
        // so the active tree lacks "home.subtitle"; the fallback table still has it.
        assert!(i18n.tree().lookup("home.subtitle").is_none());
        assert_eq!(
            i18n.t("home.subtitle").as_text(),
            Some("Check news credibility in seconds")
        );
    }

    #[tokio::test]
    async fn test_bracket_and_dotted_keys_match() {
        let i18n = loaded("en").await;
        assert_eq!(i18n.t("items[0]"), i18n.t("items.0"));
        assert_eq!(i18n.t("items[1]").as_text(), Some("one"));
        assert_eq!(
            i18n.t("how_it_works.steps[2]").as_text(),
            Some("Get Results")
        );
    }

    #[tokio::test]
    async fn test_containers_are_returned_raw() {
        let i18n = loaded("en").await;
        match i18n.t("how_it_works.steps") {
            Translated::List(items) => assert_eq!(items.len(), 3),
            other => panic!("Expected a list, got {:?}", other),
        }
        assert!(matches!(i18n.t("tips"), Translated::Tree(_)));
        assert_eq!(i18n.text("tips", &Params::new()), "tips");
    }

    #[tokio::test]
    async fn test_namespace_rewrites() {
        let i18n = loaded("en").await;
        // Bare key found under a declared section
        assert_eq!(i18n.t("greeting").as_text(), Some("Hello {name}"));
        assert_eq!(i18n.t("steps.0").as_text(), Some("Paste Text"));
        // Leading default section stripped
        assert_eq!(i18n.t("home.language").as_text(), Some("English (common)"));
    }

    #[tokio::test]
    async fn test_without_namespaces_only_literal_keys() {
        let mut i18n = I18n::new();
        i18n.with_namespaces(Namespaces::none());
        i18n.load("en", &source()).await;
        assert_eq!(i18n.t("greeting").as_text(), Some("greeting"));
    }

    #[tokio::test]
    async fn test_switching_language_reflects_new_tree() {
        let mut i18n = loaded("en").await;
        assert_eq!(
            i18n.t("home.title").as_text(),
            Some("Detect Fake News with AI (fetched)")
        );

        let report = i18n.load("es", &source()).await;
        assert_eq!(report.merged, vec!["home"]);
        assert_eq!(report.missing, vec!["common"]);
        assert_eq!(i18n.current_language(), "es");
        assert_eq!(i18n.document_lang(), "es");
        assert_eq!(i18n.t("home.title").as_text(), Some("Detecta (es)"));
        // Nothing from the English documents survives the switch
        assert!(!i18n.has_key("nav.tips"));
        assert_eq!(i18n.t("language").as_text(), Some("Español"));
    }

    #[tokio::test]
    async fn test_broken_documents_fall_back_silently() {
        let broken = MemorySource::new()
            .with_raw_document("en", COMMON_DOCUMENT, "{ nope")
            .with_document("en", HOME_DOCUMENT, json!(["not", "an", "object"]));

        let mut i18n = I18n::new();
        let report = i18n.load("en", &broken).await;
        assert!(report.is_fallback_only());
        assert_eq!(report.failed, vec!["common", "home"]);
        assert_eq!(
            i18n.t("home.title").as_text(),
            Some("Detect Fake News with AI")
        );
    }

    #[tokio::test]
    async fn test_unknown_language_uses_default_fallback() {
        let mut i18n = I18n::new();
        let report = i18n.load("fr", &MemorySource::new()).await;
        assert_eq!(report.missing.len(), 2);
        assert_eq!(i18n.current_language(), "fr");
        assert_eq!(i18n.t("language").as_text(), Some("Português"));
    }

    #[tokio::test]
    async fn test_switch_language_persists_preference() {
        let mut prefs = MemoryPreferences::new();
        let mut i18n = I18n::new();
        i18n.switch_language("es", &source(), &mut prefs).await;
        assert_eq!(prefs.get(LANGUAGE_PREFERENCE_KEY), Some("es".to_string()));
        assert_eq!(preferred_language(&prefs, Some("en-US")), "es");
    }

    #[tokio::test]
    async fn test_custom_fallbacks() {
        let mut i18n = I18n::new();
        let only = TranslationTree::new().with_text("only", "here");
        i18n.with_fallbacks(FallbackTables::empty().with_language("pt-BR", only));
        assert_eq!(i18n.t("only").as_text(), Some("here"));
        assert_eq!(i18n.t("home.title").as_text(), Some("home.title"));
    }

    #[tokio::test]
    async fn test_bundled_locales() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("locales");
        let source = DirSource::new(dir);
        for lang in SUPPORTED_LANGUAGES {
            let mut i18n = I18n::new();
            let report = i18n.load(lang, &source).await;
            assert_eq!(report.merged, vec!["common", "home"], "language {}", lang);
            assert!(i18n.has_key("home.title"));
            assert!(i18n.has_key("tips.source.items.0"));
            assert!(i18n.has_key("notifications.rate_limited"));
        }
    }
}
