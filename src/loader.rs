use crate::error::{I18nError, I18nResult};
use crate::tree::TranslationTree;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Shared strings used across every page
pub const COMMON_DOCUMENT: &str = "common";
/// Strings of the landing page; merged last so it wins over `common`
pub const HOME_DOCUMENT: &str = "home";

/// Something that can produce the translation documents of a language.
///
/// `Ok(None)` means the document does not exist, which is not an error.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, lang: &str, document: &str) -> I18nResult<Option<TranslationTree>>;

    /// Human readable description used in log lines
    fn describe(&self) -> String;
}

/// Check that a language tag is safe to use as a path or URL segment
pub fn validate_language(lang: &str) -> I18nResult<()> {
    if lang.is_empty()
        || !lang
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(I18nError::InvalidLanguage(lang.to_string()));
    }
    Ok(())
}

/// Load a translation document from a single JSON file
///
/// The file must hold a JSON object:
/// ```json
/// {
///     "title": "Detect Fake News with AI",
///     "steps": ["Paste text", "Automatic analysis"],
///     "tips": { "source": { "title": "Check the source" } }
/// }
/// ```
pub fn load_document_from_file(path: &Path) -> I18nResult<TranslationTree> {
    let content = fs::read_to_string(path)?;
    TranslationTree::from_json_str(&content)
}

/// List the languages of a locales directory (one subdirectory per language)
pub fn list_languages(dir: &Path) -> I18nResult<Vec<String>> {
    let mut languages = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            if validate_language(name).is_ok() {
                languages.push(name.to_string());
            }
        }
    }
    languages.sort();
    Ok(languages)
}

/// Documents laid out on disk as `{root}/{lang}/{document}.json`
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirSource { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, lang: &str, document: &str) -> PathBuf {
        self.root.join(lang).join(format!("{}.json", document))
    }
}

#[async_trait]
impl DocumentSource for DirSource {
    async fn fetch(&self, lang: &str, document: &str) -> I18nResult<Option<TranslationTree>> {
        validate_language(lang)?;
        let path = self.document_path(lang, document);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No document at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        TranslationTree::from_json_str(&content).map(Some)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

/// Documents served over HTTP at `{base_url}/locales/{lang}/{document}.json`
#[derive(Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// Requests time out after 10 s; a timed-out document counts as failed
    pub fn new(base_url: &str) -> I18nResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(HttpSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn document_url(&self, lang: &str, document: &str) -> String {
        format!("{}/locales/{}/{}.json", self.base_url, lang, document)
    }
}

impl std::fmt::Debug for HttpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSource")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, lang: &str, document: &str) -> I18nResult<Option<TranslationTree>> {
        validate_language(lang)?;
        let url = self.document_url(lang, document);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            debug!("GET {} returned {}", url, response.status());
            return Ok(None);
        }

        let body = response.text().await?;
        TranslationTree::from_json_str(&body).map(Some)
    }

    fn describe(&self) -> String {
        format!("{}/locales", self.base_url)
    }
}

/// In-memory documents, keyed by language and document name
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<(String, String), String>,
}

impl MemorySource {
    pub fn new() -> Self {
        MemorySource {
            documents: HashMap::new(),
        }
    }

    pub fn with_document(self, lang: &str, document: &str, content: serde_json::Value) -> Self {
        self.with_raw_document(lang, document, &content.to_string())
    }

    /// Store the document text as-is, without checking that it is JSON
    pub fn with_raw_document(mut self, lang: &str, document: &str, content: &str) -> Self {
        self.documents
            .insert((lang.to_string(), document.to_string()), content.to_string());
        self
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn fetch(&self, lang: &str, document: &str) -> I18nResult<Option<TranslationTree>> {
        match self.documents.get(&(lang.to_string(), document.to_string())) {
            Some(content) => TranslationTree::from_json_str(content).map(Some),
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        format!("memory ({} documents)", self.documents.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;
    use serde_json::json;

    fn locales_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("locales")
    }

    #[test]
    fn test_validate_language() {
        assert!(validate_language("pt-BR").is_ok());
        assert!(validate_language("en").is_ok());
        assert!(validate_language("zh_Hans").is_ok());
        assert!(validate_language("").is_err());
        assert!(validate_language("../etc").is_err());
        assert!(validate_language("en/home").is_err());
    }

    #[test]
    fn test_load_document_from_file() {
        let tree = load_document_from_file(&locales_dir().join("en").join("home.json")).unwrap();
        assert_eq!(
            tree.lookup("home.title"),
            Some(Node::Text("Detect Fake News with AI"))
        );
    }

    #[test]
    fn test_load_document_missing_file() {
        let result = load_document_from_file(&locales_dir().join("xx").join("home.json"));
        assert!(matches!(result, Err(I18nError::Io(_))));
    }

    #[test]
    fn test_list_languages() {
        let languages = list_languages(&locales_dir()).unwrap();
        assert_eq!(languages, vec!["en", "es", "pt-BR"]);
    }

    #[tokio::test]
    async fn test_dir_source_fetch() {
        let source = DirSource::new(locales_dir());
        let common = source.fetch("es", COMMON_DOCUMENT).await.unwrap().unwrap();
        assert!(!common.is_empty());
        assert!(source.fetch("es", "missing").await.unwrap().is_none());
        assert!(source.fetch("xx", HOME_DOCUMENT).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dir_source_rejects_path_traversal() {
        let source = DirSource::new(locales_dir());
        let result = source.fetch("../locales", HOME_DOCUMENT).await;
        assert!(matches!(result, Err(I18nError::InvalidLanguage(_))));
    }

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemorySource::new()
            .with_document("en", HOME_DOCUMENT, json!({"title": "Hi"}))
            .with_raw_document("en", COMMON_DOCUMENT, "{ broken");

        let home = source.fetch("en", HOME_DOCUMENT).await.unwrap().unwrap();
        assert_eq!(home.lookup("title"), Some(Node::Text("Hi")));
        assert!(matches!(
            source.fetch("en", COMMON_DOCUMENT).await,
            Err(I18nError::Json(_))
        ));
        assert!(source.fetch("es", HOME_DOCUMENT).await.unwrap().is_none());
    }

    #[test]
    fn test_http_source_document_url() {
        let source = HttpSource::new("http://localhost:3000/").unwrap();
        assert_eq!(
            source.document_url("pt-BR", HOME_DOCUMENT),
            "http://localhost:3000/locales/pt-BR/home.json"
        );
        assert_eq!(source.describe(), "http://localhost:3000/locales");
    }

    #[tokio::test]
    async fn test_http_source_rejects_bad_language() {
        let source = HttpSource::new("http://localhost:3000").unwrap();
        assert!(source.fetch("en?x=1", HOME_DOCUMENT).await.is_err());
    }

    /// Serve `status` with an empty body to every connection
    async fn serve_status(status: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    status
                );
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_http_source_not_found_is_empty() {
        let source = HttpSource::new(&serve_status("404 Not Found").await).unwrap();
        assert!(source.fetch("en", HOME_DOCUMENT).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_http_source_server_error_keeps_fallback() {
        let source = HttpSource::new(&serve_status("500 Internal Server Error").await).unwrap();

        let mut i18n = crate::I18n::new();
        let report = i18n.load("en", &source).await;
        assert!(report.is_fallback_only());
        assert_eq!(report.missing, vec![COMMON_DOCUMENT, HOME_DOCUMENT]);
        assert!(report.failed.is_empty());
        assert_eq!(
            i18n.t("home.title").as_text(),
            Some("Detect Fake News with AI")
        );
    }

    #[tokio::test]
    #[ignore] // Needs a running fakecheck-web instance on port 3000
    async fn test_http_source_live() {
        let source = HttpSource::new("http://127.0.0.1:3000").unwrap();
        let home = source.fetch("en", HOME_DOCUMENT).await.unwrap();
        assert!(home.is_some());
    }
}
