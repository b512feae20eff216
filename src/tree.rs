use crate::error::{I18nError, I18nResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// A single entry of a translation tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TranslationValue {
    Text(String),
    List(Vec<String>),
    Tree(TranslationTree),
}

/// Borrowed view of whatever a dotted path points at.
///
/// List items are plain strings, so indexing into a list yields `Text`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Text(&'a str),
    List(&'a [String]),
    Tree(&'a TranslationTree),
}

impl<'a> From<&'a TranslationValue> for Node<'a> {
    fn from(value: &'a TranslationValue) -> Self {
        match value {
            TranslationValue::Text(text) => Node::Text(text),
            TranslationValue::List(items) => Node::List(items),
            TranslationValue::Tree(tree) => Node::Tree(tree),
        }
    }
}

/// Nested key/value structure holding the localized strings of one language
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TranslationTree(BTreeMap<String, TranslationValue>);

impl TranslationTree {
    pub fn new() -> Self {
        TranslationTree(BTreeMap::new())
    }

    pub fn with_text(mut self, key: &str, text: &str) -> Self {
        self.insert(key, TranslationValue::Text(text.to_owned()));
        self
    }

    pub fn with_list(mut self, key: &str, items: &[&str]) -> Self {
        let items = items.iter().map(|item| item.to_string()).collect();
        self.insert(key, TranslationValue::List(items));
        self
    }

    pub fn with_tree(mut self, key: &str, tree: TranslationTree) -> Self {
        self.insert(key, TranslationValue::Tree(tree));
        self
    }

    pub fn insert(&mut self, key: &str, value: TranslationValue) {
        self.0.insert(key.to_owned(), value);
    }

    pub fn get(&self, key: &str) -> Option<&TranslationValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Overwrite top-level entries with those of `other`.
    ///
    /// Nested trees are replaced as a whole, never merged member by member.
    pub fn merge_shallow(&mut self, other: TranslationTree) {
        self.0.extend(other.0);
    }

    /// Walk a dotted path, indexing lists with integer segments
    pub fn lookup(&self, path: &str) -> Option<Node<'_>> {
        let mut node = Node::Tree(self);
        for segment in path.split('.') {
            node = match node {
                Node::Tree(tree) => Node::from(tree.get(segment)?),
                Node::List(items) => {
                    let index: usize = segment.parse().ok()?;
                    Node::Text(items.get(index)?)
                }
                Node::Text(_) => return None,
            };
        }
        Some(node)
    }

    /// Build a tree from a parsed JSON document.
    ///
    /// The root must be an object. Numbers and booleans are kept as their
    /// string form, `null` members are dropped and non-scalar list items are
    /// skipped.
    pub fn from_json(document: &Value) -> I18nResult<Self> {
        let object = document.as_object().ok_or_else(|| {
            I18nError::InvalidDocument("root must be a JSON object".to_string())
        })?;
        Ok(tree_from_object(object, ""))
    }

    pub fn from_json_str(source: &str) -> I18nResult<Self> {
        let document: Value = serde_json::from_str(source)?;
        Self::from_json(&document)
    }
}

fn tree_from_object(object: &serde_json::Map<String, Value>, prefix: &str) -> TranslationTree {
    let mut tree = TranslationTree::new();
    for (key, value) in object {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        if let Some(value) = value_from_json(value, &path) {
            tree.insert(key, value);
        }
    }
    tree
}

fn value_from_json(value: &Value, path: &str) -> Option<TranslationValue> {
    match value {
        Value::Null => None,
        Value::Object(object) => Some(TranslationValue::Tree(tree_from_object(object, path))),
        Value::Array(items) => {
            let mut list = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match scalar_text(item) {
                    Some(text) => list.push(text),
                    None => warn!("Skipping non-text list item '{}.{}'", path, index),
                }
            }
            Some(TranslationValue::List(list))
        }
        scalar => scalar_text(scalar).map(TranslationValue::Text),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TranslationTree {
        TranslationTree::new()
            .with_text("language", "English")
            .with_list("items", &["first", "second"])
            .with_tree(
                "home",
                TranslationTree::new()
                    .with_text("title", "Detect Fake News with AI")
                    .with_tree("hero", TranslationTree::new().with_text("cta", "Verify")),
            )
    }

    #[test]
    fn test_lookup_nested() {
        let tree = sample();
        assert_eq!(tree.lookup("language"), Some(Node::Text("English")));
        assert_eq!(
            tree.lookup("home.title"),
            Some(Node::Text("Detect Fake News with AI"))
        );
        assert_eq!(tree.lookup("home.hero.cta"), Some(Node::Text("Verify")));
    }

    #[test]
    fn test_lookup_list_index() {
        let tree = sample();
        assert_eq!(tree.lookup("items.1"), Some(Node::Text("second")));
        assert_eq!(tree.lookup("items.2"), None);
        assert_eq!(tree.lookup("items.x"), None);
    }

    #[test]
    fn test_lookup_returns_containers() {
        let tree = sample();
        assert!(matches!(tree.lookup("items"), Some(Node::List(items)) if items.len() == 2));
        assert!(matches!(tree.lookup("home.hero"), Some(Node::Tree(_))));
    }

    #[test]
    fn test_lookup_missing_segments() {
        let tree = sample();
        assert_eq!(tree.lookup("home.missing"), None);
        assert_eq!(tree.lookup("language.deeper"), None);
        assert_eq!(tree.lookup(""), None);
    }

    #[test]
    fn test_merge_shallow_replaces_whole_sections() {
        let mut tree = sample();
        tree.merge_shallow(
            TranslationTree::new()
                .with_tree("home", TranslationTree::new().with_text("title", "Fetched")),
        );
        assert_eq!(tree.lookup("home.title"), Some(Node::Text("Fetched")));
        // The old "home.hero" is gone: sections are not deep-merged
        assert_eq!(tree.lookup("home.hero.cta"), None);
        assert_eq!(tree.lookup("language"), Some(Node::Text("English")));
    }

    #[test]
    fn test_from_json_lenient_values() {
        let tree = TranslationTree::from_json(&json!({
            "title": "Hello",
            "count": 3,
            "enabled": true,
            "nothing": null,
            "steps": ["one", 2, {"bad": true}],
            "nested": {"deep": {"leaf": "value"}}
        }))
        .unwrap();

        assert_eq!(tree.lookup("count"), Some(Node::Text("3")));
        assert_eq!(tree.lookup("enabled"), Some(Node::Text("true")));
        assert_eq!(tree.get("nothing"), None);
        assert_eq!(
            tree.get("steps"),
            Some(&TranslationValue::List(vec!["one".to_string(), "2".to_string()]))
        );
        assert_eq!(tree.lookup("nested.deep.leaf"), Some(Node::Text("value")));
    }

    #[test]
    fn test_from_json_rejects_non_object_root() {
        assert!(matches!(
            TranslationTree::from_json(&json!(["a", "b"])),
            Err(I18nError::InvalidDocument(_))
        ));
        assert!(matches!(
            TranslationTree::from_json_str("{ not json"),
            Err(I18nError::Json(_))
        ));
    }

    #[test]
    fn test_serialize_round_shape() {
        let tree = TranslationTree::new()
            .with_text("a", "b")
            .with_list("c", &["d"]);
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({"a": "b", "c": ["d"]})
        );
    }
}
