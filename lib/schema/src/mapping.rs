//! Field mappings
//!
//! A mapping says where a normalized field comes from in a raw record:
//! one source field, the first present of several candidates, or a
//! function of the whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Derives a field value from the whole raw record
pub type DeriveFn = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

#[derive(Clone)]
pub enum FieldMapping {
    /// Read one source field
    Direct(String),
    /// Read the first candidate present in the record, even when it holds null
    Fallback(Vec<String>),
    /// Compute the value from the raw record
    Derived(DeriveFn),
}

impl FieldMapping {
    pub fn direct(path: impl Into<String>) -> Self {
        FieldMapping::Direct(path.into())
    }

    pub fn fallback<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldMapping::Fallback(paths.into_iter().map(Into::into).collect())
    }

    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        FieldMapping::Derived(Arc::new(f))
    }

    /// Resolve this mapping against `raw`
    ///
    /// `None` means the field is absent. A field holding null is present:
    /// a direct mapping yields `Some(Value::Null)`, and a fallback stops at
    /// the first candidate that exists, null or not.
    pub fn resolve(&self, raw: &Value) -> Option<Value> {
        match self {
            FieldMapping::Direct(path) => lookup(raw, path).cloned(),
            FieldMapping::Fallback(paths) => paths.iter().find_map(|path| lookup(raw, path)).cloned(),
            FieldMapping::Derived(f) => f(raw),
        }
    }

    /// True for a direct mapping with an empty source name, as left by a
    /// blank form entry
    pub fn is_blank(&self) -> bool {
        match self {
            FieldMapping::Direct(path) => path.trim().is_empty(),
            FieldMapping::Fallback(paths) => paths.iter().all(|p| p.trim().is_empty()),
            FieldMapping::Derived(_) => false,
        }
    }
}

impl fmt::Debug for FieldMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldMapping::Direct(path) => f.debug_tuple("Direct").field(path).finish(),
            FieldMapping::Fallback(paths) => f.debug_tuple("Fallback").field(paths).finish(),
            FieldMapping::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}

impl From<&str> for FieldMapping {
    fn from(path: &str) -> Self {
        FieldMapping::direct(path)
    }
}

/// Configuration files spell mappings as a string or an array of strings
#[derive(Deserialize)]
#[serde(untagged)]
enum MappingRepr {
    Direct(String),
    Fallback(Vec<String>),
}

impl<'de> Deserialize<'de> for FieldMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match MappingRepr::deserialize(deserializer)? {
            MappingRepr::Direct(path) => FieldMapping::Direct(path),
            MappingRepr::Fallback(paths) => FieldMapping::Fallback(paths),
        })
    }
}

/// Look up `path` in `raw`
///
/// A literal key wins; otherwise a dotted path walks nested objects, so
/// `imdb.rating` reaches `{"imdb": {"rating": 7.5}}`.
pub fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    let object = raw.as_object()?;
    if let Some(value) = object.get(path) {
        return Some(value);
    }
    if !path.contains('.') {
        return None;
    }
    path.split('.').try_fold(raw, |current, key| current.as_object()?.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_mapping() {
        let raw = json!({"title": "Heat", "year": null});
        assert_eq!(FieldMapping::direct("title").resolve(&raw), Some(json!("Heat")));
        assert_eq!(FieldMapping::direct("year").resolve(&raw), Some(Value::Null));
        assert_eq!(FieldMapping::direct("missing").resolve(&raw), None);
    }

    #[test]
    fn test_fallback_first_present() {
        let mapping = FieldMapping::fallback(["overview", "plot", "description"]);
        let raw = json!({"plot": "great action"});
        assert_eq!(mapping.resolve(&raw), Some(json!("great action")));

        // a null candidate still counts as present
        let raw = json!({"overview": null, "plot": "p", "description": "d"});
        assert_eq!(mapping.resolve(&raw), Some(Value::Null));

        let raw = json!({"plot": "p", "description": "d"});
        assert_eq!(mapping.resolve(&raw), Some(json!("p")));

        assert_eq!(mapping.resolve(&json!({})), None);
    }

    #[test]
    fn test_derived_mapping() {
        let mapping = FieldMapping::derived(|raw| {
            let first = raw.get("first")?.as_str()?;
            let last = raw.get("last")?.as_str()?;
            Some(Value::String(format!("{} {}", first, last)))
        });
        let raw = json!({"first": "Ada", "last": "Lovelace"});
        assert_eq!(mapping.resolve(&raw), Some(json!("Ada Lovelace")));
        assert_eq!(mapping.resolve(&json!({"first": "Ada"})), None);
    }

    #[test]
    fn test_dotted_path() {
        let raw = json!({"imdb": {"rating": 7.5}, "a.b": 1});
        assert_eq!(lookup(&raw, "imdb.rating"), Some(&json!(7.5)));
        assert_eq!(lookup(&raw, "a.b"), Some(&json!(1)));
        assert_eq!(lookup(&raw, "imdb.votes"), None);
        assert_eq!(lookup(&json!([1, 2]), "0"), None);
    }

    #[test]
    fn test_deserialize() {
        let direct: FieldMapping = serde_json::from_str("\"_id\"").unwrap();
        assert!(matches!(direct, FieldMapping::Direct(ref p) if p == "_id"));

        let fallback: FieldMapping = serde_json::from_str(r#"["overview", "plot"]"#).unwrap();
        assert!(matches!(fallback, FieldMapping::Fallback(ref p) if p.len() == 2));

        assert!(serde_json::from_str::<FieldMapping>("42").is_err());
    }

    #[test]
    fn test_blank() {
        assert!(FieldMapping::direct("  ").is_blank());
        assert!(!FieldMapping::direct("title").is_blank());
        assert!(!FieldMapping::derived(|_| None).is_blank());
    }
}
