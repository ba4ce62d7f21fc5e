//! # Field-Path Resolver
//!
//! Reads and writes values inside nested JSON records addressed by a
//! dot-delimited path (`"hero.title"`).
//!
//! Arrays are opaque leaves here: `"items.0"` does not index into an
//! array. Only the list and object field types touch array contents.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("Field path is empty")]
    Empty,

    #[error("Field path {0:?} has an empty segment")]
    EmptySegment(String),
}

/// Split a path into its segments, rejecting empty ones
pub fn segments(path: &str) -> Result<Vec<&str>, PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(PathError::EmptySegment(path.to_string()));
    }

    Ok(parts)
}

/// Value at `path` inside `root`, `None` on any missing level
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    get_in(root.as_object()?, path)
}

/// Value at `path` inside a record
pub fn get_in<'a>(record: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let parts = segments(path).ok()?;
    let (last, parents) = parts.split_last()?;

    let mut current = record;
    for key in parents {
        current = current.get(*key)?.as_object()?;
    }
    current.get(*last)
}

/// Assign `value` at `path`, creating intermediate objects as needed.
/// A non-object `root` is replaced by an empty object first.
pub fn set(root: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
    segments(path)?;
    if let Value::Object(record) = root {
        return set_in(record, path, value);
    }

    let mut record = Map::new();
    set_in(&mut record, path, value)?;
    *root = Value::Object(record);
    Ok(())
}

/// Assign `value` at `path` inside a record.
/// Intermediates that are not objects (strings, numbers, arrays) are
/// replaced by empty objects.
pub fn set_in(record: &mut Map<String, Value>, path: &str, value: Value) -> Result<(), PathError> {
    let parts = segments(path)?;
    insert_at(record, &parts, value);
    Ok(())
}

fn insert_at(record: &mut Map<String, Value>, parts: &[&str], value: Value) {
    match parts {
        [] => {}
        [last] => {
            record.insert(last.to_string(), value);
        }
        [key, rest @ ..] => {
            let slot = record
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(map) = slot {
                insert_at(map, rest, value);
                return;
            }

            let mut map = Map::new();
            insert_at(&mut map, rest, value);
            *slot = Value::Object(map);
        }
    }
}

/// Remove the value at `path`, returning it if it existed
pub fn remove_in(record: &mut Map<String, Value>, path: &str) -> Result<Option<Value>, PathError> {
    let parts = segments(path)?;
    let (last, parents) = parts.split_last().ok_or(PathError::Empty)?;

    let mut current = record;
    for key in parents {
        current = match current.get_mut(*key).and_then(Value::as_object_mut) {
            Some(map) => map,
            None => return Ok(None),
        };
    }
    Ok(current.remove(*last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_segments() {
        assert_eq!(segments("a.b.c").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(segments("title").unwrap(), vec!["title"]);
        assert_eq!(segments(""), Err(PathError::Empty));
        assert!(matches!(segments("a..b"), Err(PathError::EmptySegment(_))));
        assert!(matches!(segments(".a"), Err(PathError::EmptySegment(_))));
        assert!(matches!(segments("a."), Err(PathError::EmptySegment(_))));
    }

    #[test]
    fn test_get_nested() {
        let doc = json!({ "about": { "hero": { "title": "Hi" } } });

        assert_eq!(get(&doc, "about.hero.title"), Some(&json!("Hi")));
        assert_eq!(get(&doc, "about.hero"), Some(&json!({ "title": "Hi" })));
    }

    #[test]
    fn test_get_missing_short_circuits() {
        let doc = json!({ "about": { "title": "Hi" } });

        assert_eq!(get(&doc, "about.missing.deeper"), None);
        assert_eq!(get(&doc, "nope"), None);
        // Walking through a leaf string yields nothing rather than failing
        assert_eq!(get(&doc, "about.title.length"), None);
        assert_eq!(get(&doc, ""), None);
    }

    #[test]
    fn test_arrays_are_opaque() {
        let doc = json!({ "skills": { "items": ["rust", "go"] } });

        assert_eq!(get(&doc, "skills.items"), Some(&json!(["rust", "go"])));
        assert_eq!(get(&doc, "skills.items.0"), None);
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut doc = json!({});
        set(&mut doc, "about.hero.title", json!("Hello")).unwrap();

        assert_eq!(doc, json!({ "about": { "hero": { "title": "Hello" } } }));
    }

    #[test]
    fn test_set_preserves_siblings() {
        let mut doc = json!({ "about": { "hero": { "title": "Old", "subtitle": "Keep" } } });
        set(&mut doc, "about.hero.title", json!("New")).unwrap();

        assert_eq!(get(&doc, "about.hero.subtitle"), Some(&json!("Keep")));
        assert_eq!(get(&doc, "about.hero.title"), Some(&json!("New")));
    }

    #[test]
    fn test_set_replaces_leaf_intermediate() {
        let mut record = Map::new();
        record.insert("hero".to_string(), json!("flat string"));

        set_in(&mut record, "hero.title", json!("Nested")).unwrap();
        assert_eq!(get_in(&record, "hero.title"), Some(&json!("Nested")));
    }

    #[test]
    fn test_set_replaces_non_object_root() {
        let mut doc = json!(["not", "a", "record"]);
        set(&mut doc, "about.title", json!("Hi")).unwrap();
        assert_eq!(doc, json!({ "about": { "title": "Hi" } }));

        let mut doc = json!("flat");
        assert_eq!(set(&mut doc, "a..b", json!(1)), Err(PathError::EmptySegment("a..b".to_string())));
        assert_eq!(doc, json!("flat"));
    }

    #[test]
    fn test_set_rejects_empty_path() {
        let mut doc = json!({});
        assert_eq!(set(&mut doc, "", json!(1)), Err(PathError::Empty));
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let docs = [
            json!({}),
            json!({ "a": { "b": 1 } }),
            json!({ "a": "leaf", "x": [1, 2] }),
        ];
        let paths = ["a", "a.b", "a.b.c", "x.y"];
        let value = json!({ "nested": ["v"] });

        for doc in &docs {
            for path in paths {
                let mut doc = doc.clone();
                set(&mut doc, path, value.clone()).unwrap();
                assert_eq!(get(&doc, path), Some(&value), "path {}", path);
            }
        }
    }

    #[test]
    fn test_remove_in() {
        let mut record = json!({ "hero": { "title": "T", "body": "B" } })
            .as_object()
            .cloned()
            .unwrap();

        assert_eq!(remove_in(&mut record, "hero.title").unwrap(), Some(json!("T")));
        assert_eq!(remove_in(&mut record, "hero.title").unwrap(), None);
        assert_eq!(remove_in(&mut record, "missing.deep").unwrap(), None);
        assert_eq!(get_in(&record, "hero.body"), Some(&json!("B")));
    }
}
