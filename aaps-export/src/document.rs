//! Ordered JSON tree for export files.
//!
//! Exports carry many fields this crate never interprets. The document is
//! kept as a generic JSON object (insertion-ordered, numbers kept verbatim)
//! and edited through dot-separated paths such as `security.file_hash`, so
//! everything else passes through untouched.

use crate::error::{ExportError, ExportResult};
use serde_json::{Map, Value};

/// A parsed settings export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportDocument {
    root: Map<String, Value>,
}

impl ExportDocument {
    /// Parses an export. The top-level value must be a JSON object.
    pub fn parse(bytes: &[u8]) -> ExportResult<Self> {
        match serde_json::from_slice(bytes)? {
            Value::Object(root) => Ok(Self { root }),
            other => Err(ExportError::MalformedDocument(format!(
                "expected a JSON object at the top level, found {}",
                type_name(&other)
            ))),
        }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        get_path(&self.root, path)
    }

    /// String value at `path`, `None` if missing or not a string.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Like [`get_str`](Self::get_str) but a missing field is an error.
    pub fn require_str(&self, path: &str) -> ExportResult<&str> {
        self.get_str(path).ok_or_else(|| {
            ExportError::MalformedDocument(format!("missing string field `{path}`"))
        })
    }

    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> ExportResult<()> {
        set_path(&mut self.root, path, value.into())
    }

    pub fn remove(&mut self, path: &str) -> Option<Value> {
        remove_path(&mut self.root, path)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Serializes with two-space indentation and a trailing newline.
    ///
    /// The output is stable: the same tree always yields the same bytes,
    /// which the file hash relies on.
    pub fn to_pretty_bytes(&self) -> ExportResult<Vec<u8>> {
        let mut out = serde_json::to_vec_pretty(&self.root)?;
        out.push(b'\n');
        Ok(out)
    }
}

/// Looks up a dot-separated path.
pub fn get_path<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = root.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Sets a dot-separated path, creating intermediate objects as needed.
///
/// Existing keys keep their position; new keys are appended. Fails when an
/// intermediate segment exists but is not an object.
pub fn set_path(root: &mut Map<String, Value>, path: &str, value: Value) -> ExportResult<()> {
    let (parents, leaf) = split_leaf(path);
    let mut current = root;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = entry.as_object_mut().ok_or_else(|| {
            ExportError::MalformedDocument(format!(
                "cannot set `{path}`: `{segment}` is not an object"
            ))
        })?;
    }
    current.insert(leaf.to_string(), value);
    Ok(())
}

/// Removes a dot-separated path, keeping the order of the remaining keys.
pub fn remove_path(root: &mut Map<String, Value>, path: &str) -> Option<Value> {
    let (parents, leaf) = split_leaf(path);
    let mut current = root;
    for segment in parents {
        current = current.get_mut(segment)?.as_object_mut()?;
    }
    current.shift_remove(leaf)
}

fn split_leaf(path: &str) -> (impl Iterator<Item = &str>, &str) {
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };
    (parents.into_iter().flat_map(|p| p.split('.')), leaf)
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> ExportDocument {
        ExportDocument::parse(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(matches!(
            ExportDocument::parse(b"[1, 2]"),
            Err(ExportError::MalformedDocument(_))
        ));
        assert!(matches!(ExportDocument::parse(b"{"), Err(ExportError::Json(_))));
    }

    #[test]
    fn get_nested_path() {
        let d = doc(json!({"security": {"salt": "00ff"}}));
        assert_eq!(d.get_str("security.salt"), Some("00ff"));
        assert!(d.get("security.missing").is_none());
        assert!(d.get("security.salt.deeper").is_none());
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let mut d = doc(json!({"format": "aaps_structured"}));
        d.set("security.algorithm", "none").unwrap();
        assert_eq!(d.get_str("security.algorithm"), Some("none"));
    }

    #[test]
    fn set_through_scalar_fails() {
        let mut d = doc(json!({"security": 5}));
        assert!(matches!(
            d.set("security.salt", "00"),
            Err(ExportError::MalformedDocument(_))
        ));
    }

    #[test]
    fn set_keeps_key_position() {
        let mut d = doc(json!({"a": 1, "format": "x", "z": 2}));
        d.set("format", "y").unwrap();
        let keys: Vec<_> = d.as_map().keys().cloned().collect();
        assert_eq!(keys, ["a", "format", "z"]);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut d = doc(json!({"security": {"a": 1, "salt": "00", "b": 2, "c": 3}}));
        assert_eq!(d.remove("security.salt"), Some(json!("00")));
        let keys: Vec<_> = d.get("security").unwrap().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert!(d.remove("security.salt").is_none());
        assert!(d.remove("nothing.here").is_none());
    }

    #[test]
    fn numbers_survive_reserialization() {
        let d = ExportDocument::parse(br#"{"created_at": 1.50, "big": 123456789012345678901234567890}"#)
            .unwrap();
        let out = String::from_utf8(d.to_pretty_bytes().unwrap()).unwrap();
        assert!(out.contains("1.50"));
        assert!(out.contains("123456789012345678901234567890"));
    }

    #[test]
    fn pretty_output_ends_with_newline() {
        let out = doc(json!({"a": 1})).to_pretty_bytes().unwrap();
        assert_eq!(out, b"{\n  \"a\": 1\n}\n");
    }
}
