//! Option value trees and lazily resolved field references.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Number;

use crate::error::ValueError;

/// Insertion-ordered map of named option values.
pub type Map = IndexMap<String, Value>;

/// A value inside an option payload.
///
/// Mirrors the JSON data model plus [`Ref`], a placeholder that stands in
/// for a field of the parent object until resolution runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Seq(Vec<Value>),
    Map(Map),
    Ref(Ref),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Map entry by key; `None` for non-maps.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Take the map out of a map value. Any other shape yields the empty
    /// map, the same permissive mapping-beats-scalar policy the merge
    /// algebra uses.
    pub fn into_map(self) -> Map {
        match self {
            Value::Map(map) => map,
            _ => Map::new(),
        }
    }

    /// Parse a JSON string into a value tree.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidJson`] when the payload does not parse.
    pub fn from_json_str(payload: &str) -> Result<Value, ValueError> {
        let json: serde_json::Value =
            serde_json::from_str(payload).map_err(|source| ValueError::InvalidJson { source })?;
        Ok(Value::from(json))
    }

    /// Convert to plain JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::UnresolvedRef`] if the tree still contains a
    /// reference; the error names the offending node by a slash path.
    pub fn to_json(&self) -> Result<serde_json::Value, ValueError> {
        to_json_at(self, "")
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Seq(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<Ref> for Value {
    fn from(reference: Ref) -> Self {
        Value::Ref(reference)
    }
}

/// Serializes like JSON for inspection; a reference renders as a
/// `{"$ref": key}` marker object.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Seq(seq) => {
                let mut out = serializer.serialize_seq(Some(seq.len()))?;
                for value in seq {
                    out.serialize_element(value)?;
                }
                out.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Value::Ref(reference) => {
                let mut out = serializer.serialize_map(Some(1))?;
                out.serialize_entry("$ref", reference.key())?;
                out.end()
            }
        }
    }
}

/// Lazy reference to a named field of the parent object.
///
/// Stored in place of a value and replaced during resolution. A missing
/// field, or resolution without a parent, yields [`Value::Null`] rather
/// than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    key: String,
}

impl Ref {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// The field name this reference resolves through.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Look the field up on `source`, defaulting to null.
    pub fn resolve(&self, source: Option<&dyn FieldSource>) -> Value {
        source
            .and_then(|source| source.field(&self.key))
            .unwrap_or(Value::Null)
    }
}

/// Field lookup capability for reference resolution.
///
/// The resolver never inspects the parent object itself; the caller supplies
/// the lookup. Implement this for whatever carries per-resource state, or
/// use the ready-made impls for [`Map`] and for `()` (a parent with no
/// fields).
pub trait FieldSource {
    /// Value of a named field, or `None` when the field is absent.
    fn field(&self, key: &str) -> Option<Value>;
}

impl FieldSource for Map {
    fn field(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl FieldSource for () {
    fn field(&self, _key: &str) -> Option<Value> {
        None
    }
}

/// Replace every [`Ref`] in a value tree with the named field of `source`.
///
/// Structure-preserving: maps and sequences are rebuilt entry by entry in
/// order, scalars pass through unchanged. Only `Ref` nodes change, becoming
/// the source's field value or [`Value::Null`] when the source is `None` or
/// the field missing.
pub fn resolve_refs(source: Option<&dyn FieldSource>, value: &Value) -> Value {
    match value {
        Value::Ref(reference) => reference.resolve(source),
        Value::Map(map) => Value::Map(
            map.iter()
                .map(|(key, value)| (key.clone(), resolve_refs(source, value)))
                .collect(),
        ),
        Value::Seq(seq) => Value::Seq(seq.iter().map(|value| resolve_refs(source, value)).collect()),
        other => other.clone(),
    }
}

// --- Internal implementation ---

fn to_json_at(value: &Value, path: &str) -> Result<serde_json::Value, ValueError> {
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Number(n) => Ok(serde_json::Value::Number(n.clone())),
        Value::String(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Seq(seq) => {
            let items = seq
                .iter()
                .enumerate()
                .map(|(index, value)| to_json_at(value, &format!("{}/{}", path, index)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(serde_json::Value::Array(items))
        }
        Value::Map(map) => {
            let mut entries = serde_json::Map::new();
            for (key, value) in map {
                entries.insert(key.clone(), to_json_at(value, &format!("{}/{}", path, key))?);
            }
            Ok(serde_json::Value::Object(entries))
        }
        Value::Ref(reference) => Err(ValueError::UnresolvedRef {
            path: if path.is_empty() {
                "/".to_string()
            } else {
                path.to_string()
            },
            key: reference.key().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ref_resolves_to_field_value() {
        let mut state = Map::new();
        state.insert("schema".into(), Value::from(json!({"name": "string"})));

        let resolved = Ref::new("schema").resolve(Some(&state));
        assert_eq!(resolved, Value::from(json!({"name": "string"})));
    }

    #[test]
    fn missing_field_resolves_to_null() {
        let state = Map::new();
        assert_eq!(Ref::new("schema").resolve(Some(&state)), Value::Null);
    }

    #[test]
    fn absent_source_resolves_to_null() {
        assert_eq!(Ref::new("schema").resolve(None), Value::Null);
    }

    #[test]
    fn custom_field_source() {
        struct Band {
            genre: &'static str,
        }

        impl FieldSource for Band {
            fn field(&self, key: &str) -> Option<Value> {
                match key {
                    "genre" => Some(Value::from(json!(self.genre))),
                    _ => None,
                }
            }
        }

        let band = Band { genre: "rock" };
        assert_eq!(Ref::new("genre").resolve(Some(&band)), Value::from(json!("rock")));
        assert_eq!(Ref::new("label").resolve(Some(&band)), Value::Null);
    }

    #[test]
    fn resolution_preserves_structure() {
        let mut state = Map::new();
        state.insert("limit".into(), Value::from(json!(50)));

        let mut inner = Map::new();
        inner.insert("default".into(), Value::Ref(Ref::new("limit")));
        inner.insert("unit".into(), Value::from(json!("rows")));

        let mut tree = Map::new();
        tree.insert("page".into(), Value::Map(inner));
        tree.insert(
            "fallbacks".into(),
            Value::Seq(vec![Value::Ref(Ref::new("limit")), Value::from(json!(10))]),
        );

        let resolved = resolve_refs(Some(&state), &Value::Map(tree));
        assert_eq!(
            resolved,
            Value::from(json!({
                "page": {"default": 50, "unit": "rows"},
                "fallbacks": [50, 10]
            }))
        );
    }

    #[test]
    fn resolution_without_source_nulls_refs() {
        let tree = Value::Seq(vec![Value::Ref(Ref::new("kwargs")), Value::from(json!(1))]);
        assert_eq!(
            resolve_refs(None, &tree),
            Value::from(json!([null, 1]))
        );
    }

    #[test]
    fn scalars_pass_through_untouched() {
        let scalar = Value::from(json!("omit"));
        assert_eq!(resolve_refs(None, &scalar), scalar);
    }

    #[test]
    fn from_json_covers_all_shapes() {
        let value = Value::from(json!({
            "flag": true,
            "count": 3,
            "name": "band",
            "nothing": null,
            "tags": ["a", "b"]
        }));

        assert_eq!(value.get("flag"), Some(&Value::Bool(true)));
        assert_eq!(value.get("name").and_then(Value::as_str), Some("band"));
        assert_eq!(value.get("nothing"), Some(&Value::Null));
        assert_eq!(value.get("tags").and_then(Value::as_seq).map(<[Value]>::len), Some(2));
    }

    #[test]
    fn into_map_keeps_maps_and_drops_the_rest() {
        let map = Value::from(json!({"a": 1})).into_map();
        assert_eq!(map.get("a"), Some(&Value::from(json!(1))));

        assert!(Value::from(json!("scalar")).into_map().is_empty());
        assert!(Value::from(json!([1, 2])).into_map().is_empty());
        assert!(Value::Null.into_map().is_empty());
    }

    #[test]
    fn to_json_round_trips_resolved_trees() {
        let original = json!({"page": {"limit": 10}, "tags": ["a"], "live": true});
        let value = Value::from(original.clone());
        assert_eq!(value.to_json().unwrap(), original);
    }

    #[test]
    fn to_json_reports_unresolved_ref_with_path() {
        let mut inner = Map::new();
        inner.insert("schema".into(), Value::Ref(Ref::new("kwargs")));
        let mut tree = Map::new();
        tree.insert("args".into(), Value::Map(inner));

        let err = Value::Map(tree).to_json().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unresolved reference \"kwargs\" at /args/schema"
        );
    }

    #[test]
    fn from_json_str_parses() {
        let value = Value::from_json_str(r#"{"tags": ["band"]}"#).unwrap();
        assert_eq!(value, Value::from(json!({"tags": ["band"]})));
    }

    #[test]
    fn from_json_str_rejects_bad_payloads() {
        let err = Value::from_json_str("{not json").unwrap_err();
        assert!(err.to_string().starts_with("invalid JSON:"));
    }

    #[test]
    fn serialize_renders_ref_marker() {
        let mut tree = Map::new();
        tree.insert("args".into(), Value::Ref(Ref::new("kwargs")));

        let rendered = serde_json::to_value(Value::Map(tree)).unwrap();
        assert_eq!(rendered, json!({"args": {"$ref": "kwargs"}}));
    }
}
