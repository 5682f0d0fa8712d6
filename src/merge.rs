//! Deep merge of option value trees.

use crate::value::{Map, Value};

/// Deep-merge a sequence of value trees, earlier trees winning.
///
/// Folds left-to-right from an empty map; at each step the accumulated
/// value is the child and the next tree the parent. Within a pairwise
/// merge, maps merge key-by-key over the union of keys (child's key order
/// first, parent-only keys after), recursing per key with an absent entry
/// treated as null. When exactly one side of a pair is a map, the other
/// side is treated as the empty map and the map's structure survives; this
/// permissive policy is deliberate, not an error. Outside of maps the child
/// wins unless it is null; sequences never merge element-wise.
pub fn merge_recursive<'a, I>(trees: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    trees
        .into_iter()
        .fold(Value::Map(Map::new()), |acc, next| merge_values(&acc, next))
}

/// Pairwise merge with the child taking precedence.
pub(crate) fn merge_values(child: &Value, parent: &Value) -> Value {
    if !child.is_map() && !parent.is_map() {
        return if child.is_null() {
            parent.clone()
        } else {
            child.clone()
        };
    }

    let empty = Map::new();
    let child_map = child.as_map().unwrap_or(&empty);
    let parent_map = parent.as_map().unwrap_or(&empty);
    Value::Map(merge_maps(child_map, parent_map))
}

/// Key-union merge of two field maps, child entries first.
pub(crate) fn merge_maps(child: &Map, parent: &Map) -> Map {
    let mut merged = Map::new();
    for (key, child_value) in child {
        let parent_value = parent.get(key).unwrap_or(&Value::Null);
        merged.insert(key.clone(), merge_values(child_value, parent_value));
    }
    for (key, parent_value) in parent {
        if !child.contains_key(key) {
            merged.insert(key.clone(), merge_values(&Value::Null, parent_value));
        }
    }
    merged
}
