//! Insertion-ordered string-keyed map backing `Value::Object`.

use indexmap::IndexMap;

use super::Value;

/// An insertion-ordered mapping from string keys to values.
///
/// Mirrors `minijinja::value::ValueMap`'s use of `indexmap` to give `Object`
/// Python-`dict`-like iteration order (§3).
pub type ValueMap = IndexMap<String, Value>;

pub fn map_with_capacity(capacity: usize) -> ValueMap {
    IndexMap::with_capacity(capacity)
}
