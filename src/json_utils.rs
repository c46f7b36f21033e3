//! Chained lookups into nested JSON objects.
//!
//! The preference stores nest their interesting sections several objects
//! deep; these helpers walk a key chain and give back `None` as soon as a
//! key is missing or the value under it is not an object.

use serde_json::Value;
use std::path::Path;

/// Follows `keys` through nested objects. `None` for an empty chain, a
/// missing key, or a non-object along the way.
pub fn get_chained<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let (first, rest) = keys.split_first()?;
    let next = value.as_object()?.get(*first)?;
    if rest.is_empty() {
        Some(next)
    } else {
        get_chained(next, rest)
    }
}

/// Mutable twin of [`get_chained`], used when rewriting a store in place.
pub fn get_chained_mut<'a>(value: &'a mut Value, keys: &[&str]) -> Option<&'a mut Value> {
    let (first, rest) = keys.split_first()?;
    let next = value.as_object_mut()?.get_mut(*first)?;
    if rest.is_empty() {
        Some(next)
    } else {
        get_chained_mut(next, rest)
    }
}

/// True when `path` is empty or points at nothing on disk.
pub fn path_not_exist(path: &str) -> bool {
    path.is_empty() || !Path::new(path).exists()
}
