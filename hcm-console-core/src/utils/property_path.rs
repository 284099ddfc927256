//! Dotted property path access on form objects (`subnet.name`)

use serde_json::{Map, Value};

/// Read the value at `path`, if every segment exists.
pub fn get_path<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = root.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(obj) => obj.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Write `value` at `path`, creating intermediate objects as needed.
///
/// Returns `false` when an intermediate segment exists but is not an object.
pub fn set_path(root: &mut Map<String, Value>, path: &str, value: Value) -> bool {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return false;
    };

    let mut current = root;
    for segment in parents {
        let entry = current
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match entry {
            Value::Object(obj) => current = obj,
            _ => return false,
        }
    }
    current.insert((*last).to_string(), value);
    true
}
