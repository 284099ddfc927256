//! Merge a vendor record into one flat display row

use serde_json::{Map, Value};

/// Flatten a raw record for display.
///
/// Equivalent to merging, in this order, the record itself, `spec`,
/// `attachment`, `revision`, `extension` and `extension.attachment`. Later
/// sources win on key collision; a missing or non-object source counts as
/// empty. The order decides which vendor-specific value is shown when two
/// sub-objects carry the same logical field, so it must not change.
pub fn flatten_record(record: &Value) -> Map<String, Value> {
    let mut row = Map::new();
    let Some(root) = record.as_object() else {
        return row;
    };

    let extension = root.get("extension");
    let sources = [
        Some(record),
        root.get("spec"),
        root.get("attachment"),
        root.get("revision"),
        extension,
        extension.and_then(|e| e.get("attachment")),
    ];

    for source in sources.into_iter().flatten() {
        if let Some(obj) = source.as_object() {
            for (key, value) in obj {
                row.insert(key.clone(), value.clone());
            }
        }
    }
    row
}
