use serde_json::Value;

/// Pick the "latest" version out of a metadata response.
///
/// - array: the first element; a string element is used as-is, an object element yields
///   its `field` (or `version` when `field` is missing)
/// - object: its `field`
/// - string: itself
///
/// Blank results count as no value.
pub fn latest_from_json(body: &Value, field: &str) -> Option<String> {
    let raw = match body {
        Value::Array(items) => match items.first()? {
            Value::String(s) => Some(s.as_str()),
            Value::Object(obj) => obj
                .get(field)
                .or_else(|| obj.get("version"))
                .and_then(Value::as_str),
            _ => None,
        },
        Value::Object(obj) => obj.get(field).and_then(Value::as_str),
        Value::String(s) => Some(s.as_str()),
        _ => None,
    }?;

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
