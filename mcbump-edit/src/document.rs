//! Key-path edits for JSON documents.

use crate::error::PatchError;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyEdit {
    NotFound,
    Unchanged,
    Changed,
}

/// Parse a document whose top level must be an object.
pub(crate) fn parse(content: &str, path: &str) -> Result<Value, PatchError> {
    let doc: Value = serde_json::from_str(content).map_err(|e| PatchError::Malformed {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    if !doc.is_object() {
        return Err(PatchError::Malformed {
            path: path.to_string(),
            message: "top level is not an object".to_string(),
        });
    }
    Ok(doc)
}

/// Set an existing key to a string. Missing parents or keys are left alone.
pub(crate) fn set_string(doc: &mut Value, path: &[String], value: &str) -> KeyEdit {
    let Some((last, parents)) = path.split_last() else {
        return KeyEdit::NotFound;
    };

    let mut node = doc;
    for key in parents {
        match node.get_mut(key.as_str()) {
            Some(child) if child.is_object() => node = child,
            _ => return KeyEdit::NotFound,
        }
    }

    let Some(slot) = node.as_object_mut().and_then(|obj| obj.get_mut(last.as_str())) else {
        return KeyEdit::NotFound;
    };
    if slot.as_str() == Some(value) {
        return KeyEdit::Unchanged;
    }
    *slot = Value::String(value.to_string());
    KeyEdit::Changed
}

/// Two-space pretty JSON in the document's original key order, keeping a trailing newline
/// if the original had one.
pub(crate) fn serialize(doc: &Value, original: &str, path: &str) -> Result<String, PatchError> {
    let mut out = serde_json::to_string_pretty(doc).map_err(|e| PatchError::Malformed {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    if original.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}
