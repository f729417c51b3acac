//! Desired-properties document walking
//!
//! Matches an inbound twin document against registered bindings and
//! performs type-checked extraction of each property's `"value"` entry.

use crate::value::{TwinValue, ValueKind};
use serde_json::{Map, Value as Json};
use tracing::debug;

/// Parse an inbound payload into a JSON document. Anything that is not a
/// well-formed JSON object drops the whole message: desired updates are
/// periodic and idempotent, so a dropped update is superseded by the next
/// sync.
pub(crate) fn parse_document(payload: &[u8]) -> Option<Json> {
    match serde_json::from_slice::<Json>(payload) {
        Ok(doc) if doc.is_object() => Some(doc),
        Ok(_) => {
            debug!("dropping twin update: document root is not an object");
            None
        }
        Err(err) => {
            debug!("dropping twin update: {err}");
            None
        }
    }
}

/// Resolve the object holding property values. A full twin document nests
/// them under `"desired"`; a delta document carries them at the root.
pub(crate) fn desired_object(doc: &Json) -> Option<&Map<String, Json>> {
    let root = doc.as_object()?;
    match root.get("desired").and_then(Json::as_object) {
        Some(desired) => Some(desired),
        None => Some(root),
    }
}

/// Dotted-path lookup: each `.`-separated segment of `path` descends one
/// nested object level.
pub(crate) fn dotted_get<'a>(object: &'a Map<String, Json>, path: &str) -> Option<&'a Json> {
    let mut current = object;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let value = current.get(segment)?;
        if segments.peek().is_none() {
            return Some(value);
        }
        current = value.as_object()?;
    }
    None
}

/// Extract the property object's `"value"` entry if its JSON type matches
/// the binding kind exactly. A present-but-wrong-typed value yields `None`:
/// not an error, just desired state that is not applicable here.
pub(crate) fn extract_value(kind: ValueKind, properties: &Map<String, Json>) -> Option<TwinValue> {
    let value = properties.get("value")?;
    match kind {
        // Fractional desired values for an integer binding truncate toward
        // zero, matching the wire consumers this engine talks to.
        ValueKind::Integer => value.as_f64().map(|n| TwinValue::Integer(n as i64)),
        ValueKind::Float => value.as_f64().map(TwinValue::from),
        ValueKind::Boolean => value.as_bool().map(TwinValue::Boolean),
        ValueKind::String => value.as_str().map(TwinValue::from),
        ValueKind::Unknown => None,
    }
}
