//! Reported-state fragment rendering and submission
//!
//! Each report is a single-key JSON object `{"<property>": <value>}`
//! correlated to the transport request id that carries it.

use crate::binding::{RequestId, TwinBinding};
use crate::error::TwinError;
use crate::transport::ReportTransport;
use crate::value::{TwinValue, ValueKind};

/// Map a twin value to its JSON representation. Non-finite floats have no
/// JSON form.
fn json_value(value: &TwinValue) -> Option<serde_json::Value> {
    match value {
        TwinValue::Boolean(b) => Some(serde_json::Value::Bool(*b)),
        TwinValue::Integer(i) => Some(serde_json::Value::from(*i)),
        TwinValue::Float(f) => {
            serde_json::Number::from_f64(f.into_inner()).map(serde_json::Value::Number)
        }
        TwinValue::String(s) => Some(serde_json::Value::from(s.as_str())),
    }
}

/// Render the reported-properties fragment for one property. String values
/// are JSON-escaped, so the fragment is always a valid document.
pub(crate) fn render_fragment(name: &str, value: &TwinValue) -> Result<String, TwinError> {
    let body = json_value(value).ok_or_else(|| TwinError::Serialize {
        property: name.to_string(),
    })?;
    let mut fragment = serde_json::Map::with_capacity(1);
    fragment.insert(name.to_string(), body);
    serde_json::to_string(&serde_json::Value::Object(fragment)).map_err(|_| TwinError::Serialize {
        property: name.to_string(),
    })
}

/// Record the request id on the binding, sync the binding's slot to the
/// reported value, render the fragment, and hand it to the transport.
///
/// The slot tracks the last *reported* value, not only the last desired
/// one. Strings are the exception: the slot is cleared to empty
/// immediately, since string state is never retained past the report
/// that carried it.
pub(crate) fn report_state(
    binding: &mut TwinBinding,
    value: &TwinValue,
    request_id: RequestId,
    transport: &mut dyn ReportTransport,
) -> Result<bool, TwinError> {
    if binding.kind() == ValueKind::Unknown {
        return Err(TwinError::UnknownKind {
            property: binding.name().to_string(),
        });
    }
    if !binding.is_open() {
        return Err(TwinError::BindingClosed {
            property: binding.name().to_string(),
        });
    }
    if value.kind() != binding.kind() {
        return Err(TwinError::KindMismatch {
            property: binding.name().to_string(),
            expected: binding.kind(),
            actual: value.kind(),
        });
    }

    binding.set_pending(request_id);
    match value {
        TwinValue::String(_) => binding.set_value(TwinValue::String(String::new())),
        other => binding.set_value(other.clone()),
    }

    let fragment = render_fragment(binding.name(), value)?;
    Ok(transport.submit(binding, &fragment))
}
