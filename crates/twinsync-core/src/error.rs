//! Error types for registry and reporting operations

use crate::value::ValueKind;
use thiserror::Error;

/// Errors surfaced by binding registration and reported-state submission.
///
/// Malformed inbound payloads are not represented here: the engine drops
/// them without error, since a missed desired update is superseded by the
/// next sync.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TwinError {
    /// Binding was declared without a usable value kind.
    #[error("binding '{property}' has no configured value kind")]
    UnknownKind {
        /// Property name of the offending binding.
        property: String,
    },

    /// No binding is registered under the given property name.
    #[error("no binding named '{property}'")]
    UnknownBinding {
        /// The name that failed to resolve.
        property: String,
    },

    /// The operation requires an opened binding.
    #[error("binding '{property}' is not open")]
    BindingClosed {
        /// Property name of the closed binding.
        property: String,
    },

    /// Supplied value does not match the binding's declared kind.
    #[error("binding '{property}' expects {expected}, got {actual}")]
    KindMismatch {
        /// Property name of the binding.
        property: String,
        /// The binding's declared kind.
        expected: ValueKind,
        /// The kind of the value supplied.
        actual: ValueKind,
    },

    /// The reported-state fragment could not be rendered.
    #[error("failed to serialize reported state for '{property}'")]
    Serialize {
        /// Property name of the binding being reported.
        property: String,
    },
}
