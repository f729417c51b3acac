//! Twin property bindings
//!
//! A binding pairs one twin property name with typed local state, an
//! optional change handler, and the correlation id of its most recent
//! report.

use crate::error::TwinError;
use crate::value::{TwinValue, ValueKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Correlation token for one reported-state submission, issued by the
/// transport layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub i64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Change notification callback, invoked synchronously after a desired
/// value lands and before the reported state is built
pub type ChangeHandler = Box<dyn FnMut(&TwinBinding) -> anyhow::Result<()> + Send>;

/// One twin property: a name, a declared kind, the typed state slot, an
/// optional change handler, and the pending request correlation field.
///
/// The slot is `None` until [`TwinRegistry::open`](crate::TwinRegistry::open)
/// succeeds for this binding and again after `close`; while open it always
/// holds a value of the declared kind.
pub struct TwinBinding {
    name: String,
    kind: ValueKind,
    slot: Option<TwinValue>,
    on_change: Option<ChangeHandler>,
    pending_request: Option<RequestId>,
}

impl TwinBinding {
    /// Declare a binding for `name` holding values of `kind`
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            slot: None,
            on_change: None,
            pending_request: None,
        }
    }

    /// Attach a change handler invoked after each applied desired update
    #[must_use]
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&TwinBinding) -> anyhow::Result<()> + Send + 'static,
    {
        self.on_change = Some(Box::new(handler));
        self
    }

    /// The twin property name; both the desired and the reported key
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared value kind
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Current state, or `None` while the binding is closed
    pub fn value(&self) -> Option<&TwinValue> {
        self.slot.as_ref()
    }

    /// Request id of the most recent report for this binding, if any.
    /// Overwritten by each report; only the latest correlation is kept.
    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending_request
    }

    /// Whether the binding has an active state slot
    pub fn is_open(&self) -> bool {
        self.slot.is_some()
    }

    /// Install the zero value for this binding's kind. Rejects `Unknown`.
    pub(crate) fn open(&mut self) -> Result<(), TwinError> {
        match self.kind.zero_value() {
            Some(zero) => {
                self.slot = Some(zero);
                Ok(())
            }
            None => Err(TwinError::UnknownKind {
                property: self.name.clone(),
            }),
        }
    }

    /// Release the state slot. Idempotent; safe on a never-opened binding.
    pub(crate) fn close(&mut self) {
        self.slot = None;
    }

    pub(crate) fn set_value(&mut self, value: TwinValue) {
        self.slot = Some(value);
    }

    pub(crate) fn set_pending(&mut self, id: RequestId) {
        self.pending_request = Some(id);
    }

    /// Run the change handler, if any. Handler failures are logged and do
    /// not abort processing: a handler cannot veto an applied update.
    pub(crate) fn notify_changed(&mut self) {
        if let Some(mut handler) = self.on_change.take() {
            if let Err(err) = handler(self) {
                warn!("change handler for '{}' failed: {err}", self.name);
            }
            self.on_change = Some(handler);
        }
    }
}

impl fmt::Debug for TwinBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwinBinding")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("slot", &self.slot)
            .field("has_handler", &self.on_change.is_some())
            .field("pending_request", &self.pending_request)
            .finish()
    }
}
