//! Binding registry lifecycle and lookup
//!
//! The registry is an ordered, fixed set of bindings established once at
//! startup; `open` and `close` bracket the whole set.

use crate::binding::{RequestId, TwinBinding};
use tracing::warn;

/// Ordered collection of twin property bindings
pub struct TwinRegistry {
    bindings: Vec<TwinBinding>,
}

impl TwinRegistry {
    /// Build a registry over a fixed set of bindings. Nothing is allocated
    /// until [`open`](Self::open).
    pub fn new(bindings: Vec<TwinBinding>) -> Self {
        Self { bindings }
    }

    /// Open every binding in the set. A binding declared with an unknown
    /// kind is skipped, not fatal to the rest: each binding validates
    /// independently. Returns the number of bindings opened; per-binding
    /// outcome is observable through [`TwinBinding::is_open`].
    pub fn open(&mut self) -> usize {
        let mut opened = 0;
        for binding in &mut self.bindings {
            match binding.open() {
                Ok(()) => opened += 1,
                Err(err) => warn!("skipping binding: {err}"),
            }
        }
        opened
    }

    /// Release every binding's state slot. Safe after a partial open and
    /// safe to call more than once.
    pub fn close(&mut self) {
        for binding in &mut self.bindings {
            binding.close();
        }
    }

    /// Linear scan by property name, first match wins. Names are expected
    /// unique; a duplicate silently shadows later entries (caller
    /// responsibility).
    pub fn find_by_name(&self, name: &str) -> Option<&TwinBinding> {
        self.bindings.iter().find(|b| b.name() == name)
    }

    pub(crate) fn find_by_name_mut(&mut self, name: &str) -> Option<&mut TwinBinding> {
        self.bindings.iter_mut().find(|b| b.name() == name)
    }

    /// Linear scan over pending request ids, first match wins. Correlation
    /// values are overwritten rather than queued, so two bindings sharing
    /// an outstanding id resolve ambiguously to the first.
    pub fn find_by_request_id(&self, id: RequestId) -> Option<&TwinBinding> {
        self.bindings
            .iter()
            .find(|b| b.pending_request() == Some(id))
    }

    /// Iterate the bindings in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, TwinBinding> {
        self.bindings.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, TwinBinding> {
        self.bindings.iter_mut()
    }

    /// Number of bindings in the set, open or not
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
