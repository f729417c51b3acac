//! Twin synchronization engine facade
//!
//! Owns the binding registry, the report transport, and the engine
//! configuration, and exposes the inbound entry point plus the correlation
//! lookup used when the transport acknowledges a report.

use crate::binding::{RequestId, TwinBinding};
use crate::desired;
use crate::error::TwinError;
use crate::registry::TwinRegistry;
use crate::report;
use crate::transport::ReportTransport;
use crate::value::TwinValue;
use serde_json::Value as Json;
use tracing::{debug, info, warn};

/// Engine tuning knobs
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Echo reported state immediately after each applied desired update.
    /// Hosts that batch their own reports disable this.
    pub auto_report: bool,

    /// Drop inbound payloads larger than this many bytes
    pub max_payload_bytes: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_report: true,
            max_payload_bytes: None,
        }
    }
}

/// The synchronization engine: one registry, one transport, no global state.
/// Independent engines can coexist in a process.
pub struct TwinSyncEngine {
    registry: TwinRegistry,
    transport: Box<dyn ReportTransport + Send>,
    config: EngineConfig,
}

impl TwinSyncEngine {
    /// Build an engine over a fixed binding set with default configuration
    pub fn new(
        bindings: Vec<TwinBinding>,
        transport: impl ReportTransport + Send + 'static,
    ) -> Self {
        Self::with_config(bindings, transport, EngineConfig::default())
    }

    /// Build an engine with explicit configuration
    pub fn with_config(
        bindings: Vec<TwinBinding>,
        transport: impl ReportTransport + Send + 'static,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry: TwinRegistry::new(bindings),
            transport: Box::new(transport),
            config,
        }
    }

    /// Open the whole binding set. Returns the number of bindings opened.
    pub fn open(&mut self) -> usize {
        let opened = self.registry.open();
        info!("opened {} of {} twin bindings", opened, self.registry.len());
        opened
    }

    /// Close the whole binding set. Safe after a partial open.
    pub fn close(&mut self) {
        self.registry.close();
        info!("closed twin binding set");
    }

    /// Process one inbound desired-properties payload.
    ///
    /// Every binding whose name resolves in the document gets the full
    /// treatment: type-checked extraction, slot update, change handler,
    /// then (unless auto-reporting is off) a reported-state echo correlated
    /// to `request_id`. Malformed payloads drop the whole message with no
    /// partial effects. Returns the number of bindings updated.
    pub fn handle_desired_update(&mut self, payload: &[u8], request_id: RequestId) -> usize {
        if let Some(limit) = self.config.max_payload_bytes {
            if payload.len() > limit {
                debug!(
                    "dropping twin update: payload of {} bytes exceeds limit of {limit}",
                    payload.len()
                );
                return 0;
            }
        }

        let Some(doc) = desired::parse_document(payload) else {
            return 0;
        };
        let Some(properties) = desired::desired_object(&doc) else {
            return 0;
        };

        let auto_report = self.config.auto_report;
        let mut updated = 0;

        for binding in self.registry.iter_mut() {
            if !binding.is_open() {
                continue;
            }
            let Some(entry) =
                desired::dotted_get(properties, binding.name()).and_then(Json::as_object)
            else {
                continue;
            };
            let Some(value) = desired::extract_value(binding.kind(), entry) else {
                continue;
            };

            binding.set_value(value);
            binding.notify_changed();
            updated += 1;
            debug!("applied desired value for '{}'", binding.name());

            if !auto_report {
                continue;
            }
            if let Some(current) = binding.value().cloned() {
                match report::report_state(binding, &current, request_id, &mut *self.transport) {
                    Ok(true) => {}
                    Ok(false) => warn!("transport rejected report for '{}'", binding.name()),
                    Err(err) => warn!("failed to report '{}': {err}", binding.name()),
                }
            }
        }

        updated
    }

    /// Host-initiated reported-state submission for one property.
    ///
    /// Returns the transport's accept/reject verdict, or an error when the
    /// name does not resolve, the binding is closed, the value kind does
    /// not match the binding, or the fragment cannot be rendered.
    pub fn report_state(
        &mut self,
        property: &str,
        value: TwinValue,
        request_id: RequestId,
    ) -> Result<bool, TwinError> {
        let Some(binding) = self.registry.find_by_name_mut(property) else {
            return Err(TwinError::UnknownBinding {
                property: property.to_string(),
            });
        };
        report::report_state(binding, &value, request_id, &mut *self.transport)
    }

    /// Correlation lookup for asynchronous acknowledgement handling
    pub fn find_by_request_id(&self, request_id: RequestId) -> Option<&TwinBinding> {
        self.registry.find_by_request_id(request_id)
    }

    /// Resolve a transport-level acknowledgement back to the binding that
    /// issued the report, logging the delivery status.
    pub fn acknowledge(&self, request_id: RequestId, status: i32) -> Option<&TwinBinding> {
        match self.registry.find_by_request_id(request_id) {
            Some(binding) => {
                info!(
                    "report for '{}' acknowledged with status {status}",
                    binding.name()
                );
                Some(binding)
            }
            None => {
                warn!("acknowledgement for unknown request {request_id} (status {status})");
                None
            }
        }
    }

    /// Read access to a binding by property name
    pub fn binding(&self, name: &str) -> Option<&TwinBinding> {
        self.registry.find_by_name(name)
    }

    /// The underlying registry
    pub fn registry(&self) -> &TwinRegistry {
        &self.registry
    }
}
