//! TwinSync Core Engine
//!
//! This crate provides a device-twin synchronization engine with:
//! - A typed binding registry pairing twin property names with local state
//! - Desired-properties document matching and type-checked extraction
//! - Per-property change notification callbacks
//! - Reported-state fragment generation with request-id correlation

pub mod binding;
pub mod engine;
pub mod error;
pub mod registry;
pub mod transport;
pub mod value;

mod desired;
mod report;

pub use binding::{ChangeHandler, RequestId, TwinBinding};
pub use engine::{EngineConfig, TwinSyncEngine};
pub use error::TwinError;
pub use registry::TwinRegistry;
pub use transport::ReportTransport;
pub use value::{TwinValue, ValueKind};
