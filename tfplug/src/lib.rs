//! tfplug - plugin framework for infrastructure providers
//!
//! Defines the provider, resource, and data source contracts a host
//! orchestrator drives, the dynamic value model exchanged over the wire,
//! and the schema-driven plan engine that turns declared attribute
//! behavior into create/update/replace decisions.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod import;
pub mod logging;
pub mod plan;
pub mod plan_modifier;
pub mod validator;

// Re-exports for convenience
pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use import::import_state_passthrough_id;
pub use logging::{init_logging, try_init_logging};
pub use plan::{plan_resource_change, PlanAction, PlannedChange};
pub use plan_modifier::{PlanModifier, RequiresReplace, UseStateForUnknown};
pub use provider::{Provider, ProviderMetadataRequest, ProviderMetadataResponse};
pub use resource::{Resource, ResourceWithConfigure, ResourceWithImportState};
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{AttributePath, Diagnostic, DiagnosticSeverity, Dynamic, DynamicValue};
pub use validator::Validator;
