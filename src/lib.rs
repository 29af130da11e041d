//! Consent Form Service
//!
//! This library provides a form lifecycle engine and a web service around
//! it: operators compose a form from a palette of field types, publish
//! it, and later review structured submissions (captured consent and
//! handwritten signatures included) and export them as PDF documents.
//!
//! # Modules
//!
//! - `services::registry`: field type catalog (value shapes, widgets)
//! - `services::reorder`: ordered field sequence behind the compose canvas
//! - `services::storage`: injected key-value `Store` with capacity limits
//! - `services::form_store`: published form definitions with eviction
//! - `services::submission_store`: captured submission records
//! - `services::renderer`: compose and fill modes over a stored schema
//! - `services::exporter`: filled-form and audit-trail PDF documents

pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

// Re-export the main API types for ease of use
pub use errors::FormError;
pub use handlers::api::AppState;
pub use models::form::{FieldType, FormDefinition, FormField};
pub use models::submission::Submission;
pub use routes::create_router;
pub use services::form_store::FormStore;
pub use services::renderer::FormRenderer;
pub use services::storage::{JsonFileStore, MemoryStore, Store};
pub use services::submission_store::SubmissionStore;
