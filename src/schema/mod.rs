//! Payload schema validation.
//!
//! ## Contents
//! - [`SchemaSource`] lookup seam: topic → compiled schema or "none"
//! - [`StaticSchemaSource`] in-memory implementation
//! - `SchemaValidator` (crate-internal) the adapter the dispatcher calls
//!
//! Validation is opt-in (`BusConfig::validate_schemas`); when disabled the
//! dispatcher skips the lookup entirely.

mod source;
mod validator;

pub use source::{SchemaSource, StaticSchemaSource};

pub(crate) use validator::SchemaValidator;
