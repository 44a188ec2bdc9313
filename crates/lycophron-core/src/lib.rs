//! Core contracts for Lycophron.
//!
//! This crate owns the static metadata field catalog used to build CSV
//! templates and to validate CSV headers before records are loaded.

pub mod catalog;
pub mod error;
pub mod fields;

pub use catalog::{FieldCatalog, HeaderReport, Namespace, TemplateRequest};
pub use error::{Error, Result};
pub use fields::{
    ACCESS_FIELDS, CORE_FIELDS, FILENAMES_FIELD, ID_FIELD, NAMESPACE_FIELDS, NAMESPACE_PREFIXES,
    STANDARD_FIELDS,
};

/// Separator between a namespace prefix and a bare field name.
pub const FIELD_SEPARATOR: char = '.';
