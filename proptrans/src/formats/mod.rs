//! Supported localization file formats.
//!
//! Only Java `.properties` is handled; the module layout leaves room for
//! sibling formats that share the [`crate::traits::Parser`] trait.

pub mod properties;

pub use properties::{Format as PropertiesFormat, ParseWarning};

/// File extension of the properties format, without the dot.
pub const PROPERTIES_EXTENSION: &str = "properties";
