//! Shared utilities: parameter validation.

pub mod validation;

pub use validation::{validate_log_level, validate_name, validate_non_negative, validate_positive, validate_probability};
