//! Parameter validation utilities.
//!
//! Small checks shared by the configuration layer, the device factory and
//! the graph builder. They return `Err(String)` with a human readable reason;
//! callers wrap the message into their own error type together with the name
//! of the offending parameter.

/// Log levels understood by `env_logger` filters
pub const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Validate that a value is finite and strictly positive
///
/// # Examples
/// ```
/// use agrifog::utils::validation::validate_positive;
///
/// assert!(validate_positive(5.0).is_ok());
/// assert!(validate_positive(0.0).is_err());
/// assert!(validate_positive(f64::NAN).is_err());
/// ```
pub fn validate_positive(value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{} is not a finite number", value));
    }
    if value <= 0.0 {
        return Err(format!("{} must be greater than zero", value));
    }
    Ok(())
}

/// Validate that a value is finite and not negative
pub fn validate_non_negative(value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{} is not a finite number", value));
    }
    if value < 0.0 {
        return Err(format!("{} must not be negative", value));
    }
    Ok(())
}

/// Validate a forwarding probability
///
/// Probabilities are taken as declared: the check only enforces the
/// `[0.0, 1.0]` range, it never rescales.
///
/// # Examples
/// ```
/// use agrifog::utils::validation::validate_probability;
///
/// assert!(validate_probability(1.0).is_ok());
/// assert!(validate_probability(0.0).is_ok());
/// assert!(validate_probability(1.5).is_err());
/// ```
pub fn validate_probability(value: f64) -> Result<(), String> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(format!("{} is not a probability in [0.0, 1.0]", value));
    }
    Ok(())
}

/// Validate an identifier-like name (module, device, tuple type)
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name cannot be empty".to_string());
    }
    if name.trim() != name {
        return Err(format!("name '{}' has leading or trailing whitespace", name));
    }
    Ok(())
}

/// Validate a log level string
pub fn validate_log_level(level: &str) -> Result<(), String> {
    let lowered = level.to_lowercase();
    if LOG_LEVELS.contains(&lowered.as_str()) {
        Ok(())
    } else {
        Err(format!(
            "unknown log level '{}' (expected one of {})",
            level,
            LOG_LEVELS.join(", ")
        ))
    }
}
