use super::SwapError;
use tracing::{error, warn};

/// Logs an error with appropriate severity based on the error type.
///
/// # Arguments
/// * `error` - The SwapError to log
/// * `context` - Additional context about where/how the error occurred
pub fn log_error(error: &SwapError, context: &str) {
    match error {
        SwapError::Http { status, message } => {
            if status.is_server_error() {
                error!("{} - HTTP error {}: {}", context, status, message);
            } else {
                warn!("{} - HTTP error {}: {}", context, status, message);
            }
        }
        SwapError::Network(msg) => {
            warn!("{} - Network error: {}", context, msg);
        }
        SwapError::Validation(v) => {
            warn!("{} - Validation: {}", context, v);
        }
        SwapError::Simulation { stage, message, logs } => {
            error!(stage = %stage, log_lines = logs.len(), "{} - Simulation failed: {}", context, message);
        }
        SwapError::Confirmation { signature, message, logs } => {
            error!(%signature, log_lines = logs.len(), "{} - Confirmation failed: {}", context, message);
            for line in logs {
                warn!(%signature, "{}", line);
            }
        }
        SwapError::ConfigError(msg) => {
            error!("{} - Configuration error: {}", context, msg);
        }
        SwapError::InternalError(msg) => {
            error!("{} - Internal error: {}", context, msg);
        }
        _ => error!("{} - {}", context, error),
    }
}

/// Converts a reqwest error to a SwapError with additional context.
///
/// # Arguments
/// * `error` - The reqwest error to convert
/// * `context` - Additional context about the request that failed
pub fn handle_reqwest_error(error: reqwest::Error, context: &str) -> SwapError {
    if error.is_timeout() {
        SwapError::Network(format!("{}: Request timed out - {}", context, error))
    } else if let Some(status) = error.status() {
        SwapError::Http {
            status,
            message: format!("{}: {}", context, error),
        }
    } else if error.is_decode() {
        SwapError::Aggregator(format!("{}: malformed body - {}", context, error))
    } else {
        SwapError::Network(format!("{}: {}", context, error))
    }
}
