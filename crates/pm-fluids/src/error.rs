//! Fluid property errors.

use pm_core::CoreError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur while fixing or classifying a state.
///
/// Every failure a single query can produce maps onto one of these variants so
/// sweeps can record it per sample and keep going.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Inputs that can never fix a state (non-finite, non-positive, dependent pair).
    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    /// Query is outside the region where the requested state exists.
    #[error("Value out of range: {what}")]
    OutOfRange { what: String },

    /// Backend failed to converge (typically close to the critical point).
    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    /// Substance or input pair not handled by the provider.
    #[error("Not supported: {what}")]
    NotSupported { what: String },

    /// Any other backend failure, message preserved.
    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl FluidError {
    pub fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidInput { what: what.into() }
    }

    pub fn out_of_range(what: impl Into<String>) -> Self {
        Self::OutOfRange { what: what.into() }
    }

    /// True for failures caused by asking outside the valid domain, as opposed
    /// to malformed input.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::ConvergenceFailed { .. })
    }

    /// Prefix the message with `context`, keeping the variant.
    pub fn with_context(self, context: impl std::fmt::Display) -> Self {
        let wrap = |text: String| format!("{context}: {text}");
        match self {
            Self::InvalidInput { what } => Self::InvalidInput { what: wrap(what) },
            Self::OutOfRange { what } => Self::OutOfRange { what: wrap(what) },
            Self::ConvergenceFailed { what } => Self::ConvergenceFailed { what: wrap(what) },
            Self::NotSupported { what } => Self::NotSupported { what: wrap(what) },
            Self::Backend { message } => Self::Backend {
                message: wrap(message),
            },
        }
    }

    /// Classify a raw backend message.
    ///
    /// CoolProp reports failures as plain strings, so the mapping is a
    /// best-effort substring match. Unknown messages fall back to `Backend`.
    pub fn from_backend_message(message: &str) -> Self {
        const CONVERGENCE_MARKERS: &[&str] = &[
            "converge",
            "max iterations",
            "maximum number of iterations",
            "opposite signs",
        ];
        const OUT_OF_RANGE_MARKERS: &[&str] = &[
            "not in range",
            "out of range",
            "outside the range of validity",
            "must be in range",
            "must be between",
            "quality must be",
            "above the critical",
            "greater than critical",
            "less than triple",
        ];
        const INVALID_MARKERS: &[&str] = &[
            "not a valid number",
            "invalid state",
            "invalid number",
            "not independent",
            "bad input pair",
        ];

        let lowered = message.to_lowercase();
        let owned = message.to_string();

        if contains_any(&lowered, CONVERGENCE_MARKERS) {
            Self::ConvergenceFailed { what: owned }
        } else if contains_any(&lowered, OUT_OF_RANGE_MARKERS) {
            Self::OutOfRange { what: owned }
        } else if contains_any(&lowered, INVALID_MARKERS) {
            Self::InvalidInput { what: owned }
        } else {
            Self::Backend { message: owned }
        }
    }
}

impl From<CoreError> for FluidError {
    fn from(err: CoreError) -> Self {
        FluidError::InvalidInput {
            what: err.to_string(),
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::invalid("pressure must be positive");
        assert!(err.to_string().contains("pressure"));

        let err = FluidError::Backend {
            message: "CoolProp failed".into(),
        };
        assert!(err.to_string().contains("CoolProp"));
    }

    #[test]
    fn backend_message_out_of_range() {
        let err = FluidError::from_backend_message(
            "Pressure to PQ_flash [3e+07 Pa] must be in range [611.655 Pa, 2.2064e+07 Pa]",
        );
        assert!(matches!(err, FluidError::OutOfRange { .. }));
        assert!(err.is_out_of_range());
    }

    #[test]
    fn backend_message_convergence() {
        let err = FluidError::from_backend_message("Secant failed to converge");
        assert!(matches!(err, FluidError::ConvergenceFailed { .. }));
        assert!(err.is_out_of_range());
    }

    #[test]
    fn backend_message_invalid() {
        let err = FluidError::from_backend_message("p is not a valid number");
        assert!(matches!(err, FluidError::InvalidInput { .. }));
        assert!(!err.is_out_of_range());
    }

    #[test]
    fn backend_message_fallback() {
        let err = FluidError::from_backend_message("something else entirely");
        assert!(matches!(err, FluidError::Backend { .. }));
    }

    #[test]
    fn core_error_becomes_invalid_input() {
        let err: FluidError = CoreError::NonPositive {
            what: "specific volume",
            value: -1.0,
        }
        .into();
        assert!(matches!(err, FluidError::InvalidInput { .. }));
    }
}
