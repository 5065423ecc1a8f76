use thiserror::Error;

/// Errors raised by a pricing request.
///
/// Every variant is fatal to the request that produced it. Nothing in the
/// engine retries or substitutes a default value; the caller gets the
/// offending field or value back so it can build a user-facing message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// A configuration value violates its domain. Raised before any
    /// simulation work starts.
    #[error("invalid configuration: {field} = {value} ({reason})")]
    InvalidConfiguration {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A simulated price, payoff or aggregate became non-finite.
    #[error("numerical instability in {context}: got {value}")]
    NumericalInstability { context: String, value: f64 },

    /// A pricing method, payoff policy or scenario name outside the
    /// supported set.
    #[error("unsupported {kind}: '{value}'")]
    UnsupportedMethod { kind: &'static str, value: String },

    /// The batch was aborted through the engine's cancellation flag.
    #[error("pricing run cancelled")]
    Cancelled,
}

impl PricingError {
    pub(crate) fn invalid(field: &'static str, value: impl ToString, reason: &'static str) -> Self {
        PricingError::InvalidConfiguration {
            field,
            value: value.to_string(),
            reason,
        }
    }

    pub(crate) fn unstable(context: impl Into<String>, value: f64) -> Self {
        PricingError::NumericalInstability {
            context: context.into(),
            value,
        }
    }

    pub(crate) fn unsupported(kind: &'static str, value: impl Into<String>) -> Self {
        PricingError::UnsupportedMethod {
            kind,
            value: value.into(),
        }
    }
}
