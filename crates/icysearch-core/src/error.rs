use std::fmt;
use thiserror::Error as ThisError;

///
/// QueryError
///
/// Every failure surfaced while compiling a query or extracting typed
/// results from a backend response. Inputs are deterministic, so none of
/// these are retryable.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("unsupported expression '{expression}': {reason}")]
    UnsupportedExpression { expression: String, reason: String },

    #[error("aggregation '{name}' is missing from the response")]
    MissingAggregation { name: String },

    #[error("bucket key '{key}' cannot be converted to {target}")]
    Conversion { key: String, target: &'static str },

    #[error("aggregation name '{name}' is derived more than once in the same query")]
    AmbiguousFieldName { name: String },

    #[error("aggregation '{name}' has an unexpected response shape: {reason}")]
    MalformedResponse { name: String, reason: String },

    #[error("invalid search config: {message}")]
    Config { message: String },
}

impl QueryError {
    pub(crate) fn unsupported(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedExpression {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(name: impl Into<String>) -> Self {
        Self::MissingAggregation { name: name.into() }
    }

    pub(crate) fn conversion<V>(key: impl Into<String>) -> Self {
        Self::Conversion {
            key: key.into(),
            target: std::any::type_name::<V>(),
        }
    }

    pub(crate) fn ambiguous(name: impl Into<String>) -> Self {
        Self::AmbiguousFieldName { name: name.into() }
    }

    pub(crate) fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedExpression { .. } => ErrorClass::Unsupported,
            Self::MissingAggregation { .. } => ErrorClass::Missing,
            Self::Conversion { .. } => ErrorClass::Conversion,
            Self::AmbiguousFieldName { .. } => ErrorClass::Ambiguous,
            Self::MalformedResponse { .. } => ErrorClass::Malformed,
            Self::Config { .. } => ErrorClass::Config,
        }
    }

    /// True when the error means the requested aggregation was never
    /// returned by the backend.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::MissingAggregation { .. })
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}: {self}", self.class())
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorClass {
    Unsupported,
    Missing,
    Conversion,
    Ambiguous,
    Malformed,
    Config,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unsupported => "unsupported",
            Self::Missing => "missing",
            Self::Conversion => "conversion",
            Self::Ambiguous => "ambiguous",
            Self::Malformed => "malformed",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}
