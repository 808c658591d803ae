//! Uniform failure type for the execute-once step.
//!
//! Every failure from the execution engine, the inspection engine, the codec,
//! or the relocator is folded into a single `StepError` so the pipeline
//! controller only has one thing to handle. None of these are retried.
use thiserror::Error;

/// Discriminant of a [`StepError`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepErrorKind {
    ConfigurationInvalid,
    ExecutionFailed,
    ResultParseFailed,
    InspectionFailed,
    RelocationFailed,
    AttachFailed,
}

#[derive(Debug, Error)]
pub enum StepError {
    /// An option could not be parsed; raised before any job is submitted.
    #[error("invalid configuration for '{key}': {message}")]
    ConfigurationInvalid { key: String, message: String },

    /// The primary job failed or could not be submitted.
    #[error("execute operation failed: {0}")]
    ExecutionFailed(String),

    /// The primary job's payload is not a valid element description.
    #[error("result element could not be parsed: {0}")]
    ResultParseFailed(String),

    /// The inspection job failed or its payload is undecodable.
    #[error("media inspection of {location} failed: {message}")]
    InspectionFailed { location: String, message: String },

    /// Moving the element into the package namespace failed.
    #[error("could not move element {element} into media package {package}: {message}")]
    RelocationFailed {
        package: String,
        element: String,
        message: String,
    },

    /// Any other error while attaching the element to the package.
    #[error("could not attach element {element}: {message}")]
    AttachFailed { element: String, message: String },
}

impl StepError {
    pub fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigurationInvalid {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn inspection(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InspectionFailed {
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn attach(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AttachFailed {
            element: element.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> StepErrorKind {
        match self {
            StepError::ConfigurationInvalid { .. } => StepErrorKind::ConfigurationInvalid,
            StepError::ExecutionFailed(_) => StepErrorKind::ExecutionFailed,
            StepError::ResultParseFailed(_) => StepErrorKind::ResultParseFailed,
            StepError::InspectionFailed { .. } => StepErrorKind::InspectionFailed,
            StepError::RelocationFailed { .. } => StepErrorKind::RelocationFailed,
            StepError::AttachFailed { .. } => StepErrorKind::AttachFailed,
        }
    }
}

pub type StepResult<T> = Result<T, StepError>;

/// Render an `anyhow` chain on one line for embedding in a `StepError`.
pub(crate) fn chain_message(err: &anyhow::Error) -> String {
    format!("{err:#}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_key_and_message() {
        let err = StepError::configuration("expected-type", "'bogus' is not a valid element type");
        assert_eq!(
            err.to_string(),
            "invalid configuration for 'expected-type': 'bogus' is not a valid element type"
        );
        assert_eq!(err.kind(), StepErrorKind::ConfigurationInvalid);
    }

    #[test]
    fn chain_message_keeps_context() {
        let err = anyhow::anyhow!("disk full").context("move track");
        assert_eq!(chain_message(&err), "move track: disk full");
    }
}
