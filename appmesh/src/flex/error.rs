use thiserror::Error;
use tfplug::types::AttributePath;

/// Configuration problems found while expanding a spec
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error(
        "{group}: only one of `{}` can be specified, but `{}` were specified",
        .members.join(","),
        .populated.join(",")
    )]
    ExactlyOneOf {
        group: AttributePath,
        members: &'static [&'static str],
        populated: Vec<&'static str>,
    },

    #[error("{group}: one of `{}` must be specified", .members.join(","))]
    MissingOneOf {
        group: AttributePath,
        members: &'static [&'static str],
    },

    #[error(
        "{group}: at most one of `{}` can be specified, but `{}` were specified",
        .members.join(","),
        .populated.join(",")
    )]
    AtMostOneOf {
        group: AttributePath,
        members: &'static [&'static str],
        populated: Vec<&'static str>,
    },

    #[error("{path}: block is required")]
    MissingRequired { path: AttributePath },

    #[error("{path}: expected {expected}, got {actual}")]
    InvalidType {
        path: AttributePath,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{path}: {message}")]
    InvalidValue { path: AttributePath, message: String },
}

impl ValidationError {
    /// Attribute the diagnostic should point at
    pub fn path(&self) -> &AttributePath {
        match self {
            ValidationError::ExactlyOneOf { group, .. }
            | ValidationError::MissingOneOf { group, .. }
            | ValidationError::AtMostOneOf { group, .. } => group,
            ValidationError::MissingRequired { path }
            | ValidationError::InvalidType { path, .. }
            | ValidationError::InvalidValue { path, .. } => path,
        }
    }
}
