//! Error types for route table construction
//!
//! Everything in here is raised while the route table is being built. Failing
//! to match a path or to generate a link is an ordinary outcome and never
//! surfaces as one of these errors.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors that can occur while parsing a route template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("The route template '{template}' contains an empty segment")]
    EmptySegment { template: String },
    #[error("Invalid parameter name '{name}' in route template '{template}'")]
    InvalidParameterName { template: String, name: String },
    #[error("The route parameter name '{name}' appears more than once in '{template}'")]
    DuplicateParameter { template: String, name: String },
    #[error("A catch-all parameter can only appear as the last segment of '{template}'")]
    CatchAllNotLast { template: String },
    #[error("A catch-all parameter cannot be part of a complex segment in '{template}'")]
    CatchAllInComplexSegment { template: String },
    #[error("A catch-all parameter cannot be marked optional in '{template}'")]
    OptionalCatchAll { template: String },
    #[error("An optional parameter cannot have a default value ('{name}' in '{template}')")]
    OptionalWithDefault { template: String, name: String },
    #[error("A path segment cannot contain two consecutive parameters ('{template}')")]
    ConsecutiveParameters { template: String },
    #[error("An optional parameter must be the last part of its segment ('{name}' in '{template}')")]
    OptionalNotLast { template: String, name: String },
    #[error("An optional parameter in a complex segment can only be preceded by a period ('{name}' in '{template}')")]
    OptionalNotAfterPeriod { template: String, name: String },
    #[error("Unbalanced braces or parentheses in route template '{template}'")]
    Unbalanced { template: String },
    #[error("In a route parameter, '{{' and '}}' must be escaped with '{{{{' and '}}}}' ('{template}')")]
    UnescapedBrace { template: String },
    #[error("Invalid parameter syntax '{{{parameter}}}' in route template '{template}'")]
    InvalidParameter { template: String, parameter: String },
}

/// Errors raised when resolving an inline constraint such as `int` or `range(1,5)`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("The constraint '{0}' could not be resolved")]
    Unknown(String),
    #[error("Invalid arguments for constraint '{name}': {reason}")]
    InvalidArguments { name: String, reason: String },
}

/// Errors raised by `TreeRouteBuilder` while registering entries or building the router
#[derive(Error, Debug)]
pub enum RouteBuildError {
    #[error("Route template error: {0}")]
    Template(#[from] TemplateError),
    #[error("Constraint error on parameter '{parameter}': {source}")]
    Constraint {
        parameter: String,
        #[source]
        source: ConstraintError,
    },
    #[error("Two routes named '{name}' have different templates: '{existing}' and '{new}'")]
    DuplicateRouteName {
        name: String,
        existing: String,
        new: String,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid router options: {0}")]
    Config(#[from] ConfigError),
}

impl RouteBuildError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        RouteBuildError::InvalidArgument(message.into())
    }
}

/// Error returned when a precedence value cannot be parsed from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid precedence '{0}': expected a decimal with a single integer digit")]
pub struct ParsePrecedenceError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_message_mentions_both_templates() {
        let error = RouteBuildError::DuplicateRouteName {
            name: "home".to_string(),
            existing: "home/index".to_string(),
            new: "home/{id}".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("home/index"));
        assert!(message.contains("home/{id}"));
    }

    #[test]
    fn test_template_error_converts_into_build_error() {
        let error: RouteBuildError =
            TemplateError::EmptySegment { template: "a//b".to_string() }.into();
        assert!(matches!(error, RouteBuildError::Template(TemplateError::EmptySegment { .. })));
    }
}
