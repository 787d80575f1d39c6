//! Pipeline errors.
use apollo_compiler::validation::DiagnosticList;
use apollo_compiler::validation::WithErrors;
use displaydoc::Display;
use thiserror::Error;

pub use crate::configuration::ConfigurationError;
use crate::graphql::Error;
use crate::graphql::IntoGraphQLErrors;
use crate::graphql::Location as ErrorLocation;

pub(crate) const PARSE_FAILED_CODE: &str = "GRAPHQL_PARSE_FAILED";
pub(crate) const VALIDATION_FAILED_CODE: &str = "GRAPHQL_VALIDATION_FAILED";

/// Error in the schema.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum SchemaError {
    /// GraphQL parser error(s): {0}
    Parse(ParseErrors),
    /// GraphQL validation error(s): {0}
    Validate(ValidationErrors),
    /// cannot register a resolver for '{type_name}.{field_name}': no such field in the schema
    UnknownField {
        /// The parent type of the resolver.
        type_name: String,
        /// The field the resolver was registered for.
        field_name: String,
    },
    /// missing SDL to build the schema from
    MissingSdl,
}

/// Error while reading or writing a [`crate::Context`] entry.
#[derive(Debug, Error, Display)]
pub enum ContextError {
    /// could not (de)serialize context entry: {0}
    Serialization(#[from] serde_json::Error),
}

/// Collection of schema parsing errors.
#[derive(Debug)]
pub struct ParseErrors {
    pub(crate) errors: DiagnosticList,
}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut errors = self.errors.iter();
        for (i, error) in errors.by_ref().take(5).enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", error)?;
        }
        let remaining = errors.count();
        if remaining > 0 {
            write!(f, "\n...and {remaining} other errors")?;
        }
        Ok(())
    }
}

/// One syntax error found in request text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub location: Option<ErrorLocation>,
}

/// The syntax errors of a request, in source order. Never empty when returned by a parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxErrors {
    pub errors: Vec<SyntaxError>,
}

impl SyntaxErrors {
    pub fn new(errors: Vec<SyntaxError>) -> Self {
        Self { errors }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl From<DiagnosticList> for SyntaxErrors {
    fn from(errors: DiagnosticList) -> Self {
        Self {
            errors: errors
                .iter()
                .map(|diagnostic| SyntaxError {
                    message: diagnostic.error.to_string(),
                    location: diagnostic.line_column_range().map(|range| ErrorLocation {
                        line: range.start.line as u32,
                        column: range.start.column as u32,
                    }),
                })
                .collect(),
        }
    }
}

impl<T> From<WithErrors<T>> for SyntaxErrors {
    fn from(WithErrors { errors, .. }: WithErrors<T>) -> Self {
        errors.into()
    }
}

impl std::fmt::Display for SyntaxErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            match &error.location {
                Some(location) => write!(
                    f,
                    "[{}:{}] {}",
                    location.line, location.column, error.message
                )?,
                None => write!(f, "{}", error.message)?,
            }
        }
        Ok(())
    }
}

impl IntoGraphQLErrors for SyntaxErrors {
    fn into_graphql_errors(self) -> Vec<Error> {
        self.errors
            .into_iter()
            .map(|error| {
                Error::builder()
                    .message(error.message)
                    .locations(error.location.into_iter().collect::<Vec<_>>())
                    .extension_code(PARSE_FAILED_CODE)
                    .build()
            })
            .collect()
    }
}

/// Collection of validation errors, already in their GraphQL shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<Error>,
}

impl From<DiagnosticList> for ValidationErrors {
    fn from(errors: DiagnosticList) -> Self {
        Self {
            errors: errors
                .iter()
                .map(|diagnostic| {
                    Error::builder()
                        .message(diagnostic.error.to_string())
                        .locations(
                            diagnostic
                                .line_column_range()
                                .map(|range| {
                                    vec![ErrorLocation {
                                        line: range.start.line as u32,
                                        column: range.start.column as u32,
                                    }]
                                })
                                .unwrap_or_default(),
                        )
                        .extension_code(VALIDATION_FAILED_CODE)
                        .build()
                })
                .collect(),
        }
    }
}

impl<T> From<WithErrors<T>> for ValidationErrors {
    fn from(WithErrors { errors, .. }: WithErrors<T>) -> Self {
        errors.into()
    }
}

impl IntoGraphQLErrors for ValidationErrors {
    fn into_graphql_errors(self) -> Vec<Error> {
        self.errors
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            if let Some(location) = error.locations.first() {
                write!(
                    f,
                    "[{}:{}] {}",
                    location.line, location.column, error.message
                )?;
            } else {
                write!(f, "{}", error.message)?;
            }
        }
        Ok(())
    }
}
