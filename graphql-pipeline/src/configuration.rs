//! Pipeline configuration.
//!
//! Read from YAML with [`Configuration::from_yaml`]. Every section and every
//! field has a default, so an empty document is a valid configuration.

use displaydoc::Display;
use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::services::execution::ResolutionMode;
use crate::services::execution::default_max_concurrency;
use crate::services::parse::default_recursion_limit;
use crate::services::parse::default_token_limit;
use crate::services::validate::ValidationRules;

/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// could not parse configuration: {0}
    InvalidYaml(#[from] serde_yaml::Error),
    /// {message}: {error}
    InvalidValue {
        message: &'static str,
        error: String,
    },
}

/// The configuration of a [`crate::Pipeline`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Configuration {
    /// Request parsing.
    pub parser: ParserConfig,

    /// Resolver scheduling.
    pub execution: ExecutionConfig,

    /// Operation limits checked during validation.
    pub limits: ValidationRules,

    /// Phase spans.
    pub telemetry: Telemetry,
}

/// Request parsing options.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    /// Maximum nesting of the request syntax tree.
    /// Defaults to 500
    #[serde(default = "default_recursion_limit")]
    pub recursion_limit: usize,

    /// Maximum number of tokens in a request.
    /// Defaults to 15000
    #[serde(default = "default_token_limit")]
    pub token_limit: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            recursion_limit: default_recursion_limit(),
            token_limit: default_token_limit(),
        }
    }
}

/// Resolver scheduling options.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExecutionConfig {
    /// How sibling fields are resolved.
    /// Defaults to sequential
    #[serde(default)]
    pub mode: ResolutionMode,

    /// Maximum number of sibling fields resolved at once in concurrent mode.
    /// Defaults to 16
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            mode: ResolutionMode::default(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// Phase span options.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Telemetry {
    /// Record a span around each phase of requests that carry a context.
    /// Defaults to true
    #[serde(default = "default_tracing")]
    pub tracing: bool,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            tracing: default_tracing(),
        }
    }
}

const fn default_tracing() -> bool {
    true
}

impl Configuration {
    /// Parses and checks a YAML configuration. Blank input gives the defaults.
    pub fn from_yaml(raw_yaml: &str) -> Result<Self, ConfigurationError> {
        if raw_yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let configuration: Self = serde_yaml::from_str(raw_yaml)?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.execution.max_concurrency == 0 {
            return Err(ConfigurationError::InvalidValue {
                message: "execution.max_concurrency must be greater than 0",
                error: "got 0".to_string(),
            });
        }
        if self.parser.recursion_limit == 0 || self.parser.token_limit == 0 {
            return Err(ConfigurationError::InvalidValue {
                message: "parser limits must be greater than 0",
                error: format!(
                    "recursion_limit: {}, token_limit: {}",
                    self.parser.recursion_limit, self.parser.token_limit
                ),
            });
        }
        Ok(())
    }

    /// JSON schema of the YAML configuration.
    pub fn json_schema() -> RootSchema {
        schemars::schema_for!(Configuration)
    }
}
