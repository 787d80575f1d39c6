//! Sequencing of the request phases.

use std::fmt;
use std::sync::Arc;

use tracing::Instrument;

use crate::Context;
use crate::Schema;
use crate::Source;
use crate::configuration::Configuration;
use crate::graphql::IntoGraphQLErrors;
use crate::graphql::Response;
use crate::json_ext::Object;
use crate::services::execution::DefaultExecutor;
use crate::services::execution::ExecutionRequest;
use crate::services::execution::Executor;
use crate::services::execution::PanicHandler;
use crate::services::execution::ResolutionStrategy;
use crate::services::execution::Sequential;
use crate::services::parse::DocumentParser;
use crate::services::parse::Parser;
use crate::services::validate::SchemaValidator;
use crate::services::validate::ValidationRules;
use crate::services::validate::Validator;
use crate::tracer::EXECUTION_SPAN_NAME;
use crate::tracer::NoopTracer;
use crate::tracer::PARSING_SPAN_NAME;
use crate::tracer::SpanGuard;
use crate::tracer::Tracer;
use crate::tracer::TracingTracer;
use crate::tracer::VALIDATION_SPAN_NAME;

/// Everything one request needs.
///
/// Root value and variables are read, never written, by every phase.
#[non_exhaustive]
pub struct Params {
    pub schema: Arc<Schema>,
    pub request_string: String,
    pub root_value: Object,
    pub variables: Object,
    pub operation_name: Option<String>,
    pub context: Option<Context>,
    pub panic_handler: Option<PanicHandler>,
    pub strategy: Option<Arc<dyn ResolutionStrategy>>,
}

#[buildstructor::buildstructor]
impl Params {
    #[builder(visibility = "pub")]
    #[allow(clippy::too_many_arguments)]
    fn new(
        schema: Arc<Schema>,
        request_string: String,
        root_value: Option<Object>,
        variables: Option<Object>,
        operation_name: Option<String>,
        context: Option<Context>,
        panic_handler: Option<PanicHandler>,
        strategy: Option<Arc<dyn ResolutionStrategy>>,
    ) -> Self {
        Self {
            schema,
            request_string,
            root_value: root_value.unwrap_or_default(),
            variables: variables.unwrap_or_default(),
            operation_name,
            context,
            panic_handler,
            strategy,
        }
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Params")
            .field("request_string", &self.request_string)
            .field("operation_name", &self.operation_name)
            .field("context", &self.context)
            .field("panic_handler", &self.panic_handler.is_some())
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// Runs requests through parsing, validation and execution.
///
/// Parsing and validation failures are terminal: the response then carries
/// that phase's errors and no data, and the next phases never run. Otherwise
/// the executor's response is returned as is.
#[derive(Clone)]
pub struct Pipeline {
    parser: Arc<dyn Parser>,
    validator: Arc<dyn Validator>,
    executor: Arc<dyn Executor>,
    tracer: Arc<dyn Tracer>,
    validation_rules: Option<ValidationRules>,
    strategy: Arc<dyn ResolutionStrategy>,
}

#[buildstructor::buildstructor]
impl Pipeline {
    /// Any collaborator left out gets its default implementation.
    #[builder(visibility = "pub")]
    fn new(
        parser: Option<Arc<dyn Parser>>,
        validator: Option<Arc<dyn Validator>>,
        executor: Option<Arc<dyn Executor>>,
        tracer: Option<Arc<dyn Tracer>>,
        validation_rules: Option<ValidationRules>,
        strategy: Option<Arc<dyn ResolutionStrategy>>,
    ) -> Self {
        Self {
            parser: parser.unwrap_or_else(|| Arc::new(DocumentParser::default())),
            validator: validator.unwrap_or_else(|| Arc::new(SchemaValidator)),
            executor: executor.unwrap_or_else(|| Arc::new(DefaultExecutor)),
            tracer: tracer.unwrap_or_else(|| Arc::new(TracingTracer)),
            validation_rules,
            strategy: strategy.unwrap_or_else(|| Arc::new(Sequential)),
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("tracer", &self.tracer)
            .field("validation_rules", &self.validation_rules)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn from_configuration(configuration: &Configuration) -> Self {
        let parser = DocumentParser::builder()
            .recursion_limit(configuration.parser.recursion_limit)
            .token_limit(configuration.parser.token_limit)
            .build();
        let tracer: Arc<dyn Tracer> = if configuration.telemetry.tracing {
            Arc::new(TracingTracer)
        } else {
            Arc::new(NoopTracer)
        };
        let validation_rules =
            (configuration.limits != ValidationRules::default()).then(|| configuration.limits.clone());
        Self::builder()
            .parser(Arc::new(parser) as Arc<dyn Parser>)
            .tracer(tracer)
            .and_validation_rules(validation_rules)
            .strategy(
                configuration
                    .execution
                    .mode
                    .strategy(configuration.execution.max_concurrency),
            )
            .build()
    }

    /// Runs one request. Always produces a response.
    pub async fn execute(&self, params: Params) -> Response {
        let Params {
            schema,
            request_string,
            root_value,
            variables,
            operation_name,
            context,
            panic_handler,
            strategy,
        } = params;
        let context = context.as_ref();
        let source = Source::request(request_string);

        let parsed = {
            let span = self.start_span(context, PARSING_SPAN_NAME);
            span.in_scope(|| self.parser.parse(&source))
        };
        let document = match parsed {
            Ok(document) => document,
            Err(errors) => {
                tracing::debug!(errors = errors.len(), "request failed to parse");
                return Response::from_errors(errors.into_graphql_errors());
            }
        };

        let verdict = {
            let span = self.start_span(context, VALIDATION_SPAN_NAME);
            span.in_scope(|| {
                self.validator
                    .validate(&schema, &document, self.validation_rules.as_ref())
            })
        };
        if !verdict.is_valid() {
            tracing::debug!(
                errors = verdict.errors().len(),
                "request failed validation"
            );
            return Response::from_errors(verdict.into_graphql_errors());
        }
        let document = verdict.into_executable(&schema, &document);

        let strategy = strategy.unwrap_or_else(|| self.strategy.clone());
        let request = ExecutionRequest {
            schema: &schema,
            root_value: &root_value,
            document: &document,
            operation_name: operation_name.as_deref(),
            variables: &variables,
            context,
            panic_handler: panic_handler.as_ref(),
            strategy: strategy.as_ref(),
        };
        let span = self.start_span(context, EXECUTION_SPAN_NAME);
        let response = self
            .executor
            .execute(request)
            .instrument(span.tracing_span())
            .await;
        span.finish();
        response
    }

    fn start_span(&self, context: Option<&Context>, name: &'static str) -> SpanGuard {
        match context {
            Some(context) => self.tracer.start_span(context, name),
            None => SpanGuard::noop(),
        }
    }
}

/// Runs one request through the default [`Pipeline`].
pub async fn execute(params: Params) -> Response {
    Pipeline::default().execute(params).await
}
