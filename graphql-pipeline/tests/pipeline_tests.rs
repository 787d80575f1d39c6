use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use apollo_compiler::ast;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use graphql_pipeline::Configuration;
use graphql_pipeline::Context;
use graphql_pipeline::Params;
use graphql_pipeline::Pipeline;
use graphql_pipeline::Schema;
use graphql_pipeline::execute;
use graphql_pipeline::graphql;
use graphql_pipeline::graphql::Response;
use graphql_pipeline::json_ext::Value;
use graphql_pipeline::services::ExecutionRequest;
use graphql_pipeline::services::Executor;
use graphql_pipeline::services::ValidationRules;
use graphql_pipeline::services::Validator;
use graphql_pipeline::services::Verdict;
use graphql_pipeline::services::execution::Concurrent;
use graphql_pipeline::services::execution::FieldError;
use graphql_pipeline::services::execution::PanicHandler;
use graphql_pipeline::services::execution::ResolutionStrategy;
use graphql_pipeline::services::execution::ResolveInfo;
use graphql_pipeline::services::execution::Resolver;
use graphql_pipeline::services::execution::Sequential;
use graphql_pipeline::services::execution::sync_resolver;
use graphql_pipeline::tracer::SpanGuard;
use graphql_pipeline::tracer::Tracer;
use mockall::mock;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json_bytes::json;

const SDL: &str = r#"
    type Query {
        hello: String
        slow(ms: Int!, label: String!): String
        items: [Item!]!
        boom: String
    }

    type Item {
        id: ID!
        label: String
    }
"#;

struct Sleep;

#[async_trait]
impl Resolver for Sleep {
    async fn resolve(&self, info: ResolveInfo<'_>) -> Result<Value, FieldError> {
        let ms = info
            .arguments
            .get("ms")
            .and_then(|ms| ms.as_u64())
            .unwrap_or_default();
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(info
            .arguments
            .get("label")
            .cloned()
            .unwrap_or(Value::Null))
    }
}

fn schema() -> Arc<Schema> {
    Arc::new(
        Schema::parse(SDL)
            .unwrap()
            .with_resolver("Query", "hello", sync_resolver(|_| Ok(json!("world"))))
            .unwrap()
            .with_resolver("Query", "slow", Sleep)
            .unwrap()
            .with_resolver(
                "Query",
                "items",
                sync_resolver(|_| {
                    Ok(json!([
                        { "id": "1", "label": "first" },
                        { "id": "2", "label": "second" }
                    ]))
                }),
            )
            .unwrap()
            .with_resolver(
                "Query",
                "boom",
                sync_resolver(|_| -> Result<Value, FieldError> { panic!("resolver exploded") }),
            )
            .unwrap(),
    )
}

fn params(request: &str) -> Params {
    Params::builder()
        .schema(schema())
        .request_string(request)
        .build()
}

/// Records invocations and answers with a canned response.
#[derive(Default)]
struct SpyExecutor {
    calls: AtomicUsize,
    response: Response,
}

impl Executor for SpyExecutor {
    fn execute<'a>(&'a self, _request: ExecutionRequest<'a>) -> BoxFuture<'a, Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.response.clone();
        async move { response }.boxed()
    }
}

/// Rejects every document with the same errors.
struct RejectingValidator {
    errors: Vec<graphql::Error>,
}

impl Validator for RejectingValidator {
    fn validate(
        &self,
        _schema: &Schema,
        _document: &ast::Document,
        _rules: Option<&ValidationRules>,
    ) -> Verdict {
        Verdict::from_errors(self.errors.clone())
    }
}

mock! {
    PhaseTracer {}

    impl Tracer for PhaseTracer {
        fn start_span(&self, context: &Context, name: &'static str) -> SpanGuard;
    }
}

impl fmt::Debug for MockPhaseTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockPhaseTracer").finish_non_exhaustive()
    }
}

#[tokio::test]
async fn hello_world() {
    let response = execute(params("{ hello }")).await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({ "data": { "hello": "world" } })
    );
}

#[tokio::test]
async fn unterminated_request_is_a_syntax_error() {
    let executor = Arc::new(SpyExecutor::default());
    let pipeline = Pipeline::builder()
        .executor(executor.clone() as Arc<dyn Executor>)
        .build();
    let response = pipeline.execute(params("{ hel")).await;

    assert!(response.data.is_none());
    assert!(!response.errors.is_empty());
    assert!(
        response
            .errors
            .iter()
            .all(|error| error.extension_code().as_deref() == Some("GRAPHQL_PARSE_FAILED"))
    );
    assert_eq!(executor.calls.load(Ordering::SeqCst), 0);

    let serialized = serde_json::to_value(&response).unwrap();
    assert_eq!(serialized["data"], serde_json::Value::Null);
    assert!(serialized["errors"].as_array().is_some_and(|errors| !errors.is_empty()));
}

#[tokio::test]
async fn unknown_field_is_a_validation_error() {
    let executor = Arc::new(SpyExecutor::default());
    let pipeline = Pipeline::builder()
        .executor(executor.clone() as Arc<dyn Executor>)
        .build();
    let response = pipeline.execute(params("{ unknownField }")).await;

    assert!(response.data.is_none());
    assert!(!response.errors.is_empty());
    assert_eq!(
        response.errors[0].extension_code().as_deref(),
        Some("GRAPHQL_VALIDATION_FAILED")
    );
    assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn verdict_errors_are_returned_exactly() {
    let errors = vec![
        graphql::Error::builder()
            .message("first violation")
            .extension_code("RULE_A")
            .build(),
        graphql::Error::builder().message("second violation").build(),
    ];
    let executor = Arc::new(SpyExecutor::default());
    let pipeline = Pipeline::builder()
        .validator(Arc::new(RejectingValidator {
            errors: errors.clone(),
        }) as Arc<dyn Validator>)
        .executor(executor.clone() as Arc<dyn Executor>)
        .build();
    let response = pipeline.execute(params("{ hello }")).await;

    assert_eq!(response, Response::from_errors(errors));
    assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn executor_response_is_returned_unchanged() {
    let canned = Response::builder()
        .data(json!({ "anything": [1, 2, 3] }))
        .error(graphql::Error::builder().message("partial").build())
        .extension("cost", json!(7))
        .build();
    let executor = Arc::new(SpyExecutor {
        calls: AtomicUsize::new(0),
        response: canned.clone(),
    });
    let pipeline = Pipeline::builder()
        .executor(executor.clone() as Arc<dyn Executor>)
        .build();
    let response = pipeline.execute(params("{ hello }")).await;

    assert_eq!(response, canned);
    assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn panic_handler_is_called_once() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = seen.clone();
    let handler: PanicHandler = Arc::new(
        move |context: Option<&Context>, payload: &(dyn Any + Send)| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|message| message.to_string())
                .unwrap_or_default();
            let request_id = context
                .and_then(|context| context.get::<_, String>("request_id").ok().flatten());
            recorded.lock().push((request_id, message));
        },
    );
    let context = Context::new();
    context.insert("request_id", "abc".to_string()).unwrap();

    let response = execute(
        Params::builder()
            .schema(schema())
            .request_string("{ hello boom }")
            .context(context)
            .panic_handler(handler)
            .build(),
    )
    .await;

    assert_eq!(
        *seen.lock(),
        vec![(Some("abc".to_string()), "resolver exploded".to_string())]
    );
    assert_eq!(
        response.data,
        Some(json!({ "hello": "world", "boom": null }))
    );
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].extension_code().as_deref(),
        Some("RESOLVER_PANIC")
    );
    assert_eq!(
        response.errors[0].path.as_ref().map(|path| path.to_string()),
        Some("/boom".to_string())
    );
}

#[tokio::test]
async fn mistyped_variable_never_reaches_resolvers() {
    let response = execute(
        Params::builder()
            .schema(schema())
            .request_string(r#"query($ms: Int!) { slow(ms: $ms, label: "x") }"#)
            .variables(
                json!({ "ms": "not an int" })
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
            .build(),
    )
    .await;

    assert!(response.data.is_none());
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].extension_code().as_deref(),
        Some("VALIDATION_INVALID_TYPE_VARIABLE")
    );
    assert_eq!(
        serde_json::to_value(&response).unwrap()["data"],
        serde_json::Value::Null
    );
}

#[tokio::test]
async fn introspection_runs_through_the_pipeline() {
    let response = execute(params("{ __schema { queryType { name } } }")).await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({ "data": { "__schema": { "queryType": { "name": "Query" } } } })
    );
}

#[tokio::test]
async fn no_context_means_no_spans() {
    let mut tracer = MockPhaseTracer::new();
    tracer.expect_start_span().never();
    let pipeline = Pipeline::builder()
        .tracer(Arc::new(tracer) as Arc<dyn Tracer>)
        .build();

    let response = pipeline.execute(params("{ hello }")).await;
    assert_eq!(response.data, Some(json!({ "hello": "world" })));
}

#[tokio::test]
async fn context_opens_one_span_per_phase() {
    let mut tracer = MockPhaseTracer::new();
    let mut sequence = mockall::Sequence::new();
    for phase in ["GraphQL Parsing", "GraphQL Validation", "GraphQL Execution"] {
        tracer
            .expect_start_span()
            .withf(move |_, name| name == phase)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| SpanGuard::noop());
    }
    let pipeline = Pipeline::builder()
        .tracer(Arc::new(tracer) as Arc<dyn Tracer>)
        .build();

    let response = pipeline
        .execute(
            Params::builder()
                .schema(schema())
                .request_string("{ hello }")
                .context(Context::new())
                .build(),
        )
        .await;
    assert!(response.errors.is_empty());
}

const FAN_OUT: &str = r#"
    {
        a: slow(ms: 40, label: "a")
        b: slow(ms: 1, label: "b")
        hello
        items { id label }
        c: slow(ms: 15, label: "c")
    }
"#;

#[tokio::test]
async fn strategies_agree_on_data() {
    let run = |strategy: Arc<dyn ResolutionStrategy>| {
        execute(
            Params::builder()
                .schema(schema())
                .request_string(FAN_OUT)
                .strategy(strategy)
                .build(),
        )
    };
    let sequential = run(Arc::new(Sequential) as Arc<dyn ResolutionStrategy>).await;
    let concurrent = run(Arc::new(Concurrent::new(8)) as Arc<dyn ResolutionStrategy>).await;

    assert!(sequential.errors.is_empty());
    assert_eq!(sequential, concurrent);
    insta::assert_json_snapshot!(concurrent, @r#"
    {
      "data": {
        "a": "a",
        "b": "b",
        "hello": "world",
        "items": [
          {
            "id": "1",
            "label": "first"
          },
          {
            "id": "2",
            "label": "second"
          }
        ],
        "c": "c"
      }
    }
    "#);
}

#[tokio::test]
async fn configuration_drives_the_pipeline() {
    let configuration = Configuration::from_yaml(
        r#"
execution:
  mode: concurrent
  max_concurrency: 2
limits:
  max_depth: 1
telemetry:
  tracing: false
"#,
    )
    .unwrap();
    let pipeline = Pipeline::from_configuration(&configuration);

    let response = pipeline.execute(params("{ hello }")).await;
    assert_eq!(response.data, Some(json!({ "hello": "world" })));

    let response = pipeline.execute(params("{ items { id } }")).await;
    assert!(response.data.is_none());
    assert_eq!(
        response.errors[0].extension_code().as_deref(),
        Some("MAX_DEPTH_LIMIT")
    );
}
