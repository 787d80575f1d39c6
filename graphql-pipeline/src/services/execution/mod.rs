//! Execution of validated documents.
//!
//! The [`DefaultExecutor`] walks the selected operation, calling the resolvers
//! bound in the [`Schema`] and completing their values against the field types.
//! Sibling fields are scheduled by a [`ResolutionStrategy`]. Whatever the
//! strategy, data and errors are assembled in field order.

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use apollo_compiler::ExecutableDocument;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::executable;
use apollo_compiler::introspection;
use apollo_compiler::request::RequestError;
use apollo_compiler::request::coerce_variable_values;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::FieldDefinition;
use apollo_compiler::validation::Valid;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json_bytes::ByteString;

use crate::Context;
use crate::Schema;
use crate::graphql;
use crate::graphql::Location;
use crate::graphql::Response;
use crate::json_ext::Object;
use crate::json_ext::Path;
use crate::json_ext::Value;

mod resolver;
mod strategy;

pub(crate) use resolver::default_field_resolver;
pub use resolver::FieldError;
pub use resolver::FnResolver;
pub use resolver::ResolveInfo;
pub use resolver::Resolver;
pub use resolver::sync_resolver;
pub use strategy::Concurrent;
pub(crate) use strategy::default_max_concurrency;
pub use strategy::ResolutionMode;
pub use strategy::ResolutionStrategy;
pub use strategy::ResolvedField;
pub use strategy::Sequential;

pub const RESOLVER_PANIC_CODE: &str = "RESOLVER_PANIC";
pub const REQUEST_CANCELLED_CODE: &str = "REQUEST_CANCELLED";
pub const UNKNOWN_OPERATION_NAME_CODE: &str = "GRAPHQL_UNKNOWN_OPERATION_NAME";
pub const INVALID_VARIABLE_CODE: &str = "VALIDATION_INVALID_TYPE_VARIABLE";
pub const INTROSPECTION_FAILED_CODE: &str = "INTROSPECTION_FAILED";
pub const SUBSCRIPTION_NOT_SUPPORTED_CODE: &str = "SUBSCRIPTION_NOT_SUPPORTED";

/// Called once for every resolver panic, with the request context (if any) and
/// the panic payload.
pub type PanicHandler = Arc<dyn Fn(Option<&Context>, &(dyn Any + Send)) + Send + Sync>;

/// Everything the executor needs for one request.
///
/// `variables` are the raw values sent by the caller. They are coerced against
/// the selected operation's variable definitions before anything runs.
#[derive(Clone, Copy)]
pub struct ExecutionRequest<'a> {
    pub schema: &'a Schema,
    pub root_value: &'a Object,
    pub document: &'a Valid<ExecutableDocument>,
    pub operation_name: Option<&'a str>,
    pub variables: &'a Object,
    pub context: Option<&'a Context>,
    pub panic_handler: Option<&'a PanicHandler>,
    pub strategy: &'a dyn ResolutionStrategy,
}

/// Runs a validated document.
///
/// Implementations must not let a resolver panic escape, must schedule sibling
/// fields through the request's strategy and must stop starting top-level
/// fields once the context is cancelled.
pub trait Executor: Send + Sync {
    fn execute<'a>(&'a self, request: ExecutionRequest<'a>) -> BoxFuture<'a, Response>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultExecutor;

impl Executor for DefaultExecutor {
    fn execute<'a>(&'a self, request: ExecutionRequest<'a>) -> BoxFuture<'a, Response> {
        execute_request(request).boxed()
    }
}

async fn execute_request(request: ExecutionRequest<'_>) -> Response {
    let document = request.document;
    let operation = match document.operations.get(request.operation_name) {
        Ok(operation) => operation,
        Err(error) => {
            return Response::from_errors(vec![request_error(
                &error,
                document,
                UNKNOWN_OPERATION_NAME_CODE,
            )]);
        }
    };
    let variables =
        match coerce_variable_values(request.schema.definitions(), operation, request.variables) {
            Ok(variables) => variables,
            Err(error) => {
                tracing::debug!(
                    operation_name = ?operation.name,
                    "request variables failed coercion: {}",
                    error.message()
                );
                return Response::from_errors(vec![request_error(
                    &error,
                    document,
                    INVALID_VARIABLE_CODE,
                )]);
            }
        };

    let operation_type = operation.operation_type;
    if operation_type.is_subscription() {
        return Response::from_errors(vec![
            graphql::Error::builder()
                .message("subscriptions are not supported")
                .extension_code(SUBSCRIPTION_NOT_SUPPORTED_CODE)
                .build(),
        ]);
    }

    let introspection = match introspect(request.schema, document, operation, &variables) {
        Ok(introspection) => introspection,
        Err(error) => {
            return Response::from_errors(vec![request_error(
                &error,
                document,
                INTROSPECTION_FAILED_CODE,
            )]);
        }
    };

    tracing::trace!(
        operation_name = ?operation.name,
        operation_type = operation_type_name(operation_type),
        "executing operation"
    );

    let execution = ExecutionContext {
        schema: request.schema,
        document,
        variables: variables.into_inner(),
        introspection: introspection.data,
        context: request.context,
        panic_handler: request.panic_handler,
        strategy: request.strategy,
    };
    let root = Value::Object(request.root_value.clone());
    let result = execution
        .execute_selection_set(
            operation.selection_set.ty.as_str(),
            &root,
            vec![&operation.selection_set],
            &Path::empty(),
            Level::Root {
                serial: operation_type.is_mutation(),
            },
        )
        .await;

    let mut errors = result.errors;
    errors.extend(introspection.errors);
    Response {
        data: Some(result.value.unwrap_or(Value::Null)),
        errors,
        extensions: Object::new(),
    }
}

fn operation_type_name(operation_type: ast::OperationType) -> &'static str {
    match operation_type {
        ast::OperationType::Query => "query",
        ast::OperationType::Mutation => "mutation",
        ast::OperationType::Subscription => "subscription",
    }
}

/// A request error: the request is rejected as a whole, with no data.
fn request_error(
    error: &RequestError,
    document: &ExecutableDocument,
    code: &'static str,
) -> graphql::Error {
    let mut error = graphql::Error::from(error.to_graphql_error(&document.sources));
    error
        .extensions
        .entry("code")
        .or_insert(Value::String(ByteString::from(code)));
    error
}

/// Response of the schema introspection fields of a query.
struct Introspection {
    /// `None` when a non-null introspection field came out null.
    data: Option<Object>,
    errors: Vec<graphql::Error>,
}

/// Runs the root `__schema` and `__type` fields of a query, if there are any.
fn introspect(
    schema: &Schema,
    document: &Valid<ExecutableDocument>,
    operation: &executable::Operation,
    variables: &Valid<Object>,
) -> Result<Introspection, RequestError> {
    let introspects = operation.operation_type.is_query()
        && operation
            .root_fields(document)
            .any(|field| is_schema_introspection(field.name.as_str()));
    if !introspects {
        return Ok(Introspection {
            data: Some(Object::new()),
            errors: Vec::new(),
        });
    }
    introspection::check_max_depth(document, operation)?;
    let response = introspection::partial_execute(
        schema.definitions(),
        schema.implementers(),
        document,
        operation,
        variables,
    )?;
    Ok(Introspection {
        data: response.data,
        errors: response
            .errors
            .into_iter()
            .map(graphql::Error::from)
            .collect(),
    })
}

fn is_schema_introspection(field_name: &str) -> bool {
    matches!(field_name, "__schema" | "__type")
}

fn location_of<T>(document: &ExecutableDocument, node: &Node<T>) -> Option<Location> {
    node.line_column_range(&document.sources)
        .map(|range| Location {
            line: range.start.line as u32,
            column: range.start.column as u32,
        })
}

/// Converts an input literal, `None` when it is a variable that was not supplied.
fn value_from_ast(value: &ast::Value, variables: &Object) -> Option<Value> {
    Some(match value {
        ast::Value::Null => Value::Null,
        ast::Value::Enum(name) => Value::String(name.as_str().into()),
        ast::Value::Variable(name) => return variables.get(name.as_str()).cloned(),
        ast::Value::String(string) => Value::String(string.as_str().into()),
        ast::Value::Boolean(boolean) => Value::Bool(*boolean),
        ast::Value::Int(int) => match int.try_to_i32() {
            Ok(int) => Value::Number(int.into()),
            Err(_) => float_value(int.try_to_f64().ok()),
        },
        ast::Value::Float(float) => float_value(float.try_to_f64().ok()),
        ast::Value::List(items) => Value::Array(
            items
                .iter()
                .map(|item| value_from_ast(item, variables).unwrap_or(Value::Null))
                .collect(),
        ),
        ast::Value::Object(fields) => Value::Object(
            fields
                .iter()
                .filter_map(|(name, value)| {
                    Some((
                        ByteString::from(name.as_str()),
                        value_from_ast(value, variables)?,
                    ))
                })
                .collect(),
        ),
    })
}

fn float_value(float: Option<f64>) -> Value {
    float
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[derive(Clone, Copy)]
enum Level {
    Root { serial: bool },
    Nested,
}

type GroupedFields<'b> = Vec<(&'b str, Vec<&'b Node<executable::Field>>)>;

struct ExecutionContext<'a> {
    schema: &'a Schema,
    document: &'a ExecutableDocument,
    /// Coerced variable values.
    variables: Object,
    introspection: Option<Object>,
    context: Option<&'a Context>,
    panic_handler: Option<&'a PanicHandler>,
    strategy: &'a dyn ResolutionStrategy,
}

impl<'a> ExecutionContext<'a> {
    fn execute_selection_set<'b>(
        &'b self,
        object_type: &'b str,
        parent: &'b Value,
        selection_sets: Vec<&'b executable::SelectionSet>,
        path: &'b Path,
        level: Level,
    ) -> BoxFuture<'b, ResolvedField> {
        async move {
            let fields = self.collect_fields(object_type, &selection_sets);
            let keys = fields.iter().map(|(key, _)| *key).collect::<Vec<_>>();
            let top_level = matches!(level, Level::Root { .. });
            let tasks = fields
                .into_iter()
                .map(|(key, nodes)| {
                    self.execute_field(object_type, parent, key, nodes, path, top_level)
                })
                .collect::<Vec<_>>();

            let results = match level {
                // mutation root fields never overlap
                Level::Root { serial: true } => Sequential.resolve(tasks).await,
                _ => self.strategy.resolve(tasks).await,
            };

            let mut data = Object::new();
            let mut errors = Vec::new();
            let mut nulled = false;
            for (key, result) in keys.into_iter().zip(results) {
                errors.extend(result.errors);
                match result.value {
                    Some(value) => {
                        data.insert(ByteString::from(key), value);
                    }
                    None => nulled = true,
                }
            }
            ResolvedField::new((!nulled).then_some(Value::Object(data)), errors)
        }
        .boxed()
    }

    fn collect_fields<'b>(
        &'b self,
        object_type: &str,
        selection_sets: &[&'b executable::SelectionSet],
    ) -> GroupedFields<'b> {
        let mut grouped = Vec::new();
        let mut visited_fragments = HashSet::new();
        for selection_set in selection_sets {
            self.collect_fields_into(
                object_type,
                selection_set,
                &mut visited_fragments,
                &mut grouped,
            );
        }
        grouped
    }

    fn collect_fields_into<'b>(
        &'b self,
        object_type: &str,
        selection_set: &'b executable::SelectionSet,
        visited_fragments: &mut HashSet<&'b str>,
        grouped: &mut GroupedFields<'b>,
    ) {
        for selection in &selection_set.selections {
            match selection {
                executable::Selection::Field(field) => {
                    if !self.should_include(&field.directives) {
                        continue;
                    }
                    let key = field.response_key().as_str();
                    match grouped.iter_mut().find(|(existing, _)| *existing == key) {
                        Some((_, fields)) => fields.push(field),
                        None => grouped.push((key, vec![field])),
                    }
                }
                executable::Selection::FragmentSpread(spread) => {
                    if !self.should_include(&spread.directives)
                        || !visited_fragments.insert(spread.fragment_name.as_str())
                    {
                        continue;
                    }
                    let Some(fragment) = self.document.fragments.get(&spread.fragment_name) else {
                        continue;
                    };
                    if !self.schema.is_subtype(fragment.type_condition(), object_type) {
                        continue;
                    }
                    self.collect_fields_into(
                        object_type,
                        &fragment.selection_set,
                        visited_fragments,
                        grouped,
                    );
                }
                executable::Selection::InlineFragment(inline) => {
                    if !self.should_include(&inline.directives) {
                        continue;
                    }
                    if let Some(type_condition) = &inline.type_condition {
                        if !self.schema.is_subtype(type_condition, object_type) {
                            continue;
                        }
                    }
                    self.collect_fields_into(
                        object_type,
                        &inline.selection_set,
                        visited_fragments,
                        grouped,
                    );
                }
            }
        }
    }

    /// `@skip(if:)` and `@include(if:)`.
    fn should_include(&self, directives: &ast::DirectiveList) -> bool {
        let condition = |name: &str| {
            directives
                .get(name)
                .and_then(|directive| directive.specified_argument_by_name("if"))
                .and_then(|value| value_from_ast(value, &self.variables))
                .and_then(|value| value.as_bool())
        };
        condition("skip") != Some(true) && condition("include") != Some(false)
    }

    fn execute_field<'b>(
        &'b self,
        object_type: &'b str,
        parent: &'b Value,
        key: &'b str,
        nodes: Vec<&'b Node<executable::Field>>,
        path: &'b Path,
        top_level: bool,
    ) -> BoxFuture<'b, ResolvedField> {
        async move {
            let Some(field) = nodes.first().copied() else {
                return ResolvedField::default();
            };
            let field_path = path.join_key(key);
            if field.name.as_str() == "__typename" {
                return ResolvedField::from_value(Value::String(object_type.into()));
            }
            if top_level && is_schema_introspection(field.name.as_str()) {
                // already executed, a missing object means a non-null introspection field was null
                return match &self.introspection {
                    Some(data) => {
                        ResolvedField::from_value(data.get(key).cloned().unwrap_or(Value::Null))
                    }
                    None => ResolvedField::new(None, Vec::new()),
                };
            }
            let location = location_of(self.document, field);
            // the selection's definition may come from an interface the object implements
            let definition: &'b FieldDefinition =
                match self.schema.definitions().type_field(object_type, &field.name) {
                    Ok(definition) => definition,
                    Err(_) => &field.definition,
                };

            let resolved = if top_level && self.is_cancelled() {
                Err(FieldError::new("the request was cancelled before this field was resolved")
                    .with_code(REQUEST_CANCELLED_CODE))
            } else {
                match self.coerce_argument_values(definition, field) {
                    Ok(arguments) => {
                        self.resolve_field_value(
                            object_type,
                            parent,
                            field,
                            &arguments,
                            &field_path,
                        )
                        .await
                    }
                    Err(error) => Err(error),
                }
            };

            match resolved {
                Ok(value) => {
                    self.complete_value(object_type, &definition.ty, &nodes, value, field_path)
                        .await
                }
                Err(error) => {
                    failfast_debug!(
                        "field {}.{} failed at {}: {}",
                        object_type,
                        field.name,
                        field_path,
                        error
                    );
                    let value = (!definition.ty.is_non_null()).then_some(Value::Null);
                    ResolvedField::new(value, vec![error.into_graphql_error(field_path, location)])
                }
            }
        }
        .boxed()
    }

    fn is_cancelled(&self) -> bool {
        self.context.is_some_and(Context::is_cancelled)
    }

    fn coerce_argument_values(
        &self,
        definition: &FieldDefinition,
        field: &executable::Field,
    ) -> Result<Object, FieldError> {
        let mut coerced = Object::new();
        for argument in &definition.arguments {
            let name = argument.name.as_str();
            let value = field
                .arguments
                .iter()
                .find(|provided| provided.name == argument.name)
                .and_then(|provided| value_from_ast(&provided.value, &self.variables))
                .or_else(|| {
                    argument
                        .default_value
                        .as_ref()
                        .and_then(|default| value_from_ast(default, &self.variables))
                });
            match value {
                Some(Value::Null) if argument.ty.is_non_null() => {
                    return Err(FieldError::new(format!(
                        "Argument \"{name}\" of non-null type \"{}\" must not be null.",
                        &*argument.ty
                    )));
                }
                Some(value) => {
                    coerced.insert(ByteString::from(name), value);
                }
                None if argument.ty.is_non_null() => {
                    return Err(FieldError::new(format!(
                        "Argument \"{name}\" of required type \"{}\" was not provided.",
                        &*argument.ty
                    )));
                }
                None => {}
            }
        }
        Ok(coerced)
    }

    async fn resolve_field_value(
        &self,
        object_type: &str,
        parent: &Value,
        field: &executable::Field,
        arguments: &Object,
        path: &Path,
    ) -> Result<Value, FieldError> {
        let Some(resolver) = self.schema.resolver(object_type, &field.name) else {
            return Ok(default_field_resolver(parent, &field.name));
        };
        let info = ResolveInfo {
            parent,
            arguments,
            context: self.context,
            field_name: field.name.as_str(),
            parent_type: object_type,
            path,
            variables: &self.variables,
        };
        match AssertUnwindSafe(async move { resolver.resolve(info).await })
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(self.recover(object_type, field.name.as_str(), path, payload)),
        }
    }

    fn recover(
        &self,
        object_type: &str,
        field_name: &str,
        path: &Path,
        payload: Box<dyn Any + Send>,
    ) -> FieldError {
        let message = panic_message(&*payload);
        tracing::error!(
            parent_type = object_type,
            field = field_name,
            path = %path,
            "resolver panicked: {message}"
        );
        if let Some(handler) = self.panic_handler {
            handler(self.context, &*payload);
        }
        FieldError::new(format!("internal error while resolving {object_type}.{field_name}"))
            .with_code(RESOLVER_PANIC_CODE)
    }

    fn complete_value<'b>(
        &'b self,
        parent_type: &'b str,
        ty: &'b ast::Type,
        nodes: &'b [&'b Node<executable::Field>],
        value: Value,
        path: Path,
    ) -> BoxFuture<'b, ResolvedField> {
        async move {
            let (non_null, completed) = match ty {
                ast::Type::Named(_) | ast::Type::List(_) if value.is_null() => {
                    (false, ResolvedField::from_value(Value::Null))
                }
                ast::Type::NonNullNamed(_) | ast::Type::NonNullList(_) if value.is_null() => {
                    (true, ResolvedField::from_value(Value::Null))
                }
                ast::Type::Named(name) => {
                    (false, self.complete_named(name, nodes, value, &path).await)
                }
                ast::Type::NonNullNamed(name) => {
                    (true, self.complete_named(name, nodes, value, &path).await)
                }
                ast::Type::List(item) => {
                    (false, self.complete_list(parent_type, item, nodes, value, &path).await)
                }
                ast::Type::NonNullList(item) => {
                    (true, self.complete_list(parent_type, item, nodes, value, &path).await)
                }
            };

            let is_null = completed.value.as_ref().is_none_or(Value::is_null);
            match (non_null, is_null) {
                (true, true) => {
                    let mut errors = completed.errors;
                    // a child already reported why this position is null
                    if errors.is_empty() {
                        let field = nodes.first();
                        let field_name = field.map(|field| field.name.as_str()).unwrap_or_default();
                        let location = field.and_then(|field| location_of(self.document, field));
                        errors.push(
                            FieldError::new(format!(
                                "Cannot return null for non-nullable field {parent_type}.{field_name}."
                            ))
                            .into_graphql_error(path, location),
                        );
                    }
                    ResolvedField::new(None, errors)
                }
                (false, true) => ResolvedField::new(Some(Value::Null), completed.errors),
                _ => completed,
            }
        }
        .boxed()
    }

    async fn complete_list(
        &self,
        parent_type: &str,
        item_type: &ast::Type,
        nodes: &[&Node<executable::Field>],
        value: Value,
        path: &Path,
    ) -> ResolvedField {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return self.completion_error(
                    nodes,
                    path,
                    format!("Resolver returned {other}, expected a list"),
                );
            }
        };
        let tasks = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                self.complete_value(parent_type, item_type, nodes, item, path.join_index(index))
            })
            .collect::<Vec<_>>();
        let results = self.strategy.resolve(tasks).await;

        let mut completed = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        let mut nulled = false;
        for result in results {
            errors.extend(result.errors);
            match result.value {
                Some(value) => completed.push(value),
                None => nulled = true,
            }
        }
        ResolvedField::new((!nulled).then_some(Value::Array(completed)), errors)
    }

    async fn complete_named(
        &self,
        type_name: &ast::NamedType,
        nodes: &[&Node<executable::Field>],
        value: Value,
        path: &Path,
    ) -> ResolvedField {
        let definitions = self.schema.definitions();
        match definitions.types.get(type_name) {
            Some(ExtendedType::Scalar(_)) => match serialize_scalar(type_name.as_str(), value) {
                Ok(value) => ResolvedField::from_value(value),
                Err(message) => self.completion_error(nodes, path, message),
            },
            Some(ExtendedType::Enum(definition)) => {
                let known = value
                    .as_str()
                    .is_some_and(|name| definition.values.contains_key(name));
                if known {
                    ResolvedField::from_value(value)
                } else {
                    self.completion_error(
                        nodes,
                        path,
                        format!("Resolver returned {value}, expected enum {type_name}"),
                    )
                }
            }
            Some(ExtendedType::Object(_)) => {
                self.complete_object(type_name.as_str(), nodes, value, path)
                    .await
            }
            Some(ExtendedType::Interface(_)) | Some(ExtendedType::Union(_)) => {
                match self.resolve_abstract_type(type_name.as_str(), &value) {
                    Some(object_type) => {
                        self.complete_object(object_type, nodes, value, path).await
                    }
                    None => self.completion_error(
                        nodes,
                        path,
                        format!(
                            "Abstract type \"{type_name}\" must resolve to an object type at runtime"
                        ),
                    ),
                }
            }
            _ => self.completion_error(
                nodes,
                path,
                format!("\"{type_name}\" is not an output type"),
            ),
        }
    }

    async fn complete_object(
        &self,
        object_type: &str,
        nodes: &[&Node<executable::Field>],
        value: Value,
        path: &Path,
    ) -> ResolvedField {
        if !value.is_object() {
            return self.completion_error(
                nodes,
                path,
                format!("Resolver returned {value}, expected an object for type {object_type}"),
            );
        }
        let selection_sets = nodes
            .iter()
            .map(|field| &field.selection_set)
            .collect::<Vec<_>>();
        self.execute_selection_set(object_type, &value, selection_sets, path, Level::Nested)
            .await
    }

    /// The object type of a value at an interface or union position: its
    /// `__typename` entry, or the only possible type.
    fn resolve_abstract_type(&self, abstract_type: &str, value: &Value) -> Option<&'a str> {
        let schema = self.schema;
        let types = &schema.definitions().types;
        if let Some(typename) = value
            .as_object()
            .and_then(|object| object.get("__typename"))
            .and_then(|typename| typename.as_str())
        {
            return types
                .get_key_value(typename)
                .filter(|(_, ty)| ty.is_object())
                .map(|(name, _)| name.as_str())
                .filter(|name| schema.is_subtype(abstract_type, name));
        }
        let mut possible = types
            .iter()
            .filter(|(name, ty)| ty.is_object() && schema.is_subtype(abstract_type, name))
            .map(|(name, _)| name.as_str());
        match (possible.next(), possible.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    fn completion_error(
        &self,
        nodes: &[&Node<executable::Field>],
        path: &Path,
        message: String,
    ) -> ResolvedField {
        let location = nodes.first().and_then(|field| location_of(self.document, field));
        ResolvedField::new(
            None,
            vec![FieldError::new(message).into_graphql_error(path.clone(), location)],
        )
    }
}

/// Result coercion of built-in scalars. Custom scalars accept any value.
///
/// `Int` takes integral floats such as `3.0` and `ID` serializes integers as strings.
fn serialize_scalar(type_name: &str, value: Value) -> Result<Value, String> {
    let expected = |value: &Value| format!("Resolver returned {value}, expected {type_name}");
    match type_name {
        "Int" => {
            let int = value.as_i64().or_else(|| {
                value
                    .as_f64()
                    .filter(|float| float.is_finite() && float.fract() == 0.0)
                    .map(|float| float as i64)
            });
            match int {
                Some(int) => match i32::try_from(int) {
                    Ok(int) => Ok(Value::Number(int.into())),
                    Err(_) => Err(format!("Resolver returned {value} which overflows Int")),
                },
                None => Err(expected(&value)),
            }
        }
        "Float" if value.is_number() => Ok(value),
        "String" if value.is_string() => Ok(value),
        "Boolean" if value.is_boolean() => Ok(value),
        "ID" => match &value {
            Value::String(_) => Ok(value),
            Value::Number(number) if number.is_i64() || number.is_u64() => {
                Ok(Value::String(number.to_string().into()))
            }
            _ => Err(expected(&value)),
        },
        "Float" | "String" | "Boolean" => Err(expected(&value)),
        _ => Ok(value),
    }
}
