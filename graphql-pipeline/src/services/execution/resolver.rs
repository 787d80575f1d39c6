//! Field resolvers.

use std::fmt;

use async_trait::async_trait;
use serde_json_bytes::ByteString;

use crate::Context;
use crate::graphql;
use crate::graphql::Location;
use crate::json_ext::Object;
use crate::json_ext::Path;
use crate::json_ext::Value;

/// Everything a resolver gets to know about the field it resolves.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct ResolveInfo<'a> {
    /// The value of the parent object (the root value for top-level fields).
    pub parent: &'a Value,
    /// Coerced arguments, defaults applied.
    pub arguments: &'a Object,
    /// The request context, when the caller supplied one.
    pub context: Option<&'a Context>,
    pub field_name: &'a str,
    pub parent_type: &'a str,
    /// Where the value lands in the response data.
    pub path: &'a Path,
    /// Coerced variables of the operation.
    pub variables: &'a Object,
}

/// Produces the value of one field.
///
/// Resolvers are shared by every request running against a schema, so they
/// must be `Send + Sync`. A panic inside a resolver does not escape: it becomes
/// a field error and is reported to the request's panic handler.
#[async_trait]
pub trait Resolver: Send + Sync + 'static {
    async fn resolve(&self, info: ResolveInfo<'_>) -> Result<Value, FieldError>;
}

/// Turns a synchronous closure into a [`Resolver`].
pub fn sync_resolver<F>(resolve: F) -> FnResolver<F>
where
    F: Fn(ResolveInfo<'_>) -> Result<Value, FieldError> + Send + Sync + 'static,
{
    FnResolver(resolve)
}

/// A [`Resolver`] backed by a closure. See [`sync_resolver`].
pub struct FnResolver<F>(F);

#[async_trait]
impl<F> Resolver for FnResolver<F>
where
    F: Fn(ResolveInfo<'_>) -> Result<Value, FieldError> + Send + Sync + 'static,
{
    async fn resolve(&self, info: ResolveInfo<'_>) -> Result<Value, FieldError> {
        (self.0)(info)
    }
}

impl<F> fmt::Debug for FnResolver<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnResolver")
    }
}

/// Used for fields without a registered resolver: reads the field from the
/// parent object, null otherwise.
pub(crate) fn default_field_resolver(parent: &Value, field_name: &str) -> Value {
    parent
        .as_object()
        .and_then(|object| object.get(field_name))
        .cloned()
        .unwrap_or(Value::Null)
}

/// A resolver failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    pub message: String,
    pub extensions: Object,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extensions: Object::new(),
        }
    }

    /// Sets `extensions.code`.
    pub fn with_code(self, code: impl Into<String>) -> Self {
        self.with_extension("code", Value::String(ByteString::from(code.into())))
    }

    pub fn with_extension(mut self, key: impl Into<ByteString>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    pub(crate) fn into_graphql_error(self, path: Path, location: Option<Location>) -> graphql::Error {
        graphql::Error::builder()
            .message(self.message)
            .locations(location.into_iter().collect::<Vec<_>>())
            .path(path)
            .extensions(self.extensions)
            .build()
    }
}

impl From<String> for FieldError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for FieldError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
