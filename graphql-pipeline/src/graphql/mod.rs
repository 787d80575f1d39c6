//! Types related to GraphQL responses and errors.

mod response;

use std::fmt;

use apollo_compiler::response::GraphQLError;
use apollo_compiler::response::ResponseDataPathSegment;
pub use response::Response;
use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::ByteString;
use serde_json_bytes::Map as JsonMap;
use serde_json_bytes::Value;

use crate::json_ext::Object;
use crate::json_ext::Path;
use crate::json_ext::PathElement;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
/// The error location
pub struct Location {
    /// The line number
    pub line: u32,
    /// The column number
    pub column: u32,
}

/// A [GraphQL error](https://spec.graphql.org/October2021/#sec-Errors)
/// as may be found in the `errors` field of a GraphQL [`Response`].
///
/// Converted to (or from) JSON with serde.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
#[non_exhaustive]
pub struct Error {
    /// The error message.
    pub message: String,

    /// The locations of the error in the GraphQL document of the originating request.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,

    /// If this is a field error, the JSON path to that field in [`Response::data`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,

    /// The optional GraphQL extensions for this error.
    #[serde(skip_serializing_if = "Object::is_empty")]
    pub extensions: Object,
}

#[buildstructor::buildstructor]
impl Error {
    /// Returns a builder that builds a GraphQL [`Error`] from its components.
    ///
    /// Builder methods:
    ///
    /// * `.message(impl Into<`[`String`]`>)`
    ///   Required.
    ///   Sets [`Error::message`].
    ///
    /// * `.locations(impl Into<`[`Vec`]`<`[`Location`]`>>)`
    ///   Optional.
    ///   Sets the entire `Vec` of [`Error::locations`], which defaults to the empty.
    ///
    /// * `.location(impl Into<`[`Location`]`>)`
    ///   Optional, may be called multiple times.
    ///   Adds one item at the end of [`Error::locations`].
    ///
    /// * `.path(impl Into<`[`Path`]`>)`
    ///   Optional.
    ///   Sets [`Error::path`].
    ///
    /// * `.extensions(impl Into<`[`serde_json_bytes::Map`]`<`[`ByteString`]`, `[`Value`]`>>)`
    ///   Optional.
    ///   Sets the entire [`Error::extensions`] map, which defaults to empty.
    ///
    /// * `.extension(impl Into<`[`ByteString`]`>, impl Into<`[`Value`]`>)`
    ///   Optional, may be called multiple times.
    ///   Adds one item to the [`Error::extensions`] map.
    ///
    /// * `.extension_code(impl Into<`[`String`]`>)`
    ///   Optional.
    ///   Sets the "code" in the extension map. Will be ignored if extension already has this key
    ///   set.
    ///
    /// * `.build()`
    ///   Finishes the builder and returns a GraphQL [`Error`].
    #[builder(visibility = "pub")]
    fn new(
        message: String,
        locations: Vec<Location>,
        path: Option<Path>,
        extension_code: Option<String>,
        // Skip the `Object` type alias in order to use buildstructor's map special-casing
        mut extensions: JsonMap<ByteString, Value>,
    ) -> Self {
        if let Some(code) = extension_code {
            extensions
                .entry("code")
                .or_insert(Value::String(ByteString::from(code)));
        }
        Self {
            message,
            locations,
            path,
            extensions,
        }
    }

    /// Extract the error code from [`Error::extensions`] as a String if it is set.
    pub fn extension_code(&self) -> Option<String> {
        self.extensions.get("code").and_then(|c| match c {
            Value::String(s) => Some(s.as_str().to_owned()),
            Value::Number(n) => Some(n.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) | Value::Bool(_) => None,
        })
    }
}

impl From<GraphQLError> for Error {
    fn from(error: GraphQLError) -> Self {
        let GraphQLError {
            message,
            locations,
            path,
            extensions,
        } = error;
        let locations = locations
            .into_iter()
            .map(|location| Location {
                line: location.line as u32,
                column: location.column as u32,
            })
            .collect();
        let path = if !path.is_empty() {
            let elements = path
                .into_iter()
                .map(|element| match element {
                    ResponseDataPathSegment::Field(name) => PathElement::Key(name.as_str().into()),
                    ResponseDataPathSegment::ListIndex(i) => PathElement::Index(i),
                })
                .collect();
            Some(Path(elements))
        } else {
            None
        };
        Self {
            message,
            locations,
            path,
            extensions,
        }
    }
}

/// Displays (only) the error message.
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

/// Converts a phase's error collection into the list of GraphQL errors sent to the caller.
///
/// Order is preserved: the n-th error of the collection becomes the n-th GraphQL error.
pub trait IntoGraphQLErrors
where
    Self: Sized,
{
    fn into_graphql_errors(self) -> Vec<Error>;
}

impl IntoGraphQLErrors for Vec<Error> {
    fn into_graphql_errors(self) -> Vec<Error> {
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;

    #[test]
    fn builder_sets_code_once() {
        let error = Error::builder()
            .message("boom")
            .extension("code", "CUSTOM")
            .extension_code("IGNORED")
            .build();
        assert_eq!(error.extension_code().as_deref(), Some("CUSTOM"));
    }

    #[test]
    fn serialization_skips_empty_members() {
        let error = Error::builder().message("only a message").build();
        assert_eq!(
            serde_json_bytes::to_value(&error).unwrap(),
            json!({ "message": "only a message" })
        );

        let error = Error::builder()
            .message("located")
            .location(Location { line: 1, column: 3 })
            .path(Path::from("hero/0/name"))
            .extension_code("RESOLVER_ERROR")
            .build();
        assert_eq!(
            serde_json_bytes::to_value(&error).unwrap(),
            json!({
                "message": "located",
                "locations": [{ "line": 1, "column": 3 }],
                "path": ["hero", 0, "name"],
                "extensions": { "code": "RESOLVER_ERROR" }
            })
        );
    }

    #[test]
    fn converts_compiler_request_errors() {
        let schema =
            apollo_compiler::Schema::parse_and_validate("type Query { n(n: Int): Int }", "schema.graphql")
                .unwrap();
        let document = apollo_compiler::ExecutableDocument::parse_and_validate(
            &schema,
            "query($n: Int!) { n(n: $n) }",
            "query.graphql",
        )
        .unwrap();
        let operation = document.operations.get(None).unwrap();
        let error = apollo_compiler::request::coerce_variable_values(
            &schema,
            operation,
            &JsonMap::new(),
        )
        .unwrap_err();

        let error = Error::from(error.to_graphql_error(&document.sources));
        assert_eq!(error.message, "missing value for non-null variable 'n'");
        assert_eq!(error.locations, vec![Location { line: 1, column: 7 }]);
        assert_eq!(error.path, None);
    }
}
