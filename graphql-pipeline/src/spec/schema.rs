//! GraphQL schema.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::schema::Implementers;
use apollo_compiler::validation::Valid;

use crate::error::ParseErrors;
use crate::error::SchemaError;
use crate::services::execution::Resolver;

/// A GraphQL schema: validated type definitions plus the resolvers bound to their fields.
///
/// The schema is read-only once built and is meant to be shared through an [`Arc`]
/// by every request that runs against it.
pub struct Schema {
    definitions: Valid<apollo_compiler::Schema>,
    implementers: apollo_compiler::collections::HashMap<Name, Implementers>,
    /// Resolvers by type name, then field name.
    resolvers: HashMap<String, HashMap<String, Arc<dyn Resolver>>>,
}

impl Schema {
    /// Parses and validates SDL. No resolver is bound yet.
    pub fn parse(sdl: &str) -> Result<Self, SchemaError> {
        if sdl.trim().is_empty() {
            return Err(SchemaError::MissingSdl);
        }
        let mut parser = apollo_compiler::parser::Parser::new();
        let result = parser.parse_ast(sdl, "schema.graphql");

        let recursion_limit = parser.recursion_reached();
        tracing::trace!(?recursion_limit, "recursion limit data");

        let definitions = result
            .map_err(|invalid| {
                SchemaError::Parse(ParseErrors {
                    errors: invalid.errors,
                })
            })?
            .to_schema_validate()
            .map_err(|errors| SchemaError::Validate(errors.into()))?;

        Ok(Self {
            implementers: definitions.implementers_map(),
            definitions,
            resolvers: HashMap::new(),
        })
    }

    /// Binds a resolver to `type_name.field_name`, replacing any previous one.
    pub fn with_resolver(
        mut self,
        type_name: &str,
        field_name: &str,
        resolver: impl Resolver,
    ) -> Result<Self, SchemaError> {
        if self.definitions.type_field(type_name, field_name).is_err() {
            return Err(SchemaError::UnknownField {
                type_name: type_name.to_string(),
                field_name: field_name.to_string(),
            });
        }
        self.resolvers
            .entry(type_name.to_string())
            .or_default()
            .insert(field_name.to_string(), Arc::new(resolver));
        Ok(self)
    }

    pub fn definitions(&self) -> &Valid<apollo_compiler::Schema> {
        &self.definitions
    }

    /// Implementations of every interface, computed once for introspection.
    pub(crate) fn implementers(&self) -> &apollo_compiler::collections::HashMap<Name, Implementers> {
        &self.implementers
    }

    pub(crate) fn resolver(&self, type_name: &str, field_name: &str) -> Option<&Arc<dyn Resolver>> {
        self.resolvers.get(type_name)?.get(field_name)
    }

    /// True when `maybe_subtype` is `abstract_type` itself, one of its union
    /// members, or one of its implementations.
    pub(crate) fn is_subtype(&self, abstract_type: &str, maybe_subtype: &str) -> bool {
        abstract_type == maybe_subtype
            || self
                .definitions
                .is_subtype(abstract_type, maybe_subtype)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bound = self
            .resolvers
            .iter()
            .flat_map(|(ty, fields)| fields.keys().map(move |field| format!("{ty}.{field}")))
            .collect::<Vec<_>>();
        bound.sort();
        f.debug_struct("Schema")
            .field("resolvers", &bound)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;
    use crate::services::execution::sync_resolver;

    const SDL: &str = r#"
        type Query {
            hello: String
            node: Node
        }

        interface Node {
            id: ID!
        }

        type User implements Node {
            id: ID!
        }

        union Result = User
    "#;

    #[test]
    fn parses_and_binds_resolvers() {
        let schema = Schema::parse(SDL)
            .unwrap()
            .with_resolver("Query", "hello", sync_resolver(|_| Ok(json!("world"))))
            .unwrap();
        assert!(schema.resolver("Query", "hello").is_some());
        assert!(schema.resolver("Query", "node").is_none());
        assert!(schema.resolver("User", "hello").is_none());
        assert!(format!("{schema:?}").contains("Query.hello"));
    }

    #[test]
    fn lists_bindings_by_type_and_field() {
        let schema = Schema::parse(SDL)
            .unwrap()
            .with_resolver("Query", "hello", sync_resolver(|_| Ok(json!("first"))))
            .unwrap()
            .with_resolver("User", "id", sync_resolver(|_| Ok(json!("u1"))))
            .unwrap()
            .with_resolver("Query", "hello", sync_resolver(|_| Ok(json!("second"))))
            .unwrap();
        assert!(schema.resolver("User", "id").is_some());
        assert!(format!("{schema:?}").contains(r#"resolvers: ["Query.hello", "User.id"]"#));
    }

    #[test]
    fn rejects_resolver_for_unknown_field() {
        let error = Schema::parse(SDL)
            .unwrap()
            .with_resolver("Query", "nope", sync_resolver(|_| Ok(json!(null))))
            .unwrap_err();
        assert!(matches!(error, SchemaError::UnknownField { .. }));
    }

    #[test]
    fn rejects_invalid_sdl() {
        assert!(matches!(
            Schema::parse("type Query {"),
            Err(SchemaError::Parse(_))
        ));
        assert!(matches!(
            Schema::parse("type Query { user: Missing }"),
            Err(SchemaError::Validate(_))
        ));
        assert!(matches!(Schema::parse("  "), Err(SchemaError::MissingSdl)));
    }

    #[test]
    fn subtypes() {
        let schema = Schema::parse(SDL).unwrap();
        assert!(schema.is_subtype("Node", "User"));
        assert!(schema.is_subtype("Result", "User"));
        assert!(schema.is_subtype("User", "User"));
        assert!(!schema.is_subtype("Query", "User"));
    }
}
