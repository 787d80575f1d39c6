//! Request validation.

use std::collections::HashMap;
use std::collections::HashSet;

use apollo_compiler::ExecutableDocument;
use apollo_compiler::ast;
use apollo_compiler::validation::Valid;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::Schema;
use crate::error::ValidationErrors;
use crate::graphql;
use crate::graphql::IntoGraphQLErrors;

/// Checks a syntax tree against a schema.
///
/// Validators never modify the schema or the document. Errors come back in
/// rule-evaluation order.
pub trait Validator: Send + Sync {
    fn validate(
        &self,
        schema: &Schema,
        document: &ast::Document,
        rules: Option<&ValidationRules>,
    ) -> Verdict;
}

/// Result of validation: valid exactly when there is no error.
///
/// A valid verdict may keep the executable form of the document built while
/// validating, so that execution does not build it again.
#[derive(Clone, Debug, Default)]
pub struct Verdict {
    errors: Vec<graphql::Error>,
    document: Option<Valid<ExecutableDocument>>,
}

impl Verdict {
    pub fn valid() -> Self {
        Self::default()
    }

    /// A valid verdict keeping the executable document.
    pub fn with_document(document: Valid<ExecutableDocument>) -> Self {
        Self {
            errors: Vec::new(),
            document: Some(document),
        }
    }

    pub fn from_errors(errors: Vec<graphql::Error>) -> Self {
        Self {
            errors,
            document: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[graphql::Error] {
        &self.errors
    }

    pub fn document(&self) -> Option<&Valid<ExecutableDocument>> {
        self.document.as_ref()
    }

    /// The executable form of the document this verdict accepted.
    ///
    /// A validator that kept none vouches for the document: it is converted
    /// without running the GraphQL rules again.
    pub(crate) fn into_executable(
        self,
        schema: &Schema,
        document: &ast::Document,
    ) -> Valid<ExecutableDocument> {
        self.document.unwrap_or_else(|| {
            let executable = match document.to_executable(schema.definitions()) {
                Ok(executable) => executable,
                Err(invalid) => invalid.partial,
            };
            Valid::assume_valid(executable)
        })
    }
}

impl IntoGraphQLErrors for Verdict {
    fn into_graphql_errors(self) -> Vec<graphql::Error> {
        self.errors
    }
}

/// Extra checks run after the GraphQL validation rules.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct ValidationRules {
    /// Maximum depth of nested fields.
    pub max_depth: Option<u32>,
    /// Maximum number of fields with distinct response keys, counted at every level.
    pub max_height: Option<u32>,
    /// Maximum number of root fields.
    pub max_root_fields: Option<u32>,
    /// Maximum number of aliases.
    pub max_aliases: Option<u32>,
    /// Log exceeded limits instead of rejecting the request.
    pub warn_only: bool,
}

impl ValidationRules {
    fn limits(&self) -> OperationLimits<Option<u32>> {
        OperationLimits {
            depth: self.max_depth,
            height: self.max_height,
            root_fields: self.max_root_fields,
            aliases: self.max_aliases,
        }
    }
}

/// [`Validator`] running every GraphQL validation rule of `apollo-compiler`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchemaValidator;

impl Validator for SchemaValidator {
    fn validate(
        &self,
        schema: &Schema,
        document: &ast::Document,
        rules: Option<&ValidationRules>,
    ) -> Verdict {
        let executable = match document.to_executable_validate(schema.definitions()) {
            Ok(executable) => executable,
            Err(invalid) => {
                return Verdict::from_errors(ValidationErrors::from(invalid).into_graphql_errors());
            }
        };
        let errors = rules
            .map(|rules| check_limits(rules, document))
            .unwrap_or_default();
        if errors.is_empty() {
            Verdict::with_document(executable)
        } else {
            Verdict::from_errors(errors)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct OperationLimits<T> {
    pub(crate) depth: T,
    pub(crate) height: T,
    pub(crate) root_fields: T,
    pub(crate) aliases: T,
}

impl<A> OperationLimits<A> {
    fn map<B>(self, mut f: impl FnMut(A) -> B) -> OperationLimits<B> {
        OperationLimits {
            depth: f(self.depth),
            height: f(self.height),
            root_fields: f(self.root_fields),
            aliases: f(self.aliases),
        }
    }

    fn combine<B, C>(
        self,
        other: OperationLimits<B>,
        mut f: impl FnMut(&'static str, A, B) -> C,
    ) -> OperationLimits<C> {
        OperationLimits {
            depth: f("depth", self.depth, other.depth),
            height: f("height", self.height, other.height),
            root_fields: f("root_fields", self.root_fields, other.root_fields),
            aliases: f("aliases", self.aliases, other.aliases),
        }
    }
}

impl OperationLimits<bool> {
    fn any(&self) -> bool {
        // make the compile warn if we forget one
        let Self {
            depth,
            height,
            root_fields,
            aliases,
        } = *self;
        depth || height || root_fields || aliases
    }
}

fn check_limits(rules: &ValidationRules, document: &ast::Document) -> Vec<graphql::Error> {
    let max = rules.limits();
    if !max.map(|limit| limit.is_some()).any() {
        return Vec::new();
    }

    let fragments = document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            ast::Definition::FragmentDefinition(fragment) => {
                Some((fragment.name.as_str(), &**fragment))
            }
            _ => None,
        })
        .collect::<HashMap<_, _>>();

    let mut exceeded = OperationLimits::<bool>::default();
    let mut fragment_cache = HashMap::new();
    for definition in &document.definitions {
        let ast::Definition::OperationDefinition(operation) = definition else {
            continue;
        };
        let measured = count(&fragments, &mut fragment_cache, &operation.selection_set);
        let operation_exceeded = max.combine(measured, |_, limit, measured| {
            limit.is_some_and(|limit| measured > limit)
        });
        if operation_exceeded.any() {
            let mut messages = Vec::new();
            max.combine(measured, |ident, max, measured| {
                if let Some(max) = max {
                    if measured > max {
                        messages.push(format!("{ident}: {measured}, max_{ident}: {max}"))
                    }
                }
            });
            tracing::warn!(
                operation_name = ?operation.name,
                "request exceeded complexity limits: {}",
                messages.join(", ")
            );
        }
        exceeded = exceeded.combine(operation_exceeded, |_, a, b| a || b);
    }

    if rules.warn_only {
        return Vec::new();
    }

    let mut errors = Vec::new();
    let mut build = |exceeded, code, message| {
        if exceeded {
            errors.push(
                graphql::Error::builder()
                    .message(message)
                    .extension_code(code)
                    .build(),
            )
        }
    };
    build(
        exceeded.depth,
        "MAX_DEPTH_LIMIT",
        "Maximum depth limit exceeded in this operation",
    );
    build(
        exceeded.height,
        "MAX_HEIGHT_LIMIT",
        "Maximum height (field count) limit exceeded in this operation",
    );
    build(
        exceeded.root_fields,
        "MAX_ROOT_FIELDS_LIMIT",
        "Maximum root fields limit exceeded in this operation",
    );
    build(
        exceeded.aliases,
        "MAX_ALIASES_LIMIT",
        "Maximum aliases limit exceeded in this operation",
    );
    errors
}

enum Computation<T> {
    InProgress,
    Done(T),
}

/// Recursively measure the given selection set against each limit
fn count<'a>(
    fragments: &HashMap<&'a str, &'a ast::FragmentDefinition>,
    fragment_cache: &mut HashMap<&'a str, Computation<OperationLimits<u32>>>,
    selection_set: &'a [ast::Selection],
) -> OperationLimits<u32> {
    let mut counts = OperationLimits::<u32>::default();
    let mut fields_seen = HashSet::new();
    for selection in selection_set {
        match selection {
            ast::Selection::Field(field) => {
                let nested = count(fragments, fragment_cache, &field.selection_set);
                counts.depth = counts.depth.max(1 + nested.depth);
                counts.height += nested.height;
                counts.aliases += nested.aliases;
                // Multiple aliases for the same field could use different arguments
                // Until we do full merging for limit checking purpose,
                // approximate measured height with an upper bound rather than a lower bound.
                let used_name = if let Some(alias) = &field.alias {
                    counts.aliases += 1;
                    alias.as_str()
                } else {
                    field.name.as_str()
                };
                let not_seen_before = fields_seen.insert(used_name);
                if not_seen_before {
                    counts.height += 1;
                    counts.root_fields += 1;
                }
            }
            ast::Selection::InlineFragment(fragment) => {
                let nested = count(fragments, fragment_cache, &fragment.selection_set);
                counts.depth = counts.depth.max(nested.depth);
                counts.height += nested.height;
                counts.aliases += nested.aliases;
            }
            ast::Selection::FragmentSpread(spread) => {
                let name = spread.fragment_name.as_str();
                let nested = match fragment_cache.get(name) {
                    None => {
                        let Some(definition) = fragments.get(name) else {
                            // undefined fragments are rejected by validation
                            continue;
                        };
                        fragment_cache.insert(name, Computation::InProgress);
                        let nested = count(fragments, fragment_cache, &definition.selection_set);
                        fragment_cache.insert(name, Computation::Done(nested));
                        nested
                    }
                    // a fragment cycle, rejected by validation
                    Some(Computation::InProgress) => continue,
                    Some(Computation::Done(cached)) => *cached,
                };
                counts.depth = counts.depth.max(nested.depth);
                counts.height += nested.height;
                counts.aliases += nested.aliases;
            }
        }
    }
    counts
}
