//! Request parsing.

use apollo_compiler::ast;

use crate::Source;
use crate::error::SyntaxErrors;

/// Turns request text into a syntax tree.
///
/// A parser only checks syntax: it never looks at a schema, and on failure it
/// reports at least one error, in source order.
pub trait Parser: Send + Sync {
    fn parse(&self, source: &Source) -> Result<ast::Document, SyntaxErrors>;
}

/// [`Parser`] backed by `apollo-compiler`.
#[derive(Clone, Copy, Debug)]
pub struct DocumentParser {
    recursion_limit: usize,
    token_limit: usize,
}

#[buildstructor::buildstructor]
impl DocumentParser {
    #[builder(visibility = "pub")]
    fn new(recursion_limit: Option<usize>, token_limit: Option<usize>) -> Self {
        Self {
            recursion_limit: recursion_limit.unwrap_or_else(default_recursion_limit),
            token_limit: token_limit.unwrap_or_else(default_token_limit),
        }
    }
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Parser for DocumentParser {
    fn parse(&self, source: &Source) -> Result<ast::Document, SyntaxErrors> {
        let mut parser = apollo_compiler::parser::Parser::new()
            .recursion_limit(self.recursion_limit)
            .token_limit(self.token_limit);
        let result = parser.parse_ast(&source.body, &source.name);

        // Trace log recursion limit data
        let recursion_limit = parser.recursion_reached();
        tracing::trace!(?recursion_limit, "recursion limit data");

        result.map_err(SyntaxErrors::from)
    }
}

pub(crate) const fn default_recursion_limit() -> usize {
    500
}

pub(crate) const fn default_token_limit() -> usize {
    15_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::IntoGraphQLErrors;

    #[test]
    fn parses_without_a_schema() {
        let document = DocumentParser::default()
            .parse(&Source::request("{ unknownField }"))
            .unwrap();
        assert_eq!(document.definitions.len(), 1);
    }

    #[test]
    fn reports_unterminated_selection_set() {
        let errors = DocumentParser::default()
            .parse(&Source::request("{ hel"))
            .unwrap_err();
        assert!(!errors.is_empty());
        let errors = errors.into_graphql_errors();
        assert_eq!(errors[0].extension_code().as_deref(), Some("GRAPHQL_PARSE_FAILED"));
        assert!(errors[0].locations.iter().all(|location| location.line == 1));
    }

    #[test]
    fn errors_are_in_source_order() {
        let errors = DocumentParser::default()
            .parse(&Source::request("query {\n  a(\n}\nquery {\n  b(\n}"))
            .unwrap_err();
        let lines = errors
            .errors
            .iter()
            .filter_map(|error| error.location.as_ref().map(|location| location.line))
            .collect::<Vec<_>>();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
        assert!(!errors.is_empty());
    }

    #[test]
    fn enforces_token_limit() {
        let parser = DocumentParser::builder().token_limit(5).build();
        let errors = parser
            .parse(&Source::request("{ a b c d e f g h }"))
            .unwrap_err();
        assert!(!errors.is_empty());
        assert!(DocumentParser::default()
            .parse(&Source::request("{ a b c d e f g h }"))
            .is_ok());
    }
}
