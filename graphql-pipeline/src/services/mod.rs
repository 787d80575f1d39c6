//! The phases a request goes through.

pub mod execution;
pub mod parse;
pub mod validate;

pub use execution::DefaultExecutor;
pub use execution::ExecutionRequest;
pub use execution::Executor;
pub use parse::DocumentParser;
pub use parse::Parser;
pub use validate::SchemaValidator;
pub use validate::ValidationRules;
pub use validate::Validator;
pub use validate::Verdict;
