//! Runs GraphQL requests through parsing, validation and execution.
//!
//! The entry point is [`execute`] (or [`Pipeline::execute`] when collaborators
//! need to be replaced). A request always produces a [`graphql::Response`]:
//! syntax and validation problems short-circuit with their own errors and no
//! data, resolver failures end up next to partial data.

#![cfg_attr(feature = "failfast", allow(unreachable_code))]
#![warn(unreachable_pub)]

macro_rules! failfast_debug {
    ($($tokens:tt)+) => {{
        tracing::debug!($($tokens)+);
        #[cfg(feature = "failfast")]
        panic!(
            "failfast triggered. \
            Please remove the feature failfast if you don't want to see these panics"
        );
    }};
}

pub mod configuration;
mod context;
pub mod error;
pub mod graphql;
pub mod json_ext;
mod pipeline;
pub mod services;
mod spec;
pub mod tracer;

pub use configuration::Configuration;
pub use context::Context;
pub use pipeline::Params;
pub use pipeline::Pipeline;
pub use pipeline::execute;
pub use spec::REQUEST_SOURCE_NAME;
pub use spec::Schema;
pub use spec::Source;
