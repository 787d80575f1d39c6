//! How sibling field resolutions are scheduled.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::graphql;
use crate::json_ext::Value;

/// Outcome of one field or list item.
///
/// `value` is `None` when a null reached a non-null position: the parent has to
/// become null in turn.
#[derive(Debug, Default)]
pub struct ResolvedField {
    pub(crate) value: Option<Value>,
    pub(crate) errors: Vec<graphql::Error>,
}

impl ResolvedField {
    pub(crate) fn from_value(value: Value) -> Self {
        Self {
            value: Some(value),
            errors: Vec::new(),
        }
    }

    pub(crate) fn new(value: Option<Value>, errors: Vec<graphql::Error>) -> Self {
        Self { value, errors }
    }

    /// The completed value, `None` when it could not be completed.
    pub fn completed(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn errors(&self) -> &[graphql::Error] {
        &self.errors
    }
}

/// Runs the resolution tasks of sibling fields.
///
/// Tasks come in field order and results must be returned in that same order,
/// whatever order they complete in.
pub trait ResolutionStrategy: Send + Sync + fmt::Debug {
    fn resolve<'a>(
        &'a self,
        tasks: Vec<BoxFuture<'a, ResolvedField>>,
    ) -> BoxFuture<'a, Vec<ResolvedField>>;
}

/// One task at a time, in order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sequential;

impl ResolutionStrategy for Sequential {
    fn resolve<'a>(
        &'a self,
        tasks: Vec<BoxFuture<'a, ResolvedField>>,
    ) -> BoxFuture<'a, Vec<ResolvedField>> {
        async move {
            let mut results = Vec::with_capacity(tasks.len());
            for task in tasks {
                results.push(task.await);
            }
            results
        }
        .boxed()
    }
}

/// Up to `max_concurrency` tasks in flight at once.
///
/// Tasks are interleaved by `buffered` on the task that polls the request, not
/// spawned. They only overlap while awaiting: a resolver that blocks or stays
/// busy on the CPU holds every sibling until it returns. Such resolvers gain
/// nothing over [`Sequential`] unless they move their work elsewhere, for
/// example with `tokio::task::spawn_blocking`.
#[derive(Clone, Copy, Debug)]
pub struct Concurrent {
    max_concurrency: usize,
}

impl Concurrent {
    /// A limit of zero is treated as one.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }
}

impl Default for Concurrent {
    fn default() -> Self {
        Self::new(default_max_concurrency())
    }
}

impl ResolutionStrategy for Concurrent {
    fn resolve<'a>(
        &'a self,
        tasks: Vec<BoxFuture<'a, ResolvedField>>,
    ) -> BoxFuture<'a, Vec<ResolvedField>> {
        // `buffered` yields in submission order, not completion order
        stream::iter(tasks)
            .buffered(self.max_concurrency)
            .collect::<Vec<_>>()
            .boxed()
    }
}

/// Resolution strategy selected in the configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Resolve sibling fields one after the other.
    #[default]
    Sequential,
    /// Resolve sibling fields concurrently.
    Concurrent,
}

impl ResolutionMode {
    pub fn strategy(self, max_concurrency: usize) -> Arc<dyn ResolutionStrategy> {
        match self {
            ResolutionMode::Sequential => Arc::new(Sequential),
            ResolutionMode::Concurrent => Arc::new(Concurrent::new(max_concurrency)),
        }
    }
}

pub(crate) const fn default_max_concurrency() -> usize {
    16
}
