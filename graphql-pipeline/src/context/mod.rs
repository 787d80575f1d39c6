//! Provide a [`Context`] for a single request.
//!
//! The context is handed to the pipeline by the caller and passed untouched to
//! every resolver. It carries caller-supplied entries, a cancellation signal and
//! an optional deadline. Cloning a context is cheap and every clone observes the
//! same entries and the same cancellation state.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ContextError;
use crate::json_ext::Value;

/// Holds [`Context`] entries.
pub(crate) type Entries = Arc<DashMap<String, Value>>;

/// Request-scoped context.
#[derive(Clone, Debug, Default)]
pub struct Context {
    entries: Entries,
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a context that counts as cancelled once `deadline` is reached.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns a context that counts as cancelled after `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Signals cancellation to everything holding a clone of this context.
    pub fn cancel(&self) {
        self.cancellation.cancel()
    }

    /// True once [`Context::cancel`] was called or the deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
            || self
                .deadline
                .map(|deadline| Instant::now() >= deadline)
                .unwrap_or(false)
    }

    /// The token resolvers can await to stop their own work early.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Get a value from the context using the provided key.
    ///
    /// Semantics:
    ///  - If the operation fails, that's because we can't deserialize the value.
    ///  - If the operation succeeds, the value is an [`Option`].
    pub fn get<K, V>(&self, key: K) -> Result<Option<V>, ContextError>
    where
        K: Into<String>,
        V: DeserializeOwned,
    {
        self.entries
            .get(&key.into())
            .map(|v| serde_json_bytes::from_value(v.value().clone()))
            .transpose()
            .map_err(ContextError::from)
    }

    /// Insert a value into the context using the provided key and value.
    ///
    /// Semantics:
    ///  - If the operation fails, then the pair has not been inserted.
    ///  - If the operation succeeds, the result is the old value as an [`Option`].
    pub fn insert<K, V>(&self, key: K, value: V) -> Result<Option<V>, ContextError>
    where
        K: Into<String>,
        V: DeserializeOwned + Serialize,
    {
        let value = serde_json_bytes::to_value(value)?;
        self.entries
            .insert(key.into(), value)
            .map(serde_json_bytes::from_value)
            .transpose()
            .map_err(ContextError::from)
    }

    /// Update a value in the context using the provided key and update function.
    ///
    /// The default is used when the key is not yet present.
    pub fn upsert<K, V>(
        &self,
        key: K,
        upsert: impl FnOnce(V) -> V,
        default: impl FnOnce() -> V,
    ) -> Result<(), ContextError>
    where
        K: Into<String>,
        V: DeserializeOwned + Serialize,
    {
        let key = key.into();
        let mut entry = self.entries.entry(key).or_insert(Value::Null);
        let current = match entry.value() {
            Value::Null => default(),
            value => serde_json_bytes::from_value(value.clone())?,
        };
        *entry.value_mut() = serde_json_bytes::to_value(upsert(current))?;
        Ok(())
    }

    pub fn contains_key<K>(&self, key: K) -> bool
    where
        K: Into<String>,
    {
        self.entries.contains_key(&key.into())
    }
}

#[cfg(test)]
mod tests;
