//! JSON values exchanged with resolvers and returned to callers.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
pub use serde_json_bytes::ByteString;
pub use serde_json_bytes::Value;

/// A JSON object.
pub type Object = serde_json_bytes::Map<ByteString, Value>;

/// A GraphQL path element that is composed of strings or numbers.
/// e.g `/book/3/name`
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// An index path element.
    Index(usize),

    /// A key path element.
    Key(String),
}

/// A path into the response data, used to locate field errors.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(pub Vec<PathElement>);

impl Path {
    pub fn empty() -> Path {
        Path(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.0.iter()
    }

    /// Returns a new path with `key` appended.
    pub fn join_key(&self, key: impl Into<String>) -> Path {
        let mut elements = self.0.clone();
        elements.push(PathElement::Key(key.into()));
        Path(elements)
    }

    /// Returns a new path with `index` appended.
    pub fn join_index(&self, index: usize) -> Path {
        let mut elements = self.0.clone();
        elements.push(PathElement::Index(index));
        Path(elements)
    }

    pub fn last_key(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|element| match element {
            PathElement::Key(key) => Some(key.as_str()),
            PathElement::Index(_) => None,
        })
    }
}

impl<T> From<T> for Path
where
    T: AsRef<str>,
{
    fn from(s: T) -> Self {
        Self(
            s.as_ref()
                .split('/')
                .filter(|s| !s.is_empty())
                .map(|s| match s.parse::<usize>() {
                    Ok(index) => PathElement::Index(index),
                    Err(_) => PathElement::Key(s.to_string()),
                })
                .collect(),
        )
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in self.iter() {
            write!(f, "/")?;
            match element {
                PathElement::Index(index) => write!(f, "{index}")?,
                PathElement::Key(key) => write!(f, "{key}")?,
            }
        }
        Ok(())
    }
}
