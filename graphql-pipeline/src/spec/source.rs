/// Logical name attached to request text, used when reporting errors.
pub const REQUEST_SOURCE_NAME: &str = "GraphQL request";

/// Request text tagged with a logical name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub body: String,
}

impl Source {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    /// Tags request text with [`REQUEST_SOURCE_NAME`].
    pub fn request(body: impl Into<String>) -> Self {
        Self::new(REQUEST_SOURCE_NAME, body)
    }
}
