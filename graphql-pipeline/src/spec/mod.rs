mod schema;
mod source;

pub use schema::Schema;
pub use source::REQUEST_SOURCE_NAME;
pub use source::Source;
