//! Vector search tools.

mod query;

pub use query::SearchQueryTool;
