//! Authoring agent tools.

mod compose;

pub use compose::AgentComposeTool;
