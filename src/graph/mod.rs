mod build;
mod literal;
mod scope;
mod store;

pub use build::{BuildSummary, GraphBuilder};
pub use scope::Scope;
pub use store::{EdgeId, GraphStore, NodeDraft, NodeId, NodeKind};
