// Definition-graph construction: the default chain is a singly linked list
// encoded as transition rows, so insertion repairs at most two edges.

pub mod builder;

pub use builder::{DefinitionGraphBuilder, TransitionBuilder};
