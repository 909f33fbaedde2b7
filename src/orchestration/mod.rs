// Orchestration layer: the public façade composing the graph builder, the
// lifecycle state machine, the traversal sweep and the advancement gate
// over the store contract.

pub mod engine;
pub mod report;
pub mod traversal;

pub use engine::WorkflowEngine;
pub use report::WorkflowDecisionEntry;
