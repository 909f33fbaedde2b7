use serde::{Deserialize, Serialize};

/// Name of the primary chain edge between activity definitions.
pub const DEFAULT_TRANSITION_NAME: &str = "default";

/// Name of the backward edge the graph builder wires alongside tail inserts.
pub const BACK_TRANSITION_NAME: &str = "back";

/// Named directed edge between two activity definitions.
///
/// The `"default"` name is reserved for the primary chain; any other name is
/// a named branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDefinition {
    pub id: i64,
    pub workflow_definition_id: i64,
    pub from_activity_definition_id: i64,
    pub to_activity_definition_id: i64,
    pub name: String,
}

/// New TransitionDefinition for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransitionDefinition {
    pub workflow_definition_id: i64,
    pub from_activity_definition_id: i64,
    pub to_activity_definition_id: i64,
    pub name: String,
}

impl TransitionDefinition {
    /// Composite key used by stores that index transitions by source and name
    pub fn composite_key(&self) -> String {
        format!("{}|{}", self.from_activity_definition_id, self.name)
    }
}
