use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Template for a workflow: the root of the definition graph.
///
/// `start_activity_definition_id` is the head of the default chain and stays
/// `None` until the first activity is inserted at position 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub id: i64,
    pub name: String,
    pub start_activity_definition_id: Option<i64>,
    pub creation_date: DateTime<Utc>,
}

/// New WorkflowDefinition for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkflowDefinition {
    pub name: String,
}

impl NewWorkflowDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
