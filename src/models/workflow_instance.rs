use crate::state_machine::WorkflowStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One running execution of a workflow definition, attached to an external
/// subject item.
///
/// `current_activity_instance_id` always references an [`super::ActivityInstance`]
/// belonging to this same workflow instance. The item behind `item_id` is
/// resolved through the item store collaborator and never owned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInstance {
    pub id: i64,
    pub workflow_definition_id: i64,
    pub item_id: i64,
    pub status: WorkflowStatus,
    pub current_activity_instance_id: Option<i64>,
    pub username: String,
    pub user_logic: bool,
    pub creation_date: DateTime<Utc>,
}

/// New WorkflowInstance for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkflowInstance {
    pub workflow_definition_id: i64,
    pub item_id: i64,
    pub username: String,
    pub user_logic: bool,
}
