use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Materialized occurrence of an activity definition within one workflow
/// instance. At most one exists per (workflow instance, activity definition).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityInstance {
    pub id: i64,
    pub activity_definition_id: i64,
    pub workflow_instance_id: i64,
    pub creation_date: DateTime<Utc>,
}

/// New ActivityInstance for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivityInstance {
    pub activity_definition_id: i64,
    pub workflow_instance_id: i64,
}
