//! # Store Contract
//!
//! The persistence seam of the engine: CRUD plus the indexed lookups the
//! orchestration layer needs, expressed as an async trait so a durable SQL
//! adapter can implement the same contract as the in-memory reference.

pub mod memory;

pub use memory::MemoryWorkflowStore;

use crate::error::Result;
use crate::models::{
    ActivityDefinition, ActivityInstance, Decision, NewActivityDefinition, NewActivityInstance,
    NewDecision, NewTransitionDefinition, NewWorkflowDefinition, NewWorkflowInstance,
    TransitionDefinition, WorkflowDefinition, WorkflowInstance,
};
use async_trait::async_trait;

/// Lookup criteria for transitions: name is mandatory, endpoints optional.
#[derive(Debug, Clone, Default)]
pub struct TransitionCriteria {
    pub name: String,
    pub from_activity_definition_id: Option<i64>,
    pub to_activity_definition_id: Option<i64>,
}

impl TransitionCriteria {
    /// Match the transition with the given name arriving at `to`
    pub fn arriving_at(name: impl Into<String>, to: i64) -> Self {
        Self {
            name: name.into(),
            from_activity_definition_id: None,
            to_activity_definition_id: Some(to),
        }
    }
}

/// Persistence contract required by the orchestration engine.
///
/// Implementations own id assignment: `create_*` rejects pre-assigned ids
/// and returns the stored entity with its generated id. All mutation is by
/// whole-value replacement; readers never observe partially updated rows.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    // Workflow definitions

    async fn create_definition(&self, new: NewWorkflowDefinition) -> Result<WorkflowDefinition>;

    async fn read_definition(&self, id: i64) -> Result<WorkflowDefinition>;

    async fn read_definition_by_name(&self, name: &str) -> Result<WorkflowDefinition>;

    async fn update_definition(&self, definition: &WorkflowDefinition) -> Result<()>;

    // Activity definitions

    async fn create_activity_definition(
        &self,
        new: NewActivityDefinition,
    ) -> Result<ActivityDefinition>;

    async fn read_activity_definition(&self, id: i64) -> Result<ActivityDefinition>;

    /// Resolve the activity occupying `position` in the default chain, if any
    async fn find_activity_definition_by_position(
        &self,
        definition: &WorkflowDefinition,
        position: i32,
    ) -> Result<Option<ActivityDefinition>>;

    /// All activity definitions of the default chain, in chain order
    async fn find_all_default_activity_definitions(
        &self,
        definition: &WorkflowDefinition,
    ) -> Result<Vec<ActivityDefinition>>;

    /// Shift right: bump `position` of every activity definition in this
    /// workflow definition at or after `position`
    async fn increment_positions_from(
        &self,
        workflow_definition_id: i64,
        position: i32,
    ) -> Result<()>;

    /// Number of `"default"` transitions reachable from the start activity
    async fn count_default_transitions(&self, definition: &WorkflowDefinition) -> Result<usize>;

    // Transitions

    async fn add_transition(&self, new: NewTransitionDefinition) -> Result<TransitionDefinition>;

    async fn update_transition(&self, transition: &TransitionDefinition) -> Result<()>;

    async fn find_transition(
        &self,
        criteria: &TransitionCriteria,
    ) -> Result<Option<TransitionDefinition>>;

    /// Whether a transition with this name leaves the given activity definition
    async fn has_next_activity(
        &self,
        from_activity_definition_id: i64,
        transition_name: &str,
    ) -> Result<bool>;

    /// Resolve the activity definition the named transition points at
    async fn find_next_activity_definition(
        &self,
        from_activity_definition_id: i64,
        transition_name: &str,
    ) -> Result<ActivityDefinition>;

    // Workflow instances

    async fn create_instance(&self, new: NewWorkflowInstance) -> Result<WorkflowInstance>;

    async fn read_instance(&self, id: i64) -> Result<WorkflowInstance>;

    /// For-update read variant backing the save-decision concurrency guard.
    /// The in-memory reference takes no lock; a durable adapter would issue
    /// a `SELECT ... FOR UPDATE`.
    async fn read_instance_for_update(&self, id: i64) -> Result<WorkflowInstance>;

    async fn read_instance_by_item(
        &self,
        workflow_definition_id: i64,
        item_id: i64,
    ) -> Result<WorkflowInstance>;

    async fn update_instance(&self, instance: &WorkflowInstance) -> Result<()>;

    // Activity instances

    async fn create_activity(&self, new: NewActivityInstance) -> Result<ActivityInstance>;

    async fn read_activity(&self, id: i64) -> Result<ActivityInstance>;

    /// The at-most-one activity instance for (workflow instance, definition)
    async fn find_activity_by_definition(
        &self,
        workflow_instance_id: i64,
        activity_definition_id: i64,
    ) -> Result<Option<ActivityInstance>>;

    async fn find_activities_by_instance(
        &self,
        workflow_instance_id: i64,
    ) -> Result<Vec<ActivityInstance>>;

    // Decisions

    async fn create_decision(
        &self,
        activity_instance_id: i64,
        new: &NewDecision,
    ) -> Result<Decision>;

    async fn update_decision(&self, decision: &Decision) -> Result<()>;

    async fn find_decisions_by_activity(&self, activity_instance_id: i64) -> Result<Vec<Decision>>;

    async fn find_decisions_by_instance(&self, workflow_instance_id: i64) -> Result<Vec<Decision>>;
}
