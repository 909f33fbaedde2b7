pub mod activity_definition;
pub mod activity_instance;
pub mod decision;
pub mod transition_definition;
pub mod workflow_definition;
pub mod workflow_instance;

// Re-export core models for easy access
pub use activity_definition::{ActivityDefinition, Multiplicity, NewActivityDefinition};
pub use activity_instance::{ActivityInstance, NewActivityInstance};
pub use decision::{Decision, NewDecision, AUTO_DECISION_USERNAME};
pub use transition_definition::{
    NewTransitionDefinition, TransitionDefinition, DEFAULT_TRANSITION_NAME, BACK_TRANSITION_NAME,
};
pub use workflow_definition::{NewWorkflowDefinition, WorkflowDefinition};
pub use workflow_instance::{NewWorkflowInstance, WorkflowInstance};
