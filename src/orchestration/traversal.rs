//! # Traversal Engine
//!
//! The auto-validation sweep: starting from the activity the instance just
//! landed on, walk the named transition chain forward, recording an
//! engine-authored decision at every activity the predicate clears, and stop
//! at the first activity that needs a human (or at the chain's end).

use crate::error::{EngineError, Result};
use crate::models::{ActivityInstance, NewActivityInstance, NewDecision, WorkflowInstance};
use crate::orchestration::WorkflowEngine;
use tracing::{debug, trace};

impl WorkflowEngine {
    /// The at-most-one activity instance for (instance, definition), created
    /// on first visit. Re-entry through a `"back"` transition lands on the
    /// already materialized instance with its decisions intact.
    pub(crate) async fn find_or_create_activity(
        &self,
        workflow_instance_id: i64,
        activity_definition_id: i64,
    ) -> Result<ActivityInstance> {
        if let Some(existing) = self
            .store
            .find_activity_by_definition(workflow_instance_id, activity_definition_id)
            .await?
        {
            return Ok(existing);
        }
        self.store
            .create_activity(NewActivityInstance {
                activity_definition_id,
                workflow_instance_id,
            })
            .await
    }

    /// Sweep forward from `current` along `transition_name`.
    ///
    /// Returns `true` when the sweep fell off the end of the chain (the last
    /// activity auto-validated and had no outgoing transition). The
    /// instance's current-activity pointer is persisted once, after the
    /// sweep, and only if the sweep moved it. Exhausting the configured
    /// iteration cap without a natural stop is an error, since it can only
    /// mean a cycle of auto-validating activities.
    pub(crate) async fn auto_validate_next_activities(
        &self,
        instance: &mut WorkflowInstance,
        current: ActivityInstance,
        current_definition_id: i64,
        transition_name: &str,
    ) -> Result<bool> {
        let mut definition = self
            .store
            .read_activity_definition(current_definition_id)
            .await?;
        let item = self.item_store.read_item(instance.item_id).await?;

        let mut current = current;
        let mut moved = false;
        let mut end_reached = false;
        let mut stopped = false;

        // Bounded defensively; a well-formed chain terminates on its own
        for _ in 0..self.config.max_sweep_iterations {
            if !self.predicate.can_auto_validate(&definition, &item).await? {
                stopped = true;
                break;
            }

            self.store
                .create_decision(current.id, &NewDecision::automatic())
                .await?;
            debug!(
                workflow_instance_id = instance.id,
                activity_instance_id = current.id,
                activity_definition_id = definition.id,
                "activity auto-validated"
            );

            if !self
                .store
                .has_next_activity(definition.id, transition_name)
                .await?
            {
                end_reached = true;
                stopped = true;
                break;
            }

            definition = self
                .store
                .find_next_activity_definition(definition.id, transition_name)
                .await?;
            current = self
                .find_or_create_activity(instance.id, definition.id)
                .await?;
            moved = true;
        }

        if moved {
            instance.current_activity_instance_id = Some(current.id);
            self.store.update_instance(instance).await?;
            if self.config.trace_mutations {
                trace!(workflow_instance_id = instance.id, "instance row updated");
            }
            debug!(
                workflow_instance_id = instance.id,
                activity_instance_id = current.id,
                end_reached,
                "auto-validation sweep moved the current activity"
            );
        }

        // Pointer progress is persisted above even on this path; only the
        // cap exhaustion itself is surfaced
        if !stopped {
            return Err(EngineError::validation(format!(
                "auto-validation sweep on workflow instance {} exceeded {} iterations",
                instance.id, self.config.max_sweep_iterations
            )));
        }

        Ok(end_reached)
    }
}
