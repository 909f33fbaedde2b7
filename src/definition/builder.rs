//! # Definition Graph Builder
//!
//! Inserts activity definitions into the ordered default chain of a workflow
//! definition and wires the forward/back transitions. The chain is encoded
//! as `"default"` transition rows headed by the definition's start pointer;
//! `position` is a redundant index maintained for direct lookup.

use crate::error::{EngineError, Result};
use crate::models::{
    ActivityDefinition, NewActivityDefinition, NewTransitionDefinition, WorkflowDefinition,
    BACK_TRANSITION_NAME, DEFAULT_TRANSITION_NAME,
};
use crate::store::{TransitionCriteria, WorkflowStore};
use std::sync::Arc;
use tracing::debug;

/// Fluent builder for transition rows; the name defaults to `"default"`.
pub struct TransitionBuilder {
    name: Option<String>,
    workflow_definition_id: i64,
    from_activity_definition_id: i64,
    to_activity_definition_id: i64,
}

impl TransitionBuilder {
    pub fn new(workflow_definition_id: i64, from: i64, to: i64) -> Self {
        Self {
            name: None,
            workflow_definition_id,
            from_activity_definition_id: from,
            to_activity_definition_id: to,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn build(self) -> NewTransitionDefinition {
        NewTransitionDefinition {
            workflow_definition_id: self.workflow_definition_id,
            from_activity_definition_id: self.from_activity_definition_id,
            to_activity_definition_id: self.to_activity_definition_id,
            name: self
                .name
                .unwrap_or_else(|| DEFAULT_TRANSITION_NAME.to_string()),
        }
    }
}

/// Inserts activities into a definition's default chain.
pub struct DefinitionGraphBuilder {
    store: Arc<dyn WorkflowStore>,
}

impl DefinitionGraphBuilder {
    pub fn new(store: Arc<dyn WorkflowStore>) -> Self {
        Self { store }
    }

    /// Insert `new_activity` at `position` (1-based) in the definition's
    /// default chain, shifting the tail right when the position is occupied.
    ///
    /// Updates `definition.start_activity_definition_id` in place when the
    /// head changes. Returns the persisted activity definition.
    pub async fn insert_activity(
        &self,
        definition: &mut WorkflowDefinition,
        mut new_activity: NewActivityDefinition,
        position: i32,
    ) -> Result<ActivityDefinition> {
        let resident = self
            .store
            .find_activity_definition_by_position(definition, position)
            .await?;

        new_activity.position = position;

        let created = match resident {
            None => self.append_at_tail(definition, new_activity, position).await?,
            Some(resident) => {
                self.splice_before(definition, new_activity, position, resident)
                    .await?
            }
        };

        debug!(
            workflow_definition_id = definition.id,
            activity_definition_id = created.id,
            position,
            "activity definition inserted"
        );

        Ok(created)
    }

    /// Insertion at the tail (or into an empty definition). The number of
    /// existing default edges must match the target position.
    async fn append_at_tail(
        &self,
        definition: &mut WorkflowDefinition,
        new_activity: NewActivityDefinition,
        position: i32,
    ) -> Result<ActivityDefinition> {
        let edge_count = self.store.count_default_transitions(definition).await?;
        let expected = 0.max(position - 2) as usize;
        if edge_count != expected {
            return Err(EngineError::InvalidPosition {
                workflow_definition_id: definition.id,
                position,
                message: format!(
                    "chain has {edge_count} default transitions, expected {expected}"
                ),
            });
        }

        let created = self.store.create_activity_definition(new_activity).await?;

        if position == 2 {
            let start_id = definition.start_activity_definition_id.ok_or_else(|| {
                EngineError::not_found("ActivityDefinition", "start of definition")
            })?;
            self.link_forward_and_back(definition.id, start_id, created.id)
                .await?;
        } else if position > 2 {
            let previous = self
                .store
                .find_activity_definition_by_position(definition, position - 1)
                .await?
                .ok_or_else(|| EngineError::InvalidPosition {
                    workflow_definition_id: definition.id,
                    position,
                    message: format!("no activity definition at position {}", position - 1),
                })?;
            self.link_forward_and_back(definition.id, previous.id, created.id)
                .await?;
        } else {
            // First ever activity: it becomes the chain head, no edges yet
            definition.start_activity_definition_id = Some(created.id);
            self.store.update_definition(definition).await?;
        }

        Ok(created)
    }

    /// Mid-chain insertion before `resident`: shift the tail right, then
    /// locally repair the two affected edges.
    async fn splice_before(
        &self,
        definition: &mut WorkflowDefinition,
        new_activity: NewActivityDefinition,
        position: i32,
        resident: ActivityDefinition,
    ) -> Result<ActivityDefinition> {
        self.store
            .increment_positions_from(definition.id, position)
            .await?;

        let created = self.store.create_activity_definition(new_activity).await?;

        if position > 1 {
            // Retarget the edge arriving at the resident onto the new
            // activity, then link new -> resident
            let criteria = TransitionCriteria::arriving_at(DEFAULT_TRANSITION_NAME, resident.id);
            let mut incoming = self.store.find_transition(&criteria).await?.ok_or_else(|| {
                EngineError::not_found("TransitionDefinition", format!("-> {}", resident.id))
            })?;
            incoming.to_activity_definition_id = created.id;
            self.store.update_transition(&incoming).await?;

            let forward = TransitionBuilder::new(definition.id, created.id, resident.id).build();
            self.store.add_transition(forward).await?;
        } else {
            // New chain head: redirect the start pointer and link forward
            let forward = TransitionBuilder::new(definition.id, created.id, resident.id).build();
            self.store.add_transition(forward).await?;
            definition.start_activity_definition_id = Some(created.id);
            self.store.update_definition(definition).await?;
        }

        Ok(created)
    }

    /// Wire the `"default"` edge `from -> to` and its `"back"` counterpart
    async fn link_forward_and_back(
        &self,
        workflow_definition_id: i64,
        from: i64,
        to: i64,
    ) -> Result<()> {
        let back = TransitionBuilder::new(workflow_definition_id, to, from)
            .with_name(BACK_TRANSITION_NAME)
            .build();
        self.store.add_transition(back).await?;

        let forward = TransitionBuilder::new(workflow_definition_id, from, to).build();
        self.store.add_transition(forward).await?;
        Ok(())
    }
}
