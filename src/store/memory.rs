//! In-memory reference implementation of the store contract.
//!
//! Entities live in per-entity concurrent maps keyed by generated integer
//! ids; transitions are additionally keyed by a `"{from}|{name}"` composite
//! so "next activity" resolution is O(1). Remaining secondary lookups are
//! linear scans, which is acceptable for a test/reference double where the
//! maps stay small per process.

use crate::error::{EngineError, Result};
use crate::models::{
    ActivityDefinition, ActivityInstance, Decision, NewActivityDefinition, NewActivityInstance,
    NewDecision, NewTransitionDefinition, NewWorkflowDefinition, NewWorkflowInstance,
    TransitionDefinition, WorkflowDefinition, WorkflowInstance, DEFAULT_TRANSITION_NAME,
};
use crate::state_machine::WorkflowStatus;
use crate::store::{TransitionCriteria, WorkflowStore};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

fn transition_key(from_activity_definition_id: i64, name: &str) -> String {
    format!("{from_activity_definition_id}|{name}")
}

/// In-memory store double, also the default backing for tests.
#[derive(Default)]
pub struct MemoryWorkflowStore {
    definitions: DashMap<i64, WorkflowDefinition>,
    definition_sequence: AtomicI64,

    activity_definitions: DashMap<i64, ActivityDefinition>,
    activity_definition_sequence: AtomicI64,

    /// Keyed by `"{from}|{name}"`, one transition per (source, name)
    transitions: DashMap<String, TransitionDefinition>,
    transition_sequence: AtomicI64,

    instances: DashMap<i64, WorkflowInstance>,
    instance_sequence: AtomicI64,

    activities: DashMap<i64, ActivityInstance>,
    activity_sequence: AtomicI64,

    decisions: DashMap<i64, Decision>,
    decision_sequence: AtomicI64,
}

impl MemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(sequence: &AtomicI64) -> i64 {
        sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Walk the default chain from the start activity, yielding each
    /// activity definition in order. A chain longer than the number of
    /// stored definitions can only mean a cycle, which is reported as a
    /// structural error rather than a truncated chain.
    fn walk_default_chain(&self, definition: &WorkflowDefinition) -> Result<Vec<ActivityDefinition>> {
        let mut chain = Vec::new();
        let Some(start_id) = definition.start_activity_definition_id else {
            return Ok(chain);
        };

        let bound = self.activity_definitions.len() + 1;
        let mut current = self
            .activity_definitions
            .get(&start_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| EngineError::not_found("ActivityDefinition", start_id))?;

        for _ in 0..bound {
            chain.push(current.clone());
            let next = self
                .transitions
                .get(&transition_key(current.id, DEFAULT_TRANSITION_NAME))
                .map(|entry| entry.to_activity_definition_id);
            match next {
                Some(next_id) => {
                    current = self
                        .activity_definitions
                        .get(&next_id)
                        .map(|entry| entry.clone())
                        .ok_or_else(|| EngineError::not_found("ActivityDefinition", next_id))?;
                }
                None => return Ok(chain),
            }
        }

        Err(EngineError::validation(format!(
            "default transition chain of workflow definition {} does not terminate",
            definition.id
        )))
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn create_definition(&self, new: NewWorkflowDefinition) -> Result<WorkflowDefinition> {
        let id = Self::next_id(&self.definition_sequence);
        let definition = WorkflowDefinition {
            id,
            name: new.name,
            start_activity_definition_id: None,
            creation_date: Utc::now(),
        };
        self.definitions.insert(id, definition.clone());
        Ok(definition)
    }

    async fn read_definition(&self, id: i64) -> Result<WorkflowDefinition> {
        self.definitions
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or_else(|| EngineError::not_found("WorkflowDefinition", id))
    }

    async fn read_definition_by_name(&self, name: &str) -> Result<WorkflowDefinition> {
        self.definitions
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.clone())
            .ok_or_else(|| EngineError::not_found("WorkflowDefinition", name))
    }

    async fn update_definition(&self, definition: &WorkflowDefinition) -> Result<()> {
        if !self.definitions.contains_key(&definition.id) {
            return Err(EngineError::not_found("WorkflowDefinition", definition.id));
        }
        self.definitions.insert(definition.id, definition.clone());
        Ok(())
    }

    async fn create_activity_definition(
        &self,
        new: NewActivityDefinition,
    ) -> Result<ActivityDefinition> {
        let id = Self::next_id(&self.activity_definition_sequence);
        let activity_definition = ActivityDefinition {
            id,
            workflow_definition_id: new.workflow_definition_id,
            name: new.name,
            position: new.position,
            multiplicity: new.multiplicity,
        };
        self.activity_definitions
            .insert(id, activity_definition.clone());
        Ok(activity_definition)
    }

    async fn read_activity_definition(&self, id: i64) -> Result<ActivityDefinition> {
        self.activity_definitions
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or_else(|| EngineError::not_found("ActivityDefinition", id))
    }

    async fn find_activity_definition_by_position(
        &self,
        definition: &WorkflowDefinition,
        position: i32,
    ) -> Result<Option<ActivityDefinition>> {
        if position < 1 {
            return Ok(None);
        }
        let chain = self.walk_default_chain(definition)?;
        Ok(chain.into_iter().nth((position - 1) as usize))
    }

    async fn find_all_default_activity_definitions(
        &self,
        definition: &WorkflowDefinition,
    ) -> Result<Vec<ActivityDefinition>> {
        self.walk_default_chain(definition)
    }

    async fn increment_positions_from(
        &self,
        workflow_definition_id: i64,
        position: i32,
    ) -> Result<()> {
        for mut entry in self.activity_definitions.iter_mut() {
            if entry.workflow_definition_id == workflow_definition_id && entry.position >= position
            {
                entry.position += 1;
            }
        }
        Ok(())
    }

    async fn count_default_transitions(&self, definition: &WorkflowDefinition) -> Result<usize> {
        let chain = self.walk_default_chain(definition)?;
        // n nodes in the chain are joined by n-1 default edges
        Ok(chain.len().saturating_sub(1))
    }

    async fn add_transition(&self, new: NewTransitionDefinition) -> Result<TransitionDefinition> {
        let id = Self::next_id(&self.transition_sequence);
        let transition = TransitionDefinition {
            id,
            workflow_definition_id: new.workflow_definition_id,
            from_activity_definition_id: new.from_activity_definition_id,
            to_activity_definition_id: new.to_activity_definition_id,
            name: new.name,
        };
        self.transitions
            .insert(transition.composite_key(), transition.clone());
        Ok(transition)
    }

    async fn update_transition(&self, transition: &TransitionDefinition) -> Result<()> {
        // The source or name may have changed, so drop the stale key first
        let stale_key = self
            .transitions
            .iter()
            .find(|entry| entry.id == transition.id)
            .map(|entry| entry.key().clone());

        match stale_key {
            Some(key) => {
                self.transitions.remove(&key);
            }
            None => {
                return Err(EngineError::not_found("TransitionDefinition", transition.id));
            }
        }
        self.transitions
            .insert(transition.composite_key(), transition.clone());
        Ok(())
    }

    async fn find_transition(
        &self,
        criteria: &TransitionCriteria,
    ) -> Result<Option<TransitionDefinition>> {
        let found = self.transitions.iter().find(|entry| {
            let match_from = criteria
                .from_activity_definition_id
                .map_or(true, |from| from == entry.from_activity_definition_id);
            let match_to = criteria
                .to_activity_definition_id
                .map_or(true, |to| to == entry.to_activity_definition_id);
            match_from && match_to && criteria.name == entry.name
        });
        Ok(found.map(|entry| entry.clone()))
    }

    async fn has_next_activity(
        &self,
        from_activity_definition_id: i64,
        transition_name: &str,
    ) -> Result<bool> {
        Ok(self
            .transitions
            .contains_key(&transition_key(from_activity_definition_id, transition_name)))
    }

    async fn find_next_activity_definition(
        &self,
        from_activity_definition_id: i64,
        transition_name: &str,
    ) -> Result<ActivityDefinition> {
        let key = transition_key(from_activity_definition_id, transition_name);
        let to_id = self
            .transitions
            .get(&key)
            .map(|entry| entry.to_activity_definition_id)
            .ok_or_else(|| EngineError::not_found("TransitionDefinition", key))?;
        self.read_activity_definition(to_id).await
    }

    async fn create_instance(&self, new: NewWorkflowInstance) -> Result<WorkflowInstance> {
        let id = Self::next_id(&self.instance_sequence);
        let instance = WorkflowInstance {
            id,
            workflow_definition_id: new.workflow_definition_id,
            item_id: new.item_id,
            status: WorkflowStatus::Created,
            current_activity_instance_id: None,
            username: new.username,
            user_logic: new.user_logic,
            creation_date: Utc::now(),
        };
        self.instances.insert(id, instance.clone());
        Ok(instance)
    }

    async fn read_instance(&self, id: i64) -> Result<WorkflowInstance> {
        self.instances
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or_else(|| EngineError::not_found("WorkflowInstance", id))
    }

    async fn read_instance_for_update(&self, id: i64) -> Result<WorkflowInstance> {
        // No row lock for the in-memory double
        self.read_instance(id).await
    }

    async fn read_instance_by_item(
        &self,
        workflow_definition_id: i64,
        item_id: i64,
    ) -> Result<WorkflowInstance> {
        self.instances
            .iter()
            .find(|entry| {
                entry.item_id == item_id && entry.workflow_definition_id == workflow_definition_id
            })
            .map(|entry| entry.clone())
            .ok_or_else(|| {
                EngineError::not_found("WorkflowInstance", format!("item {item_id}"))
            })
    }

    async fn update_instance(&self, instance: &WorkflowInstance) -> Result<()> {
        if !self.instances.contains_key(&instance.id) {
            return Err(EngineError::not_found("WorkflowInstance", instance.id));
        }
        self.instances.insert(instance.id, instance.clone());
        Ok(())
    }

    async fn create_activity(&self, new: NewActivityInstance) -> Result<ActivityInstance> {
        let id = Self::next_id(&self.activity_sequence);
        let activity = ActivityInstance {
            id,
            activity_definition_id: new.activity_definition_id,
            workflow_instance_id: new.workflow_instance_id,
            creation_date: Utc::now(),
        };
        self.activities.insert(id, activity.clone());
        Ok(activity)
    }

    async fn read_activity(&self, id: i64) -> Result<ActivityInstance> {
        self.activities
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or_else(|| EngineError::not_found("ActivityInstance", id))
    }

    async fn find_activity_by_definition(
        &self,
        workflow_instance_id: i64,
        activity_definition_id: i64,
    ) -> Result<Option<ActivityInstance>> {
        Ok(self
            .activities
            .iter()
            .find(|entry| {
                entry.workflow_instance_id == workflow_instance_id
                    && entry.activity_definition_id == activity_definition_id
            })
            .map(|entry| entry.clone()))
    }

    async fn find_activities_by_instance(
        &self,
        workflow_instance_id: i64,
    ) -> Result<Vec<ActivityInstance>> {
        Ok(self
            .activities
            .iter()
            .filter(|entry| entry.workflow_instance_id == workflow_instance_id)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn create_decision(
        &self,
        activity_instance_id: i64,
        new: &NewDecision,
    ) -> Result<Decision> {
        if new.id.is_some() {
            return Err(EngineError::validation("a new decision must not have an id"));
        }
        let id = Self::next_id(&self.decision_sequence);
        let decision = Decision {
            id,
            activity_instance_id,
            username: new.username.clone(),
            choice: new.choice,
            comments: new.comments.clone(),
            decision_date: new.decision_date,
        };
        self.decisions.insert(id, decision.clone());
        Ok(decision)
    }

    async fn update_decision(&self, decision: &Decision) -> Result<()> {
        if !self.decisions.contains_key(&decision.id) {
            return Err(EngineError::not_found("Decision", decision.id));
        }
        self.decisions.insert(decision.id, decision.clone());
        Ok(())
    }

    async fn find_decisions_by_activity(&self, activity_instance_id: i64) -> Result<Vec<Decision>> {
        let mut decisions: Vec<Decision> = self
            .decisions
            .iter()
            .filter(|entry| entry.activity_instance_id == activity_instance_id)
            .map(|entry| entry.clone())
            .collect();
        decisions.sort_by_key(|decision| decision.id);
        Ok(decisions)
    }

    async fn find_decisions_by_instance(&self, workflow_instance_id: i64) -> Result<Vec<Decision>> {
        let activity_ids: Vec<i64> = self
            .find_activities_by_instance(workflow_instance_id)
            .await?
            .into_iter()
            .map(|activity| activity.id)
            .collect();

        let mut decisions: Vec<Decision> = self
            .decisions
            .iter()
            .filter(|entry| activity_ids.contains(&entry.activity_instance_id))
            .map(|entry| entry.clone())
            .collect();
        decisions.sort_by_key(|decision| decision.id);
        Ok(decisions)
    }
}
