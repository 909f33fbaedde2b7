//! # Orchestration Façade
//!
//! [`WorkflowEngine`] is the single entry point for authoring definitions,
//! running instances through their lifecycle, recording decisions and
//! advancing the current-activity pointer. It composes the store contract,
//! the item store and the rule subsystem behind one API.

use crate::config::EngineConfig;
use crate::definition::DefinitionGraphBuilder;
use crate::error::{EngineError, Result};
use crate::models::{
    ActivityDefinition, ActivityInstance, Decision, Multiplicity, NewActivityDefinition,
    NewDecision, NewWorkflowDefinition, NewWorkflowInstance, WorkflowDefinition, WorkflowInstance,
    DEFAULT_TRANSITION_NAME,
};
use crate::rules::{
    AutoValidatePredicate, ItemStore, RuleBasedAutoValidate, RuleCondition, RuleContext,
    RuleDefinition, RuleFilter, RuleServices, SelectorDefinition,
};
use crate::state_machine::{next_status, LifecycleEvent, WorkflowStatus};
use crate::store::WorkflowStore;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Orchestration engine over a store, an item store, the rule subsystem and
/// an auto-validation predicate.
pub struct WorkflowEngine {
    pub(crate) store: Arc<dyn WorkflowStore>,
    pub(crate) item_store: Arc<dyn ItemStore>,
    pub(crate) rule_services: Arc<dyn RuleServices>,
    pub(crate) predicate: Arc<dyn AutoValidatePredicate>,
    pub(crate) config: EngineConfig,
    graph_builder: DefinitionGraphBuilder,
}

impl WorkflowEngine {
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        item_store: Arc<dyn ItemStore>,
        rule_services: Arc<dyn RuleServices>,
        predicate: Arc<dyn AutoValidatePredicate>,
    ) -> Self {
        let graph_builder = DefinitionGraphBuilder::new(store.clone());
        Self {
            store,
            item_store,
            rule_services,
            predicate,
            config: EngineConfig::default(),
            graph_builder,
        }
    }

    /// Engine wired with the rule-backed predicate: an activity needs a
    /// human decision exactly when one of its rules holds.
    pub fn with_rule_based_auto_validate(
        store: Arc<dyn WorkflowStore>,
        item_store: Arc<dyn ItemStore>,
        rule_services: Arc<dyn RuleServices>,
    ) -> Self {
        let predicate = Arc::new(RuleBasedAutoValidate::new(rule_services.clone()));
        Self::new(store, item_store, rule_services, predicate)
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    // Definition authoring

    pub async fn create_definition(&self, new: NewWorkflowDefinition) -> Result<WorkflowDefinition> {
        let definition = self.store.create_definition(new).await?;
        info!(
            workflow_definition_id = definition.id,
            name = %definition.name,
            "workflow definition created"
        );
        Ok(definition)
    }

    pub async fn get_definition(&self, id: i64) -> Result<WorkflowDefinition> {
        self.store.read_definition(id).await
    }

    pub async fn get_definition_by_name(&self, name: &str) -> Result<WorkflowDefinition> {
        self.store.read_definition_by_name(name).await
    }

    /// Insert an activity definition at `position` (1-based) in the default
    /// chain. `definition` is updated in place when the head changes.
    pub async fn insert_activity(
        &self,
        definition: &mut WorkflowDefinition,
        new_activity: NewActivityDefinition,
        position: i32,
    ) -> Result<ActivityDefinition> {
        self.graph_builder
            .insert_activity(definition, new_activity, position)
            .await
    }

    pub async fn get_activity_definition(&self, id: i64) -> Result<ActivityDefinition> {
        self.store.read_activity_definition(id).await
    }

    /// Attach a rule and its conditions to an activity definition.
    pub async fn add_rule(
        &self,
        activity_definition: &ActivityDefinition,
        mut rule: RuleDefinition,
        conditions: Vec<RuleCondition>,
    ) -> Result<i64> {
        rule.activity_definition_id = Some(activity_definition.id);
        let rule_id = self.rule_services.add_rule(rule).await?;
        for mut condition in conditions {
            condition.rule_id = Some(rule_id);
            self.rule_services.add_condition(condition).await?;
        }
        Ok(rule_id)
    }

    /// Attach an approver selector and its filters to an activity definition.
    pub async fn add_selector(
        &self,
        activity_definition: &ActivityDefinition,
        mut selector: SelectorDefinition,
        filters: Vec<RuleFilter>,
    ) -> Result<i64> {
        selector.activity_definition_id = Some(activity_definition.id);
        let selector_id = self.rule_services.add_selector(selector).await?;
        for mut filter in filters {
            filter.selector_id = Some(selector_id);
            self.rule_services.add_filter(filter).await?;
        }
        Ok(selector_id)
    }

    // Instance lifecycle

    pub async fn create_instance(&self, new: NewWorkflowInstance) -> Result<WorkflowInstance> {
        let instance = self.store.create_instance(new).await?;
        info!(
            workflow_instance_id = instance.id,
            workflow_definition_id = instance.workflow_definition_id,
            item_id = instance.item_id,
            "workflow instance created"
        );
        Ok(instance)
    }

    /// Create an instance against the definition resolved by name.
    pub async fn create_instance_by_definition_name(
        &self,
        definition_name: &str,
        item_id: i64,
        username: impl Into<String>,
        user_logic: bool,
    ) -> Result<WorkflowInstance> {
        let definition = self.store.read_definition_by_name(definition_name).await?;
        self.create_instance(NewWorkflowInstance {
            workflow_definition_id: definition.id,
            item_id,
            username: username.into(),
            user_logic,
        })
        .await
    }

    pub async fn get_instance(&self, id: i64) -> Result<WorkflowInstance> {
        self.store.read_instance(id).await
    }

    pub async fn get_instance_by_item(
        &self,
        workflow_definition_id: i64,
        item_id: i64,
    ) -> Result<WorkflowInstance> {
        self.store
            .read_instance_by_item(workflow_definition_id, item_id)
            .await
    }

    pub async fn get_activity(&self, id: i64) -> Result<ActivityInstance> {
        self.store.read_activity(id).await
    }

    /// Start a created instance: materialize the start activity, point the
    /// instance at it and run the auto-validation sweep from there.
    pub async fn start_instance(&self, instance: &mut WorkflowInstance) -> Result<()> {
        instance.status = next_status(instance.status, LifecycleEvent::Start)?;

        let definition = self
            .store
            .read_definition(instance.workflow_definition_id)
            .await?;
        let start_id = definition.start_activity_definition_id.ok_or_else(|| {
            EngineError::state_violation(format!(
                "workflow definition {} has no start activity",
                definition.id
            ))
        })?;

        let current = self.find_or_create_activity(instance.id, start_id).await?;
        instance.current_activity_instance_id = Some(current.id);
        self.store.update_instance(instance).await?;

        info!(
            workflow_instance_id = instance.id,
            activity_instance_id = current.id,
            "workflow instance started"
        );

        self.auto_validate_next_activities(instance, current, start_id, DEFAULT_TRANSITION_NAME)
            .await?;
        Ok(())
    }

    pub async fn pause_instance(&self, instance: &mut WorkflowInstance) -> Result<()> {
        self.apply_lifecycle_event(instance, LifecycleEvent::Pause).await
    }

    pub async fn resume_instance(&self, instance: &mut WorkflowInstance) -> Result<()> {
        self.apply_lifecycle_event(instance, LifecycleEvent::Resume).await
    }

    pub async fn end_instance(&self, instance: &mut WorkflowInstance) -> Result<()> {
        self.apply_lifecycle_event(instance, LifecycleEvent::End).await
    }

    async fn apply_lifecycle_event(
        &self,
        instance: &mut WorkflowInstance,
        event: LifecycleEvent,
    ) -> Result<()> {
        let from = instance.status;
        instance.status = next_status(from, event)?;
        self.store.update_instance(instance).await?;
        if self.config.trace_mutations {
            trace!(workflow_instance_id = instance.id, "instance row updated");
        }
        info!(
            workflow_instance_id = instance.id,
            from = %from,
            to = %instance.status,
            event = event.event_type(),
            "workflow instance transitioned"
        );
        Ok(())
    }

    // Decisions and advancement

    /// Record (or amend, when the decision carries an id) a decision against
    /// the instance's current activity.
    ///
    /// The instance is re-read under the store's for-update semantics and
    /// its current-activity pointer compared with the caller's copy; a
    /// mismatch means the pointer moved since the caller last read the
    /// instance and the save is rejected.
    pub async fn save_decision(
        &self,
        instance: &WorkflowInstance,
        decision: &NewDecision,
    ) -> Result<Decision> {
        if instance.status != WorkflowStatus::Started {
            return Err(EngineError::state_violation(format!(
                "cannot record a decision on a workflow instance in status {}",
                instance.status
            )));
        }

        let fetched = self.store.read_instance_for_update(instance.id).await?;
        if fetched.current_activity_instance_id != instance.current_activity_instance_id {
            return Err(EngineError::ConcurrencyConflict {
                instance_id: instance.id,
            });
        }

        let current_id = instance
            .current_activity_instance_id
            .ok_or_else(|| EngineError::not_found("ActivityInstance", "current"))?;
        let current = self.store.read_activity(current_id).await?;

        let saved = match decision.id {
            None => self.store.create_decision(current.id, decision).await?,
            Some(id) => {
                let amended = Decision {
                    id,
                    activity_instance_id: current.id,
                    username: decision.username.clone(),
                    choice: decision.choice,
                    comments: decision.comments.clone(),
                    decision_date: decision.decision_date,
                };
                self.store.update_decision(&amended).await?;
                amended
            }
        };

        debug!(
            workflow_instance_id = instance.id,
            activity_instance_id = current.id,
            decision_id = saved.id,
            username = %saved.username,
            "decision recorded"
        );
        Ok(saved)
    }

    /// The single decision of a single-approval activity, if any.
    pub async fn get_decision(&self, activity: &ActivityInstance) -> Result<Option<Decision>> {
        let definition = self
            .store
            .read_activity_definition(activity.activity_definition_id)
            .await?;
        if definition.multiplicity != Multiplicity::Single {
            return Err(EngineError::MultiplicityMismatch {
                activity_definition_id: definition.id,
                message: "single-decision read on a multiple-approval activity".to_string(),
            });
        }
        let mut decisions = self.store.find_decisions_by_activity(activity.id).await?;
        Ok(if decisions.is_empty() {
            None
        } else {
            Some(decisions.remove(0))
        })
    }

    /// All decisions of a multiple-approval activity.
    pub async fn get_decisions(&self, activity: &ActivityInstance) -> Result<Vec<Decision>> {
        let definition = self
            .store
            .read_activity_definition(activity.activity_definition_id)
            .await?;
        if definition.multiplicity != Multiplicity::Multiple {
            return Err(EngineError::MultiplicityMismatch {
                activity_definition_id: definition.id,
                message: "multi-decision read on a single-approval activity".to_string(),
            });
        }
        self.store.find_decisions_by_activity(activity.id).await
    }

    /// Whether the instance may leave its current activity: at least one
    /// decision exists, and for multiple-approval activities every eligible
    /// approver has decided.
    pub async fn can_advance(&self, instance: &WorkflowInstance) -> Result<bool> {
        let current_id = instance
            .current_activity_instance_id
            .ok_or_else(|| EngineError::not_found("ActivityInstance", "current"))?;
        let current = self.store.read_activity(current_id).await?;

        let definition = self
            .store
            .read_activity_definition(current.activity_definition_id)
            .await?;
        if definition.multiplicity == Multiplicity::Single {
            let decisions = self.store.find_decisions_by_activity(current.id).await?;
            return Ok(!decisions.is_empty());
        }
        // Multiple: full approver coverage; an empty approver set is
        // trivially covered
        self.quorum_reached(instance, &current).await
    }

    /// Advance the instance along the named transition, sweeping any
    /// auto-validating successors; ends the instance when the chain runs out.
    pub async fn advance(
        &self,
        instance: &mut WorkflowInstance,
        transition_name: &str,
    ) -> Result<()> {
        let current_id = instance
            .current_activity_instance_id
            .ok_or_else(|| EngineError::not_found("ActivityInstance", "current"))?;
        let current = self.store.read_activity(current_id).await?;

        if !self.can_advance(instance).await? {
            return Err(EngineError::AdvancementDenied {
                instance_id: instance.id,
            });
        }
        self.advance_from(instance, current, transition_name).await
    }

    /// Record a decision and advance in one step, when the decision completes
    /// the activity's quorum. For single-approval activities the freshly saved
    /// decision is the quorum.
    pub async fn save_decision_and_advance(
        &self,
        instance: &mut WorkflowInstance,
        transition_name: &str,
        decision: &NewDecision,
    ) -> Result<()> {
        let current_id = instance
            .current_activity_instance_id
            .ok_or_else(|| EngineError::not_found("ActivityInstance", "current"))?;
        let current = self.store.read_activity(current_id).await?;

        self.save_decision(instance, decision).await?;

        if self.quorum_reached(instance, &current).await? {
            self.advance_from(instance, current, transition_name).await?;
        }
        Ok(())
    }

    /// Quorum check for the advancement gate. A single-approval activity is
    /// satisfied by any decision; a multiple-approval one requires a decision
    /// from every approver the rule subsystem selects for it.
    async fn quorum_reached(
        &self,
        instance: &WorkflowInstance,
        current: &ActivityInstance,
    ) -> Result<bool> {
        let definition = self
            .store
            .read_activity_definition(current.activity_definition_id)
            .await?;
        match definition.multiplicity {
            Multiplicity::Single => Ok(true),
            Multiplicity::Multiple => {
                let decisions = self.store.find_decisions_by_activity(current.id).await?;
                let item = self.item_store.read_item(instance.item_id).await?;
                let constants = self
                    .rule_services
                    .get_constants(instance.workflow_definition_id)
                    .await?;
                let ctx = RuleContext::new(item, constants);
                let approvers = self
                    .rule_services
                    .select_approvers(definition.id, &ctx)
                    .await?;
                let decided = approvers
                    .iter()
                    .filter(|approver| decisions.iter().any(|d| &d.username == *approver))
                    .count();
                Ok(decided == approvers.len())
            }
        }
    }

    /// Move the pointer past `current` along the named transition without
    /// re-checking the gate, then sweep; end the instance when no transition
    /// leaves the current activity or the sweep reaches the chain's end.
    pub(crate) async fn advance_from(
        &self,
        instance: &mut WorkflowInstance,
        current: ActivityInstance,
        transition_name: &str,
    ) -> Result<()> {
        let from_definition_id = current.activity_definition_id;
        if !self
            .store
            .has_next_activity(from_definition_id, transition_name)
            .await?
        {
            return self.end_instance(instance).await;
        }

        let next_definition = self
            .store
            .find_next_activity_definition(from_definition_id, transition_name)
            .await?;
        let next = self
            .find_or_create_activity(instance.id, next_definition.id)
            .await?;
        instance.current_activity_instance_id = Some(next.id);
        self.store.update_instance(instance).await?;
        if self.config.trace_mutations {
            trace!(workflow_instance_id = instance.id, "instance row updated");
        }

        debug!(
            workflow_instance_id = instance.id,
            activity_instance_id = next.id,
            activity_definition_id = next_definition.id,
            transition = transition_name,
            "workflow instance advanced"
        );

        let end_reached = self
            .auto_validate_next_activities(instance, next, next_definition.id, transition_name)
            .await?;
        if end_reached {
            self.end_instance(instance).await?;
        }
        Ok(())
    }
}
