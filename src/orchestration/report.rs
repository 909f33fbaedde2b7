//! # Decision Reports
//!
//! Read-side views over a workflow instance: the per-activity decision
//! report (restricted to activities whose rules hold for the subject item),
//! the manual-activity listing and criteria-based activity search.

use crate::error::Result;
use crate::models::{ActivityDefinition, ActivityInstance, Decision};
use crate::orchestration::WorkflowEngine;
use crate::rules::{ApproverGroup, RuleContext, RuleCriteria};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the decision report: an activity definition that currently
/// requires approval, its materialized instance (when the workflow has
/// reached it), the approver groups the rule subsystem selects for it, and
/// the decisions recorded so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDecisionEntry {
    pub activity_definition: ActivityDefinition,
    pub activity: Option<ActivityInstance>,
    pub groups: Vec<ApproverGroup>,
    pub decisions: Option<Vec<Decision>>,
}

impl WorkflowEngine {
    /// Per-activity decision report for an instance, in chain order.
    ///
    /// Activities whose rules do not hold for the subject item are omitted:
    /// they require no approval for this item, so there is nothing to report.
    pub async fn decision_report(
        &self,
        workflow_instance_id: i64,
    ) -> Result<Vec<WorkflowDecisionEntry>> {
        let instance = self.store.read_instance(workflow_instance_id).await?;
        let definition = self
            .store
            .read_definition(instance.workflow_definition_id)
            .await?;
        let chain = self
            .store
            .find_all_default_activity_definitions(&definition)
            .await?;

        let mut activities_by_definition: HashMap<i64, ActivityInstance> = self
            .store
            .find_activities_by_instance(instance.id)
            .await?
            .into_iter()
            .map(|a| (a.activity_definition_id, a))
            .collect();
        let mut decisions_by_activity: HashMap<i64, Vec<Decision>> = HashMap::new();
        for decision in self.store.find_decisions_by_instance(instance.id).await? {
            decisions_by_activity
                .entry(decision.activity_instance_id)
                .or_default()
                .push(decision);
        }

        let item = self.item_store.read_item(instance.item_id).await?;
        let constants = self
            .rule_services
            .get_constants(instance.workflow_definition_id)
            .await?;
        let ctx = RuleContext::new(item, constants);

        let mut entries = Vec::new();
        for activity_definition in chain {
            if !self
                .rule_services
                .is_rule_valid(activity_definition.id, &ctx)
                .await?
            {
                continue;
            }
            let groups = self
                .rule_services
                .select_groups(activity_definition.id, &ctx)
                .await?;
            let activity = activities_by_definition.remove(&activity_definition.id);
            let decisions = activity
                .as_ref()
                .and_then(|a| decisions_by_activity.remove(&a.id));
            entries.push(WorkflowDecisionEntry {
                activity_definition,
                activity,
                groups,
                decisions,
            });
        }
        Ok(entries)
    }

    /// Activity definitions of the instance's chain that will require a
    /// human decision for this instance's subject item.
    pub async fn manual_activity_definitions(
        &self,
        workflow_instance_id: i64,
    ) -> Result<Vec<ActivityDefinition>> {
        let instance = self.store.read_instance(workflow_instance_id).await?;
        let definition = self
            .store
            .read_definition(instance.workflow_definition_id)
            .await?;
        let chain = self
            .store
            .find_all_default_activity_definitions(&definition)
            .await?;
        let item = self.item_store.read_item(instance.item_id).await?;

        let mut manual = Vec::new();
        for activity_definition in chain {
            if !self
                .predicate
                .can_auto_validate(&activity_definition, &item)
                .await?
            {
                manual.push(activity_definition);
            }
        }
        Ok(manual)
    }

    /// Activity definitions of a workflow definition whose rules match the
    /// given condition criteria, in chain order.
    pub async fn find_activities_by_criteria(
        &self,
        criteria: &RuleCriteria,
    ) -> Result<Vec<ActivityDefinition>> {
        let definition = self
            .store
            .read_definition(criteria.workflow_definition_id)
            .await?;
        let chain = self
            .store
            .find_all_default_activity_definitions(&definition)
            .await?;
        let candidates: Vec<i64> = chain.iter().map(|a| a.id).collect();
        let matching = self
            .rule_services
            .find_matching_definitions(criteria, candidates)
            .await?;
        Ok(chain
            .into_iter()
            .filter(|a| matching.contains(&a.id))
            .collect())
    }
}
