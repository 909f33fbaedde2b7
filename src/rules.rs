//! # External Collaborator Contracts
//!
//! The engine consumes a yes/no auto-validation verdict and an approver set
//! from a business-rule subsystem, and reads subject items from an item
//! store. Both live behind traits so backends are swappable; the engine
//! never evaluates conditions itself.

use crate::error::Result;
use crate::models::ActivityDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-workflow-definition constants injected into rule evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConstants(HashMap<String, String>);

impl RuleConstants {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Evaluation context handed to the rule subsystem: the subject item plus
/// the definition's constants.
#[derive(Debug, Clone)]
pub struct RuleContext {
    pub item: Value,
    pub constants: RuleConstants,
}

impl RuleContext {
    pub fn new(item: Value, constants: RuleConstants) -> Self {
        Self { item, constants }
    }
}

/// A business rule attached to an activity definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: Option<i64>,
    /// Activity definition this rule guards; stamped by the engine.
    pub activity_definition_id: Option<i64>,
    pub label: Option<String>,
}

/// One condition of a rule (field/operator/expression).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCondition {
    pub id: Option<i64>,
    pub rule_id: Option<i64>,
    pub field: String,
    pub operator: String,
    pub expression: String,
}

impl RuleCondition {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            rule_id: None,
            field: field.into(),
            operator: operator.into(),
            expression: expression.into(),
        }
    }
}

/// Approver-group selector attached to an activity definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectorDefinition {
    pub id: Option<i64>,
    pub activity_definition_id: Option<i64>,
    pub group_id: String,
}

/// One filter of a selector, narrowing the selected group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleFilter {
    pub id: Option<i64>,
    pub selector_id: Option<i64>,
    pub field: String,
    pub operator: String,
    pub expression: String,
}

impl RuleFilter {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            selector_id: None,
            field: field.into(),
            operator: operator.into(),
            expression: expression.into(),
        }
    }
}

/// A group of approvers as resolved by the rule subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproverGroup {
    pub id: String,
    pub label: String,
}

/// Search criteria over rule conditions, scoped to a workflow definition.
#[derive(Debug, Clone, Default)]
pub struct RuleCriteria {
    pub workflow_definition_id: i64,
    pub conditions: Vec<RuleCondition>,
}

/// Business-rule subsystem contract.
///
/// `is_rule_valid` drives auto-validation (an activity with no valid rule
/// needs no human decision); `select_approvers` drives the multiple-approval
/// advancement gate.
#[async_trait]
pub trait RuleServices: Send + Sync {
    /// Whether any rule attached to the activity definition holds for the context
    async fn is_rule_valid(&self, activity_definition_id: i64, ctx: &RuleContext) -> Result<bool>;

    /// Resolve the eligible approver ids for the activity definition
    async fn select_approvers(
        &self,
        activity_definition_id: i64,
        ctx: &RuleContext,
    ) -> Result<Vec<String>>;

    /// Resolve the approver groups for the activity definition
    async fn select_groups(
        &self,
        activity_definition_id: i64,
        ctx: &RuleContext,
    ) -> Result<Vec<ApproverGroup>>;

    /// Register a rule; returns the assigned rule id
    async fn add_rule(&self, rule: RuleDefinition) -> Result<i64>;

    /// Register a condition under an existing rule; returns the assigned id
    async fn add_condition(&self, condition: RuleCondition) -> Result<i64>;

    /// Register a selector; returns the assigned selector id
    async fn add_selector(&self, selector: SelectorDefinition) -> Result<i64>;

    /// Register a filter under an existing selector; returns the assigned id
    async fn add_filter(&self, filter: RuleFilter) -> Result<i64>;

    /// Constants configured for a workflow definition
    async fn get_constants(&self, workflow_definition_id: i64) -> Result<RuleConstants>;

    /// Filter `candidates` down to the activity definition ids whose rules
    /// match the criteria
    async fn find_matching_definitions(
        &self,
        criteria: &RuleCriteria,
        candidates: Vec<i64>,
    ) -> Result<Vec<i64>>;
}

/// Read-only access to the external domain objects workflows are attached to.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn read_item(&self, item_id: i64) -> Result<Value>;
}

/// Decides whether an activity needs no human decision for a given item.
#[async_trait]
pub trait AutoValidatePredicate: Send + Sync {
    async fn can_auto_validate(
        &self,
        activity_definition: &ActivityDefinition,
        item: &Value,
    ) -> Result<bool>;
}

/// Rule-backed predicate: an activity auto-validates exactly when no rule
/// attached to it holds for the subject item.
pub struct RuleBasedAutoValidate {
    rule_services: Arc<dyn RuleServices>,
}

impl RuleBasedAutoValidate {
    pub fn new(rule_services: Arc<dyn RuleServices>) -> Self {
        Self { rule_services }
    }
}

#[async_trait]
impl AutoValidatePredicate for RuleBasedAutoValidate {
    async fn can_auto_validate(
        &self,
        activity_definition: &ActivityDefinition,
        item: &Value,
    ) -> Result<bool> {
        let constants = self
            .rule_services
            .get_constants(activity_definition.workflow_definition_id)
            .await?;
        let ctx = RuleContext::new(item.clone(), constants);
        let rule_valid = self
            .rule_services
            .is_rule_valid(activity_definition.id, &ctx)
            .await?;
        Ok(!rule_valid)
    }
}
