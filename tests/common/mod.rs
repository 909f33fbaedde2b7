//! Shared test doubles: an in-memory item store and a deterministic
//! rule-subsystem fake with just enough condition evaluation for scenarios.

#![allow(dead_code)]

use approvalflow_core::error::{EngineError, Result};
use approvalflow_core::rules::{
    ApproverGroup, ItemStore, RuleCondition, RuleConstants, RuleContext, RuleCriteria,
    RuleDefinition, RuleFilter, RuleServices, SelectorDefinition,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// In-memory item store keyed by item id.
#[derive(Default)]
pub struct MemoryItemStore {
    items: Mutex<HashMap<i64, Value>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, item_id: i64, item: Value) {
        self.items.lock().unwrap().insert(item_id, item);
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn read_item(&self, item_id: i64) -> Result<Value> {
        self.items
            .lock()
            .unwrap()
            .get(&item_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("Item", item_id))
    }
}

/// Rule-subsystem fake.
///
/// Conditions evaluate against top-level string fields of the item JSON:
/// `=` is equality, `IN` matches against a comma-separated expression.
/// Approver selection resolves the selector's group id through a membership
/// map configured by the test.
#[derive(Default)]
pub struct FakeRuleServices {
    sequence: AtomicI64,
    rules: Mutex<Vec<RuleDefinition>>,
    conditions: Mutex<Vec<RuleCondition>>,
    selectors: Mutex<Vec<SelectorDefinition>>,
    filters: Mutex<Vec<RuleFilter>>,
    groups: Mutex<HashMap<String, (String, Vec<String>)>>,
    constants: Mutex<HashMap<i64, RuleConstants>>,
}

impl FakeRuleServices {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Register an approver group with its member ids
    pub fn register_group(&self, group_id: &str, label: &str, members: &[&str]) {
        self.groups.lock().unwrap().insert(
            group_id.to_string(),
            (
                label.to_string(),
                members.iter().map(|m| m.to_string()).collect(),
            ),
        );
    }

    pub fn set_constants(&self, workflow_definition_id: i64, constants: RuleConstants) {
        self.constants
            .lock()
            .unwrap()
            .insert(workflow_definition_id, constants);
    }

    fn condition_holds(condition: &RuleCondition, item: &Value) -> bool {
        let field_value = match item.get(&condition.field) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => return false,
        };
        match condition.operator.as_str() {
            "=" => field_value == condition.expression,
            "IN" => condition
                .expression
                .split(',')
                .any(|candidate| candidate.trim() == field_value),
            _ => false,
        }
    }

    fn rule_holds_for(&self, activity_definition_id: i64, item: &Value) -> bool {
        let rules = self.rules.lock().unwrap();
        let conditions = self.conditions.lock().unwrap();
        rules
            .iter()
            .filter(|r| r.activity_definition_id == Some(activity_definition_id))
            .any(|rule| {
                conditions
                    .iter()
                    .filter(|c| c.rule_id == rule.id)
                    .all(|c| Self::condition_holds(c, item))
            })
    }
}

#[async_trait]
impl RuleServices for FakeRuleServices {
    async fn is_rule_valid(&self, activity_definition_id: i64, ctx: &RuleContext) -> Result<bool> {
        Ok(self.rule_holds_for(activity_definition_id, &ctx.item))
    }

    async fn select_approvers(
        &self,
        activity_definition_id: i64,
        _ctx: &RuleContext,
    ) -> Result<Vec<String>> {
        let selectors = self.selectors.lock().unwrap();
        let groups = self.groups.lock().unwrap();
        let mut approvers = Vec::new();
        for selector in selectors
            .iter()
            .filter(|s| s.activity_definition_id == Some(activity_definition_id))
        {
            if let Some((_, members)) = groups.get(&selector.group_id) {
                approvers.extend(members.iter().cloned());
            }
        }
        Ok(approvers)
    }

    async fn select_groups(
        &self,
        activity_definition_id: i64,
        _ctx: &RuleContext,
    ) -> Result<Vec<ApproverGroup>> {
        let selectors = self.selectors.lock().unwrap();
        let groups = self.groups.lock().unwrap();
        Ok(selectors
            .iter()
            .filter(|s| s.activity_definition_id == Some(activity_definition_id))
            .filter_map(|s| {
                groups.get(&s.group_id).map(|(label, _)| ApproverGroup {
                    id: s.group_id.clone(),
                    label: label.clone(),
                })
            })
            .collect())
    }

    async fn add_rule(&self, mut rule: RuleDefinition) -> Result<i64> {
        let id = self.next_id();
        rule.id = Some(id);
        self.rules.lock().unwrap().push(rule);
        Ok(id)
    }

    async fn add_condition(&self, mut condition: RuleCondition) -> Result<i64> {
        let id = self.next_id();
        condition.id = Some(id);
        self.conditions.lock().unwrap().push(condition);
        Ok(id)
    }

    async fn add_selector(&self, mut selector: SelectorDefinition) -> Result<i64> {
        let id = self.next_id();
        selector.id = Some(id);
        self.selectors.lock().unwrap().push(selector);
        Ok(id)
    }

    async fn add_filter(&self, mut filter: RuleFilter) -> Result<i64> {
        let id = self.next_id();
        filter.id = Some(id);
        self.filters.lock().unwrap().push(filter);
        Ok(id)
    }

    async fn get_constants(&self, workflow_definition_id: i64) -> Result<RuleConstants> {
        Ok(self
            .constants
            .lock()
            .unwrap()
            .get(&workflow_definition_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_matching_definitions(
        &self,
        criteria: &RuleCriteria,
        candidates: Vec<i64>,
    ) -> Result<Vec<i64>> {
        let rules = self.rules.lock().unwrap();
        let conditions = self.conditions.lock().unwrap();
        Ok(candidates
            .into_iter()
            .filter(|candidate| {
                rules
                    .iter()
                    .filter(|r| r.activity_definition_id == Some(*candidate))
                    .any(|rule| {
                        criteria.conditions.iter().all(|wanted| {
                            conditions.iter().any(|c| {
                                c.rule_id == rule.id
                                    && c.field == wanted.field
                                    && c.operator == wanted.operator
                                    && c.expression == wanted.expression
                            })
                        })
                    })
            })
            .collect())
    }
}
