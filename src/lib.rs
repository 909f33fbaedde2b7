//! # Approvalflow Core
//!
//! Approval-workflow orchestration engine: ordered chains of approval
//! activities over external subject items, with a lifecycle state machine,
//! rule-driven auto-validation and a decision ledger gating advancement.
//!
//! ## Architecture
//!
//! - **Models**: workflow/activity definitions, instances, transitions,
//!   decisions
//! - **Store contract**: async persistence seam with an in-memory reference
//!   implementation
//! - **Definition graph builder**: positional insertion into the default
//!   transition chain
//! - **State machine**: created/started/paused/ended lifecycle with explicit
//!   transition validation
//! - **Orchestration façade**: [`WorkflowEngine`], composing the traversal
//!   sweep, the advancement gate and decision recording
//! - **Rules**: contracts for the external rule subsystem and item store
//!
//! ## Example
//!
//! ```no_run
//! use approvalflow_core::models::{NewActivityDefinition, NewWorkflowDefinition};
//! use approvalflow_core::orchestration::WorkflowEngine;
//! use approvalflow_core::store::MemoryWorkflowStore;
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     item_store: Arc<dyn approvalflow_core::rules::ItemStore>,
//! #     rule_services: Arc<dyn approvalflow_core::rules::RuleServices>,
//! # ) -> approvalflow_core::Result<()> {
//! let store = Arc::new(MemoryWorkflowStore::new());
//! let engine = WorkflowEngine::with_rule_based_auto_validate(store, item_store, rule_services);
//!
//! let mut definition = engine
//!     .create_definition(NewWorkflowDefinition::new("expense approval"))
//!     .await?;
//! let definition_id = definition.id;
//! engine
//!     .insert_activity(
//!         &mut definition,
//!         NewActivityDefinition::single(definition_id, "manager review"),
//!         1,
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod definition;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod rules;
pub mod state_machine;
pub mod store;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use logging::init_structured_logging;
pub use orchestration::{WorkflowDecisionEntry, WorkflowEngine};
pub use state_machine::WorkflowStatus;
