use serde::{Deserialize, Serialize};
use std::fmt;

/// How many approvals an activity requires before the advancement gate opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    /// Exactly one decision satisfies the activity
    Single,
    /// One decision per resolved approver; full coverage required
    Multiple,
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Multiple => write!(f, "multiple"),
        }
    }
}

impl std::str::FromStr for Multiplicity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "multiple" => Ok(Self::Multiple),
            _ => Err(format!("Invalid multiplicity: {s}")),
        }
    }
}

impl Default for Multiplicity {
    fn default() -> Self {
        Self::Single
    }
}

/// One step template in a workflow definition.
///
/// `position` is a redundant denormalized index over the default chain,
/// 1-based, kept so positional lookups do not require a full traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDefinition {
    pub id: i64,
    pub workflow_definition_id: i64,
    pub name: String,
    pub position: i32,
    pub multiplicity: Multiplicity,
}

/// New ActivityDefinition for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivityDefinition {
    pub workflow_definition_id: i64,
    pub name: String,
    pub position: i32,
    pub multiplicity: Multiplicity,
}

impl NewActivityDefinition {
    /// Single-approval activity template; position is assigned on insertion.
    pub fn single(workflow_definition_id: i64, name: impl Into<String>) -> Self {
        Self {
            workflow_definition_id,
            name: name.into(),
            position: 0,
            multiplicity: Multiplicity::Single,
        }
    }

    /// Multiple-approval activity template
    pub fn multiple(workflow_definition_id: i64, name: impl Into<String>) -> Self {
        Self {
            workflow_definition_id,
            name: name.into(),
            position: 0,
            multiplicity: Multiplicity::Multiple,
        }
    }
}
