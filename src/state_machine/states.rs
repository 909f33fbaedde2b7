use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow instance lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Initial state when the instance is created
    Created,
    /// Instance is running and accepts decisions
    Started,
    /// Instance is suspended; no decisions accepted
    Paused,
    /// Instance finished; immutable history from here on
    Ended,
}

impl WorkflowStatus {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended)
    }

    /// Check if the instance is actively processing (decisions accepted)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Started)
    }

    /// Check if the instance may be ended from this state
    pub fn can_end(&self) -> bool {
        matches!(self, Self::Started | Self::Paused)
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Started => write!(f, "started"),
            Self::Paused => write!(f, "paused"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

impl std::str::FromStr for WorkflowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "started" => Ok(Self::Started),
            "paused" => Ok(Self::Paused),
            "ended" => Ok(Self::Ended),
            _ => Err(format!("Invalid workflow status: {s}")),
        }
    }
}

/// Default state for new workflow instances
impl Default for WorkflowStatus {
    fn default() -> Self {
        Self::Created
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_check() {
        assert!(WorkflowStatus::Ended.is_terminal());
        assert!(!WorkflowStatus::Created.is_terminal());
        assert!(!WorkflowStatus::Started.is_terminal());
        assert!(!WorkflowStatus::Paused.is_terminal());
    }

    #[test]
    fn test_can_end() {
        assert!(WorkflowStatus::Started.can_end());
        assert!(WorkflowStatus::Paused.can_end());
        assert!(!WorkflowStatus::Created.can_end());
        assert!(!WorkflowStatus::Ended.can_end());
    }

    #[test]
    fn test_status_string_conversion() {
        assert_eq!(WorkflowStatus::Started.to_string(), "started");
        assert_eq!(
            "paused".parse::<WorkflowStatus>().unwrap(),
            WorkflowStatus::Paused
        );
        assert!("running".parse::<WorkflowStatus>().is_err());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&WorkflowStatus::Created).unwrap();
        assert_eq!(json, "\"created\"");
        let parsed: WorkflowStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, WorkflowStatus::Created);
    }
}
