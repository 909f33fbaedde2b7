use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author recorded on decisions the traversal engine writes itself.
pub const AUTO_DECISION_USERNAME: &str = "<AUTO>";

/// One approver's recorded choice against an activity instance.
///
/// Decisions authored by [`AUTO_DECISION_USERNAME`] were written by the
/// auto-validation sweep, not by a human.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: i64,
    pub activity_instance_id: i64,
    pub username: String,
    pub choice: Option<i32>,
    pub comments: Option<String>,
    pub decision_date: Option<DateTime<Utc>>,
}

impl Decision {
    /// Check whether this decision was generated by the engine
    pub fn is_automatic(&self) -> bool {
        self.username == AUTO_DECISION_USERNAME
    }
}

/// A decision to record or amend.
///
/// `id` is `None` for a new decision; carrying an id turns the save into an
/// update of the existing row. `activity_instance_id` is stamped by the
/// engine from the instance's current activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDecision {
    pub id: Option<i64>,
    pub username: String,
    pub choice: Option<i32>,
    pub comments: Option<String>,
    pub decision_date: Option<DateTime<Utc>>,
}

impl NewDecision {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            choice: None,
            comments: None,
            decision_date: None,
        }
    }

    /// Automatic decision stamped with the current time
    pub fn automatic() -> Self {
        Self {
            id: None,
            username: AUTO_DECISION_USERNAME.to_string(),
            choice: None,
            comments: None,
            decision_date: Some(Utc::now()),
        }
    }

    pub fn with_choice(mut self, choice: i32) -> Self {
        self.choice = Some(choice);
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    pub fn with_decision_date(mut self, date: DateTime<Utc>) -> Self {
        self.decision_date = Some(date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_automatic_detection() {
        let decision = Decision {
            id: 1,
            activity_instance_id: 1,
            username: AUTO_DECISION_USERNAME.to_string(),
            choice: None,
            comments: None,
            decision_date: Some(Utc::now()),
        };
        assert!(decision.is_automatic());

        let human = Decision {
            username: "alice".to_string(),
            ..decision
        };
        assert!(!human.is_automatic());
    }

    #[test]
    fn test_automatic_builder_stamps_date() {
        let auto = NewDecision::automatic();
        assert_eq!(auto.username, AUTO_DECISION_USERNAME);
        assert!(auto.decision_date.is_some());
        assert!(auto.id.is_none());
    }
}
