use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Task priority, stored as its name in the `priority` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn weight(self) -> i64 {
        match self {
            Priority::High => 5,
            Priority::Medium => 3,
            Priority::Low => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub deadline: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Urgency score used to order pending tasks: weighted priority plus
    /// deadline proximity. A task past its deadline scores the full
    /// deadline bonus; a task without a deadline scores none.
    pub fn urgency(&self, today: NaiveDate) -> i64 {
        let priority_score = self.priority.weight() * 3;
        let deadline_score = match self.deadline {
            Some(deadline) => {
                let days_until = (deadline - today).num_days();
                if days_until >= 0 {
                    (10 - days_until).max(0) * 4
                } else {
                    10 * 4
                }
            }
            None => 0,
        };
        priority_score + deadline_score
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.deadline.is_some_and(|deadline| deadline < today)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Pending,
    Completed,
    Overdue,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub status: Option<StatusFilter>,
    #[serde(default)]
    pub priority: Option<Priority>,
}
