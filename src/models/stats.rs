use serde::Serialize;

/// Task counts per priority. Every key is present even when zero so the
/// pie chart always shows all three slices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PriorityBreakdown {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

/// Completed-task counts per weekday, keyed "Sun".."Sat".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeeklyCompletions {
    pub sun: i64,
    pub mon: i64,
    pub tue: i64,
    pub wed: i64,
    pub thu: i64,
    pub fri: i64,
    pub sat: i64,
}

/// One month of the completion line chart: tasks created that month and
/// how many of them are completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    pub month: String,
    pub total: i64,
    pub completed: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub total: i64,
    pub pending: i64,
    pub completed: i64,
    pub overdue: i64,
}

/// Pending tasks bucketed by urgency score range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrgencyHistogram {
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}
