use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc, Weekday};
use sqlx::SqlitePool;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{
    MonthlyBucket, Priority, PriorityBreakdown, TaskSummary, UrgencyHistogram, WeeklyCompletions,
};

/// Read-only aggregations over one owner's tasks. Every call recomputes
/// from the store; nothing is cached between requests.
pub struct StatsService {
    db: SqlitePool,
}

impl StatsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Counts all of the owner's tasks, completed included.
    pub async fn priority_breakdown(&self, owner: &str) -> Result<PriorityBreakdown, AppError> {
        let counts = repository::count_by_priority(&self.db, owner).await?;

        let mut breakdown = PriorityBreakdown::default();
        for (priority, count) in counts {
            match priority {
                Priority::Low => breakdown.low = count,
                Priority::Medium => breakdown.medium = count,
                Priority::High => breakdown.high = count,
            }
        }
        Ok(breakdown)
    }

    /// All-time counts of completions per weekday of the completion
    /// timestamp.
    pub async fn weekly_completions(&self, owner: &str) -> Result<WeeklyCompletions, AppError> {
        let times = repository::fetch_completion_times(&self.db, owner).await?;
        Ok(bucket_weekdays(&times))
    }

    /// Tasks bucketed by creation month, ascending.
    pub async fn monthly_completion(&self, owner: &str) -> Result<Vec<MonthlyBucket>, AppError> {
        let rows = repository::fetch_creation_log(&self.db, owner).await?;
        Ok(bucket_months(&rows))
    }

    pub async fn summary(&self, owner: &str) -> Result<TaskSummary, AppError> {
        let today = Utc::now().date_naive();
        let (total, completed, overdue) =
            repository::summary_counts(&self.db, owner, today).await?;

        Ok(TaskSummary {
            total,
            pending: total - completed,
            completed,
            overdue,
        })
    }

    pub async fn urgency_histogram(&self, owner: &str) -> Result<UrgencyHistogram, AppError> {
        let today = Utc::now().date_naive();
        let tasks = repository::fetch_tasks(&self.db, owner).await?;
        let scores = tasks
            .iter()
            .filter(|task| !task.completed)
            .map(|task| task.urgency(today));
        Ok(bucket_urgency(scores))
    }
}

fn bucket_weekdays(times: &[DateTime<Utc>]) -> WeeklyCompletions {
    let mut counts = WeeklyCompletions::default();
    for time in times {
        match time.weekday() {
            Weekday::Sun => counts.sun += 1,
            Weekday::Mon => counts.mon += 1,
            Weekday::Tue => counts.tue += 1,
            Weekday::Wed => counts.wed += 1,
            Weekday::Thu => counts.thu += 1,
            Weekday::Fri => counts.fri += 1,
            Weekday::Sat => counts.sat += 1,
        }
    }
    counts
}

fn bucket_months(rows: &[(DateTime<Utc>, bool)]) -> Vec<MonthlyBucket> {
    let mut months: BTreeMap<(i32, u32), (i64, i64)> = BTreeMap::new();
    for (created_at, completed) in rows {
        let entry = months
            .entry((created_at.year(), created_at.month()))
            .or_default();
        entry.0 += 1;
        if *completed {
            entry.1 += 1;
        }
    }

    months
        .into_iter()
        .map(|((year, month), (total, completed))| MonthlyBucket {
            month: format!("{year:04}-{month:02}"),
            total,
            completed,
        })
        .collect()
}

fn bucket_urgency(scores: impl Iterator<Item = i64>) -> UrgencyHistogram {
    let labels = ["0-10", "11-20", "21-30", "31-40", "41+"];
    let mut values = [0i64; 5];
    for score in scores {
        let idx = if score <= 10 {
            0
        } else if score <= 20 {
            1
        } else if score <= 30 {
            2
        } else if score <= 40 {
            3
        } else {
            4
        };
        values[idx] += 1;
    }

    UrgencyHistogram {
        labels: labels.iter().map(|label| label.to_string()).collect(),
        values: values.to_vec(),
    }
}
