pub mod stats;
pub mod task;

pub use stats::{MonthlyBucket, PriorityBreakdown, TaskSummary, UrgencyHistogram, WeeklyCompletions};
pub use task::{NewTaskRequest, Priority, StatusFilter, Task, TaskFilter, UpdateTaskRequest};
