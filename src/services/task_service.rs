use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{NewTaskRequest, StatusFilter, Task, TaskFilter, UpdateTaskRequest};

/// Lifecycle operations on a single owner's tasks. Every operation is
/// scoped to the calling owner; a task belonging to someone else is
/// indistinguishable from a missing one.
pub struct TaskService {
    db: SqlitePool,
}

impl TaskService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create(&self, owner: &str, mut req: NewTaskRequest) -> Result<Task, AppError> {
        req.title = req.title.trim().to_string();
        if req.title.is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }

        let task = repository::insert_task(&self.db, owner, req).await?;
        info!("created task {} for owner {}", task.id, owner);
        Ok(task)
    }

    /// Pending tasks first, most urgent on top; completed tasks after.
    pub async fn list(&self, owner: &str, filter: TaskFilter) -> Result<Vec<Task>, AppError> {
        let today = Utc::now().date_naive();
        let tasks = repository::fetch_tasks(&self.db, owner).await?;

        let mut tasks: Vec<Task> = tasks
            .into_iter()
            .filter(|task| match filter.status {
                Some(StatusFilter::Pending) => !task.completed,
                Some(StatusFilter::Completed) => task.completed,
                Some(StatusFilter::Overdue) => task.is_overdue(today),
                None => true,
            })
            .filter(|task| filter.priority.is_none_or(|priority| task.priority == priority))
            .collect();

        tasks.sort_by_key(|task| {
            if task.completed {
                (1, 0)
            } else {
                (0, -task.urgency(today))
            }
        });

        Ok(tasks)
    }

    pub async fn toggle_complete(&self, owner: &str, id: &str) -> Result<Task, AppError> {
        let mut task = repository::find_task(&self.db, owner, id)
            .await?
            .ok_or(AppError::NotFound)?;

        task.completed = !task.completed;
        task.completed_at = task.completed.then(Utc::now);

        let ok =
            repository::set_completed(&self.db, owner, id, task.completed, task.completed_at)
                .await?;
        if !ok {
            return Err(AppError::NotFound);
        }

        Ok(task)
    }

    pub async fn edit(
        &self,
        owner: &str,
        id: &str,
        mut req: UpdateTaskRequest,
    ) -> Result<Task, AppError> {
        if let Some(title) = req.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(AppError::Validation("title must not be empty".to_string()));
            }
            req.title = Some(title);
        }

        repository::update_task(&self.db, owner, id, req)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, owner: &str, id: &str) -> Result<(), AppError> {
        let ok = repository::delete_task(&self.db, owner, id).await?;
        if !ok {
            return Err(AppError::NotFound);
        }
        info!("deleted task {} for owner {}", id, owner);
        Ok(())
    }
}
