use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{NewTaskRequest, Priority, Task, UpdateTaskRequest};

const TASK_COLUMNS: &str =
    "id, owner_id, title, description, priority, deadline, completed, created_at, completed_at";

pub async fn insert_task(
    db: &SqlitePool,
    owner: &str,
    req: NewTaskRequest,
) -> Result<Task, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO tasks \
            (id, owner_id, title, description, priority, deadline, completed, created_at, completed_at) \
         VALUES (?, ?, ?, ?, ?, ?, 0, ?, NULL)",
    )
    .bind(&id)
    .bind(owner)
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.priority)
    .bind(req.deadline)
    .bind(now)
    .execute(db)
    .await?;

    Ok(Task {
        id,
        owner_id: owner.to_string(),
        title: req.title,
        description: req.description,
        priority: req.priority,
        deadline: req.deadline,
        completed: false,
        created_at: now,
        completed_at: None,
    })
}

pub async fn fetch_tasks(db: &SqlitePool, owner: &str) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = ? ORDER BY created_at DESC"
    ))
    .bind(owner)
    .fetch_all(db)
    .await
}

pub async fn find_task(
    db: &SqlitePool,
    owner: &str,
    id: &str,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ? AND owner_id = ?"
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(db)
    .await
}

pub async fn update_task(
    db: &SqlitePool,
    owner: &str,
    id: &str,
    req: UpdateTaskRequest,
) -> Result<Option<Task>, sqlx::Error> {
    let mut current = match find_task(db, owner, id).await? {
        Some(task) => task,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(description) = req.description {
        current.description = Some(description);
    }
    if let Some(priority) = req.priority {
        current.priority = priority;
    }
    if let Some(deadline) = req.deadline {
        current.deadline = Some(deadline);
    }

    sqlx::query(
        "UPDATE tasks SET title = ?, description = ?, priority = ?, deadline = ? \
         WHERE id = ? AND owner_id = ?",
    )
    .bind(&current.title)
    .bind(&current.description)
    .bind(current.priority)
    .bind(current.deadline)
    .bind(id)
    .bind(owner)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn set_completed(
    db: &SqlitePool,
    owner: &str,
    id: &str,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE tasks SET completed = ?, completed_at = ? WHERE id = ? AND owner_id = ?",
    )
    .bind(completed)
    .bind(completed_at)
    .bind(id)
    .bind(owner)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn delete_task(db: &SqlitePool, owner: &str, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn count_by_priority(
    db: &SqlitePool,
    owner: &str,
) -> Result<Vec<(Priority, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (Priority, i64)>(
        "SELECT priority, COUNT(*) FROM tasks WHERE owner_id = ? GROUP BY priority",
    )
    .bind(owner)
    .fetch_all(db)
    .await
}

pub async fn fetch_completion_times(
    db: &SqlitePool,
    owner: &str,
) -> Result<Vec<DateTime<Utc>>, sqlx::Error> {
    sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT completed_at FROM tasks \
         WHERE owner_id = ? AND completed = 1 AND completed_at IS NOT NULL",
    )
    .bind(owner)
    .fetch_all(db)
    .await
}

pub async fn fetch_creation_log(
    db: &SqlitePool,
    owner: &str,
) -> Result<Vec<(DateTime<Utc>, bool)>, sqlx::Error> {
    sqlx::query_as::<_, (DateTime<Utc>, bool)>(
        "SELECT created_at, completed FROM tasks WHERE owner_id = ?",
    )
    .bind(owner)
    .fetch_all(db)
    .await
}

/// Returns (total, completed, overdue) for the owner's tasks. Overdue
/// means pending with a deadline strictly before `today`.
pub async fn summary_counts(
    db: &SqlitePool,
    owner: &str,
    today: NaiveDate,
) -> Result<(i64, i64, i64), sqlx::Error> {
    sqlx::query_as::<_, (i64, i64, i64)>(
        "SELECT \
            COUNT(*), \
            COALESCE(SUM(completed), 0), \
            COALESCE(SUM(CASE WHEN completed = 0 AND deadline IS NOT NULL AND deadline < ? \
                THEN 1 ELSE 0 END), 0) \
         FROM tasks WHERE owner_id = ?",
    )
    .bind(today)
    .bind(owner)
    .fetch_one(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite://:memory:")
            .await
            .expect("Failed to create test db");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    fn new_task(title: &str, priority: Priority) -> NewTaskRequest {
        NewTaskRequest {
            title: title.to_string(),
            description: None,
            priority,
            deadline: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_task() {
        let pool = setup_test_db().await;

        let req = NewTaskRequest {
            title: "Write report".to_string(),
            description: Some("quarterly numbers".to_string()),
            priority: Priority::High,
            deadline: NaiveDate::from_ymd_opt(2026, 9, 1),
        };

        let task = insert_task(&pool, "alice", req).await.expect("Failed to insert task");
        assert_eq!(task.title, "Write report");
        assert_eq!(task.priority, Priority::High);
        assert!(!task.completed);
        assert!(task.completed_at.is_none());

        let tasks = fetch_tasks(&pool, "alice").await.expect("Failed to fetch tasks");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, task.id);
        assert_eq!(tasks[0].deadline, NaiveDate::from_ymd_opt(2026, 9, 1));
    }

    #[tokio::test]
    async fn test_find_task_is_owner_scoped() {
        let pool = setup_test_db().await;

        let task = insert_task(&pool, "alice", new_task("Buy milk", Priority::Low))
            .await
            .expect("Failed to insert task");

        let found = find_task(&pool, "alice", &task.id).await.expect("query failed");
        assert!(found.is_some());

        let foreign = find_task(&pool, "bob", &task.id).await.expect("query failed");
        assert!(foreign.is_none());
    }

    #[tokio::test]
    async fn test_update_task_patches_fields() {
        let pool = setup_test_db().await;

        let task = insert_task(&pool, "alice", new_task("Draft", Priority::Low))
            .await
            .expect("Failed to insert task");

        let update = UpdateTaskRequest {
            title: Some("Draft v2".to_string()),
            description: Some("second pass".to_string()),
            priority: Some(Priority::High),
            deadline: None,
        };
        let updated = update_task(&pool, "alice", &task.id, update)
            .await
            .expect("Failed to update task")
            .expect("Task not found");

        assert_eq!(updated.title, "Draft v2");
        assert_eq!(updated.description.as_deref(), Some("second pass"));
        assert_eq!(updated.priority, Priority::High);
        assert!(updated.deadline.is_none());

        let reloaded = find_task(&pool, "alice", &task.id)
            .await
            .expect("query failed")
            .expect("Task not found");
        assert_eq!(reloaded.title, "Draft v2");
        assert_eq!(reloaded.priority, Priority::High);
    }

    #[tokio::test]
    async fn test_set_completed_roundtrip() {
        let pool = setup_test_db().await;

        let task = insert_task(&pool, "alice", new_task("Ship it", Priority::Medium))
            .await
            .expect("Failed to insert task");

        let now = Utc::now();
        let ok = set_completed(&pool, "alice", &task.id, true, Some(now))
            .await
            .expect("Failed to set completed");
        assert!(ok);

        let reloaded = find_task(&pool, "alice", &task.id)
            .await
            .expect("query failed")
            .expect("Task not found");
        assert!(reloaded.completed);
        assert_eq!(
            reloaded.completed_at.map(|t| t.timestamp()),
            Some(now.timestamp())
        );

        let ok = set_completed(&pool, "alice", &task.id, false, None)
            .await
            .expect("Failed to clear completed");
        assert!(ok);

        let reloaded = find_task(&pool, "alice", &task.id)
            .await
            .expect("query failed")
            .expect("Task not found");
        assert!(!reloaded.completed);
        assert!(reloaded.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_delete_task() {
        let pool = setup_test_db().await;

        let task = insert_task(&pool, "alice", new_task("Old note", Priority::Low))
            .await
            .expect("Failed to insert task");

        assert!(delete_task(&pool, "alice", &task.id).await.expect("delete failed"));
        assert!(!delete_task(&pool, "alice", &task.id).await.expect("delete failed"));

        let tasks = fetch_tasks(&pool, "alice").await.expect("Failed to fetch tasks");
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_count_by_priority_groups_rows() {
        let pool = setup_test_db().await;

        for title in ["a", "b"] {
            insert_task(&pool, "alice", new_task(title, Priority::High))
                .await
                .expect("Failed to insert task");
        }
        insert_task(&pool, "alice", new_task("c", Priority::Medium))
            .await
            .expect("Failed to insert task");
        insert_task(&pool, "bob", new_task("d", Priority::Low))
            .await
            .expect("Failed to insert task");

        let mut counts = count_by_priority(&pool, "alice").await.expect("query failed");
        counts.sort_by_key(|(_, count)| *count);
        assert_eq!(counts, vec![(Priority::Medium, 1), (Priority::High, 2)]);
    }
}
