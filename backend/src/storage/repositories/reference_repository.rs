use anyhow::Result;
use shared::{RecentActivity, Task};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::storage::connection::DbConnection;

/// Repository for the dashboard's activity feed and task list
#[derive(Clone)]
pub struct ReferenceRepository {
    db: DbConnection,
}

impl ReferenceRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_activity(row: &SqliteRow) -> Result<RecentActivity> {
        Ok(RecentActivity {
            recent_activity_id: row.try_get("recent_activity_id")?,
            activity_type: row.try_get("activity_type")?,
            message: row.try_get("message")?,
            time: row.try_get("time")?,
        })
    }

    fn map_task(row: &SqliteRow) -> Result<Task> {
        Ok(Task {
            task_id: row.try_get("task_id")?,
            task_name: row.try_get("task_name")?,
            due_date: row.try_get("due_date")?,
            priority: row.try_get("priority")?,
        })
    }

    /// Latest activities first
    pub async fn list_activities(&self, limit: Option<i64>) -> Result<Vec<RecentActivity>> {
        let rows = self
            .db
            .query(
                r#"
                SELECT recent_activity_id, activity_type, message, time
                FROM recent_activities
                ORDER BY time DESC, recent_activity_id DESC
                LIMIT ?
                "#,
                &[limit.unwrap_or(-1).into()],
            )
            .await?;
        rows.iter().map(Self::map_activity).collect()
    }

    pub async fn add_activity(&self, activity_type: &str, message: &str) -> Result<i64> {
        self.db
            .insert(
                "INSERT INTO recent_activities (activity_type, message) VALUES (?, ?)",
                &[activity_type.into(), message.into()],
            )
            .await
    }

    /// Soonest tasks first, optionally only those due on or after `from`
    pub async fn list_tasks(&self, from: Option<&str>, limit: Option<i64>) -> Result<Vec<Task>> {
        let rows = self
            .db
            .query(
                r#"
                SELECT task_id, task_name, due_date, priority
                FROM tasks
                WHERE (? IS NULL OR due_date >= ?)
                ORDER BY due_date ASC, task_id ASC
                LIMIT ?
                "#,
                &[from.into(), from.into(), limit.unwrap_or(-1).into()],
            )
            .await?;
        rows.iter().map(Self::map_task).collect()
    }

    pub async fn add_task(&self, task_name: &str, due_date: &str, priority: &str) -> Result<i64> {
        self.db
            .insert(
                "INSERT INTO tasks (task_name, due_date, priority) VALUES (?, ?, ?)",
                &[task_name.into(), due_date.into(), priority.into()],
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::TestEnvironment;

    #[tokio::test]
    async fn test_activities_newest_first() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = ReferenceRepository::new(env.connection.clone());

        repo.add_activity("tenant", "Tom moved in").await.unwrap();
        repo.add_activity("payment", "Rent received").await.unwrap();

        let activities = repo.list_activities(None).await.unwrap();
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].message, "Rent received");
        assert_eq!(repo.list_activities(Some(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tasks_from_date_and_unique_names() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = ReferenceRepository::new(env.connection.clone());

        repo.add_task("Inspect roof", "2025-05-01", "High").await.unwrap();
        repo.add_task("Renew insurance", "2025-03-01", "Medium").await.unwrap();
        repo.add_task("Old task", "2024-12-01", "Low").await.unwrap();
        assert!(repo.add_task("Inspect roof", "2025-06-01", "Low").await.is_err());

        let upcoming = repo.list_tasks(Some("2025-01-01"), Some(5)).await.unwrap();
        let names: Vec<_> = upcoming.iter().map(|t| t.task_name.as_str()).collect();
        assert_eq!(names, vec!["Renew insurance", "Inspect roof"]);
        assert_eq!(repo.list_tasks(None, None).await.unwrap().len(), 3);
    }
}
