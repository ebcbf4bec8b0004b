use log::{info, warn};
use shared::{NewActivityRequest, NewTaskRequest, RecentActivity, Task, DATE_FORMAT};

use super::errors::{DomainError, ValidationErrors};
use super::validation::parse_date;
use crate::storage::ReferenceRepository;

/// Activity feed and task list shown on the dashboard
#[derive(Clone)]
pub struct ReferenceService {
    repository: ReferenceRepository,
}

impl ReferenceService {
    pub fn new(repository: ReferenceRepository) -> Self {
        Self { repository }
    }

    pub async fn list_activities(&self, limit: Option<i64>) -> Result<Vec<RecentActivity>, DomainError> {
        self.repository
            .list_activities(limit)
            .await
            .map_err(|e| DomainError::from_storage("Activity", e))
    }

    pub async fn add_activity(&self, request: &NewActivityRequest) -> Result<i64, DomainError> {
        let mut errors = ValidationErrors::default();
        if request.activity_type.trim().is_empty() {
            errors.add("activity_type", "is required");
        }
        if request.message.trim().is_empty() {
            errors.add("message", "is required");
        }
        if !errors.is_empty() {
            warn!("Rejected activity: {}", errors);
            return Err(errors.into());
        }

        let id = self
            .repository
            .add_activity(request.activity_type.trim(), request.message.trim())
            .await
            .map_err(|e| DomainError::from_storage("Activity", e))?;
        info!("Recorded {} activity {}", request.activity_type.trim(), id);
        Ok(id)
    }

    /// Tasks ordered by due date, optionally only those due on or after `from`
    pub async fn list_tasks(&self, from: Option<&str>, limit: Option<i64>) -> Result<Vec<Task>, DomainError> {
        let from = match from.map(str::trim).filter(|f| !f.is_empty()) {
            Some(from) => Some(
                parse_date(from)
                    .ok_or_else(|| ValidationErrors::single("from", "must be a valid date (YYYY-MM-DD)"))?
                    .format(DATE_FORMAT)
                    .to_string(),
            ),
            None => None,
        };

        self.repository
            .list_tasks(from.as_deref(), limit)
            .await
            .map_err(|e| DomainError::from_storage("Task", e))
    }

    pub async fn add_task(&self, request: &NewTaskRequest) -> Result<i64, DomainError> {
        let mut errors = ValidationErrors::default();
        if request.task_name.trim().is_empty() {
            errors.add("task_name", "is required");
        }
        if request.priority.trim().is_empty() {
            errors.add("priority", "is required");
        }
        let due_date = parse_date(request.due_date.trim());
        if due_date.is_none() {
            errors.add("due_date", "must be a valid date (YYYY-MM-DD)");
        }
        let Some(due_date) = due_date.filter(|_| errors.is_empty()) else {
            warn!("Rejected task: {}", errors);
            return Err(errors.into());
        };

        let id = self
            .repository
            .add_task(
                request.task_name.trim(),
                &due_date.format(DATE_FORMAT).to_string(),
                request.priority.trim(),
            )
            .await
            .map_err(|e| DomainError::from_storage("Task", e))?;
        info!("Added task {} due {}", id, due_date);
        Ok(id)
    }
}
