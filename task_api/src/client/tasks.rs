use reqwest::Method;
use tokio::sync::watch;

use super::{ApiClient, ClientError};
use crate::entities::{DeletedTask, Task, TaskRequest};

/// Keeps a local copy of the signed-in user's tasks in step with the API.
pub struct TaskService {
    api: ApiClient,
    tasks: watch::Sender<Vec<Task>>,
}

impl TaskService {
    pub fn new(api: ApiClient) -> Self {
        let (tasks, _) = watch::channel(Vec::new());
        Self { api, tasks }
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Task>> {
        self.tasks.subscribe()
    }

    pub async fn refresh(&self) -> Result<Vec<Task>, ClientError> {
        let tasks: Vec<Task> = self.api.get("/api/tasks").await?;
        self.tasks.send_replace(tasks.clone());
        Ok(tasks)
    }

    pub async fn add(&self, title: &str, description: &str) -> Result<Task, ClientError> {
        if title.trim().is_empty() {
            return Err(ClientError::Invalid("A task needs a title"));
        }

        let request = TaskRequest {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            is_completed: None,
        };
        let task: Task = self.api.send(Method::POST, "/api/tasks", &request).await?;

        self.tasks.send_modify(|tasks| tasks.push(task.clone()));
        Ok(task)
    }

    /// Sends a partial update; fields left `None` are untouched.
    pub async fn update(&self, id: i64, changes: TaskRequest) -> Result<Task, ClientError> {
        let task: Task = self
            .api
            .send(Method::PATCH, &format!("/api/tasks/{id}"), &changes)
            .await?;

        self.tasks.send_modify(|tasks| {
            if let Some(slot) = tasks.iter_mut().find(|t| t.id == task.id) {
                *slot = task.clone();
            }
        });
        Ok(task)
    }

    pub async fn toggle(&self, id: i64) -> Result<Task, ClientError> {
        let completed = self
            .tasks
            .borrow()
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.is_completed)
            .ok_or(ClientError::Invalid("Task is not in the list"))?;

        let changes = TaskRequest {
            is_completed: Some(!completed),
            ..TaskRequest::default()
        };
        self.update(id, changes).await
    }

    pub async fn remove(&self, id: i64) -> Result<(), ClientError> {
        let deleted: DeletedTask = self.api.delete(&format!("/api/tasks/{id}")).await?;

        self.tasks.send_modify(|tasks| tasks.retain(|t| t.id != deleted.id));
        Ok(())
    }

    /// Drops the local list. [`AuthService::logout`](super::AuthService::logout) calls this.
    pub fn clear(&self) {
        self.tasks.send_replace(Vec::new());
    }
}
