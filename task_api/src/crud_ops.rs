use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::authentication::CurrentUser;
use crate::entities::{DeletedTask, NewTask, Task, TaskRequest};
use crate::error::ApiError;
use crate::AppState;

const INVALID_TASK: &str = "Invalid task data";
const TASK_NOT_FOUND: &str = "Task not found!";
const UPDATE_DENIED: &str = "User not authorized to update this task!";
const DELETE_DENIED: &str = "User not authorized to delete this task!";

fn parse_task_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation("Invalid task id"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Loads a task and checks that `user_id` owns it. `denied` is the message
/// returned to anyone else.
async fn owned_task(
    state: &AppState,
    raw_id: &str,
    user_id: i64,
    denied: &'static str,
) -> Result<Task, ApiError> {
    let id = parse_task_id(raw_id)?;
    let task = state
        .tasks
        .find_task(id)
        .await?
        .ok_or(ApiError::NotFound(TASK_NOT_FOUND))?;

    if task.user_id != user_id {
        tracing::warn!(task_id = id, user_id, owner_id = task.user_id, "ownership check failed");
        return Err(ApiError::NotOwner(denied));
    }

    Ok(task)
}

async fn save(state: &AppState, task: &Task) -> Result<Task, ApiError> {
    state
        .tasks
        .update_task(task)
        .await?
        .ok_or(ApiError::NotFound(TASK_NOT_FOUND))
}

pub async fn get_tasks(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.tasks.list_tasks(user.id).await?;
    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(request) = payload?;

    let (Some(title), Some(description)) =
        (non_blank(request.title), non_blank(request.description))
    else {
        return Err(ApiError::validation(INVALID_TASK));
    };

    let task = state
        .tasks
        .create_task(
            user.id,
            NewTask {
                title,
                description,
                is_completed: request.is_completed.unwrap_or(false),
            },
        )
        .await?;

    tracing::info!(task_id = task.id, user_id = user.id, "created task");
    Ok((StatusCode::CREATED, Json(task)))
}

/// `PUT /api/tasks/{id}`: title and description must both be present.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(request) = payload?;
    let mut task = owned_task(&state, &id, user.id, UPDATE_DENIED).await?;

    let (Some(title), Some(description)) =
        (non_blank(request.title), non_blank(request.description))
    else {
        return Err(ApiError::validation(INVALID_TASK));
    };

    task.title = title;
    task.description = description;
    if let Some(is_completed) = request.is_completed {
        task.is_completed = is_completed;
    }

    Ok(Json(save(&state, &task).await?))
}

/// `PATCH /api/tasks/{id}`: any subset of fields.
pub async fn patch_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(request) = payload?;
    let mut task = owned_task(&state, &id, user.id, UPDATE_DENIED).await?;

    if let Some(title) = request.title {
        task.title = non_blank(Some(title)).ok_or_else(|| ApiError::validation(INVALID_TASK))?;
    }
    if let Some(description) = request.description {
        task.description =
            non_blank(Some(description)).ok_or_else(|| ApiError::validation(INVALID_TASK))?;
    }
    if let Some(is_completed) = request.is_completed {
        task.is_completed = is_completed;
    }

    Ok(Json(save(&state, &task).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<DeletedTask>, ApiError> {
    let task = owned_task(&state, &id, user.id, DELETE_DENIED).await?;

    if !state.tasks.delete_task(task.id, user.id).await? {
        return Err(ApiError::NotFound(TASK_NOT_FOUND));
    }

    tracing::info!(task_id = task.id, user_id = user.id, "deleted task");
    Ok(Json(DeletedTask {
        id: task.id,
        message: "Task removed!".to_string(),
    }))
}
