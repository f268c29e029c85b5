//! Assigned tasks: paged list, single-task detail and status updates.
//!
//! The list and the detail have separate lifecycles. Loading a detail never
//! touches the list, and a status update patches the matching list item in
//! place instead of refetching the page.

use serde::Serialize;

use crate::api::ApiClient;
use crate::error::{PortalError, Result};
use crate::normalized::{Task, TaskPage, TaskStatus};
use crate::store::{Activities, Reducer, Resource, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskActivity {
    List,
    Detail,
    StatusUpdate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskState {
    pub tasks: Option<TaskPage>,
    pub detail: Option<Task>,
    pub activity: Activities<TaskActivity>,
}

#[derive(Debug)]
pub enum TaskAction {
    Started(TaskActivity),
    Failed(TaskActivity, String),
    Settled(TaskActivity),
    ListLoaded(TaskPage),
    DetailLoaded(Task),
    StatusUpdated(Task),
    DetailCleared,
}

impl Reducer for TaskState {
    type Action = TaskAction;
    type Category = TaskActivity;

    fn reduce(&self, action: TaskAction) -> Self {
        let mut next = self.clone();
        match action {
            TaskAction::Started(category) => {
                if category == TaskActivity::Detail {
                    next.detail = None;
                }
                next.activity.start(category);
            }
            TaskAction::Failed(category, message) => {
                if category == TaskActivity::Detail {
                    next.detail = None;
                }
                next.activity.fail(category, message);
            }
            TaskAction::Settled(category) => next.activity.settle(category),
            TaskAction::ListLoaded(page) => {
                next.tasks = Some(page);
                next.activity.succeed(TaskActivity::List);
            }
            TaskAction::DetailLoaded(task) => {
                next.detail = Some(task);
                next.activity.succeed(TaskActivity::Detail);
            }
            TaskAction::StatusUpdated(task) => {
                if let Some(item) = next
                    .tasks
                    .as_mut()
                    .and_then(|page| page.items.iter_mut().find(|t| t.id == task.id))
                {
                    *item = task.clone();
                }
                next.detail = Some(task);
                next.activity.succeed(TaskActivity::StatusUpdate);
            }
            TaskAction::DetailCleared => {
                next.detail = None;
                next.activity.clear(TaskActivity::Detail);
                next.activity.clear(TaskActivity::StatusUpdate);
            }
        }
        next
    }

    fn started(category: TaskActivity) -> TaskAction {
        TaskAction::Started(category)
    }

    fn failed(category: TaskActivity, message: String) -> TaskAction {
        TaskAction::Failed(category, message)
    }

    fn settled(category: TaskActivity) -> TaskAction {
        TaskAction::Settled(category)
    }
}

/// Paging and filtering for the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskQuery {
    pub page: u64,
    pub page_size: u64,
    pub status: Option<TaskStatus>,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            status: None,
        }
    }
}

/// Task state machine.
#[derive(Debug, Clone)]
pub struct Tasks {
    api: ApiClient,
    resource: Resource<TaskState>,
}

impl Tasks {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            resource: Resource::new("task"),
        }
    }

    pub fn store(&self) -> &Store<TaskState> {
        self.resource.store()
    }

    /// `GET /tasks/my-tasks`.
    pub async fn get_tasks(&self, query: TaskQuery) -> Result<TaskPage> {
        self.resource
            .execute(
                TaskActivity::List,
                "Failed to fetch tasks",
                async {
                    let body = self
                        .api
                        .tasks()
                        .my_tasks(query.page, query.page_size, query.status)
                        .await?;
                    Ok(TaskPage::from_response(&body))
                },
                |page| TaskAction::ListLoaded(page.clone()),
            )
            .await
    }

    /// `GET /tasks/{id}`.
    pub async fn get_task(&self, id: &str) -> Result<Task> {
        let id = require_id(id)?;
        self.resource
            .execute(
                TaskActivity::Detail,
                "Failed to fetch task",
                async {
                    let body = self.api.tasks().get(id).await?;
                    let mut task = Task::from_response(&body);
                    if task.id.is_empty() {
                        task.id = id.to_string();
                    }
                    Ok(task)
                },
                |task| TaskAction::DetailLoaded(task.clone()),
            )
            .await
    }

    /// `PUT /tasks/{id}`.
    ///
    /// When the server answers without the task, the cached copy is updated
    /// with the new status instead.
    pub async fn update_task_status(&self, id: &str, status: TaskStatus) -> Result<Task> {
        let id = require_id(id)?;
        self.resource
            .execute(
                TaskActivity::StatusUpdate,
                "Failed to update status",
                async {
                    let body = self.api.tasks().update_status(id, status).await?;
                    let returned = Task::from_response(&body);
                    let mut task = if returned.id.is_empty() && returned.title.is_empty() {
                        self.cached(id).unwrap_or_default()
                    } else {
                        returned
                    };
                    task.id = id.to_string();
                    task.status = status;
                    Ok(task)
                },
                |task| TaskAction::StatusUpdated(task.clone()),
            )
            .await
    }

    /// Drops the detail and its detail/update sub-states.
    pub fn clear_task_detail(&self) {
        self.store().dispatch(TaskAction::DetailCleared);
    }

    fn cached(&self, id: &str) -> Option<Task> {
        let state = self.store().state();
        state
            .detail
            .iter()
            .chain(state.tasks.iter().flat_map(|page| page.items.iter()))
            .find(|t| t.id == id)
            .cloned()
    }
}

fn require_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(PortalError::Validation("Task id is required".to_string()));
    }
    Ok(id)
}
