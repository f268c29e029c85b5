//! Per-domain endpoint groups.
//!
//! Each method is one HTTP call and returns the raw JSON body; shaping it is
//! left to the adapters in [`crate::normalized`].

use serde_json::Value;

use super::client::{ApiClient, Call};
use super::types::{ChatQuestion, LeaveApplication, LoginRequest, ProjectsQuery, TaskStatusUpdate};
use crate::error::Result;
use crate::normalized::TaskStatus;

// =============================================================================
// Auth API
// =============================================================================

#[derive(Debug)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `POST /auth/login`. Does not need a token.
    pub async fn login(&self, request: &LoginRequest) -> Result<Value> {
        let call = Call::post("auth/login").public().json(request)?;
        self.client.send(call).await
    }

    /// `GET /auth/me`.
    pub async fn me(&self) -> Result<Value> {
        self.client.send(Call::get("auth/me")).await
    }
}

// =============================================================================
// Dashboard API
// =============================================================================

#[derive(Debug)]
pub struct DashboardApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DashboardApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn employee(&self) -> Result<Value> {
        self.client.send(Call::get("dashboard/employee")).await
    }

    pub async fn overview(&self) -> Result<Value> {
        self.client.send(Call::get("dashboard/overview")).await
    }
}

// =============================================================================
// Attendance API
// =============================================================================

#[derive(Debug)]
pub struct AttendanceApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AttendanceApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn punch_in(&self) -> Result<Value> {
        self.client.send(Call::post("attendance/punch-in")).await
    }

    pub async fn punch_out(&self) -> Result<Value> {
        self.client.send(Call::post("attendance/punch-out")).await
    }

    pub async fn today(&self) -> Result<Value> {
        self.client.send(Call::get("attendance/today")).await
    }

    pub async fn calendar(&self, year: i32, month: u32) -> Result<Value> {
        let call = Call::get("attendance/calendar")
            .query("year", year)
            .query("month", month);
        self.client.send(call).await
    }
}

// =============================================================================
// Leave API
// =============================================================================

#[derive(Debug)]
pub struct LeaveApi<'a> {
    client: &'a ApiClient,
}

impl<'a> LeaveApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn types(&self) -> Result<Value> {
        self.client.send(Call::get("leaves/types")).await
    }

    pub async fn requests(&self) -> Result<Value> {
        self.client.send(Call::get("leaves/requests")).await
    }

    pub async fn balance(&self) -> Result<Value> {
        self.client.send(Call::get("leaves/balance")).await
    }

    pub async fn apply(&self, application: &LeaveApplication) -> Result<Value> {
        let call = Call::post("leaves/apply").json(application)?;
        self.client.send(call).await
    }
}

// =============================================================================
// Task API
// =============================================================================

#[derive(Debug)]
pub struct TaskApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TaskApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /tasks/my-tasks`; `status` is omitted from the query when `None`.
    pub async fn my_tasks(
        &self,
        page: u64,
        page_size: u64,
        status: Option<TaskStatus>,
    ) -> Result<Value> {
        let mut call = Call::get("tasks/my-tasks")
            .query("page", page)
            .query("page_size", page_size);
        if let Some(status) = status {
            call = call.query("status", status);
        }
        self.client.send(call).await
    }

    pub async fn get(&self, id: &str) -> Result<Value> {
        let path = format!("tasks/{id}");
        self.client.send(Call::get(&path)).await
    }

    pub async fn update_status(&self, id: &str, status: TaskStatus) -> Result<Value> {
        let path = format!("tasks/{id}");
        let call = Call::put(&path).json(&TaskStatusUpdate { status })?;
        self.client.send(call).await
    }
}

// =============================================================================
// Projects API
// =============================================================================

#[derive(Debug)]
pub struct ProjectsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ProjectsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Filters named `page` or `page_size` are dropped from the body.
    pub async fn query(&self, query: &ProjectsQuery) -> Result<Value> {
        let call = Call::post("projects/query").json(&query.without_reserved_filters())?;
        self.client.send(call).await
    }
}

// =============================================================================
// AI Chat API
// =============================================================================

#[derive(Debug)]
pub struct ChatApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ChatApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn ask(&self, question: impl Into<String>) -> Result<Value> {
        let body = ChatQuestion {
            question: question.into(),
        };
        let call = Call::post("ai-chat/ask").json(&body)?;
        self.client.send(call).await
    }
}
