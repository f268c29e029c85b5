//! Backend HTTP access.
//!
//! [`ApiClient`] owns the reqwest client, the base URL and a handle on the
//! [`SessionHolder`](crate::session::SessionHolder). Endpoint groups hang off
//! it as borrowed accessors (`client.leave().balance()`), and all of them
//! funnel through one request pipeline that attaches the bearer token and
//! handles 401 centrally.

mod client;
mod endpoints;
mod types;

pub use client::{ApiClient, Auth, Call};
pub use endpoints::{AttendanceApi, AuthApi, ChatApi, DashboardApi, LeaveApi, ProjectsApi, TaskApi};
pub use types::{ChatQuestion, LeaveApplication, LoginRequest, ProjectsQuery, TaskStatusUpdate};
