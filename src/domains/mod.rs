//! One state machine per backend domain.
//!
//! Each module follows the same shape: a `*State` implementing
//! [`Reducer`](crate::store::Reducer), a closed `*Action` enum, a `*Activity`
//! category enum, and a machine struct whose async operations drive the state
//! through a [`Resource`](crate::store::Resource).

pub mod ai_chat;
pub mod attendance;
pub mod dashboard;
pub mod leave;
pub mod login;
pub mod projects;
pub mod task;

pub use ai_chat::{AiChat, ChatMessage, ChatRole, ChatState};
pub use attendance::{Attendance, AttendanceState};
pub use dashboard::{Dashboard, DashboardState};
pub use leave::{Leave, LeaveForm, LeaveState};
pub use login::{Login, LoginState, LoginSuccess};
pub use projects::{Projects, ProjectsState};
pub use task::{TaskQuery, TaskState, Tasks};
