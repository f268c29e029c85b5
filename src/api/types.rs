//! Request bodies sent to the backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::normalized::TaskStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /leaves/apply`.
///
/// A missing leave type is sent as `0` and a missing reason as `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveApplication {
    pub leave_type_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaskStatusUpdate {
    pub status: TaskStatus,
}

/// Body of `POST /projects/query`; filters are merged into the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectsQuery {
    pub page: u64,
    pub page_size: u64,
    #[serde(flatten)]
    pub filters: Map<String, Value>,
}

impl Default for ProjectsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            filters: Map::new(),
        }
    }
}

impl ProjectsQuery {
    /// Body keys owned by the typed paging fields.
    pub const RESERVED_KEYS: &'static [&'static str] = &["page", "page_size"];

    /// Copy without filters that would shadow `page` or `page_size`.
    #[must_use]
    pub fn without_reserved_filters(&self) -> Self {
        let mut query = self.clone();
        query
            .filters
            .retain(|key, _| !Self::RESERVED_KEYS.contains(&key.as_str()));
        query
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatQuestion {
    pub question: String,
}
