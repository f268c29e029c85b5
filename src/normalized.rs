//! Canonical shapes for backend payloads.
//!
//! The backend does not keep its field names stable: the same value may arrive
//! as `total_employees` or `totalEmployees`, wrapped in a `data` envelope or
//! not. Every endpoint gets one adapter here with a declared, priority-ordered
//! key list (see [`keys`]); the first key holding a non-null value wins. No
//! other module reads raw response fields.
//!
//! # Example
//!
//! ```rust
//! use hrms_portal::normalized::{TaskStatus, pick_text};
//! use serde_json::json;
//!
//! let body = json!({ "accessToken": "abc" });
//! assert_eq!(pick_text(&body, &["token", "accessToken"]).as_deref(), Some("abc"));
//! assert_eq!(TaskStatus::normalize("in-progress"), TaskStatus::InProgress);
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Priority-ordered source keys, one list per canonical field.
pub mod keys {
    pub const TOKEN: &[&str] = &["token", "accessToken", "access_token"];
    pub const ROLE: &[&str] = &["role", "user_role", "userRole"];
    pub const ERROR_MESSAGE: &[&str] = &["message", "error", "detail"];

    // Profile
    pub const NAME: &[&str] = &["name", "full_name", "fullName", "username"];
    pub const EMAIL: &[&str] = &["email", "email_address", "emailAddress"];
    pub const DEPARTMENT: &[&str] = &["department", "department_name", "departmentName"];
    pub const DESIGNATION: &[&str] = &["designation", "position", "job_title", "jobTitle"];
    pub const PHONE: &[&str] = &["phone", "phone_number", "phoneNumber", "mobile"];
    pub const EMPLOYEE_CODE: &[&str] = &["employee_code", "employeeCode", "employee_id", "emp_code"];

    // Employee dashboard
    pub const MY_TASKS: &[&str] = &["myTasks", "my_tasks", "totalTasks", "total_tasks"];
    pub const TODAYS_STATUS: &[&str] = &[
        "todayStatus",
        "todays_status",
        "attendanceStatus",
        "attendance_status",
        "checkInStatus",
    ];
    pub const LEAVE_BALANCE: &[&str] = &["leave_balance", "leaveBalance"];
    pub const TOTAL_AVAILABLE_DAYS: &[&str] = &["total_available_days", "totalAvailableDays"];
    pub const MY_PROJECTS: &[&str] = &["my_projects", "myProjects"];
    pub const PROJECT_COUNT: &[&str] = &["projectCount", "project_count"];
    pub const OPEN_TASKS: &[&str] = &["openTasks", "open_tasks"];
    pub const IN_PROGRESS: &[&str] = &["inProgress", "in_progress"];
    pub const COMPLETED: &[&str] = &["completed", "completedTasks", "completed_tasks"];

    // Admin overview
    pub const TOTAL_EMPLOYEES: &[&str] = &["total_employees", "totalEmployees"];
    pub const ACTIVE_EMPLOYEES: &[&str] = &["active_employees", "activeEmployees"];
    pub const TOTAL_DEPARTMENTS: &[&str] = &["total_departments", "totalDepartments"];
    pub const TOTAL_PROJECTS: &[&str] = &["total_projects", "totalProjects"];
    pub const ACTIVE_PROJECTS: &[&str] = &["active_projects", "activeProjects"];
    pub const TOTAL_TASKS: &[&str] = &["total_tasks", "totalTasks"];
    pub const ADMIN_OPEN_TASKS: &[&str] = &["open_tasks", "openTasks"];
    pub const IN_PROGRESS_TASKS: &[&str] = &["in_progress_tasks", "inProgressTasks"];
    pub const CLOSED_TASKS: &[&str] = &["closed_tasks", "closedTasks"];
    pub const OVERDUE_TASKS: &[&str] = &["overdue_tasks", "overdueTasks"];
    pub const PENDING_LEAVE_REQUESTS: &[&str] =
        &["pending_leave_requests", "pendingLeaveRequests"];

    // Attendance
    pub const PUNCH_IN_TIME: &[&str] = &[
        "punch_in_time",
        "punchInTime",
        "punchIn",
        "inTime",
        "check_in_time",
    ];
    pub const PUNCH_OUT_TIME: &[&str] = &[
        "punch_out_time",
        "punchOutTime",
        "punchOut",
        "outTime",
        "check_out_time",
    ];
    pub const PUNCH_TIME: &[&str] = &[
        "punchInTime",
        "punchOutTime",
        "punch_in_time",
        "punch_out_time",
        "inTime",
        "outTime",
        "time",
        "createdAt",
        "created_at",
    ];
    pub const ATTENDANCE_STATUS: &[&str] = &["status", "attendance_status", "attendanceStatus"];
    pub const CALENDAR_RECORDS: &[&str] = &["days", "records", "attendance", "calendar", "data"];
    pub const WORK_DAYS: &[&str] = &[
        "workDays",
        "work_days",
        "working_days",
        "total_working_days",
        "total_days",
        "totalDays",
    ];
    pub const PRESENT: &[&str] = &["present", "present_days", "presentDays"];
    pub const ABSENT: &[&str] = &["absent", "absent_days", "absentDays"];
    pub const PRESENT_DATES: &[&str] = &["presentDates", "present_dates"];
    pub const ABSENT_DATES: &[&str] = &["absentDates", "absent_dates"];
    pub const RECORD_DATE: &[&str] = &["date", "attendance_date", "day"];
    pub const IS_PRESENT: &[&str] = &["is_present", "isPresent"];

    // Leave
    pub const LEAVE_TYPE_ID: &[&str] = &["id", "leave_type_id", "leaveTypeId"];
    pub const LEAVE_TYPE_NAME: &[&str] = &[
        "leave_type_name",
        "leaveTypeName",
        "leave_type",
        "leaveType",
        "type_name",
        "name",
    ];
    pub const LEAVE_MAX_DAYS: &[&str] = &["max_days", "maxDays", "days_allowed", "total_days"];
    pub const LIST: &[&str] = &["items", "results", "data"];
    pub const LEAVE_REQUESTS: &[&str] = &["requests", "leave_requests", "leaveRequests"];
    pub const LEAVE_BALANCES: &[&str] = &["balances", "leave_balances", "leaveBalances"];
    pub const START_DATE: &[&str] = &["start_date", "startDate", "from_date", "fromDate"];
    pub const END_DATE: &[&str] = &["end_date", "endDate", "to_date", "toDate"];
    pub const LEAVE_DAYS: &[&str] = &["days", "total_days", "number_of_days", "numberOfDays"];
    pub const USED: &[&str] = &["used", "used_days", "usedDays", "taken"];
    pub const TOTAL: &[&str] = &["total", "total_days", "totalDays", "allocated", "allotted"];
    pub const AVAILABLE: &[&str] = &[
        "available",
        "available_days",
        "availableDays",
        "remaining",
        "remaining_days",
        "remainingDays",
        "balance",
    ];
    pub const REASON: &[&str] = &["reason", "remarks"];

    // Tasks
    pub const ID: &[&str] = &["id", "task_id", "taskId"];
    pub const TITLE: &[&str] = &["title", "name", "task_name", "taskName"];
    pub const DESCRIPTION: &[&str] = &["description", "details"];
    pub const STATUS: &[&str] = &["status", "task_status", "taskStatus"];
    pub const PRIORITY: &[&str] = &["priority"];
    pub const DUE_DATE: &[&str] = &["due_date", "dueDate", "deadline"];
    pub const ASSIGNED_BY: &[&str] = &["assigned_by", "assignedBy", "assigned_by_name", "created_by_name"];
    pub const PROJECT_NAME: &[&str] = &["project_name", "projectName", "project"];
    pub const TASK_LIST: &[&str] = &["items", "tasks", "results", "data"];

    // Pagination
    pub const PAGINATION: &[&str] = &["pagination", "meta"];
    pub const PAGE: &[&str] = &["page", "current_page", "currentPage"];
    pub const PAGE_SIZE: &[&str] = &["page_size", "pageSize", "per_page", "perPage"];
    pub const TOTAL_ITEMS: &[&str] = &["total", "total_items", "totalItems", "count"];
    pub const TOTAL_PAGES: &[&str] = &["total_pages", "totalPages", "pages"];

    // Projects
    pub const PROJECT_LIST: &[&str] = &["data", "projects", "items"];
    pub const CLIENT: &[&str] = &["client", "client_name", "clientName"];
    pub const NUMBER_OF_DAYS: &[&str] = &["number_of_days", "numberOfDays"];
    pub const TARGET_DATE: &[&str] = &["target_date", "targetDate", "end_date"];

    // AI chat
    pub const CHAT_REPLY: &[&str] = &["response", "message", "reply", "answer"];
}

// ─────────────────────────────────────────────────────────────────────────────
// Lookup primitives
// ─────────────────────────────────────────────────────────────────────────────

/// First non-null value under any of `keys`.
pub fn pick<'a>(source: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| source.get(*key))
        .find(|value| !value.is_null())
}

/// First non-empty scalar under any of `keys`, rendered as text.
pub fn pick_text(source: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| source.get(*key))
        .find_map(scalar_text)
}

/// First value under any of `keys` that reads as a non-negative integer.
pub fn pick_u64(source: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter()
        .filter_map(|key| source.get(*key))
        .find_map(|value| match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
}

/// First value under any of `keys` that reads as a number.
pub fn pick_f64(source: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| source.get(*key))
        .find_map(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
}

/// First value under any of `keys` that reads as a boolean.
pub fn pick_bool(source: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter()
        .filter_map(|key| source.get(*key))
        .find_map(|value| match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|i| i != 0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        })
}

/// First array under any of `keys`.
pub fn pick_array<'a>(source: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter()
        .filter_map(|key| source.get(*key))
        .find_map(Value::as_array)
}

/// Unwraps a `{ "data": ... }` envelope when one is present.
pub fn envelope(body: &Value) -> &Value {
    match body.get("data") {
        Some(inner) if !inner.is_null() => inner,
        _ => body,
    }
}

/// Text for a scalar, or for an object's `name` (e.g. `{"department": {"name": ..}}`).
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(_) => value.get("name").and_then(scalar_text),
        _ => None,
    }
}

/// Date text from either `"2024-10-01"` or `{"date": "2024-10-01"}`.
fn date_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => pick_text(value, keys::RECORD_DATE),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Extracts the bearer token from a login response.
pub fn extract_token(auth: &Value) -> Option<String> {
    pick_text(auth, keys::TOKEN).or_else(|| pick_text(envelope(auth), keys::TOKEN))
}

/// Extracts the account role from persisted auth data.
pub fn extract_role(auth: &Value) -> Option<String> {
    let inner = envelope(auth);
    [auth, inner]
        .into_iter()
        .flat_map(|source| [Some(source), source.get("user")])
        .flatten()
        .find_map(|source| pick_text(source, keys::ROLE))
}

/// Human-readable message from an error response body.
///
/// Priority: `message`, then `error`, then `detail`.
pub fn extract_error_message(body: &Value) -> Option<String> {
    pick_text(body, keys::ERROR_MESSAGE)
}

// ─────────────────────────────────────────────────────────────────────────────
// Profile
// ─────────────────────────────────────────────────────────────────────────────

/// The signed-in user's profile (`/auth/me`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub phone: Option<String>,
    pub employee_code: Option<String>,
}

impl Profile {
    pub fn from_response(body: &Value) -> Self {
        let source = envelope(body);
        let user = source.get("user").filter(|u| u.is_object()).unwrap_or(source);
        Self {
            id: pick_text(user, &["id", "user_id", "userId"]),
            name: pick_text(user, keys::NAME),
            email: pick_text(user, keys::EMAIL),
            role: pick_text(user, keys::ROLE),
            department: pick_text(user, keys::DEPARTMENT),
            designation: pick_text(user, keys::DESIGNATION),
            phone: pick_text(user, keys::PHONE),
            employee_code: pick_text(user, keys::EMPLOYEE_CODE),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dashboard
// ─────────────────────────────────────────────────────────────────────────────

/// Employee dashboard summary cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub my_tasks: Option<String>,
    pub todays_status: Option<String>,
    pub leave_balance_days: Option<f64>,
    pub my_projects: Option<u64>,
    pub open_tasks: Option<String>,
    pub in_progress: Option<String>,
    pub completed: Option<String>,
}

impl DashboardSummary {
    pub fn from_response(body: &Value) -> Self {
        let source = pick(body, &["summary"])
            .or_else(|| pick(envelope(body), &["summary"]))
            .unwrap_or_else(|| envelope(body));

        let leave_balance_days = pick(source, keys::LEAVE_BALANCE).and_then(|balance| {
            if balance.is_object() {
                pick_f64(balance, keys::TOTAL_AVAILABLE_DAYS)
            } else {
                balance.as_f64()
            }
        });

        let my_projects = match pick(source, keys::MY_PROJECTS) {
            Some(Value::Array(items)) => Some(items.len() as u64),
            _ => pick_u64(source, keys::PROJECT_COUNT),
        };

        Self {
            my_tasks: pick_text(source, keys::MY_TASKS),
            todays_status: pick_text(source, keys::TODAYS_STATUS),
            leave_balance_days,
            my_projects,
            open_tasks: pick_text(source, keys::OPEN_TASKS),
            in_progress: pick_text(source, keys::IN_PROGRESS),
            completed: pick_text(source, keys::COMPLETED),
        }
    }
}

/// Cross-employee counts for administrative accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminOverview {
    pub total_employees: u64,
    pub active_employees: u64,
    pub total_departments: u64,
    pub total_projects: u64,
    pub active_projects: u64,
    pub total_tasks: u64,
    pub open_tasks: u64,
    pub in_progress_tasks: u64,
    pub closed_tasks: u64,
    pub overdue_tasks: u64,
    pub pending_leave_requests: u64,
}

impl AdminOverview {
    pub fn from_response(body: &Value) -> Self {
        let source = envelope(body);
        let overview = pick(source, &["overview"]).unwrap_or(source);
        let count = |keys: &[&str]| pick_u64(overview, keys).unwrap_or(0);
        Self {
            total_employees: count(keys::TOTAL_EMPLOYEES),
            active_employees: count(keys::ACTIVE_EMPLOYEES),
            total_departments: count(keys::TOTAL_DEPARTMENTS),
            total_projects: count(keys::TOTAL_PROJECTS),
            active_projects: count(keys::ACTIVE_PROJECTS),
            total_tasks: count(keys::TOTAL_TASKS),
            open_tasks: count(keys::ADMIN_OPEN_TASKS),
            in_progress_tasks: count(keys::IN_PROGRESS_TASKS),
            closed_tasks: count(keys::CLOSED_TASKS),
            overdue_tasks: count(keys::OVERDUE_TASKS),
            pending_leave_requests: count(keys::PENDING_LEAVE_REQUESTS),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Attendance
// ─────────────────────────────────────────────────────────────────────────────

/// A punch-in or punch-out the client saw succeed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PunchRecord {
    /// When the client recorded the successful call.
    pub recorded_at: DateTime<Utc>,
    /// Server-reported punch time, if any.
    pub time: Option<String>,
    pub message: Option<String>,
}

impl PunchRecord {
    pub fn from_response(body: &Value, recorded_at: DateTime<Utc>) -> Self {
        let data = envelope(body);
        let time = match data {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            _ => pick_text(data, keys::PUNCH_TIME),
        };
        Self {
            recorded_at,
            time,
            message: pick_text(body, &["message"]),
        }
    }
}

/// Today's attendance record as reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TodayAttendance {
    pub punch_in_time: Option<String>,
    pub punch_out_time: Option<String>,
    pub status: Option<String>,
}

impl TodayAttendance {
    pub fn from_response(body: &Value) -> Self {
        let source = envelope(body);
        Self {
            punch_in_time: pick_text(source, keys::PUNCH_IN_TIME),
            punch_out_time: pick_text(source, keys::PUNCH_OUT_TIME),
            status: pick_text(source, keys::ATTENDANCE_STATUS),
        }
    }
}

/// Monthly attendance summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSummary {
    pub work_days: u64,
    pub present: u64,
    pub absent: u64,
    pub present_dates: Vec<String>,
    pub absent_dates: Vec<String>,
}

impl CalendarSummary {
    /// Builds the summary from a calendar response.
    ///
    /// Server-supplied counts and date lists take precedence; anything missing
    /// is derived from the day records' `is_present` flags. `work_days` is
    /// only ever read from the server and defaults to 0.
    pub fn from_response(body: &Value) -> Self {
        let source = envelope(body);
        let records: &[Value] = match source {
            Value::Array(items) => items.as_slice(),
            _ => pick_array(source, keys::CALENDAR_RECORDS)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        };

        let (derived_present, derived_absent) = partition_days(records);

        // Totals may sit beside a `data` array of day records.
        let dates = |keys: &[&str]| {
            pick_array(source, keys)
                .or_else(|| pick_array(body, keys))
                .map(|dates| dates.iter().filter_map(date_text).collect::<Vec<_>>())
        };
        let count = |keys: &[&str]| pick_u64(source, keys).or_else(|| pick_u64(body, keys));

        let present_dates = dates(keys::PRESENT_DATES).unwrap_or(derived_present);
        let absent_dates = dates(keys::ABSENT_DATES).unwrap_or(derived_absent);

        Self {
            work_days: count(keys::WORK_DAYS).unwrap_or(0),
            present: count(keys::PRESENT).unwrap_or(present_dates.len() as u64),
            absent: count(keys::ABSENT).unwrap_or(absent_dates.len() as u64),
            present_dates,
            absent_dates,
        }
    }
}

/// Splits day records into present and absent date lists.
pub fn partition_days(records: &[Value]) -> (Vec<String>, Vec<String>) {
    let mut present = Vec::new();
    let mut absent = Vec::new();
    for record in records {
        let Some(date) = pick_text(record, keys::RECORD_DATE) else {
            continue;
        };
        let is_present = pick_bool(record, keys::IS_PRESENT).unwrap_or_else(|| {
            pick_text(record, &["status"]).is_some_and(|s| s.eq_ignore_ascii_case("present"))
        });
        if is_present {
            present.push(date);
        } else {
            absent.push(date);
        }
    }
    (present, absent)
}

// ─────────────────────────────────────────────────────────────────────────────
// Leave
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveType {
    pub id: Option<i64>,
    pub name: String,
    pub max_days: Option<f64>,
}

impl LeaveType {
    pub fn list_from_response(body: &Value) -> Vec<Self> {
        list_items(body, keys::LIST)
            .iter()
            .map(|item| Self {
                id: pick(item, keys::LEAVE_TYPE_ID).and_then(|v| {
                    v.as_i64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
                }),
                name: pick_text(item, keys::LEAVE_TYPE_NAME).unwrap_or_default(),
                max_days: pick_f64(item, keys::LEAVE_MAX_DAYS),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: Option<String>,
    pub leave_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub days: Option<f64>,
    /// Lowercased server status (`pending`, `approved`, `rejected`, ...).
    pub status: String,
    pub reason: Option<String>,
}

impl LeaveRequest {
    pub fn list_from_response(body: &Value) -> Vec<Self> {
        let source = envelope(body);
        let items = pick_array(source, keys::LEAVE_REQUESTS)
            .map_or_else(|| list_items(body, keys::LIST), Vec::as_slice);
        items.iter().map(Self::from_value).collect()
    }

    pub fn from_value(item: &Value) -> Self {
        Self {
            id: pick_text(item, &["id", "request_id", "requestId"]),
            leave_type: pick_text(item, keys::LEAVE_TYPE_NAME),
            start_date: pick_text(item, keys::START_DATE),
            end_date: pick_text(item, keys::END_DATE),
            days: pick_f64(item, keys::LEAVE_DAYS),
            status: pick_text(item, &["status"])
                .map_or_else(|| "pending".to_string(), |s| s.to_lowercase()),
            reason: pick_text(item, keys::REASON),
        }
    }

    /// The request echoed back by `POST /leaves/apply`, when the server sends one.
    pub fn from_apply_response(body: &Value) -> Option<Self> {
        let source = envelope(body);
        let item = pick(source, &["leave", "request", "leave_request"]).unwrap_or(source);
        item.is_object().then(|| Self::from_value(item))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalanceEntry {
    pub leave_type: String,
    pub used: f64,
    pub total: f64,
    pub available: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalance {
    pub entries: Vec<LeaveBalanceEntry>,
    pub total_available_days: f64,
}

impl LeaveBalance {
    pub fn from_response(body: &Value) -> Self {
        let source = envelope(body);
        let items = match source {
            Value::Array(items) => items.as_slice(),
            _ => pick_array(source, keys::LEAVE_BALANCES)
                .or_else(|| pick_array(source, keys::LIST))
                .map(Vec::as_slice)
                .unwrap_or_default(),
        };

        let entries: Vec<LeaveBalanceEntry> = items
            .iter()
            .map(|item| {
                let used = pick_f64(item, keys::USED).unwrap_or(0.0);
                let total = pick_f64(item, keys::TOTAL).unwrap_or(0.0);
                LeaveBalanceEntry {
                    leave_type: pick_text(item, keys::LEAVE_TYPE_NAME).unwrap_or_default(),
                    used,
                    total,
                    available: pick_f64(item, keys::AVAILABLE)
                        .unwrap_or_else(|| (total - used).max(0.0)),
                }
            })
            .collect();

        let total_available_days = pick_f64(source, keys::TOTAL_AVAILABLE_DAYS)
            .unwrap_or_else(|| entries.iter().map(|e| e.available).sum());

        Self {
            entries,
            total_available_days,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tasks
// ─────────────────────────────────────────────────────────────────────────────

/// Closed task status taxonomy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl TaskStatus {
    /// Folds any server spelling into the closed taxonomy.
    ///
    /// Lowercases, maps `-` and whitespace to `_`; anything unrecognized is
    /// [`TaskStatus::Open`].
    pub fn normalize(raw: &str) -> Self {
        Self::recognize(raw).unwrap_or_default()
    }

    /// Like [`normalize`](Self::normalize), but `None` for values outside
    /// the taxonomy.
    pub fn recognize(raw: &str) -> Option<Self> {
        let folded: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c.is_whitespace() { '_' } else { c })
            .collect();
        match folded.as_str() {
            "open" => Some(Self::Open),
            "in_progress" => Some(Self::InProgress),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse for user input; server data goes through
/// [`TaskStatus::normalize`] instead.
impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::recognize(s)
            .ok_or_else(|| format!("unknown task status `{s}` (expected open, in_progress or closed)"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub assigned_by: Option<String>,
    pub project: Option<String>,
}

impl Task {
    pub fn from_value(item: &Value) -> Self {
        Self {
            id: pick_text(item, keys::ID).unwrap_or_default(),
            title: pick_text(item, keys::TITLE).unwrap_or_default(),
            description: pick_text(item, keys::DESCRIPTION),
            status: pick_text(item, keys::STATUS)
                .map(|s| TaskStatus::normalize(&s))
                .unwrap_or_default(),
            priority: pick_text(item, keys::PRIORITY).map(|p| p.to_lowercase()),
            due_date: pick_text(item, keys::DUE_DATE),
            assigned_by: pick_text(item, keys::ASSIGNED_BY),
            project: pick_text(item, keys::PROJECT_NAME),
        }
    }

    /// Single task from a detail or update response (`{data: {...}}` or bare).
    pub fn from_response(body: &Value) -> Self {
        Self::from_value(envelope(body))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub total: Option<u64>,
    pub total_pages: Option<u64>,
}

impl Pagination {
    fn from_source(source: &Value) -> Option<Self> {
        let meta = pick(source, keys::PAGINATION).unwrap_or(source);
        let pagination = Self {
            page: pick_u64(meta, keys::PAGE),
            page_size: pick_u64(meta, keys::PAGE_SIZE),
            total: pick_u64(meta, keys::TOTAL_ITEMS),
            total_pages: pick_u64(meta, keys::TOTAL_PAGES),
        };
        (pagination != Self::default()).then_some(pagination)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPage {
    pub items: Vec<Task>,
    pub pagination: Option<Pagination>,
}

impl TaskPage {
    pub fn from_response(body: &Value) -> Self {
        let source = envelope(body);
        let items = match source {
            Value::Array(items) => items.as_slice(),
            _ => pick_array(source, keys::TASK_LIST)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        };
        let pagination = match source {
            Value::Array(_) => Pagination::from_source(body),
            _ => Pagination::from_source(source).or_else(|| Pagination::from_source(body)),
        };
        Self {
            items: items.iter().map(Task::from_value).collect(),
            pagination,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Option<String>,
    pub name: String,
    pub client: Option<String>,
    pub number_of_days: u64,
    pub target_date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectsPage {
    pub projects: Vec<Project>,
    pub pagination: Option<Pagination>,
}

impl ProjectsPage {
    pub fn from_response(body: &Value) -> Self {
        let items = match body {
            Value::Array(items) => items.as_slice(),
            _ => pick_array(body, keys::PROJECT_LIST)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        };
        let pagination = match body {
            Value::Array(_) => None,
            _ => pick(body, &["pagination"]).and_then(Pagination::from_source),
        };
        Self {
            projects: items
                .iter()
                .map(|item| Project {
                    id: pick_text(item, &["id", "project_id", "projectId"]),
                    name: pick_text(item, &["name", "project_name", "projectName"])
                        .unwrap_or_default(),
                    client: pick_text(item, keys::CLIENT),
                    number_of_days: pick_u64(item, keys::NUMBER_OF_DAYS).unwrap_or(0),
                    target_date: pick_text(item, keys::TARGET_DATE),
                    status: pick_text(item, &["status"]),
                })
                .collect(),
            pagination,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AI chat
// ─────────────────────────────────────────────────────────────────────────────

/// Reply text shown when the assistant response carries none.
pub const EMPTY_CHAT_REPLY: &str = "No response from AI.";

/// Assistant reply text from an `/ai-chat/ask` response.
pub fn chat_reply_text(body: &Value) -> String {
    let data = envelope(body);
    if let Value::String(text) = data {
        return text.clone();
    }
    pick_text(data, keys::CHAT_REPLY).unwrap_or_else(|| EMPTY_CHAT_REPLY.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Items of a list response: a bare array, an enveloped array, or an array
/// under one of `list_keys`.
fn list_items<'a>(body: &'a Value, list_keys: &[&str]) -> &'a [Value] {
    let source = envelope(body);
    match source {
        Value::Array(items) => items.as_slice(),
        _ => pick_array(source, list_keys)
            .or_else(|| pick_array(body, list_keys))
            .map(Vec::as_slice)
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_status_normalization() {
        assert_eq!(TaskStatus::normalize("Open"), TaskStatus::Open);
        assert_eq!(TaskStatus::normalize("in-progress"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::normalize("In Progress"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::normalize("CLOSED"), TaskStatus::Closed);
        assert_eq!(TaskStatus::normalize("unknown-value"), TaskStatus::Open);
        assert_eq!(TaskStatus::normalize(""), TaskStatus::Open);
    }

    #[test]
    fn test_task_status_parse_rejects_unknown_values() {
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!(" Closed ".parse::<TaskStatus>(), Ok(TaskStatus::Closed));
        assert_eq!("open".parse::<TaskStatus>(), Ok(TaskStatus::Open));
        assert!("done".parse::<TaskStatus>().is_err());
        assert!("".parse::<TaskStatus>().is_err());
        assert_eq!(TaskStatus::normalize("done"), TaskStatus::Open);
    }

    #[test]
    fn test_pick_first_match_wins() {
        let body = json!({ "totalEmployees": 4, "total_employees": null });
        assert_eq!(pick_u64(&body, keys::TOTAL_EMPLOYEES), Some(4));

        let both = json!({ "total_employees": 9, "totalEmployees": 4 });
        assert_eq!(pick_u64(&both, keys::TOTAL_EMPLOYEES), Some(9));
    }

    #[test]
    fn test_pick_text_skips_empty_strings() {
        let body = json!({ "todayStatus": "", "todays_status": "Checked in" });
        assert_eq!(
            pick_text(&body, keys::TODAYS_STATUS).as_deref(),
            Some("Checked in")
        );
    }

    #[test]
    fn test_extract_token_variants() {
        assert_eq!(extract_token(&json!({"token": "a"})).as_deref(), Some("a"));
        assert_eq!(
            extract_token(&json!({"access_token": "b"})).as_deref(),
            Some("b")
        );
        assert_eq!(
            extract_token(&json!({"data": {"accessToken": "c"}})).as_deref(),
            Some("c")
        );
        assert_eq!(extract_token(&json!({"message": "ok"})), None);
    }

    #[test]
    fn test_extract_role_nested_user() {
        let auth = json!({"data": {"access_token": "t", "user": {"role": "admin"}}});
        assert_eq!(extract_role(&auth).as_deref(), Some("admin"));
        assert_eq!(
            extract_role(&json!({"role": "employee"})).as_deref(),
            Some("employee")
        );
    }

    #[test]
    fn test_error_message_priority() {
        let body = json!({"error": "bad", "message": "Already punched in"});
        assert_eq!(
            extract_error_message(&body).as_deref(),
            Some("Already punched in")
        );
        assert_eq!(
            extract_error_message(&json!({"detail": "Not found"})).as_deref(),
            Some("Not found")
        );
    }

    #[test]
    fn test_calendar_derives_counts_from_records() {
        let body = json!([
            {"date": "2024-10-01", "is_present": true},
            {"date": "2024-10-02", "is_present": false}
        ]);
        let summary = CalendarSummary::from_response(&body);
        assert_eq!(summary.present, 1);
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.present_dates, vec!["2024-10-01"]);
        assert_eq!(summary.absent_dates, vec!["2024-10-02"]);
        assert_eq!(summary.work_days, 0);
    }

    #[test]
    fn test_calendar_prefers_server_counts() {
        let body = json!({
            "data": {
                "workDays": 22,
                "present": 18,
                "days": [{"date": "2024-10-01", "is_present": true}],
                "absent_dates": [{"date": "2024-10-03"}]
            }
        });
        let summary = CalendarSummary::from_response(&body);
        assert_eq!(summary.work_days, 22);
        assert_eq!(summary.present, 18);
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.absent_dates, vec!["2024-10-03"]);
    }

    #[test]
    fn test_calendar_reads_totals_beside_record_array() {
        let body = json!({
            "workDays": 22,
            "absent": 3,
            "data": [
                {"date": "2024-10-01", "is_present": true},
                {"date": "2024-10-02", "is_present": false}
            ]
        });
        let summary = CalendarSummary::from_response(&body);
        assert_eq!(summary.work_days, 22);
        assert_eq!(summary.present, 1);
        assert_eq!(summary.absent, 3);
        assert_eq!(summary.present_dates, vec!["2024-10-01"]);
        assert_eq!(summary.absent_dates, vec!["2024-10-02"]);
    }

    #[test]
    fn test_dashboard_summary_aliases() {
        let body = json!({
            "summary": {
                "my_tasks": 5,
                "attendanceStatus": "Present",
                "leave_balance": {"total_available_days": 12.5},
                "my_projects": [{"id": 1}, {"id": 2}],
                "openTasks": "3"
            }
        });
        let summary = DashboardSummary::from_response(&body);
        assert_eq!(summary.my_tasks.as_deref(), Some("5"));
        assert_eq!(summary.todays_status.as_deref(), Some("Present"));
        assert_eq!(summary.leave_balance_days, Some(12.5));
        assert_eq!(summary.my_projects, Some(2));
        assert_eq!(summary.open_tasks.as_deref(), Some("3"));
        assert_eq!(summary.completed, None);
    }

    #[test]
    fn test_admin_overview_defaults_to_zero() {
        let body = json!({"data": {"overview": {"totalEmployees": 40, "closed_tasks": 7}}});
        let overview = AdminOverview::from_response(&body);
        assert_eq!(overview.total_employees, 40);
        assert_eq!(overview.closed_tasks, 7);
        assert_eq!(overview.overdue_tasks, 0);
    }

    #[test]
    fn test_task_page_from_envelope() {
        let body = json!({
            "data": {
                "items": [
                    {"id": 11, "title": "Write report", "status": "In-Progress"},
                    {"task_id": "12", "name": "Review", "status": "done"}
                ],
                "pagination": {"page": 1, "page_size": 20, "total": 2}
            }
        });
        let page = TaskPage::from_response(&body);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, "11");
        assert_eq!(page.items[0].status, TaskStatus::InProgress);
        assert_eq!(page.items[1].status, TaskStatus::Open);
        assert_eq!(page.pagination.unwrap().total, Some(2));
    }

    #[test]
    fn test_leave_balance_sums_available() {
        let body = json!({"data": [
            {"leave_type_name": "Annual", "used": 3, "total": 15},
            {"leave_type": "Sick", "used_days": 1, "total_days": 7, "remaining_days": 6}
        ]});
        let balance = LeaveBalance::from_response(&body);
        assert_eq!(balance.entries.len(), 2);
        assert!((balance.entries[0].available - 12.0).abs() < f64::EPSILON);
        assert!((balance.total_available_days - 18.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_projects_list_sources() {
        let bare = json!([{"name": "Apollo", "client": "NASA", "number_of_days": 30}]);
        let page = ProjectsPage::from_response(&bare);
        assert_eq!(page.projects[0].name, "Apollo");
        assert_eq!(page.projects[0].number_of_days, 30);

        let wrapped = json!({"projects": [{"name": "Gemini"}], "pagination": {"page": 2}});
        let page = ProjectsPage::from_response(&wrapped);
        assert_eq!(page.projects[0].name, "Gemini");
        assert_eq!(page.pagination.unwrap().page, Some(2));
    }

    #[test]
    fn test_chat_reply_text() {
        assert_eq!(chat_reply_text(&json!({"data": {"answer": "42"}})), "42");
        assert_eq!(chat_reply_text(&json!({"data": "plain"})), "plain");
        assert_eq!(chat_reply_text(&json!({})), EMPTY_CHAT_REPLY);
    }
}
