//! Leave types, requests, balance and applications.

use chrono::NaiveDate;
use serde::Serialize;

use crate::api::{ApiClient, LeaveApplication};
use crate::error::{PortalError, Result};
use crate::normalized::{LeaveBalance, LeaveRequest, LeaveType};
use crate::store::{Activities, Reducer, Resource, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveActivity {
    Types,
    Requests,
    Apply,
    Balance,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeaveState {
    pub types: Vec<LeaveType>,
    pub requests: Vec<LeaveRequest>,
    pub balance: Option<LeaveBalance>,
    /// What the server echoed for the last accepted application.
    pub last_application: Option<LeaveRequest>,
    pub activity: Activities<LeaveActivity>,
}

#[derive(Debug)]
pub enum LeaveAction {
    Started(LeaveActivity),
    Failed(LeaveActivity, String),
    Settled(LeaveActivity),
    TypesLoaded(Vec<LeaveType>),
    RequestsLoaded(Vec<LeaveRequest>),
    BalanceLoaded(LeaveBalance),
    Applied(Option<LeaveRequest>),
}

impl Reducer for LeaveState {
    type Action = LeaveAction;
    type Category = LeaveActivity;

    fn reduce(&self, action: LeaveAction) -> Self {
        let mut next = self.clone();
        match action {
            LeaveAction::Started(category) => next.activity.start(category),
            LeaveAction::Failed(category, message) => next.activity.fail(category, message),
            LeaveAction::Settled(category) => next.activity.settle(category),
            LeaveAction::TypesLoaded(types) => {
                next.types = types;
                next.activity.succeed(LeaveActivity::Types);
            }
            LeaveAction::RequestsLoaded(requests) => {
                next.requests = requests;
                next.activity.succeed(LeaveActivity::Requests);
            }
            LeaveAction::BalanceLoaded(balance) => {
                next.balance = Some(balance);
                next.activity.succeed(LeaveActivity::Balance);
            }
            LeaveAction::Applied(receipt) => {
                next.last_application = receipt;
                next.activity.succeed(LeaveActivity::Apply);
            }
        }
        next
    }

    fn started(category: LeaveActivity) -> LeaveAction {
        LeaveAction::Started(category)
    }

    fn failed(category: LeaveActivity, message: String) -> LeaveAction {
        LeaveAction::Failed(category, message)
    }

    fn settled(category: LeaveActivity) -> LeaveAction {
        LeaveAction::Settled(category)
    }
}

/// Caller-side form of a leave application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveForm {
    pub leave_type_id: Option<i64>,
    pub start_date: String,
    pub end_date: String,
    pub reason: Option<String>,
}

impl LeaveForm {
    /// Checks the date range and builds the request body.
    ///
    /// Both dates are required. When both parse as ISO dates the end may not
    /// precede the start; other formats are passed through unchecked.
    pub fn validate(&self) -> Result<LeaveApplication> {
        let start = self.start_date.trim();
        let end = self.end_date.trim();
        if start.is_empty() || end.is_empty() {
            return Err(PortalError::Validation(
                "Start date and end date are required".to_string(),
            ));
        }
        let reversed = match (
            NaiveDate::parse_from_str(start, "%Y-%m-%d"),
            NaiveDate::parse_from_str(end, "%Y-%m-%d"),
        ) {
            (Ok(from), Ok(to)) => to < from,
            _ => false,
        };
        if reversed {
            return Err(PortalError::Validation(
                "End date cannot be before start date".to_string(),
            ));
        }
        Ok(LeaveApplication {
            leave_type_id: self.leave_type_id.unwrap_or(0),
            start_date: start.to_string(),
            end_date: end.to_string(),
            reason: self.reason.clone().unwrap_or_default(),
        })
    }
}

/// Leave state machine.
#[derive(Debug, Clone)]
pub struct Leave {
    api: ApiClient,
    resource: Resource<LeaveState>,
}

impl Leave {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            resource: Resource::new("leave"),
        }
    }

    pub fn store(&self) -> &Store<LeaveState> {
        self.resource.store()
    }

    pub async fn get_leave_types(&self) -> Result<Vec<LeaveType>> {
        self.resource
            .execute(
                LeaveActivity::Types,
                "Failed to fetch leave types",
                async {
                    let body = self.api.leave().types().await?;
                    Ok(LeaveType::list_from_response(&body))
                },
                |types| LeaveAction::TypesLoaded(types.clone()),
            )
            .await
    }

    pub async fn get_leave_requests(&self) -> Result<Vec<LeaveRequest>> {
        self.resource
            .execute(
                LeaveActivity::Requests,
                "Failed to fetch leave requests",
                async {
                    let body = self.api.leave().requests().await?;
                    Ok(LeaveRequest::list_from_response(&body))
                },
                |requests| LeaveAction::RequestsLoaded(requests.clone()),
            )
            .await
    }

    pub async fn get_leave_balance(&self) -> Result<LeaveBalance> {
        self.resource
            .execute(
                LeaveActivity::Balance,
                "Failed to fetch leave balance",
                async {
                    let body = self.api.leave().balance().await?;
                    Ok(LeaveBalance::from_response(&body))
                },
                |balance| LeaveAction::BalanceLoaded(balance.clone()),
            )
            .await
    }

    /// `POST /leaves/apply`.
    ///
    /// An invalid form is rejected before anything is dispatched or sent.
    pub async fn apply_for_leave(&self, form: &LeaveForm) -> Result<Option<LeaveRequest>> {
        let application = form.validate()?;
        self.resource
            .execute(
                LeaveActivity::Apply,
                "Failed to apply",
                async {
                    let body = self.api.leave().apply(&application).await?;
                    Ok(LeaveRequest::from_apply_response(&body))
                },
                |receipt| LeaveAction::Applied(receipt.clone()),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(start: &str, end: &str) -> LeaveForm {
        LeaveForm {
            leave_type_id: None,
            start_date: start.to_string(),
            end_date: end.to_string(),
            reason: None,
        }
    }

    #[test]
    fn test_missing_dates_fail_validation() {
        assert!(matches!(
            form("", "2024-10-02").validate(),
            Err(PortalError::Validation(_))
        ));
        assert!(matches!(
            form("2024-10-01", "  ").validate(),
            Err(PortalError::Validation(_))
        ));
    }

    #[test]
    fn test_reversed_range_fails_validation() {
        let err = form("2024-10-05", "2024-10-01").validate().unwrap_err();
        assert_eq!(err.to_string(), "End date cannot be before start date");
    }

    #[test]
    fn test_defaults_fill_missing_type_and_reason() {
        let application = form("2024-10-01", "2024-10-01").validate().unwrap();
        assert_eq!(application.leave_type_id, 0);
        assert_eq!(application.reason, "");
    }

    #[test]
    fn test_balance_and_apply_flags_are_independent() {
        let state = LeaveState::default()
            .reduce(LeaveAction::Started(LeaveActivity::Balance))
            .reduce(LeaveAction::Started(LeaveActivity::Apply))
            .reduce(LeaveAction::Failed(LeaveActivity::Apply, "Overlap".to_string()));
        assert!(state.activity.is_loading(LeaveActivity::Balance));
        assert!(!state.activity.is_loading(LeaveActivity::Apply));
        assert_eq!(state.activity.error(LeaveActivity::Balance), None);
    }
}
