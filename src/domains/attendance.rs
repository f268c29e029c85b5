//! Attendance punches, today's record and the monthly calendar.

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::api::ApiClient;
use crate::error::{PortalError, Result};
use crate::normalized::{CalendarSummary, PunchRecord, TodayAttendance};
use crate::store::{Activities, Reducer, Resource, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceActivity {
    Punch,
    Today,
    Calendar,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceState {
    pub last_punch_in: Option<PunchRecord>,
    pub last_punch_out: Option<PunchRecord>,
    pub today: Option<TodayAttendance>,
    pub calendar: Option<CalendarSummary>,
    pub activity: Activities<AttendanceActivity>,
}

impl AttendanceState {
    /// Punched in, and not punched out since.
    ///
    /// Without any punch seen locally, falls back to the server's record for
    /// today.
    pub fn is_checked_in(&self) -> bool {
        match (&self.last_punch_in, &self.last_punch_out) {
            (Some(_), None) => true,
            (Some(punch_in), Some(punch_out)) => punch_out.recorded_at < punch_in.recorded_at,
            (None, _) => self
                .today
                .as_ref()
                .is_some_and(|t| t.punch_in_time.is_some() && t.punch_out_time.is_none()),
        }
    }

    /// A punch-out was recorded on the current local day.
    pub fn already_checked_out(&self) -> bool {
        self.already_checked_out_on(Local::now().date_naive())
    }

    pub fn already_checked_out_on(&self, day: NaiveDate) -> bool {
        let punched_out_locally = self
            .last_punch_out
            .as_ref()
            .is_some_and(|p| p.recorded_at.with_timezone(&Local).date_naive() == day);
        punched_out_locally
            || self
                .today
                .as_ref()
                .is_some_and(|t| t.punch_out_time.is_some())
    }
}

#[derive(Debug)]
pub enum AttendanceAction {
    Started(AttendanceActivity),
    Failed(AttendanceActivity, String),
    Settled(AttendanceActivity),
    PunchedIn(PunchRecord),
    PunchedOut(PunchRecord),
    TodayLoaded(TodayAttendance),
    CalendarLoaded(CalendarSummary),
}

impl Reducer for AttendanceState {
    type Action = AttendanceAction;
    type Category = AttendanceActivity;

    fn reduce(&self, action: AttendanceAction) -> Self {
        let mut next = self.clone();
        match action {
            AttendanceAction::Started(category) => next.activity.start(category),
            AttendanceAction::Failed(category, message) => next.activity.fail(category, message),
            AttendanceAction::Settled(category) => next.activity.settle(category),
            AttendanceAction::PunchedIn(record) => {
                next.last_punch_in = Some(record);
                next.activity.succeed(AttendanceActivity::Punch);
            }
            AttendanceAction::PunchedOut(record) => {
                next.last_punch_out = Some(record);
                next.activity.succeed(AttendanceActivity::Punch);
            }
            AttendanceAction::TodayLoaded(today) => {
                next.today = Some(today);
                next.activity.succeed(AttendanceActivity::Today);
            }
            AttendanceAction::CalendarLoaded(calendar) => {
                next.calendar = Some(calendar);
                next.activity.succeed(AttendanceActivity::Calendar);
            }
        }
        next
    }

    fn started(category: AttendanceActivity) -> AttendanceAction {
        AttendanceAction::Started(category)
    }

    fn failed(category: AttendanceActivity, message: String) -> AttendanceAction {
        AttendanceAction::Failed(category, message)
    }

    fn settled(category: AttendanceActivity) -> AttendanceAction {
        AttendanceAction::Settled(category)
    }
}

/// Attendance state machine.
#[derive(Debug, Clone)]
pub struct Attendance {
    api: ApiClient,
    resource: Resource<AttendanceState>,
}

impl Attendance {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            resource: Resource::new("attendance"),
        }
    }

    pub fn store(&self) -> &Store<AttendanceState> {
        self.resource.store()
    }

    /// `POST /attendance/punch-in`, then refresh today's record.
    pub async fn punch_in(&self) -> Result<PunchRecord> {
        let record = self
            .resource
            .execute(
                AttendanceActivity::Punch,
                "Failed to punch in",
                async {
                    let body = self.api.attendance().punch_in().await?;
                    Ok(PunchRecord::from_response(&body, Utc::now()))
                },
                |record| AttendanceAction::PunchedIn(record.clone()),
            )
            .await?;
        self.refresh_today().await;
        Ok(record)
    }

    /// `POST /attendance/punch-out`, then refresh today's record.
    pub async fn punch_out(&self) -> Result<PunchRecord> {
        let record = self
            .resource
            .execute(
                AttendanceActivity::Punch,
                "Failed to punch out",
                async {
                    let body = self.api.attendance().punch_out().await?;
                    Ok(PunchRecord::from_response(&body, Utc::now()))
                },
                |record| AttendanceAction::PunchedOut(record.clone()),
            )
            .await?;
        self.refresh_today().await;
        Ok(record)
    }

    /// `GET /attendance/today`.
    pub async fn fetch_today(&self) -> Result<TodayAttendance> {
        self.resource
            .execute(
                AttendanceActivity::Today,
                "Failed to fetch today's attendance",
                async {
                    let body = self.api.attendance().today().await?;
                    Ok(TodayAttendance::from_response(&body))
                },
                |today| AttendanceAction::TodayLoaded(today.clone()),
            )
            .await
    }

    /// `GET /attendance/calendar` for one month (1-12).
    pub async fn fetch_calendar(&self, year: i32, month: u32) -> Result<CalendarSummary> {
        if !(1..=12).contains(&month) {
            return Err(PortalError::Validation(format!(
                "Month must be between 1 and 12, got {month}"
            )));
        }
        self.resource
            .execute(
                AttendanceActivity::Calendar,
                "Failed to fetch attendance calendar",
                async {
                    let body = self.api.attendance().calendar(year, month).await?;
                    Ok(CalendarSummary::from_response(&body))
                },
                |calendar| AttendanceAction::CalendarLoaded(calendar.clone()),
            )
            .await
    }

    pub fn is_checked_in(&self) -> bool {
        self.store().state().is_checked_in()
    }

    pub fn already_checked_out(&self) -> bool {
        self.store().state().already_checked_out()
    }

    /// Follow-up fetch after a punch; its failure lands in the `today` category.
    async fn refresh_today(&self) {
        if let Err(e) = self.fetch_today().await {
            debug!(name: "attendance.refresh_failed", error = %e, "Follow-up fetch of today failed");
        }
    }
}
