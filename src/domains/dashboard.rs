//! Dashboard summary cards.

use serde::Serialize;

use crate::api::ApiClient;
use crate::error::Result;
use crate::normalized::{AdminOverview, DashboardSummary};
use crate::store::{Activities, Reducer, Resource, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardActivity {
    Summary,
    Overview,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    pub summary: Option<DashboardSummary>,
    pub overview: Option<AdminOverview>,
    pub activity: Activities<DashboardActivity>,
}

#[derive(Debug)]
pub enum DashboardAction {
    Started(DashboardActivity),
    Failed(DashboardActivity, String),
    Settled(DashboardActivity),
    SummaryLoaded(DashboardSummary),
    OverviewLoaded(AdminOverview),
}

impl Reducer for DashboardState {
    type Action = DashboardAction;
    type Category = DashboardActivity;

    fn reduce(&self, action: DashboardAction) -> Self {
        let mut next = self.clone();
        match action {
            DashboardAction::Started(category) => next.activity.start(category),
            DashboardAction::Failed(category, message) => next.activity.fail(category, message),
            DashboardAction::Settled(category) => next.activity.settle(category),
            DashboardAction::SummaryLoaded(summary) => {
                next.summary = Some(summary);
                next.activity.succeed(DashboardActivity::Summary);
            }
            DashboardAction::OverviewLoaded(overview) => {
                next.overview = Some(overview);
                next.activity.succeed(DashboardActivity::Overview);
            }
        }
        next
    }

    fn started(category: DashboardActivity) -> DashboardAction {
        DashboardAction::Started(category)
    }

    fn failed(category: DashboardActivity, message: String) -> DashboardAction {
        DashboardAction::Failed(category, message)
    }

    fn settled(category: DashboardActivity) -> DashboardAction {
        DashboardAction::Settled(category)
    }
}

/// Dashboard state machine.
#[derive(Debug, Clone)]
pub struct Dashboard {
    api: ApiClient,
    resource: Resource<DashboardState>,
}

impl Dashboard {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            resource: Resource::new("dashboard"),
        }
    }

    pub fn store(&self) -> &Store<DashboardState> {
        self.resource.store()
    }

    /// `GET /dashboard/employee`.
    pub async fn get_dashboard(&self) -> Result<DashboardSummary> {
        self.resource
            .execute(
                DashboardActivity::Summary,
                "Failed to fetch dashboard",
                async {
                    let body = self.api.dashboard().employee().await?;
                    Ok(DashboardSummary::from_response(&body))
                },
                |summary| DashboardAction::SummaryLoaded(summary.clone()),
            )
            .await
    }

    /// `GET /dashboard/overview`, the administrative counts.
    pub async fn get_admin_overview(&self) -> Result<AdminOverview> {
        self.resource
            .execute(
                DashboardActivity::Overview,
                "Failed to fetch dashboard overview",
                async {
                    let body = self.api.dashboard().overview().await?;
                    Ok(AdminOverview::from_response(&body))
                },
                |overview| DashboardAction::OverviewLoaded(overview.clone()),
            )
            .await
    }
}
