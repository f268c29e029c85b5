//! Project listing.

use serde::Serialize;

use crate::api::{ApiClient, ProjectsQuery};
use crate::error::Result;
use crate::normalized::ProjectsPage;
use crate::store::{Activities, Reducer, Resource, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectsActivity {
    Query,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectsState {
    pub page: Option<ProjectsPage>,
    pub activity: Activities<ProjectsActivity>,
}

#[derive(Debug)]
pub enum ProjectsAction {
    Started(ProjectsActivity),
    Failed(ProjectsActivity, String),
    Settled(ProjectsActivity),
    Loaded(ProjectsPage),
}

impl Reducer for ProjectsState {
    type Action = ProjectsAction;
    type Category = ProjectsActivity;

    fn reduce(&self, action: ProjectsAction) -> Self {
        let mut next = self.clone();
        match action {
            ProjectsAction::Started(category) => next.activity.start(category),
            ProjectsAction::Failed(category, message) => next.activity.fail(category, message),
            ProjectsAction::Settled(category) => next.activity.settle(category),
            ProjectsAction::Loaded(page) => {
                next.page = Some(page);
                next.activity.succeed(ProjectsActivity::Query);
            }
        }
        next
    }

    fn started(category: ProjectsActivity) -> ProjectsAction {
        ProjectsAction::Started(category)
    }

    fn failed(category: ProjectsActivity, message: String) -> ProjectsAction {
        ProjectsAction::Failed(category, message)
    }

    fn settled(category: ProjectsActivity) -> ProjectsAction {
        ProjectsAction::Settled(category)
    }
}

/// Projects state machine.
#[derive(Debug, Clone)]
pub struct Projects {
    api: ApiClient,
    resource: Resource<ProjectsState>,
}

impl Projects {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            resource: Resource::new("projects"),
        }
    }

    pub fn store(&self) -> &Store<ProjectsState> {
        self.resource.store()
    }

    /// `POST /projects/query`. Use [`ProjectsQuery::default`] for page 1 of 10.
    pub async fn query_projects(&self, query: &ProjectsQuery) -> Result<ProjectsPage> {
        self.resource
            .execute(
                ProjectsActivity::Query,
                "Failed to fetch projects",
                async {
                    let body = self.api.projects().query(query).await?;
                    Ok(ProjectsPage::from_response(&body))
                },
                |page| ProjectsAction::Loaded(page.clone()),
            )
            .await
    }
}
