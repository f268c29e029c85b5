//! Aggregates every domain machine behind one handle.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::domains::{
    AiChat, Attendance, AttendanceState, ChatState, Dashboard, DashboardState, Leave, LeaveState,
    Login, LoginState, Projects, ProjectsState, TaskState, Tasks,
};
use crate::error::Result;
use crate::session::{AuthSession, FileStorage, SessionHolder};

/// Combined read-only view of every domain, keyed by domain name.
#[derive(Debug, Serialize)]
pub struct PortalView {
    pub session: Arc<AuthSession>,
    pub login: Arc<LoginState>,
    pub dashboard: Arc<DashboardState>,
    pub attendance: Arc<AttendanceState>,
    pub leave: Arc<LeaveState>,
    pub task: Arc<TaskState>,
    pub projects: Arc<ProjectsState>,
    pub ai_chat: Arc<ChatState>,
}

/// Per-domain versions a cached view was built from.
type ViewKey = [u64; 8];

/// The whole portal: session, API client and one machine per domain.
///
/// Holds no domain state of its own. Cloning shares every machine.
#[derive(Debug, Clone)]
pub struct Portal {
    session: SessionHolder,
    api: ApiClient,
    login: Login,
    dashboard: Dashboard,
    attendance: Attendance,
    leave: Leave,
    tasks: Tasks,
    projects: Projects,
    ai_chat: AiChat,
    view_cache: Arc<Mutex<Option<(ViewKey, Arc<PortalView>)>>>,
}

impl Portal {
    /// Wire every machine to `api`.
    ///
    /// Domain state is reset whenever the session ends, including a central
    /// 401 seen by any domain.
    pub fn new(api: ApiClient) -> Self {
        let portal = Self {
            session: api.session().clone(),
            login: Login::new(api.clone()),
            dashboard: Dashboard::new(api.clone()),
            attendance: Attendance::new(api.clone()),
            leave: Leave::new(api.clone()),
            tasks: Tasks::new(api.clone()),
            projects: Projects::new(api.clone()),
            ai_chat: AiChat::new(api.clone()),
            api,
            view_cache: Arc::new(Mutex::new(None)),
        };
        portal.session.on_signed_out(portal.domain_reset());
        portal
    }

    /// Wire file-backed session storage and the configured client together.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let storage = Arc::new(FileStorage::new(&config.storage.dir));
        let session = SessionHolder::new(storage, config.storage.session_key.clone());
        let api = ApiClient::from_config(&config.api, session)?;
        Ok(Self::new(api))
    }

    pub fn session(&self) -> &SessionHolder {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn login(&self) -> &Login {
        &self.login
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn attendance(&self) -> &Attendance {
        &self.attendance
    }

    pub fn leave(&self) -> &Leave {
        &self.leave
    }

    pub fn tasks(&self) -> &Tasks {
        &self.tasks
    }

    pub fn projects(&self) -> &Projects {
        &self.projects
    }

    pub fn ai_chat(&self) -> &AiChat {
        &self.ai_chat
    }

    /// Restore the persisted session; see [`SessionHolder::restore_session`].
    pub async fn restore_session(&self) -> Arc<AuthSession> {
        self.session.restore_session().await
    }

    /// Current combined view.
    ///
    /// Returns the same `Arc` for as long as no domain (and not the session)
    /// has changed since the last call.
    pub fn view(&self) -> Arc<PortalView> {
        let session = self.session.snapshot();
        let login = self.login.store().snapshot();
        let dashboard = self.dashboard.store().snapshot();
        let attendance = self.attendance.store().snapshot();
        let leave = self.leave.store().snapshot();
        let task = self.tasks.store().snapshot();
        let projects = self.projects.store().snapshot();
        let ai_chat = self.ai_chat.store().snapshot();

        let key = [
            session.version,
            login.version,
            dashboard.version,
            attendance.version,
            leave.version,
            task.version,
            projects.version,
            ai_chat.version,
        ];

        let mut cache = self.view_cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, view)) = cache.as_ref().filter(|(cached_key, _)| *cached_key == key) {
            return Arc::clone(view);
        }

        let view = Arc::new(PortalView {
            session: session.state,
            login: login.state,
            dashboard: dashboard.state,
            attendance: attendance.state,
            leave: leave.state,
            task: task.state,
            projects: projects.state,
            ai_chat: ai_chat.state,
        });
        *cache = Some((key, Arc::clone(&view)));
        view
    }

    /// End the session and put every domain back to its initial state.
    pub async fn sign_out(&self) {
        self.session.logout().await;
        // Also covers signing out a session that was never authenticated.
        (self.domain_reset())();
        info!(name: "portal.signed_out", "Signed out");
    }

    /// Resets every domain store. Captures store handles only, so the
    /// session holder never keeps the portal alive.
    fn domain_reset(&self) -> impl Fn() + Send + Sync + 'static {
        let login = self.login.store().clone();
        let dashboard = self.dashboard.store().clone();
        let attendance = self.attendance.store().clone();
        let leave = self.leave.store().clone();
        let tasks = self.tasks.store().clone();
        let projects = self.projects.store().clone();
        let ai_chat = self.ai_chat.store().clone();
        move || {
            login.reset();
            dashboard.reset();
            attendance.reset();
            leave.reset();
            tasks.reset();
            projects.reset();
            ai_chat.reset();
            debug!(name: "portal.domains.reset", "All domain state reset");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::projects::{ProjectsAction, ProjectsActivity};
    use crate::session::MemoryStorage;

    fn portal() -> Portal {
        let session = SessionHolder::new(Arc::new(MemoryStorage::new()), "k");
        Portal::new(ApiClient::new("http://127.0.0.1:9", session).unwrap())
    }

    #[test]
    fn test_view_is_memoized_until_a_domain_changes() {
        let portal = portal();
        let first = portal.view();
        let second = portal.view();
        assert!(Arc::ptr_eq(&first, &second));

        portal
            .projects()
            .store()
            .dispatch(ProjectsAction::Started(ProjectsActivity::Query));
        let third = portal.view();
        assert!(!Arc::ptr_eq(&second, &third));
        assert!(Arc::ptr_eq(&first.login, &third.login));
    }

    #[tokio::test]
    async fn test_sign_out_resets_domains() {
        let portal = portal();
        portal
            .projects()
            .store()
            .dispatch(ProjectsAction::Failed(ProjectsActivity::Query, "x".to_string()));
        portal.sign_out().await;
        assert_eq!(*portal.projects().store().state(), ProjectsState::default());
        assert!(!portal.session().is_authenticated());
    }
}
