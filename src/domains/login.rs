//! Sign-in and the signed-in user's profile.

use serde::Serialize;

use crate::api::{ApiClient, LoginRequest};
use crate::error::{PortalError, Result};
use crate::normalized::{Profile, extract_role};
use crate::store::{Activities, Reducer, Resource, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginActivity {
    Login,
    Profile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoginState {
    /// Username of the last successful sign-in.
    pub username: Option<String>,
    pub role: Option<String>,
    pub profile: Option<Profile>,
    pub activity: Activities<LoginActivity>,
}

#[derive(Debug)]
pub enum LoginAction {
    Started(LoginActivity),
    Failed(LoginActivity, String),
    Settled(LoginActivity),
    LoggedIn {
        username: String,
        role: Option<String>,
    },
    ProfileLoaded(Profile),
}

impl Reducer for LoginState {
    type Action = LoginAction;
    type Category = LoginActivity;

    fn reduce(&self, action: LoginAction) -> Self {
        let mut next = self.clone();
        match action {
            LoginAction::Started(category) => next.activity.start(category),
            LoginAction::Failed(category, message) => next.activity.fail(category, message),
            LoginAction::Settled(category) => next.activity.settle(category),
            LoginAction::LoggedIn { username, role } => {
                next.username = Some(username);
                next.role = role;
                next.activity.succeed(LoginActivity::Login);
            }
            LoginAction::ProfileLoaded(profile) => {
                if profile.role.is_some() {
                    next.role.clone_from(&profile.role);
                }
                next.profile = Some(profile);
                next.activity.succeed(LoginActivity::Profile);
            }
        }
        next
    }

    fn started(category: LoginActivity) -> LoginAction {
        LoginAction::Started(category)
    }

    fn failed(category: LoginActivity, message: String) -> LoginAction {
        LoginAction::Failed(category, message)
    }

    fn settled(category: LoginActivity) -> LoginAction {
        LoginAction::Settled(category)
    }
}

/// What a successful sign-in hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginSuccess {
    pub username: String,
    pub role: Option<String>,
}

/// Login state machine.
#[derive(Debug, Clone)]
pub struct Login {
    api: ApiClient,
    resource: Resource<LoginState>,
}

impl Login {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            resource: Resource::new("login"),
        }
    }

    pub fn store(&self) -> &Store<LoginState> {
        self.resource.store()
    }

    /// `POST /auth/login`, then start the session from the response.
    ///
    /// Rejects blank credentials before any request is made.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginSuccess> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(PortalError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        let request = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };

        self.resource
            .execute(
                LoginActivity::Login,
                "Failed to login",
                async {
                    let body = self.api.auth().login(&request).await?;
                    self.api.session().login(&body).await?;
                    Ok(LoginSuccess {
                        username: request.username.clone(),
                        role: extract_role(&body),
                    })
                },
                |success| LoginAction::LoggedIn {
                    username: success.username.clone(),
                    role: success.role.clone(),
                },
            )
            .await
    }

    /// `GET /auth/me`.
    pub async fn fetch_profile(&self) -> Result<Profile> {
        self.resource
            .execute(
                LoginActivity::Profile,
                "Failed to fetch profile",
                async {
                    let body = self.api.auth().me().await?;
                    Ok(Profile::from_response(&body))
                },
                |profile| LoginAction::ProfileLoaded(profile.clone()),
            )
            .await
    }
}
