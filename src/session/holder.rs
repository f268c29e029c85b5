//! Process-wide authentication state.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::storage::SessionStorage;
use crate::error::{PortalError, Result};
use crate::normalized::{extract_role, extract_token};
use crate::store::Snapshot;

/// Storage key used when none is configured.
pub const DEFAULT_SESSION_KEY: &str = "hrms.session";

/// Role whose sessions are never restored from storage.
const ADMIN_ROLE: &str = "admin";

/// Authentication state every domain call reads its bearer token from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSession {
    pub is_authenticated: bool,
    /// True until the persisted session has been looked at once.
    pub is_loading: bool,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub role: Option<String>,
}

impl Default for AuthSession {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            is_loading: true,
            token: None,
            role: None,
        }
    }
}

impl AuthSession {
    fn signed_out() -> Self {
        Self {
            is_loading: false,
            ..Self::default()
        }
    }

    fn signed_in(token: String, role: Option<String>) -> Self {
        Self {
            is_authenticated: true,
            is_loading: false,
            token: Some(token),
            role,
        }
    }
}

/// On-disk shape of a persisted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: Option<String>,
    #[serde(rename = "authData", default)]
    pub auth_data: Value,
}

/// Single source of truth for the bearer token.
///
/// Cloning is cheap; all clones share one state. The API client holds a clone
/// and is the only component besides explicit callers that may end a session
/// (via [`SessionHolder::expire`] on a 401).
#[derive(Clone)]
pub struct SessionHolder {
    inner: Arc<SessionInner>,
}

/// Callback run when an authenticated session ends.
type SignedOutHook = Arc<dyn Fn() + Send + Sync>;

struct SessionInner {
    state: watch::Sender<Snapshot<AuthSession>>,
    storage: Arc<dyn SessionStorage>,
    key: String,
    on_signed_out: Mutex<Vec<SignedOutHook>>,
}

impl fmt::Debug for SessionHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.current();
        f.debug_struct("SessionHolder")
            .field("key", &self.inner.key)
            .field("storage", &self.inner.storage)
            .field("is_authenticated", &current.is_authenticated)
            .field("is_loading", &current.is_loading)
            .finish_non_exhaustive()
    }
}

impl SessionHolder {
    pub fn new(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
        let (state, _rx) = watch::channel(Snapshot {
            version: 0,
            state: Arc::new(AuthSession::default()),
        });
        Self {
            inner: Arc::new(SessionInner {
                state,
                storage,
                key: key.into(),
                on_signed_out: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Current bearer token, if signed in.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().state.token.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().state.is_authenticated
    }

    #[must_use]
    pub fn current(&self) -> Arc<AuthSession> {
        Arc::clone(&self.inner.state.borrow().state)
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot<AuthSession> {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<AuthSession>> {
        self.inner.state.subscribe()
    }

    /// Run `hook` whenever an authenticated session ends, whether by
    /// [`logout`](Self::logout) or by [`expire`](Self::expire).
    ///
    /// Hooks run synchronously, before the ending call returns.
    pub fn on_signed_out(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.inner
            .on_signed_out
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(hook));
    }

    /// Start a session from a login response.
    ///
    /// The token is taken from the first of `token`, `accessToken`,
    /// `access_token` (top level or inside `data`). Persisting is best
    /// effort: a storage failure is logged and the in-memory session stays.
    pub async fn login(&self, auth_response: &Value) -> Result<String> {
        let token = extract_token(auth_response).ok_or(PortalError::MissingToken)?;
        let role = extract_role(auth_response);

        let persisted = PersistedSession {
            token: Some(token.clone()),
            auth_data: auth_response.clone(),
        };
        match serde_json::to_string(&persisted) {
            Ok(raw) => {
                if let Err(e) = self.inner.storage.save(&self.inner.key, &raw).await {
                    warn!(name: "session.persist_failed", error = %e, "Could not persist session");
                }
            }
            Err(e) => {
                warn!(name: "session.persist_failed", error = %e, "Could not serialize session");
            }
        }

        self.replace(AuthSession::signed_in(token.clone(), role));
        info!(name: "session.login", "Session started");
        Ok(token)
    }

    /// Restore the persisted session, if any. Never fails.
    ///
    /// Administrative sessions and unreadable entries are discarded and
    /// deleted. `is_loading` is false afterwards on every path.
    pub async fn restore_session(&self) -> Arc<AuthSession> {
        let restored = match self.inner.storage.load(&self.inner.key).await {
            Ok(Some(raw)) => self.restore_from(&raw).await,
            Ok(None) => {
                debug!(name: "session.restore.empty", "No persisted session");
                AuthSession::signed_out()
            }
            Err(e) => {
                warn!(name: "session.restore.failed", error = %e, "Could not read persisted session");
                AuthSession::signed_out()
            }
        };
        self.replace(restored);
        self.current()
    }

    async fn restore_from(&self, raw: &str) -> AuthSession {
        let persisted: PersistedSession = match serde_json::from_str(raw) {
            Ok(p) => p,
            Err(e) => {
                warn!(name: "session.restore.corrupt", error = %e, "Discarding unreadable session");
                self.clear_storage().await;
                return AuthSession::signed_out();
            }
        };

        let role = extract_role(&persisted.auth_data);
        if role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(ADMIN_ROLE))
        {
            info!(name: "session.restore.admin", "Administrative sessions are not restored");
            self.clear_storage().await;
            return AuthSession::signed_out();
        }

        let token = persisted
            .token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| extract_token(&persisted.auth_data));
        match token {
            Some(token) => {
                info!(name: "session.restored", "Persisted session restored");
                AuthSession::signed_in(token, role)
            }
            None => {
                self.clear_storage().await;
                AuthSession::signed_out()
            }
        }
    }

    /// Explicit sign-out.
    pub async fn logout(&self) {
        self.replace(AuthSession::signed_out());
        self.clear_storage().await;
        info!(name: "session.logout", "Session ended");
    }

    /// Central 401 handling: drop the session whichever domain saw it.
    pub async fn expire(&self) {
        let was_authenticated = self.is_authenticated();
        self.replace(AuthSession::signed_out());
        self.clear_storage().await;
        if was_authenticated {
            warn!(name: "session.expired", "Server rejected the token; session cleared");
        }
    }

    fn replace(&self, next: AuthSession) {
        let mut ended = false;
        self.inner.state.send_if_modified(|current| {
            if *current.state == next {
                return false;
            }
            ended = current.state.is_authenticated && !next.is_authenticated;
            current.version += 1;
            current.state = Arc::new(next);
            true
        });
        if ended {
            self.run_signed_out_hooks();
        }
    }

    fn run_signed_out_hooks(&self) {
        // Hooks run outside the lock.
        let hooks: Vec<SignedOutHook> = self
            .inner
            .on_signed_out
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for hook in hooks {
            hook();
        }
    }

    async fn clear_storage(&self) {
        if let Err(e) = self.inner.storage.remove(&self.inner.key).await {
            warn!(name: "session.clear_failed", error = %e, "Could not delete persisted session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;
    use serde_json::json;

    fn holder() -> (SessionHolder, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let holder = SessionHolder::new(storage.clone(), DEFAULT_SESSION_KEY);
        (holder, storage)
    }

    #[tokio::test]
    async fn test_initial_state_is_loading() {
        let (holder, _) = holder();
        let current = holder.current();
        assert!(current.is_loading);
        assert!(!current.is_authenticated);

        let restored = holder.restore_session().await;
        assert!(!restored.is_loading);
        assert!(!restored.is_authenticated);
    }

    #[tokio::test]
    async fn test_login_persists_token_and_auth_data() {
        let (holder, storage) = holder();
        let token = holder
            .login(&json!({"access_token": "tok-1", "role": "employee"}))
            .await
            .unwrap();
        assert_eq!(token, "tok-1");
        assert!(holder.is_authenticated());

        let raw = storage.load(DEFAULT_SESSION_KEY).await.unwrap().unwrap();
        let persisted: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted["token"], "tok-1");
        assert_eq!(persisted["authData"]["role"], "employee");
    }

    #[tokio::test]
    async fn test_login_without_token_is_rejected() {
        let (holder, _) = holder();
        let err = holder.login(&json!({"message": "ok"})).await.unwrap_err();
        assert!(matches!(err, PortalError::MissingToken));
        assert!(!holder.is_authenticated());
    }

    #[tokio::test]
    async fn test_signed_out_hooks_fire_once_per_ended_session() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let (holder, _) = holder();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        holder.on_signed_out(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        holder.expire().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        holder.login(&json!({"token": "t"})).await.unwrap();
        holder.expire().await;
        holder.expire().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        holder.login(&json!({"token": "t"})).await.unwrap();
        holder.logout().await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_cleared() {
        let (holder, storage) = holder();
        storage.save(DEFAULT_SESSION_KEY, "{not json").await.unwrap();

        let restored = holder.restore_session().await;
        assert!(!restored.is_authenticated);
        assert!(!restored.is_loading);
        assert_eq!(storage.load(DEFAULT_SESSION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expire_clears_session() {
        let (holder, storage) = holder();
        holder.login(&json!({"token": "t"})).await.unwrap();
        holder.expire().await;
        assert!(!holder.is_authenticated());
        assert_eq!(holder.token(), None);
        assert_eq!(storage.load(DEFAULT_SESSION_KEY).await.unwrap(), None);
    }
}
