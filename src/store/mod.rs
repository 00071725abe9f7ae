//! The auth slice and the session context that owns it.
//!
//! `SessionContext::dispatch` is the only way to change the session. After
//! every reduction it brings the client's `Authorization` header and the
//! session file in line with the new state, so the header is `Bearer <token>`
//! exactly when the slice holds a token.

pub mod actions;
pub mod persist;

pub use actions::{AuthAction, LoginIntent, RegisterIntent};
pub use persist::{PersistedState, SessionFile, SessionStoreError};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::models::User;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    #[serde(default)]
    pub is_logged_in: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(skip)]
    pub is_loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

impl AuthState {
    pub fn phase(&self) -> SessionPhase {
        match (self.is_logged_in, self.is_loading) {
            (true, _) => SessionPhase::Authenticated,
            (false, true) => SessionPhase::Authenticating,
            (false, false) => SessionPhase::Anonymous,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    /// Fields that are written to disk
    fn persisted(&self) -> (bool, Option<&str>, Option<&User>) {
        (self.is_logged_in, self.token.as_deref(), self.user.as_ref())
    }
}

/// Pure reducer for the auth slice
pub fn reduce(state: &AuthState, action: &AuthAction) -> AuthState {
    match action {
        AuthAction::LoginRequest(_) | AuthAction::RegisterRequest(_) => AuthState {
            is_loading: true,
            ..state.clone()
        },
        AuthAction::LoginSuccess { token, user } => AuthState {
            is_logged_in: true,
            token: Some(token.clone()),
            user: Some(user.clone()),
            is_loading: false,
        },
        AuthAction::LoginFailure | AuthAction::Logout => AuthState::default(),
        AuthAction::RegisterUpdatedSuccess { name, email } => {
            let mut next = state.clone();
            if let Some(user) = next.user.as_mut() {
                user.name = name.clone();
                user.email = email.clone();
            }
            next.is_loading = false;
            next
        }
        AuthAction::RegisterCreatedSuccess | AuthAction::RegisterFailure => AuthState {
            is_loading: false,
            ..state.clone()
        },
        AuthAction::PersistRehydrate(Some(snapshot)) if snapshot.token().is_some() => AuthState {
            is_logged_in: true,
            is_loading: false,
            ..snapshot.auth.clone()
        },
        AuthAction::PersistRehydrate(_) => state.clone(),
    }
}

pub struct SessionContext {
    state: RwLock<AuthState>,
    client: Arc<ApiClient>,
    file: Option<SessionFile>,
    file_lock: Mutex<()>,
}

impl SessionContext {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            state: RwLock::new(AuthState::default()),
            client,
            file: None,
            file_lock: Mutex::new(()),
        }
    }

    /// Persist the slice to `file` after every change
    pub fn with_file(mut self, file: SessionFile) -> Self {
        self.file = Some(file);
        self
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn file(&self) -> Option<&SessionFile> {
        self.file.as_ref()
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.read().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.read().phase()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.read().is_logged_in
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    /// Apply `action` and return the resulting state.
    ///
    /// A token that cannot be sent as a header ends the session instead of
    /// being kept without one.
    pub fn dispatch(&self, action: &AuthAction) -> AuthState {
        let mut state = self.state.write();
        let mut next = reduce(&state, action);
        if !self.sync_authorization(&next) {
            next = reduce(&next, &AuthAction::LoginFailure);
        }
        let changed_on_disk = state.persisted() != next.persisted();
        *state = next.clone();

        // File writes happen outside the state lock, in dispatch order
        let file_guard = changed_on_disk.then(|| self.file_lock.lock());
        drop(state);
        if file_guard.is_some() {
            self.persist(&next);
        }

        debug!(action = %action, phase = ?next.phase(), "Auth action dispatched");
        next
    }

    /// Point the client's `Authorization` header at the state's token.
    /// Returns false if the token was rejected as a header value.
    fn sync_authorization(&self, state: &AuthState) -> bool {
        match state.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => match self.client.set_authorization(token) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Dropping unusable session token");
                    self.client.clear_authorization();
                    false
                }
            },
            None => {
                self.client.clear_authorization();
                true
            }
        }
    }

    fn persist(&self, state: &AuthState) {
        let Some(file) = &self.file else {
            return;
        };

        let result = if state.is_logged_in {
            file.save(&PersistedState {
                auth: state.clone(),
            })
        } else {
            file.clear()
        };

        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session");
        }
    }
}
