//! Effect handlers for the auth intents.
//!
//! Each handler runs a single call/success/failure sequence: talk to the
//! backend, then dispatch into the session context, notify and navigate.
//! Login and register are "latest wins": every dispatch takes a ticket from
//! that intent's generation counter, and a handler whose ticket went stale
//! while it was waiting on the network drops its result. The stale request
//! itself still runs to completion.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::{ApiError, Failure};
use crate::models::{LoginRequest, LoginResponse, UserPayload};
use crate::navigation::{routes, Navigator};
use crate::notify::Notifier;
use crate::store::{AuthAction, LoginIntent, PersistedState, RegisterIntent, SessionContext};

/// Generation counter for one intent type
#[derive(Debug, Default)]
pub struct Latest {
    generation: AtomicU64,
}

impl Latest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run, superseding any run still in flight
    pub fn begin(&self) -> Ticket<'_> {
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { latest: self, id }
    }
}

#[derive(Debug)]
pub struct Ticket<'a> {
    latest: &'a Latest,
    id: u64,
}

impl Ticket<'_> {
    pub fn is_current(&self) -> bool {
        self.latest.generation.load(Ordering::SeqCst) == self.id
    }
}

/// What happened to a dispatched action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectOutcome {
    /// The handler ran and its success path was taken
    Done,
    /// The handler ran and its failure path was taken
    Failed,
    /// A newer dispatch of the same intent took over; the result was dropped
    Superseded,
    /// Nothing to do (for example rehydrating without a token)
    Skipped,
}

pub struct AuthEffects {
    session: Arc<SessionContext>,
    navigator: Arc<Navigator>,
    notifier: Arc<dyn Notifier>,
    login: Latest,
    register: Latest,
}

impl AuthEffects {
    pub fn new(
        session: Arc<SessionContext>,
        navigator: Arc<Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            navigator,
            notifier,
            login: Latest::new(),
            register: Latest::new(),
        }
    }

    /// Route an action to its handler. Plain actions are only reduced.
    pub async fn dispatch(&self, action: AuthAction) -> EffectOutcome {
        match action {
            AuthAction::LoginRequest(intent) => self.login(intent).await,
            AuthAction::RegisterRequest(intent) => self.register(intent).await,
            AuthAction::PersistRehydrate(snapshot) => self.rehydrate(snapshot),
            AuthAction::Logout => self.logout(),
            other => {
                self.session.dispatch(&other);
                EffectOutcome::Done
            }
        }
    }

    pub async fn login(&self, intent: LoginIntent) -> EffectOutcome {
        let ticket = self.login.begin();
        self.session
            .dispatch(&AuthAction::LoginRequest(intent.clone()));

        let payload = LoginRequest {
            email: intent.email.clone(),
            password: intent.password.clone(),
        };
        let result: Result<LoginResponse, ApiError> =
            self.session.client().post("/tokens", &payload).await;

        if !ticket.is_current() {
            debug!(email = %intent.email, "Login superseded by a newer request");
            return EffectOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                let user_id = response.user.id;
                let state = self.session.dispatch(&AuthAction::LoginSuccess {
                    token: response.token,
                    user: response.user,
                });
                if !state.is_logged_in {
                    self.notifier.error("Invalid credentials");
                    return EffectOutcome::Failed;
                }
                info!(user_id, "Logged in");
                self.notifier.success("Logged in successfully");
                self.navigator.push(intent.return_path);
                EffectOutcome::Done
            }
            Err(e) => {
                info!(error = %e, "Login rejected");
                self.notifier.error("Invalid credentials");
                self.session.dispatch(&AuthAction::LoginFailure);
                EffectOutcome::Failed
            }
        }
    }

    /// Restore a persisted session without a network round trip
    pub fn rehydrate(&self, snapshot: Option<PersistedState>) -> EffectOutcome {
        let has_token = snapshot.as_ref().and_then(|s| s.token()).is_some();
        if !has_token {
            return EffectOutcome::Skipped;
        }

        let state = self
            .session
            .dispatch(&AuthAction::PersistRehydrate(snapshot));
        if !state.is_logged_in {
            return EffectOutcome::Failed;
        }
        debug!("Session rehydrated");
        EffectOutcome::Done
    }

    pub async fn register(&self, intent: RegisterIntent) -> EffectOutcome {
        let ticket = self.register.begin();
        self.session
            .dispatch(&AuthAction::RegisterRequest(intent.clone()));

        let client = self.session.client();
        let result: Result<serde_json::Value, ApiError> = match intent.id {
            Some(_) => {
                let payload = UserPayload {
                    email: intent.email.clone(),
                    name: intent.name.clone(),
                    password: Some(intent.password.clone()).filter(|p| !p.is_empty()),
                };
                client.put("/users", &payload).await
            }
            None => {
                let payload = UserPayload {
                    email: intent.email.clone(),
                    name: intent.name.clone(),
                    password: Some(intent.password.clone()),
                };
                client.post("/users", &payload).await
            }
        };

        if !ticket.is_current() {
            debug!(email = %intent.email, "Registration superseded by a newer request");
            return EffectOutcome::Superseded;
        }

        match result {
            Ok(_) if intent.id.is_some() => {
                self.notifier.success("Your data was updated successfully");
                self.session.dispatch(&AuthAction::RegisterUpdatedSuccess {
                    name: intent.name,
                    email: intent.email,
                });
                EffectOutcome::Done
            }
            Ok(_) => {
                self.notifier.success("Your account was created successfully");
                self.session.dispatch(&AuthAction::RegisterCreatedSuccess);
                self.navigator.push(routes::LOGIN);
                EffectOutcome::Done
            }
            Err(e) => {
                self.register_failed(&e);
                EffectOutcome::Failed
            }
        }
    }

    fn register_failed(&self, error: &ApiError) {
        match error.failure() {
            Failure::Unauthorized => {
                warn!("Session expired during account update");
                self.notifier.error("You need to login again");
                self.session.dispatch(&AuthAction::LoginFailure);
                self.navigator.push(routes::LOGIN);
                return;
            }
            Failure::Rejected(errors) => {
                for message in &errors {
                    self.notifier.error(message);
                }
            }
            Failure::Unknown => {
                info!(error = %error, "Registration failed");
                self.notifier.error("Something went wrong");
            }
        }

        self.session.dispatch(&AuthAction::RegisterFailure);
    }

    pub fn logout(&self) -> EffectOutcome {
        if !self.session.is_logged_in() {
            return EffectOutcome::Skipped;
        }

        self.session.dispatch(&AuthAction::Logout);
        self.notifier.success("Logged out");
        self.navigator.push(routes::LOGIN);
        EffectOutcome::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClient;
    use crate::config::ApiConfig;
    use crate::models::User;
    use crate::notify::ToastLog;
    use crate::store::AuthState;

    fn effects() -> (AuthEffects, Arc<SessionContext>, Arc<Navigator>, Arc<ToastLog>) {
        let client = Arc::new(ApiClient::new(&ApiConfig::default()).unwrap());
        let session = Arc::new(SessionContext::new(client));
        let navigator = Arc::new(Navigator::new());
        let toasts = Arc::new(ToastLog::new());
        let effects = AuthEffects::new(session.clone(), navigator.clone(), toasts.clone());
        (effects, session, navigator, toasts)
    }

    fn snapshot(token: &str) -> PersistedState {
        PersistedState {
            auth: AuthState {
                is_logged_in: true,
                token: Some(token.to_string()),
                user: Some(User {
                    id: 4,
                    name: "Ana".to_string(),
                    email: "ana@b.com".to_string(),
                }),
                is_loading: false,
            },
        }
    }

    #[test]
    fn test_latest_ticket_supersedes_older() {
        let latest = Latest::new();
        let first = latest.begin();
        assert!(first.is_current());

        let second = latest.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
    }

    #[test]
    fn test_rehydrate_sets_header_from_snapshot() {
        let (effects, session, _, _) = effects();
        assert_eq!(effects.rehydrate(Some(snapshot("xyz"))), EffectOutcome::Done);
        assert_eq!(session.client().authorization().as_deref(), Some("Bearer xyz"));
        assert_eq!(session.user().unwrap().id, 4);
    }

    #[test]
    fn test_rehydrate_without_token_is_noop() {
        let (effects, session, _, _) = effects();
        session.client().set_authorization("kept").unwrap();

        assert_eq!(effects.rehydrate(None), EffectOutcome::Skipped);
        assert_eq!(
            effects.rehydrate(Some(PersistedState::default())),
            EffectOutcome::Skipped
        );
        assert_eq!(session.client().authorization().as_deref(), Some("Bearer kept"));
    }

    #[test]
    fn test_logout_clears_session_and_navigates() {
        let (effects, session, navigator, toasts) = effects();
        effects.rehydrate(Some(snapshot("xyz")));

        assert_eq!(effects.logout(), EffectOutcome::Done);
        assert!(!session.is_logged_in());
        assert_eq!(session.client().authorization(), None);
        assert_eq!(navigator.current(), "/login");
        assert_eq!(toasts.successes(), vec!["Logged out"]);

        assert_eq!(effects.logout(), EffectOutcome::Skipped);
    }

    #[test]
    fn test_rehydrate_with_unusable_token_fails() {
        let (effects, session, _, _) = effects();
        assert_eq!(effects.rehydrate(Some(snapshot("bad\ntoken"))), EffectOutcome::Failed);
        assert!(!session.is_logged_in());
        assert_eq!(session.client().authorization(), None);
    }
}
