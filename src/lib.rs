pub mod cli;
pub mod client;
pub mod config;
pub mod effects;
pub mod models;
pub mod navigation;
pub mod notify;
pub mod pages;
pub mod store;
pub mod validation;

use std::sync::Arc;
use tracing::warn;

use crate::client::{ApiClient, ApiError};
use crate::config::Config;
use crate::effects::{AuthEffects, EffectOutcome};
use crate::navigation::Navigator;
use crate::notify::Notifier;
use crate::store::{AuthAction, SessionContext, SessionFile};

pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionContext>,
    pub navigator: Arc<Navigator>,
    pub notifier: Arc<dyn Notifier>,
    effects: AuthEffects,
}

impl AppState {
    /// Wire the client, session context and effect handlers together.
    /// The session is persisted to `config.session.file`.
    pub fn new(config: Config, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let client = Arc::new(ApiClient::new(&config.api)?);
        let session = Arc::new(
            SessionContext::new(client).with_file(SessionFile::new(&config.session.file)),
        );
        let navigator = Arc::new(Navigator::new());
        let effects = AuthEffects::new(session.clone(), navigator.clone(), notifier.clone());

        Ok(Self {
            config,
            session,
            navigator,
            notifier,
            effects,
        })
    }

    pub fn client(&self) -> &ApiClient {
        self.session.client()
    }

    /// Reduce `action` and run its effect handler, if it has one
    pub async fn dispatch(&self, action: AuthAction) -> EffectOutcome {
        self.effects.dispatch(action).await
    }

    /// Rehydrate the session saved by a previous run
    pub async fn restore_session(&self) -> EffectOutcome {
        let snapshot = match self.session.file().map(SessionFile::load).transpose() {
            Ok(snapshot) => snapshot.flatten(),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable session file");
                None
            }
        };
        self.dispatch(AuthAction::PersistRehydrate(snapshot)).await
    }
}
