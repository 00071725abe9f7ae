//! Headless page controllers.
//!
//! Each page owns its form fields and a loading flag, validates before it
//! sends anything, and turns every failure into notifications. None of them
//! return network errors to the caller.

pub mod login;
pub mod photos;
pub mod register;
pub mod student;
pub mod students;

pub use login::LoginPage;
pub use photos::PhotosPage;
pub use register::RegisterPage;
pub use student::{StudentForm, StudentPage};
pub use students::StudentsPage;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::client::ApiError;
use crate::effects::EffectOutcome;
use crate::navigation::routes;
use crate::store::AuthAction;
use crate::AppState;

/// Result of a page action, after notifications were sent
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Client-side validation blocked the request
    Invalid(Vec<String>),
    Done,
    Failed,
    /// A newer request of the same kind took over
    Superseded,
    /// Nothing to do
    Skipped,
}

impl From<EffectOutcome> for Outcome {
    fn from(outcome: EffectOutcome) -> Self {
        match outcome {
            EffectOutcome::Done => Outcome::Done,
            EffectOutcome::Failed => Outcome::Failed,
            EffectOutcome::Superseded => Outcome::Superseded,
            EffectOutcome::Skipped => Outcome::Skipped,
        }
    }
}

impl Outcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done)
    }
}

/// Blocking "loading" indicator shared with whatever renders the page
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raise the flag until the returned guard is dropped
    pub fn start(&self) -> LoadingGuard {
        self.0.store(true, Ordering::SeqCst);
        LoadingGuard(self.0.clone())
    }
}

#[must_use = "the flag is lowered when the guard is dropped"]
pub struct LoadingGuard(Arc<AtomicBool>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A 401 from a page call ends the session, same as a failed login, and
/// sends the user to the login page
pub(crate) fn end_session_if_unauthorized(app: &AppState, error: &ApiError) -> bool {
    if error.is_unauthorized() {
        app.session.dispatch(&AuthAction::LoginFailure);
        app.navigator.push(routes::LOGIN);
        return true;
    }
    false
}
