use std::sync::Arc;

use super::Outcome;
use crate::store::{AuthAction, RegisterIntent};
use crate::validation::{self, FormErrors};
use crate::AppState;

/// Account form: creates an account, or edits the logged-in user's own
pub struct RegisterPage {
    app: Arc<AppState>,
    id: Option<i64>,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterPage {
    /// Prefilled from the session when someone is logged in
    pub fn new(app: Arc<AppState>) -> Self {
        let user = app.session.user().filter(|_| app.session.is_logged_in());
        Self {
            id: user.as_ref().map(|u| u.id),
            name: user.as_ref().map(|u| u.name.clone()).unwrap_or_default(),
            email: user.map(|u| u.email).unwrap_or_default(),
            password: String::new(),
            app,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn is_editing(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.app.session.snapshot().is_loading
    }

    fn validate(&self) -> FormErrors {
        let mut form = FormErrors::new();
        form.check(validation::validate_name(&self.name, "Name"));
        form.check(validation::validate_email(&self.email, "Email invalid"));
        // Editing without typing a password keeps the current one
        if !self.is_editing() || !self.password.is_empty() {
            form.check(validation::validate_password(&self.password));
        }
        form
    }

    pub async fn submit(&mut self) -> Outcome {
        if let Err(errors) = self.validate().finish(self.app.notifier.as_ref()) {
            return Outcome::Invalid(errors);
        }

        let intent = RegisterIntent {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            password: std::mem::take(&mut self.password),
        };
        self.app
            .dispatch(AuthAction::register_request(intent))
            .await
            .into()
    }
}
