use std::sync::Arc;

use super::Outcome;
use crate::navigation::routes;
use crate::store::{AuthAction, LoginIntent};
use crate::validation::{self, FormErrors};
use crate::AppState;

pub struct LoginPage {
    app: Arc<AppState>,
    pub email: String,
    pub password: String,
    return_path: String,
}

impl LoginPage {
    pub fn new(app: Arc<AppState>) -> Self {
        Self {
            app,
            email: String::new(),
            password: String::new(),
            return_path: routes::HOME.to_string(),
        }
    }

    /// Page the user was sent away from, if any
    pub fn with_return_path(mut self, path: impl Into<String>) -> Self {
        self.return_path = path.into();
        self
    }

    pub fn return_path(&self) -> &str {
        &self.return_path
    }

    pub fn is_loading(&self) -> bool {
        self.app.session.snapshot().is_loading
    }

    fn validate(&self) -> FormErrors {
        let mut form = FormErrors::new();
        form.check(validation::validate_email(&self.email, "Email invalid"));
        form.check(
            validation::validate_length(
                &self.password,
                validation::PASSWORD_MIN,
                validation::PASSWORD_MAX,
                "Invalid credentials",
            ),
        );
        form
    }

    pub async fn submit(&mut self) -> Outcome {
        if let Err(errors) = self.validate().finish(self.app.notifier.as_ref()) {
            return Outcome::Invalid(errors);
        }

        let intent = LoginIntent::new(self.email.clone(), self.password.clone())
            .returning_to(self.return_path.clone());
        self.app
            .dispatch(AuthAction::login_request(intent))
            .await
            .into()
    }
}
