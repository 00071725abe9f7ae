use std::fmt;

use super::persist::PersistedState;
use crate::models::User;
use crate::navigation::routes;

/// Input of the login intent
#[derive(Debug, Clone)]
pub struct LoginIntent {
    pub email: String,
    pub password: String,
    /// Where to go after a successful login
    pub return_path: String,
}

impl LoginIntent {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            return_path: routes::HOME.to_string(),
        }
    }

    pub fn returning_to(mut self, path: impl Into<String>) -> Self {
        self.return_path = path.into();
        self
    }
}

/// Input of the register intent. An id means "update my account".
#[derive(Debug, Clone, Default)]
pub struct RegisterIntent {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub enum AuthAction {
    LoginRequest(LoginIntent),
    LoginSuccess { token: String, user: User },
    LoginFailure,
    RegisterRequest(RegisterIntent),
    RegisterUpdatedSuccess { name: String, email: String },
    RegisterCreatedSuccess,
    RegisterFailure,
    PersistRehydrate(Option<PersistedState>),
    Logout,
}

impl AuthAction {
    pub fn login_request(intent: LoginIntent) -> Self {
        AuthAction::LoginRequest(intent)
    }

    pub fn register_request(intent: RegisterIntent) -> Self {
        AuthAction::RegisterRequest(intent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthAction::LoginRequest(_) => "LOGIN_REQUEST",
            AuthAction::LoginSuccess { .. } => "LOGIN_SUCCESS",
            AuthAction::LoginFailure => "LOGIN_FAILURE",
            AuthAction::RegisterRequest(_) => "REGISTER_REQUEST",
            AuthAction::RegisterUpdatedSuccess { .. } => "REGISTER_UPDATED_SUCCESS",
            AuthAction::RegisterCreatedSuccess => "REGISTER_CREATED_SUCCESS",
            AuthAction::RegisterFailure => "REGISTER_FAILURE",
            AuthAction::PersistRehydrate(_) => "persist/REHYDRATE",
            AuthAction::Logout => "LOGOUT",
        }
    }
}

impl fmt::Display for AuthAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
