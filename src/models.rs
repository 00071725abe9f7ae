//! Wire types exchanged with the student-management backend.

use serde::{Deserialize, Serialize};

/// Authenticated staff member as returned by `POST /tokens`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Body for `POST /users` and `PUT /users`.
///
/// On update an empty password is omitted so the backend keeps the old one.
#[derive(Debug, Clone, Serialize)]
pub struct UserPayload {
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub id: Option<i64>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub age: i64,
    pub weight: f64,
    pub height: f64,
    #[serde(rename = "Photos", alias = "photos", default)]
    pub photos: Vec<Photo>,
}

impl Student {
    /// Only the first photo is ever displayed
    pub fn photo_url(&self) -> Option<&str> {
        self.photos.first().map(|p| p.url.as_str())
    }
}

/// Body for `POST /students` and `PUT /students/:id`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentPayload {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub age: i64,
    pub weight: f64,
    pub height: f64,
}
