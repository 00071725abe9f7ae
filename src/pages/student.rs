use reqwest::StatusCode;
use std::sync::Arc;
use tracing::info;

use super::{end_session_if_unauthorized, LoadingFlag, Outcome};
use crate::client::ApiError;
use crate::models::{Student, StudentPayload};
use crate::navigation::routes;
use crate::validation::{self, FormErrors};
use crate::AppState;

/// Raw field values as typed by the user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentForm {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub age: String,
    pub weight: String,
    pub height: String,
}

impl StudentForm {
    fn fill(&mut self, student: &Student) {
        self.name = student.name.clone();
        self.surname = student.surname.clone();
        self.email = student.email.clone();
        self.age = student.age.to_string();
        self.weight = student.weight.to_string();
        self.height = student.height.to_string();
    }

    /// Run every rule; on success return the payload to send
    pub fn validate(&self) -> (FormErrors, Option<StudentPayload>) {
        let mut form = FormErrors::new();
        form.check(validation::validate_name(&self.name, "Name"));
        form.check(validation::validate_name(&self.surname, "Surname"));
        form.check(validation::validate_email(&self.email, "Invalid email"));
        let age = form.check(validation::validate_int(&self.age, "Invalid age"));
        let weight = form.check(validation::validate_float(&self.weight, "Invalid weight"));
        let height = form.check(validation::validate_float(&self.height, "Invalid height"));

        let payload = match (age, weight, height) {
            (Some(age), Some(weight), Some(height)) if form.is_empty() => Some(StudentPayload {
                name: self.name.clone(),
                surname: self.surname.clone(),
                email: self.email.clone(),
                age,
                weight,
                height,
            }),
            _ => None,
        };
        (form, payload)
    }
}

/// Create or edit a single student
pub struct StudentPage {
    app: Arc<AppState>,
    id: Option<i64>,
    pub form: StudentForm,
    photo: Option<String>,
    loading: LoadingFlag,
}

impl StudentPage {
    pub fn new(app: Arc<AppState>) -> Self {
        Self {
            app,
            id: None,
            form: StudentForm::default(),
            photo: None,
            loading: LoadingFlag::default(),
        }
    }

    pub fn edit(app: Arc<AppState>, id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::new(app)
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn title(&self) -> &'static str {
        if self.id.is_some() {
            "Edit Student"
        } else {
            "New Student"
        }
    }

    /// URL of the profile picture shown in edit mode
    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }

    /// Fetch the student being edited. Nothing to do on the create page.
    pub async fn load(&mut self) -> Outcome {
        let Some(id) = self.id else {
            return Outcome::Skipped;
        };

        let _loading = self.loading.start();
        let result: Result<Student, ApiError> =
            self.app.client().get(&format!("/students/{}", id)).await;

        match result {
            Ok(student) => {
                self.photo = student.photo_url().map(str::to_string);
                self.form.fill(&student);
                Outcome::Done
            }
            Err(e) => {
                info!(student_id = id, error = %e, "Failed to load student");
                if e.status() == Some(StatusCode::BAD_REQUEST) {
                    for message in e.errors() {
                        self.app.notifier.error(message);
                    }
                }
                if !end_session_if_unauthorized(&self.app, &e) {
                    self.app.navigator.push(routes::HOME);
                }
                Outcome::Failed
            }
        }
    }

    pub async fn submit(&mut self) -> Outcome {
        let (errors, payload) = self.form.validate();
        if let Err(errors) = errors.finish(self.app.notifier.as_ref()) {
            return Outcome::Invalid(errors);
        }
        let Some(payload) = payload else {
            return Outcome::Skipped;
        };

        let _loading = self.loading.start();
        let client = self.app.client();

        let result = match self.id {
            Some(id) => client
                .put::<_, serde_json::Value>(&format!("/students/{}", id), &payload)
                .await
                .map(|_| None),
            None => client
                .post::<_, Student>("/students", &payload)
                .await
                .map(|created| Some(created.id)),
        };

        match result {
            Ok(None) => {
                self.app.notifier.success("Student data edited successfully");
                Outcome::Done
            }
            Ok(Some(created)) => {
                self.app.notifier.success("Student created successfully");
                self.id = Some(created);
                self.app.navigator.push(routes::student_edit(created));
                Outcome::Done
            }
            Err(e) => {
                if e.errors().is_empty() {
                    self.app.notifier.error("An unknown error has occurred!");
                } else {
                    for message in e.errors() {
                        self.app.notifier.error(message);
                    }
                }
                end_session_if_unauthorized(&self.app, &e);
                Outcome::Failed
            }
        }
    }
}
