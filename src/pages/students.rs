use std::sync::Arc;
use tracing::info;

use super::{end_session_if_unauthorized, LoadingFlag, Outcome};
use crate::client::ApiError;
use crate::models::Student;
use crate::AppState;

/// Student list with a two-step delete: `ask_delete` arms, `confirm_delete` sends
pub struct StudentsPage {
    app: Arc<AppState>,
    students: Vec<Student>,
    pending_delete: Option<usize>,
    loading: LoadingFlag,
}

impl StudentsPage {
    pub fn new(app: Arc<AppState>) -> Self {
        Self {
            app,
            students: Vec::new(),
            pending_delete: None,
            loading: LoadingFlag::default(),
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }

    pub async fn load(&mut self) -> Outcome {
        let _loading = self.loading.start();
        let result: Result<Vec<Student>, ApiError> = self.app.client().get("/students").await;

        match result {
            Ok(students) => {
                self.students = students;
                self.pending_delete = None;
                Outcome::Done
            }
            Err(e) => {
                if end_session_if_unauthorized(&self.app, &e) {
                    self.app.notifier.error("You need to login");
                } else {
                    info!(error = %e, "Failed to load students");
                    self.app.notifier.error("Error loading students");
                }
                Outcome::Failed
            }
        }
    }

    /// First step of a delete. Returns false if `index` is not in the list.
    pub fn ask_delete(&mut self, index: usize) -> bool {
        if index >= self.students.len() {
            return false;
        }
        self.pending_delete = Some(index);
        true
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Student awaiting confirmation, if any
    pub fn pending_delete(&self) -> Option<&Student> {
        self.pending_delete.and_then(|i| self.students.get(i))
    }

    /// Second step: delete the armed student and splice it out of the list
    pub async fn confirm_delete(&mut self) -> Outcome {
        let Some(index) = self.pending_delete.take() else {
            return Outcome::Skipped;
        };
        let Some(id) = self.students.get(index).map(|s| s.id) else {
            return Outcome::Skipped;
        };

        let _loading = self.loading.start();
        let result: Result<serde_json::Value, ApiError> = self
            .app
            .client()
            .delete(&format!("/students/{}", id))
            .await;

        match result {
            Ok(_) => {
                self.students.remove(index);
                info!(student_id = id, "Student deleted");
                Outcome::Done
            }
            Err(e) => {
                if end_session_if_unauthorized(&self.app, &e) {
                    self.app.notifier.error("You need to login");
                } else {
                    self.app
                        .notifier
                        .error("An error has occurred to delete the student.");
                }
                Outcome::Failed
            }
        }
    }
}
