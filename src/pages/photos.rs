use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use super::{end_session_if_unauthorized, LoadingFlag, Outcome};
use crate::client::{ApiError, RequestOptions};
use crate::models::{Photo, Student};
use crate::navigation::routes;
use crate::AppState;

/// Profile photo of one student
pub struct PhotosPage {
    app: Arc<AppState>,
    student_id: i64,
    photo: Option<String>,
    loading: LoadingFlag,
}

impl PhotosPage {
    pub fn new(app: Arc<AppState>, student_id: i64) -> Self {
        Self {
            app,
            student_id,
            photo: None,
            loading: LoadingFlag::default(),
        }
    }

    pub fn student_id(&self) -> i64 {
        self.student_id
    }

    /// Current photo: the stored URL, or the local file while it uploads
    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }

    pub async fn load(&mut self) -> Outcome {
        let _loading = self.loading.start();
        let result: Result<Student, ApiError> = self
            .app
            .client()
            .get(&format!("/students/{}", self.student_id))
            .await;

        match result {
            Ok(student) => {
                self.photo = student.photo_url().map(str::to_string);
                Outcome::Done
            }
            Err(e) => {
                info!(student_id = self.student_id, error = %e, "Failed to load photo");
                self.app.notifier.error("Error to get the image");
                if !end_session_if_unauthorized(&self.app, &e) {
                    self.app.navigator.push(routes::HOME);
                }
                Outcome::Failed
            }
        }
    }

    /// Read `path` from disk and upload it
    pub async fn upload(&mut self, path: &Path) -> Outcome {
        let bytes = match tokio::fs::read(path).await {
            Ok(b) => b,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read photo");
                self.app.notifier.error("Error to send the photo");
                return Outcome::Failed;
            }
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());

        self.photo = Some(path.display().to_string());
        self.upload_bytes(&file_name, bytes).await
    }

    /// Upload `bytes` as multipart `{student_id, photo}`
    pub async fn upload_bytes(&mut self, file_name: &str, bytes: Vec<u8>) -> Outcome {
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let part = match Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime.as_ref())
        {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Unusable photo content type");
                self.app.notifier.error("Error to send the photo");
                return Outcome::Failed;
            }
        };

        let form = Form::new()
            .text("student_id", self.student_id.to_string())
            .part("photo", part);

        let options = RequestOptions::default()
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .timeout(self.app.config.api.upload_timeout());

        let _loading = self.loading.start();
        let result: Result<Photo, ApiError> = self
            .app
            .client()
            .post_multipart("/photos", form, options)
            .await;

        match result {
            Ok(photo) => {
                info!(student_id = self.student_id, url = %photo.url, "Photo uploaded");
                self.photo = Some(photo.url);
                self.app.notifier.success("Photo sent successfully!");
                Outcome::Done
            }
            Err(e) => {
                self.app.notifier.error("Error to send the photo");
                end_session_if_unauthorized(&self.app, &e);
                Outcome::Failed
            }
        }
    }
}
