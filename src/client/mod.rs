//! HTTP client for the student-management backend.
//!
//! A single configured `reqwest` client with a base URL and a swappable set of
//! default headers. The session store keeps the `Authorization` entry in step
//! with the current token; every request sent afterwards carries it.

pub mod error;

pub use error::{ApiError, ErrorResponse, Failure};

use arc_swap::ArcSwap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;

/// Per-request overrides merged on top of the default headers
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    default_headers: ArcSwap<HeaderMap>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("studentdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            default_headers: ArcSwap::from_pointee(HeaderMap::new()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Current value of the default `Authorization` header, if any
    pub fn authorization(&self) -> Option<String> {
        self.default_headers
            .load()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Send `Authorization: Bearer <token>` on every following request
    pub fn set_authorization(&self, token: &str) -> Result<(), ApiError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidRequest("token is not a valid header value".into()))?;
        value.set_sensitive(true);

        self.default_headers.rcu(|current| {
            let mut next = HeaderMap::clone(current);
            next.insert(AUTHORIZATION, value.clone());
            next
        });
        Ok(())
    }

    pub fn clear_authorization(&self) {
        self.default_headers.rcu(|current| {
            let mut next = HeaderMap::clone(current);
            next.remove(AUTHORIZATION);
            next
        });
    }

    fn headers_with(&self, options: &RequestOptions) -> HeaderMap {
        let mut headers = HeaderMap::clone(&self.default_headers.load());
        for (name, value) in options.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    fn builder(&self, method: Method, path: &str, options: &RequestOptions) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, self.url(path))
            .headers(self.headers_with(options));
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }

    /// Send a request with an optional JSON body and decode the JSON answer
    pub async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut builder = self.builder(method.clone(), path, &options);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(&method, path, builder).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None::<&()>, RequestOptions::default())
            .await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body), RequestOptions::default())
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(body), RequestOptions::default())
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, path, None::<&()>, RequestOptions::default())
            .await
    }

    /// POST a multipart form. The content type and boundary are set by reqwest.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let builder = self.builder(Method::POST, path, &options).multipart(form);
        self.execute(&Method::POST, path, builder).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: &Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(%method, path, error = %e, "API request failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "API request");

        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(ApiError::from_response(status, &body));
        }

        decode(&body)
    }
}

/// Decode a success body. An empty body is treated as JSON `null`.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}
