//! HTTP implementation of [`InterviewBackend`].
//!
//! Form-encoded request bodies, JSON responses, bearer authentication.
//! Status codes are mapped onto `IcpError` variants here so the controller
//! only deals with domain errors.

use async_trait::async_trait;
use icp_core::config::Settings;
use icp_core::error::{IcpError, Result};
use icp_core::session::{
    AttemptQuota, InterviewBackend, RemoteSession, ReplyOutcome, StartRequest, StartedSession,
    TokenSource,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::dto::{
    EndResponse, LimitsResponse, ReplyResponse, SessionResponse, StartResponse, error_detail,
};

/// Talks to the interview REST endpoints.
#[derive(Clone)]
pub struct HttpInterviewBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
    default_questions: u32,
    tokens: Arc<dyn TokenSource>,
}

impl HttpInterviewBackend {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenSource>) -> Self {
        let defaults = Settings::default();
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: defaults.request_timeout(),
            default_questions: defaults.default_questions,
            tokens,
        }
    }

    pub fn from_settings(settings: &Settings, tokens: Arc<dyn TokenSource>) -> Self {
        Self::new(settings.api_base_url.clone(), tokens)
            .with_timeout(settings.request_timeout())
            .with_default_questions(settings.default_questions)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_default_questions(mut self, questions: u32) -> Self {
        self.default_questions = questions;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds an endpoint URL. Each segment is percent-encoded, so a
    /// session id can never reshape the path or add a query.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            IcpError::config(format!("Invalid API base URL {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                IcpError::config(format!("API base URL cannot hold a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(["api", "interview"])
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.timeout(self.timeout);
        match self.tokens.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| IcpError::Network(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_http_error(status, &body))
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = self.send(request, what).await?;
        let status = response.status();
        response.json::<T>().await.map_err(|e| {
            IcpError::backend(
                status.as_u16(),
                format!("Failed to parse {} response: {}", what, e),
            )
        })
    }
}

/// Maps a non-success status onto the error taxonomy.
pub fn map_http_error(status: StatusCode, body: &str) -> IcpError {
    let detail = error_detail(body);
    match status {
        StatusCode::UNAUTHORIZED => IcpError::Unauthorized(detail),
        StatusCode::TOO_MANY_REQUESTS => IcpError::RateLimited(detail),
        _ => IcpError::backend(status.as_u16(), detail),
    }
}

#[async_trait]
impl InterviewBackend for HttpInterviewBackend {
    async fn attempt_limits(&self) -> Result<AttemptQuota> {
        let response: LimitsResponse = self
            .json(self.client.get(self.url(&["limits"])?), "limits")
            .await?;
        Ok(response.into())
    }

    async fn start_session(&self, request: &StartRequest) -> Result<StartedSession> {
        let mut form = vec![
            ("difficulty", request.difficulty.to_string()),
            ("questions_limit", request.questions_limit.to_string()),
        ];
        if let Some(job_title) = request.job_title.as_ref().filter(|t| !t.is_empty()) {
            form.push(("job_title", job_title.clone()));
        }
        if let Some(feedback) = request.resume_feedback.as_ref().filter(|f| !f.is_empty()) {
            form.push(("resume_feedback", feedback.clone()));
        }

        tracing::debug!(
            "[HttpInterviewBackend] Starting session: difficulty={}, questions={}",
            request.difficulty,
            request.questions_limit
        );
        let response: StartResponse = self
            .json(self.client.post(self.url(&["start"])?).form(&form), "start")
            .await?;
        response.try_into()
    }

    async fn reply(&self, session_id: &str, user_text: &str) -> Result<ReplyOutcome> {
        let url = self.url(&[session_id, "reply"])?;
        let response: ReplyResponse = self
            .json(
                self.client.post(url).form(&[("user_text", user_text)]),
                "reply",
            )
            .await?;
        Ok(response.into())
    }

    async fn end_session(&self, session_id: &str) -> Result<Option<String>> {
        let url = self.url(&[session_id, "end"])?;
        let response: EndResponse = self.json(self.client.post(url), "end").await?;
        Ok(response.into_message())
    }

    async fn fetch_session(&self, session_id: &str) -> Result<RemoteSession> {
        let url = self.url(&[session_id])?;
        let response: SessionResponse = self.json(self.client.get(url), "session").await?;
        Ok(response.into_remote(session_id, self.default_questions))
    }
}
