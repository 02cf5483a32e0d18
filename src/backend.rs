use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::errors::{GenerationError, ReportError};
use crate::models::{
    FlashcardSessionReport, GenerationRequest, GenerationResponse, QuizResultReport, Source,
};

/// Maximum number of results the dashboard endpoint returns
pub const DASHBOARD_LIMIT: usize = 100;

/// Produces quiz or flashcard content from a topic or a document
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError>;
}

/// Records quiz scores and flashcard session completions
#[async_trait]
pub trait ResultBackend: Send + Sync {
    async fn submit_quiz_result(&self, report: &QuizResultReport) -> Result<(), ReportError>;

    async fn submit_flashcard_session(
        &self,
        report: &FlashcardSessionReport,
    ) -> Result<(), ReportError>;

    /// Most recent quiz results recorded for a user
    async fn fetch_dashboard(&self, user_id: &str) -> Result<Vec<QuizResultReport>, ReportError>;
}

/// HTTP client for the EduGenie backend, implementing both collaborators
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl HttpBackend {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Health check against `/api/ping`
    pub async fn ping(&self) -> Result<(), reqwest::Error> {
        self.client
            .get(self.endpoint("/api/ping"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn build_form(request: &GenerationRequest) -> Result<Form, reqwest::Error> {
        let form = Form::new()
            .text("mode", request.mode.as_str())
            .text("num_questions", request.item_count.to_string())
            .text("difficulty", request.difficulty.form_value());

        let form = match &request.source {
            Source::Topic(topic) => form.text("topic", topic.clone()),
            Source::File(file) => {
                let part = Part::bytes(file.bytes.clone())
                    .file_name(file.file_name.clone())
                    .mime_str(file.mime_type())?;
                form.part("file", part)
            }
        };
        Ok(form)
    }

    async fn post_report<T: serde::Serialize + Sync>(
        &self,
        path: &str,
        report: &T,
    ) -> Result<(), ReportError> {
        let response = self.client.post(self.endpoint(path)).json(report).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ReportError::Backend {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Pull a human-readable `detail` string out of an error body
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(detail) => Some(detail),
        _ => None,
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let form = Self::build_form(request)?;

        info!(
            base_url = %self.base_url,
            mode = %request.mode,
            item_count = request.item_count,
            difficulty = request.difficulty.form_value(),
            "Making generation request"
        );

        let response = self
            .client
            .post(self.endpoint("/api/generate-quiz"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                error = %body,
                "Generation request failed"
            );
            return Err(GenerationError::Backend {
                status: status.as_u16(),
                detail: extract_detail(&body),
            });
        }

        debug!(response_length = body.len(), "Received generation response");

        serde_json::from_str::<GenerationResponse>(&body)
            .map_err(|e| GenerationError::MalformedPayload(e.to_string()))
    }
}

#[async_trait]
impl ResultBackend for HttpBackend {
    async fn submit_quiz_result(&self, report: &QuizResultReport) -> Result<(), ReportError> {
        self.post_report("/api/submit-result", report).await
    }

    async fn submit_flashcard_session(
        &self,
        report: &FlashcardSessionReport,
    ) -> Result<(), ReportError> {
        self.post_report("/api/submit-flashcard-session", report)
            .await
    }

    async fn fetch_dashboard(&self, user_id: &str) -> Result<Vec<QuizResultReport>, ReportError> {
        let url = self.endpoint(&format!("/api/dashboard/{}", urlencoding::encode(user_id)));
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let mut results: Vec<QuizResultReport> = response.json().await?;
        results.truncate(DASHBOARD_LIMIT);
        Ok(results)
    }
}
