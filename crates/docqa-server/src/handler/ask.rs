//! JSON question answering endpoint.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use docqa_core::Passage;
use docqa_rig::AnswerRecord;
use serde::{Deserialize, Serialize};

use super::TRACING_TARGET;
use crate::handler::{ErrorKind, Result};
use crate::service::{QueryService, ServiceState};

/// Request body for `POST /api/ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question to answer.
    pub question: String,
}

/// One supporting passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceResponse {
    /// File name of the source document.
    pub file: String,
    /// Full path of the source document.
    pub path: String,
    /// 1-based page the passage starts on.
    pub page: u32,
    /// Passage text.
    pub content: String,
}

impl From<&Passage> for SourceResponse {
    fn from(passage: &Passage) -> Self {
        Self {
            file: passage.source_file().to_string(),
            path: passage.metadata.source_path.clone(),
            page: passage.metadata.page_number,
            content: passage.content.clone(),
        }
    }
}

/// Response body for `POST /api/ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    /// Supporting passages, best match first.
    pub sources: Vec<SourceResponse>,
}

impl From<AnswerRecord> for AskResponse {
    fn from(record: AnswerRecord) -> Self {
        Self {
            sources: record.sources.iter().map(SourceResponse::from).collect(),
            question: record.question,
            answer: record.answer,
        }
    }
}

#[tracing::instrument(skip_all)]
async fn ask(
    State(query): State<QueryService>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ErrorKind::BadRequest.with_message("question must not be empty"));
    }

    let record = query.ask(question).await.inspect_err(|error| {
        tracing::error!(
            target: TRACING_TARGET,
            error = %error,
            recoverable = error.is_recoverable(),
            "failed to answer question"
        );
    })?;

    Ok(Json(record.into()))
}

/// Returns a [`Router`] with the JSON API routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/api/ask", post(ask))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use docqa_core::mock::{MockConfig, MockProvider};
    use serde_json::json;

    use super::*;
    use crate::handler::ErrorResponse;
    use crate::handler::test::{
        create_test_server_with_response, create_test_server_with_state, create_test_state,
    };

    #[tokio::test]
    async fn returns_answer_and_ranked_sources() -> anyhow::Result<()> {
        let server = create_test_server_with_response("The sky is blue.").await?;
        let response = server
            .post("/api/ask")
            .json(&json!({ "question": "What color is the sky?" }))
            .await;
        response.assert_status_ok();

        let body: AskResponse = response.json();
        assert_eq!(body.question, "What color is the sky?");
        assert_eq!(body.answer, "The sky is blue.");
        assert_eq!(body.sources.len(), 3);
        assert_eq!(
            body.sources[0],
            SourceResponse {
                file: "sky.pdf".to_string(),
                path: "data/documents/sky.pdf".to_string(),
                page: 1,
                content: "The sky is blue.".to_string(),
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn blank_question_is_bad_request() -> anyhow::Result<()> {
        let server = create_test_server_with_response("unused").await?;
        let response = server
            .post("/api/ask")
            .json(&json!({ "question": "  " }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "question must not be empty");
        Ok(())
    }

    #[tokio::test]
    async fn backend_failure_is_service_unavailable() -> anyhow::Result<()> {
        let provider = MockProvider::new(MockConfig {
            fail_completions: true,
            ..Default::default()
        });
        let server = create_test_server_with_state(create_test_state(provider, true).await?).await?;

        let response = server
            .post("/api/ask")
            .json(&json!({ "question": "sky" }))
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: ErrorResponse = response.json();
        assert!(body.error.starts_with("generation error"));
        Ok(())
    }
}
