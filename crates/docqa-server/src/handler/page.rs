//! The question form.
//!
//! `GET /` renders an empty form. `POST /` answers the submitted question
//! and renders the same page with the answer and sources filled in. Any
//! pipeline failure is shown inline as `Error: <message>`; the handler
//! always answers with a page.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Form, Router};
use serde::{Deserialize, Serialize};

use super::TRACING_TARGET;
use super::view::{PageView, render_page};
use crate::service::{QueryService, ServiceState, SystemInfo};

/// Shown instead of an answer when the question is blank.
pub const EMPTY_QUESTION: &str = "Please enter a question.";

/// Shown in the sources panel when sources are not requested.
pub const SOURCES_HIDDEN: &str = "Sources hidden (enable 'Show Sources' to view)";

/// Fields submitted by the question form.
///
/// Browsers omit an unchecked checkbox, so `show_sources` is only present
/// when the box is ticked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub show_sources: Option<String>,
}

impl AskForm {
    /// Whether the sources checkbox was ticked.
    pub fn show_sources(&self) -> bool {
        self.show_sources.is_some()
    }
}

/// Answers one submission and returns the answer and sources panels.
///
/// A blank question short-circuits without touching the pipeline.
pub async fn answer_question(
    service: &QueryService,
    question: &str,
    show_sources: bool,
) -> (String, String) {
    let question = question.trim();
    if question.is_empty() {
        return (EMPTY_QUESTION.to_string(), String::new());
    }

    match service.ask(question).await {
        Ok(record) => {
            let sources = if show_sources {
                record.format_sources()
            } else {
                SOURCES_HIDDEN.to_string()
            };
            (record.answer, sources)
        }
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET,
                error = %error,
                recoverable = error.is_recoverable(),
                "failed to answer question"
            );
            (format!("Error: {error}"), String::new())
        }
    }
}

#[tracing::instrument(skip_all)]
async fn show_form(State(info): State<Arc<SystemInfo>>) -> Html<String> {
    Html(render_page(&PageView::empty(), &info))
}

#[tracing::instrument(skip_all)]
async fn submit_form(
    State(query): State<QueryService>,
    State(info): State<Arc<SystemInfo>>,
    Form(form): Form<AskForm>,
) -> Html<String> {
    let show_sources = form.show_sources();
    tracing::debug!(
        target: TRACING_TARGET,
        question_chars = form.question.len(),
        show_sources,
        "question submitted"
    );

    let (answer, sources) = answer_question(&query, &form.question, show_sources).await;

    let view = PageView {
        question: form.question,
        show_sources,
        answer,
        sources,
    };
    Html(render_page(&view, &info))
}

/// Returns a [`Router`] with the form routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/", get(show_form).post(submit_form))
}

#[cfg(test)]
mod tests {
    use docqa_core::mock::{MockConfig, MockProvider};

    use super::*;
    use crate::handler::test::{
        create_test_server, create_test_server_with_response, create_test_server_with_state,
        create_test_state,
    };

    #[tokio::test]
    async fn get_renders_empty_form() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let response = server.get("/").await;
        response.assert_status_ok();

        let html = response.text();
        assert!(html.contains("Document Q&amp;A Assistant"));
        assert!(html.contains("What are the key findings?"));
        assert!(html.contains("mock-completion"));
        Ok(())
    }

    #[tokio::test]
    async fn answers_with_sources() -> anyhow::Result<()> {
        let server = create_test_server_with_response("The sky is blue.").await?;
        let response = server
            .post("/")
            .form(&[("question", "What color is the sky?"), ("show_sources", "on")])
            .await;
        response.assert_status_ok();

        let html = response.text();
        assert!(html.contains(">The sky is blue.</textarea>"));
        assert!(html.contains("File: sky.pdf | Page: 1"));
        assert!(!html.contains(SOURCES_HIDDEN));
        Ok(())
    }

    #[tokio::test]
    async fn unchecked_box_hides_sources() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let response = server
            .post("/")
            .form(&[("question", "What color is the sky?")])
            .await;

        let html = response.text();
        assert!(html.contains(SOURCES_HIDDEN));
        assert!(!html.contains("File: sky.pdf"));
        Ok(())
    }

    #[tokio::test]
    async fn blank_question_skips_pipeline() -> anyhow::Result<()> {
        let provider = MockProvider::default();
        let state = create_test_state(provider.clone(), true).await?;

        let (answer, sources) = answer_question(&state.query, "   ", true).await;
        assert_eq!(answer, EMPTY_QUESTION);
        assert!(sources.is_empty());
        assert_eq!(provider.completion_count(), 0);

        let server = create_test_server_with_state(state).await?;
        let response = server.post("/").form(&[("question", "")]).await;
        assert!(response.text().contains(EMPTY_QUESTION));
        assert_eq!(provider.completion_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn pipeline_failure_is_shown_inline() -> anyhow::Result<()> {
        let provider = MockProvider::new(MockConfig {
            fail_completions: true,
            ..Default::default()
        });
        let state = create_test_state(provider, true).await?;

        let (answer, sources) = answer_question(&state.query, "sky", true).await;
        assert!(answer.starts_with("Error: generation error"));
        assert!(sources.is_empty());

        let server = create_test_server_with_state(state).await?;
        let response = server.post("/").form(&[("question", "sky")]).await;
        response.assert_status_ok();
        assert!(response.text().contains("Error: generation error"));

        // The server keeps answering after a failure.
        server.get("/").await.assert_status_ok();
        Ok(())
    }

    #[tokio::test]
    async fn uninitialized_store_is_shown_inline() -> anyhow::Result<()> {
        let state = create_test_state(MockProvider::default(), false).await?;
        let (answer, _) = answer_question(&state.query, "sky", true).await;
        assert!(answer.starts_with("Error: retrieval unavailable"));
        assert!(answer.contains("not initialized"));
        Ok(())
    }
}
