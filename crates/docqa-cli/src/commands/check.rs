//! `docqa check`: validate the environment.

use docqa_core::{CompletionService, EmbeddingService};
use docqa_rig::{DocumentProcessor, RagConfig};

use crate::TRACING_TARGET_COMMAND;

/// Lists every problem that would stop ingestion or serving.
pub async fn environment_issues(
    config: &RagConfig,
    embedder: &EmbeddingService,
    completer: &CompletionService,
) -> Vec<String> {
    let mut issues = Vec::new();
    let documents_dir = &config.documents.documents_dir;

    if !documents_dir.is_dir() {
        issues.push(format!(
            "Documents directory missing: {}",
            documents_dir.display()
        ));
    }

    if DocumentProcessor::discover(documents_dir).is_empty() {
        issues.push(format!("No PDF files found in {}", documents_dir.display()));
    }

    let (embedding, completion) = tokio::join!(embedder.health_check(), completer.health_check());

    for (role, model, health) in [
        ("Embedding", embedder.model_name(), embedding),
        ("Language", completer.model_name(), completion),
    ] {
        match health {
            Ok(health) if health.is_healthy() => {}
            Ok(health) => issues.push(format!(
                "{role} model {model} unavailable: {}. Start Ollama with `ollama serve` and pull the model.",
                health.message.unwrap_or_default()
            )),
            Err(error) => issues.push(format!("{role} model {model} unavailable: {error}")),
        }
    }

    issues
}

/// Prints the environment issues and fails if there are any.
pub async fn check(
    config: &RagConfig,
    embedder: &EmbeddingService,
    completer: &CompletionService,
) -> anyhow::Result<()> {
    let issues = environment_issues(config, embedder, completer).await;
    if issues.is_empty() {
        println!("Environment validated successfully");
        return Ok(());
    }

    tracing::warn!(
        target: TRACING_TARGET_COMMAND,
        issues = issues.len(),
        "environment check failed"
    );

    println!("Environment issues:");
    for issue in &issues {
        println!("  - {issue}");
    }
    anyhow::bail!("{} environment issue(s) found", issues.len())
}
