//! `docqa ask`: answer one question from the terminal.

use docqa_core::{CompletionService, EmbeddingService};
use docqa_rig::RagConfig;

use super::load_pipeline;

/// Answers `question` and prints the answer and, unless suppressed, its sources.
pub async fn ask(
    config: &RagConfig,
    embedder: EmbeddingService,
    completer: CompletionService,
    question: &str,
    show_sources: bool,
) -> anyhow::Result<()> {
    let pipeline = load_pipeline(config, embedder, completer).await?;
    let record = pipeline.query(question).await?;

    println!("QUESTION: {}", record.question);
    println!();
    println!("ANSWER: {}", record.answer);

    if show_sources {
        println!();
        println!("SOURCES:");
        println!("{}", record.format_sources());
    }

    Ok(())
}
