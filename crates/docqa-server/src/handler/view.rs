//! HTML rendering for the question page.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::service::SystemInfo;

/// Questions offered as one-click suggestions.
pub const EXAMPLE_QUESTIONS: [&str; 4] = [
    "What is this document about?",
    "Summarize the main points",
    "What are the key findings?",
    "Can you explain the methodology used?",
];

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem;color:#1f2937}\
.layout{display:flex;gap:2rem;flex-wrap:wrap}.main{flex:2;min-width:320px}.info{flex:1;min-width:220px;\
background:#f3f4f6;border-radius:8px;padding:1rem}textarea{width:100%;box-sizing:border-box}\
label{display:block;font-weight:600;margin:.75rem 0 .25rem}button{margin-top:.75rem;padding:.5rem 1.25rem}\
.examples button{margin:.25rem .25rem 0 0;padding:.25rem .75rem}";

/// What the page shows in its input and output fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageView {
    /// The submitted question.
    pub question: String,
    /// Whether the sources checkbox is ticked.
    pub show_sources: bool,
    /// Answer text, or a prompt or error message.
    pub answer: String,
    /// Rendered sources, or the hidden notice.
    pub sources: String,
}

impl PageView {
    /// The page before any submission.
    pub fn empty() -> Self {
        Self {
            show_sources: true,
            ..Default::default()
        }
    }
}

/// Renders the full page.
pub fn render_page(view: &PageView, info: &SystemInfo) -> String {
    let examples: String = EXAMPLE_QUESTIONS
        .iter()
        .map(|question| {
            format!(
                "<button type=\"button\" onclick=\"document.getElementById('question').value=this.dataset.q\" \
                 data-q=\"{q}\">{text}</button>",
                q = encode_double_quoted_attribute(question),
                text = encode_text(question),
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Document Q&amp;A Assistant</title>
<style>{style}</style>
</head>
<body>
<h1>Document Q&amp;A Assistant</h1>
<p>Ask questions about your documents and get answers with source citations.</p>
<div class="layout">
<div class="main">
<form method="post" action="/">
<label for="question">Your Question</label>
<textarea id="question" name="question" rows="2" placeholder="e.g., What are the key findings in the document?">{question}</textarea>
<label><input type="checkbox" name="show_sources" value="on"{checked}> Show Sources</label>
<button type="submit">Get Answer</button>
</form>
<div class="examples"><label>Examples</label>{examples}</div>
<label for="answer">Answer</label>
<textarea id="answer" rows="8" readonly>{answer}</textarea>
<label for="sources">Source Documents</label>
<textarea id="sources" rows="6" readonly>{sources}</textarea>
</div>
<div class="info">
<h3>System Info</h3>
<ul>
<li><strong>Documents</strong>: <code>{documents}</code></li>
<li><strong>Model</strong>: {model}</li>
<li><strong>Collection</strong>: {collection}</li>
</ul>
<p><strong>Tips:</strong></p>
<ul>
<li>Ask specific questions</li>
<li>Questions should relate to document content</li>
<li>Check sources for verification</li>
</ul>
</div>
</div>
</body>
</html>
"#,
        style = STYLE,
        question = encode_text(&view.question),
        checked = if view.show_sources { " checked" } else { "" },
        examples = examples,
        answer = encode_text(&view.answer),
        sources = encode_text(&view.sources),
        documents = encode_text(&info.documents_dir.display().to_string()),
        model = encode_text(&info.model),
        collection = encode_text(&info.collection),
    )
}
