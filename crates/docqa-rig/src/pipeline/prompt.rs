//! Prompt template with `{context}` and `{question}` placeholders.

use crate::{Error, Result};

const CONTEXT_PLACEHOLDER: &str = "{context}";
const QUESTION_PLACEHOLDER: &str = "{question}";

/// Built-in prompt sent to the language model.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "\
You are a helpful AI assistant. Use the following pieces of context to answer the question at the end.

If you don't know the answer based on the context, just say \"I don't have enough information in the provided documents to answer this question.\" Don't try to make up an answer.

Context:
{context}

Question: {question}

Helpful Answer:";

/// A validated prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Creates a template, checking that both placeholders are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a placeholder is missing.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in [CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(Error::config(format!(
                    "prompt template is missing the {placeholder} placeholder"
                )));
            }
        }
        Ok(Self { template })
    }

    /// Returns the raw template text.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitutes the placeholders in a single pass, so placeholder-like
    /// text inside the context or question is left untouched.
    pub fn render(&self, context: &str, question: &str) -> String {
        let mut rendered =
            String::with_capacity(self.template.len() + context.len() + question.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            let (head, tail) = rest.split_at(start);
            rendered.push_str(head);

            if let Some(after) = tail.strip_prefix(CONTEXT_PLACEHOLDER) {
                rendered.push_str(context);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(QUESTION_PLACEHOLDER) {
                rendered.push_str(question);
                rest = after;
            } else {
                rendered.push('{');
                rest = &tail[1..];
            }
        }

        rendered.push_str(rest);
        rendered
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}
