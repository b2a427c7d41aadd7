//! Retrieval-augmented answering over an indexed documentation corpus.
//!
//! The pipeline picks a prompt template from the query wording,
//! retrieves the top chunks, renders the prompt, and hands it to an
//! injected [`Generator`]. Generation failures surface as a structured
//! failed response, never as a panic or a propagated error.

use std::{
    io::Write,
    process::{Command, Stdio},
};

use serde::Serialize;

use crate::{
    error::{Error, Result},
    prompts,
    vector_store::{DEFAULT_TOP_K, Retrieved, VectorStore},
};

/// What kind of output a query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Explanation,
    Code,
}

/// Injected text-generation capability.
///
/// Takes a fully rendered prompt and returns the generated answer. The
/// service behind it is opaque; transport or authentication failures
/// come back as [`Error::Generation`].
pub trait Generator {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Generator backed by an external command.
///
/// The rendered prompt is written to the command's stdin and the
/// answer is read from its stdout. This keeps the LLM service outside
/// the process boundary.
pub struct CommandGenerator {
    command: String,
}

impl CommandGenerator {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Generator for CommandGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Generation(format!("spawn failed: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .map_err(|e| Error::Generation(format!("write failed: {e}")))?;
            // Dropping stdin sends EOF so the command can finish reading.
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::Generation(format!("wait failed: {e}")))?;

        if !output.status.success() {
            return Err(Error::Generation(format!(
                "command exited with {}",
                output.status
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| Error::Generation(format!("invalid utf-8: {e}")))
    }
}

/// Structured answer returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RagResponse {
    /// Prose answer when the task was an explanation.
    pub explanation: Option<String>,
    /// Generated code when the task asked for code.
    pub code_snippet: Option<String>,
    /// `"Page N, Section S"` references in ranked order.
    pub source_citations: Vec<String>,
    /// Set when generation failed; no answer or citations accompany it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RagResponse {
    fn not_found() -> Self {
        Self {
            explanation: Some(prompts::NOT_FOUND_ANSWER.to_string()),
            code_snippet: None,
            source_citations: Vec::new(),
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            explanation: None,
            code_snippet: None,
            source_citations: Vec::new(),
            error: Some(message),
        }
    }
}

/// Orchestrates retrieval, prompt rendering, and generation.
pub struct Pipeline<G> {
    generator: G,
    top_k: usize,
}

impl<G: Generator> Pipeline<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Answer a query against the indexed corpus.
    pub fn run(&self, store: &VectorStore, query: &str) -> RagResponse {
        let (template, kind) = select_template(query);

        let retrieved = store.retrieve(query, self.top_k);
        if retrieved.is_empty() {
            return RagResponse::not_found();
        }

        let docs = docs_text(&retrieved);
        let prompt = prompts::render(template, &docs, query);
        let source_citations = citations(&retrieved);

        match self.generator.generate(&prompt) {
            Ok(answer) => {
                let answer = answer.trim().to_string();
                let (explanation, code_snippet) = match kind {
                    TaskKind::Explanation => (Some(answer), None),
                    TaskKind::Code => (None, Some(answer)),
                };
                RagResponse {
                    explanation,
                    code_snippet,
                    source_citations,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "generation failed");
                RagResponse::failed(e.to_string())
            }
        }
    }
}

/// Pick the prompt template and task kind from the query wording.
pub fn select_template(query: &str) -> (&'static str, TaskKind) {
    let query = query.to_lowercase();
    if query.contains("python") {
        (prompts::GENERATE_PYTHON, TaskKind::Code)
    } else if query.contains("javascript")
        || query.contains("js")
        || query.contains("axios")
    {
        (prompts::GENERATE_JAVASCRIPT, TaskKind::Code)
    } else if query.contains("curl") {
        (prompts::GENERATE_CURL, TaskKind::Code)
    } else {
        (prompts::EXPLAIN_ENDPOINT, TaskKind::Explanation)
    }
}

/// Concatenate retrieved chunks into the `{docs}` prompt block.
pub fn docs_text(retrieved: &[Retrieved]) -> String {
    retrieved
        .iter()
        .map(|r| {
            format!(
                "Page {}, Section {}:\n{}",
                page_label(r.metadata.page_number),
                section_label(r.metadata.section_name.as_deref()),
                r.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build display citations in ranked order.
pub fn citations(retrieved: &[Retrieved]) -> Vec<String> {
    retrieved
        .iter()
        .map(|r| {
            format!(
                "Page {}, Section {}",
                page_label(r.metadata.page_number),
                section_label(r.metadata.section_name.as_deref())
            )
        })
        .collect()
}

fn page_label(page_number: Option<u32>) -> String {
    match page_number {
        Some(n) => n.to_string(),
        None => "unknown".to_string(),
    }
}

fn section_label(section_name: Option<&str>) -> &str {
    section_name.unwrap_or("unknown")
}
