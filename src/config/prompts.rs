//! Prompt templates for Tubechat.
//!
//! The answering template and the summary instruction are part of the external contract:
//! editing either changes what the model is asked and must bump [`PROMPT_VERSION`].
//! Templates can be overridden at startup by a `rag.toml` in the custom prompts directory.

use crate::error::{Result, TubechatError};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::debug;

/// Version of the built-in prompt contract.
pub const PROMPT_VERSION: u32 = 1;

/// Placeholder for the retrieved transcript context.
pub const CONTEXT_VAR: &str = "context";

/// Placeholder for the user's question.
pub const QUESTION_VAR: &str = "question";

/// Collection of all prompt templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub rag: RagPrompts,
}

/// Prompts for retrieval-augmented answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// Answering template with `{context}` and `{question}` placeholders.
    pub answer: String,
    /// Fixed instruction used in place of a question by `summarize`.
    pub summary: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            answer: r#"You are a helpful assistant.
Answer ONLY from the provided transcript context.
If the context is insufficient, just say you don't know.

{context}
Question: {question}"#
                .to_string(),

            summary: "Provide a detailed summary of this video. \
                      Cover all the main topics, key points, and important takeaways discussed."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, applying overrides from `custom_dir/rag.toml` if present.
    pub fn load(custom_dir: Option<&str>) -> Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
                debug!("Loaded prompt overrides from {}", rag_path.display());
            }
        }

        prompts.validate()?;
        debug!("Using prompt templates v{}", PROMPT_VERSION);
        Ok(prompts)
    }

    /// Reject templates that would silently drop the context or the question.
    pub fn validate(&self) -> Result<()> {
        for var in [CONTEXT_VAR, QUESTION_VAR] {
            if !self.rag.answer.contains(&format!("{{{}}}", var)) {
                return Err(TubechatError::Config(format!(
                    "Answer template is missing the {{{}}} placeholder",
                    var
                )));
            }
        }
        if self.rag.summary.trim().is_empty() {
            return Err(TubechatError::Config("Summary instruction is empty".to_string()));
        }
        Ok(())
    }

    /// Render a template with the given variables.
    ///
    /// Substitution is a single pass over the template, so placeholder-like text inside a
    /// value is inserted verbatim. Unknown placeholders are left untouched.
    pub fn render(template: &str, vars: &HashMap<&str, &str>) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let placeholder =
            PLACEHOLDER.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid regex"));

        placeholder
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => (*value).to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render the answering template for a context block and question.
    pub fn render_answer(&self, context: &str, question: &str) -> String {
        let vars = HashMap::from([(CONTEXT_VAR, context), (QUESTION_VAR, question)]);
        Self::render(&self.rag.answer, &vars)
    }
}
