use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, ReviewError};
use crate::llm::LlmClient;
use crate::setup;
use crate::templates::TemplateStore;

/// Where the code under review comes from.
///
/// The caller decides; a literal snippet is never probed against the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewInput {
    Path(PathBuf),
    Literal(String),
}

impl ReviewInput {
    /// Read the source text.
    pub fn load(&self) -> Result<String> {
        let source = match self {
            ReviewInput::Path(path) => fs::read_to_string(path).map_err(|e| {
                let msg = match e.kind() {
                    ErrorKind::NotFound => format!("file {} does not exist", path.display()),
                    _ => format!("failed to read {}", path.display()),
                };
                ReviewError::input(msg).with_source(e)
            })?,
            ReviewInput::Literal(code) => code.clone(),
        };

        if source.trim().is_empty() {
            return Err(ReviewError::input("nothing to review: the source is empty"));
        }

        Ok(source)
    }

    /// Code fence language guessed from the file extension.
    pub fn language(&self) -> Option<&'static str> {
        match self {
            ReviewInput::Path(path) => language_for(path),
            ReviewInput::Literal(_) => None,
        }
    }
}

fn language_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let lang = match ext.as_str() {
        "py" => "python",
        "rs" => "rust",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" => "typescript",
        "tsx" => "tsx",
        "go" => "go",
        "java" => "java",
        "kt" => "kotlin",
        "c" | "h" => "c",
        "cc" | "cpp" | "hpp" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "php" => "php",
        "sh" | "bash" => "bash",
        "swift" => "swift",
        "sql" => "sql",
        _ => return None,
    };
    Some(lang)
}

/// One review to perform.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub source_text: String,
    pub mode: String,
    pub provider: String,
    pub model: String,
    pub language: Option<&'static str>,
}

/// A finished review, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewResult {
    pub source_text: String,
    pub review_text: String,
    pub mode: String,
    pub language: Option<&'static str>,
}

impl ReviewRequest {
    /// Load `input` and pair it with the client that will review it.
    pub fn new(input: &ReviewInput, mode: &str, client: &dyn LlmClient) -> Result<Self> {
        Ok(ReviewRequest {
            source_text: input.load()?,
            mode: mode.to_string(),
            provider: client.name().to_string(),
            model: client.model().to_string(),
            language: input.language(),
        })
    }

    /// Resolve the mode's template and send one request through `client`.
    pub fn run(self, templates: &TemplateStore, client: &dyn LlmClient) -> Result<ReviewResult> {
        let template = templates.resolve(&self.mode)?;

        log::info!(
            "Reviewing {} bytes in '{}' mode with {} ({})",
            self.source_text.len(),
            self.mode,
            self.provider,
            self.model
        );

        let review_text = setup::send(client, template, &self.source_text)?;

        Ok(ReviewResult {
            source_text: self.source_text,
            review_text,
            mode: self.mode,
            language: self.language,
        })
    }
}
