use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::review::ReviewInput;

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "reviewbot",
    version,
    about = "LLM-assisted code reviewer that saves its findings as Markdown"
)]
#[command(group(
    ArgGroup::new("source")
        .args(["file", "code", "list_modes"])
        .required(true)
        .multiple(false)
))]
pub struct Cli {
    /// Path to the source file to review
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Review this code snippet directly instead of reading a file
    #[arg(long, value_name = "SNIPPET")]
    pub code: Option<String>,

    /// Review mode, i.e. which prompt template to use (e.g. strict, mentor, test_focus)
    #[arg(long, default_value = "strict")]
    pub mode: String,

    /// LLM provider (ollama, openai, anthropic)
    #[arg(long, env = "REVIEWBOT_PROVIDER", default_value = "ollama")]
    pub provider: String,

    /// Model name; overrides the provider's configured default
    #[arg(long, env = "REVIEWBOT_MODEL")]
    pub model: Option<String>,

    /// Directory the review report is written to
    #[arg(long, value_name = "DIR", default_value = "reviews")]
    pub output: PathBuf,

    /// Provider config file (otherwise ~/.config/reviewbot.toml if it exists)
    #[arg(long, env = "REVIEWBOT_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Prompt template file replacing the built-in review modes
    #[arg(long, value_name = "PATH")]
    pub templates: Option<PathBuf>,

    /// Print the available review modes and exit
    #[arg(long)]
    pub list_modes: bool,

    /// Don't echo the review text after saving it
    #[arg(long, short)]
    pub quiet: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The source to review, tagged by where it came from.
    pub fn input(&self) -> Option<ReviewInput> {
        if let Some(path) = &self.file {
            return Some(ReviewInput::Path(path.clone()));
        }
        self.code.clone().map(ReviewInput::Literal)
    }
}
