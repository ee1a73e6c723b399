/// System instruction sent with every review request, whatever the provider.
pub const SYSTEM_INSTRUCTIONS: &str = "You are a helpful code review assistant.";

/// Sampling temperature for every provider; low so reviews stay repeatable.
pub const TEMPERATURE: f32 = 0.3;

/// Anthropic requires an explicit output budget.
pub const ANTHROPIC_MAX_TOKENS: u32 = 2000;

/// Slot in a review template that receives the source code.
pub const CODE_PLACEHOLDER: &str = "{code}";

/// Review modes compiled into the binary.
pub const BUILTIN_TEMPLATES: &str = include_str!("../../prompts/templates.toml");
