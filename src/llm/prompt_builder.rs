use crate::llm::prompts;
use crate::templates;

pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// System instruction plus the template with `code` substituted in.
pub fn review_prompt(template: &str, code: &str) -> PromptPair {
    PromptPair {
        system: prompts::SYSTEM_INSTRUCTIONS.to_owned(),
        user: templates::render(template, code),
    }
}

/// Truncate long strings for debug logging.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut cut = max_len;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...\n[truncated {} chars]", &s[..cut], s[cut..].chars().count())
}
