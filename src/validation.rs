use crate::error::{CatalogIntelligenceError, Result};
use crate::models::PromptContext;
use crate::prompts::AiAction;

const MAX_QUERY_CHARS: usize = 500;
const MAX_ABSTRACT_CHARS: usize = 5000;

/// Checks caller input before any provider or store work happens.
pub struct InputValidator {
    max_query_chars: usize,
    max_abstract_chars: usize,
}

impl InputValidator {
    pub fn new() -> Self {
        Self {
            max_query_chars: MAX_QUERY_CHARS,
            max_abstract_chars: MAX_ABSTRACT_CHARS,
        }
    }

    /// Per-action required fields. Everything not required here falls back to
    /// the "N/A" placeholder at prompt time.
    pub fn validate(&self, action: AiAction, ctx: &PromptContext) -> Result<()> {
        match action {
            AiAction::FreeformSearch => {
                let query = ctx.query.as_deref().map(str::trim).unwrap_or("");
                if query.is_empty() {
                    return Err(CatalogIntelligenceError::Validation(
                        "freeform-search requires a non-empty 'query'".to_string(),
                    ));
                }
                if query.chars().count() > self.max_query_chars {
                    return Err(CatalogIntelligenceError::Validation(format!(
                        "'query' exceeds {} characters",
                        self.max_query_chars
                    )));
                }
            }
            _ => {
                let title = ctx.title.as_deref().map(str::trim).unwrap_or("");
                if title.is_empty() {
                    return Err(CatalogIntelligenceError::Validation(format!(
                        "{action} requires a non-empty 'title'"
                    )));
                }
            }
        }

        if let Some(abstract_text) = &ctx.abstract_text {
            if abstract_text.chars().count() > self.max_abstract_chars {
                return Err(CatalogIntelligenceError::Validation(format!(
                    "'abstract' exceeds {} characters",
                    self.max_abstract_chars
                )));
            }
        }

        Ok(())
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}
