use serde::Serialize;

use crate::config::LlmConfig;
use crate::error::{CatalogIntelligenceError, Result};

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const XAI_API_URL: &str = "https://api.x.ai/v1/chat/completions";
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// The LLM backends this service can target. All three speak the same
/// OpenAI-compatible chat-completions shape, so selection only swaps the
/// endpoint, key and model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProviderKind {
    Groq,
    XAi,
    OpenAiCompatible,
}

impl ProviderKind {
    pub fn base_url(self) -> &'static str {
        match self {
            ProviderKind::Groq => GROQ_API_URL,
            ProviderKind::XAi => XAI_API_URL,
            ProviderKind::OpenAiCompatible => OPENAI_API_URL,
        }
    }
}

/// Provider triple resolved once per request. Never mutated after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub kind: ProviderKind,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Identify a provider from the textual shape of a key. Keys sometimes land in
/// the wrong env slot; the prefix is stronger evidence than the slot name.
fn sniff_kind(key: &str) -> Option<ProviderKind> {
    if key.starts_with("gsk_") {
        Some(ProviderKind::Groq)
    } else if key.starts_with("xai-") {
        Some(ProviderKind::XAi)
    } else {
        None
    }
}

fn model_for(kind: ProviderKind, llm: &LlmConfig) -> String {
    match kind {
        ProviderKind::Groq => llm.groq_model.clone(),
        ProviderKind::XAi => llm.xai_model.clone(),
        ProviderKind::OpenAiCompatible => llm.openai_model.clone(),
    }
}

/// Resolve the provider triple from the configured keys.
///
/// Priority order is fixed: Groq, then xAI, then the OpenAI-compatible proxy.
/// The first non-empty key wins its slot; prefix sniffing can re-tag the slot's
/// kind when the key evidently belongs to another provider. No key at all is a
/// configuration failure, not a retryable one.
pub fn resolve(llm: &LlmConfig) -> Result<ResolvedProvider> {
    let slots: [(&str, ProviderKind); 3] = [
        (llm.groq_api_key.as_str(), ProviderKind::Groq),
        (llm.xai_api_key.as_str(), ProviderKind::XAi),
        (llm.openai_api_key.as_str(), ProviderKind::OpenAiCompatible),
    ];

    for (key, slot_kind) in slots {
        if key.is_empty() {
            continue;
        }
        let kind = sniff_kind(key).unwrap_or(slot_kind);
        if kind != slot_kind {
            tracing::warn!(
                "API key in the {:?} slot has a {:?} prefix - routing to {:?}",
                slot_kind,
                kind,
                kind
            );
        }
        return Ok(ResolvedProvider {
            kind,
            api_key: key.to_string(),
            base_url: kind.base_url().to_string(),
            model: model_for(kind, llm),
        });
    }

    Err(CatalogIntelligenceError::Config(
        "no LLM provider API key configured - AI features are unavailable".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn llm_config() -> LlmConfig {
        Config::default().llm
    }

    #[test]
    fn groq_key_wins_priority() {
        let mut llm = llm_config();
        llm.groq_api_key = "gsk_abc".to_string();
        llm.xai_api_key = "xai-def".to_string();
        let resolved = resolve(&llm).unwrap();
        assert_eq!(resolved.kind, ProviderKind::Groq);
        assert_eq!(resolved.base_url, GROQ_API_URL);
        assert_eq!(resolved.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn xai_only_key_resolves_to_xai_endpoint_and_model() {
        let mut llm = llm_config();
        llm.xai_api_key = "xai-def".to_string();
        let resolved = resolve(&llm).unwrap();
        assert_eq!(resolved.kind, ProviderKind::XAi);
        assert_eq!(resolved.base_url, XAI_API_URL);
        assert_eq!(resolved.model, "grok-2-latest");
    }

    #[test]
    fn xai_key_in_groq_slot_is_sniffed() {
        let mut llm = llm_config();
        llm.groq_api_key = "xai-misfiled".to_string();
        let resolved = resolve(&llm).unwrap();
        assert_eq!(resolved.kind, ProviderKind::XAi);
        assert_eq!(resolved.base_url, XAI_API_URL);
        assert_eq!(resolved.api_key, "xai-misfiled");
    }

    #[test]
    fn unrecognized_prefix_keeps_slot_kind() {
        let mut llm = llm_config();
        llm.openai_api_key = "sk-proj-123".to_string();
        let resolved = resolve(&llm).unwrap();
        assert_eq!(resolved.kind, ProviderKind::OpenAiCompatible);
        assert_eq!(resolved.base_url, OPENAI_API_URL);
        assert_eq!(resolved.model, "gpt-4o-mini");
    }

    #[test]
    fn resolution_is_deterministic() {
        let mut llm = llm_config();
        llm.groq_api_key = "gsk_abc".to_string();
        llm.openai_api_key = "sk-xyz".to_string();
        let a = resolve(&llm).unwrap();
        let b = resolve(&llm).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn no_keys_is_a_config_error() {
        let llm = llm_config();
        let err = resolve(&llm).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CatalogIntelligenceError::Config(_)
        ));
    }
}
