use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{Config, LlmConfig};
use crate::error::{CatalogIntelligenceError, Result};
use crate::formatter::format_catalog;
use crate::joiner::join_ranked;
use crate::models::{
    ActionOutcome, ChatMessage, ChatRequest, HealthReply, ProjectInsights, PromptContext,
    ReadingsReply, RelatedReply, SearchReply,
};
use crate::parser::{DEGRADED_MESSAGE, ParseMode, ParsedReply, parse_reply};
use crate::prompts::{AiAction, build_prompt};
use crate::provider;
use crate::repository::PostgrestCatalogRepository;
use crate::repository_traits::CatalogRepository;
use crate::transport::{HttpTransport, Transport, json_response_format};
use crate::validation::InputValidator;

const GENERIC_FAILURE: &str = "The AI service is currently unavailable. Please try again.";

/// Orchestrates one action invocation: validate, resolve provider, ground the
/// prompt in the catalog, call the provider, parse, and re-join IDs against the
/// store. Stateless across invocations; every call is an independent pipeline.
pub struct CatalogIntelligenceService<R: CatalogRepository> {
    repository: Arc<R>,
    transport: Arc<dyn Transport>,
    validator: InputValidator,
    llm: LlmConfig,
    catalog_limit: usize,
}

impl CatalogIntelligenceService<PostgrestCatalogRepository> {
    /// Wire the production store and HTTP transport from configuration.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let repository = Arc::new(PostgrestCatalogRepository::new(&cfg.store));
        let transport = Arc::new(HttpTransport::new(cfg.llm_timeout())?);
        Ok(Self::new(repository, transport, cfg))
    }
}

impl<R: CatalogRepository> CatalogIntelligenceService<R> {
    pub fn new(repository: Arc<R>, transport: Arc<dyn Transport>, cfg: &Config) -> Self {
        Self {
            repository,
            transport,
            validator: InputValidator::new(),
            llm: cfg.llm.clone(),
            catalog_limit: cfg.store.catalog_limit,
        }
    }

    /// Run one AI action.
    ///
    /// Error policy: configuration, validation and store failures return `Err`;
    /// provider transport failures become `Ok(Failed)`; unparseable replies
    /// become `Ok(Degraded)`. Dropping the returned future cancels any
    /// in-flight network call.
    pub async fn invoke(&self, action: AiAction, ctx: &PromptContext) -> Result<ActionOutcome> {
        let span = tracing::info_span!(
            "ai_action",
            action = %action,
            request_id = %Uuid::new_v4()
        );
        self.invoke_inner(action, ctx).instrument(span).await
    }

    async fn invoke_inner(&self, action: AiAction, ctx: &PromptContext) -> Result<ActionOutcome> {
        self.validator.validate(action, ctx)?;
        let provider = provider::resolve(&self.llm)?;

        // The catalog fetch always completes before prompt construction.
        let knowledge_base = if action.uses_catalog() {
            let records = self
                .repository
                .fetch_approved_catalog(self.catalog_limit)
                .await?;
            tracing::info!(records = records.len(), "grounding prompt in catalog");
            Some(format_catalog(&records))
        } else {
            None
        };

        let prompt = build_prompt(action, ctx, knowledge_base.as_deref());
        let response_format = match action.parse_mode() {
            ParseMode::Structured => json_response_format(&provider.model),
            ParseMode::Passthrough => None,
        };
        let request = ChatRequest {
            model: provider.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt.system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.user,
                },
            ],
            temperature: action.temperature(),
            max_tokens: self.llm.max_tokens,
            response_format,
        };

        let response = match self.transport.chat(&provider, &request).await {
            Ok(response) => response,
            Err(CatalogIntelligenceError::Transport { status, message }) => {
                tracing::warn!(?status, %message, "provider call failed");
                return Ok(ActionOutcome::Failed {
                    error: GENERIC_FAILURE.to_string(),
                });
            }
            Err(other) => return Err(other),
        };

        let Some(choice) = response.choices.into_iter().next() else {
            tracing::warn!("provider returned no choices");
            return Ok(ActionOutcome::Failed {
                error: GENERIC_FAILURE.to_string(),
            });
        };

        match parse_reply(&choice.message.content, action.parse_mode()) {
            ParsedReply::Text(text) => Ok(ActionOutcome::Narrative { text }),
            ParsedReply::Degraded { message } => Ok(ActionOutcome::Degraded { message }),
            ParsedReply::Structured(value) => self.finish_structured(action, value).await,
        }
    }

    /// Validate the parsed object into the action's typed shape and, for
    /// ID-returning actions, merge with authoritative records.
    async fn finish_structured(
        &self,
        action: AiAction,
        value: serde_json::Value,
    ) -> Result<ActionOutcome> {
        match action {
            AiAction::FreeformSearch => {
                let Some(reply) = typed::<SearchReply>(value) else {
                    return Ok(degraded());
                };
                let required = action.required_results().unwrap_or(reply.matches.len());
                let matches =
                    join_ranked(self.repository.as_ref(), &reply.matches, required).await?;
                Ok(ActionOutcome::Search {
                    matches,
                    summary: reply.summary,
                })
            }
            AiAction::RelatedItems => {
                let Some(reply) = typed::<RelatedReply>(value) else {
                    return Ok(degraded());
                };
                let required = action.required_results().unwrap_or(reply.related.len());
                let related =
                    join_ranked(self.repository.as_ref(), &reply.related, required).await?;
                Ok(ActionOutcome::Related { related })
            }
            AiAction::Insights => match typed::<ProjectInsights>(value) {
                Some(insights) => Ok(ActionOutcome::Insights(insights)),
                None => Ok(degraded()),
            },
            AiAction::ProjectHealth => match typed::<HealthReply>(value) {
                Some(reply) => Ok(ActionOutcome::Health {
                    score: reply.score,
                    feedback: reply.feedback,
                }),
                None => Ok(degraded()),
            },
            AiAction::SuggestedReadings => match typed::<ReadingsReply>(value) {
                Some(reply) => Ok(ActionOutcome::Readings {
                    readings: reply.readings,
                }),
                None => Ok(degraded()),
            },
            // Passthrough actions never reach here.
            _ => Err(CatalogIntelligenceError::Internal(format!(
                "structured finish invoked for passthrough action {action}"
            ))),
        }
    }
}

fn typed<T: DeserializeOwned>(value: serde_json::Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("model reply did not match the action schema: {e}");
            None
        }
    }
}

fn degraded() -> ActionOutcome {
    ActionOutcome::Degraded {
        message: DEGRADED_MESSAGE.to_string(),
    }
}
