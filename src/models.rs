use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project row from the catalog store. Owned and mutated by the store; this
/// crate only reads it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProjectRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub authors: Option<Vec<String>>,
    pub guide_name: Option<String>,
    pub academic_year: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// A catalog record the model selected (or the fallback pool supplied), with the
/// model's rationale attached. `ai_reason` is `None` for pool-padded entries and
/// is never persisted.
#[derive(Debug, Serialize, Clone)]
pub struct RecommendedProject {
    #[serde(flatten)]
    pub project: ProjectRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_reason: Option<String>,
}

/// Caller-supplied context for one action invocation. Immutable for the duration
/// of the request; missing fields render as "N/A" at prompt-construction time.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PromptContext {
    pub query: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub authors: Option<Vec<String>>,
    pub guide_name: Option<String>,
    pub academic_year: Option<String>,
}

pub const FIELD_PLACEHOLDER: &str = "N/A";

impl PromptContext {
    pub fn query_or_default(&self) -> &str {
        self.query.as_deref().unwrap_or(FIELD_PLACEHOLDER)
    }

    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or(FIELD_PLACEHOLDER)
    }

    pub fn abstract_or_default(&self) -> &str {
        self.abstract_text.as_deref().unwrap_or(FIELD_PLACEHOLDER)
    }

    pub fn tech_stack_or_default(&self) -> String {
        join_or_placeholder(self.tech_stack.as_deref())
    }

    pub fn authors_or_default(&self) -> String {
        join_or_placeholder(self.authors.as_deref())
    }

    pub fn guide_or_default(&self) -> &str {
        self.guide_name.as_deref().unwrap_or(FIELD_PLACEHOLDER)
    }

    pub fn year_or_default(&self) -> &str {
        self.academic_year.as_deref().unwrap_or(FIELD_PLACEHOLDER)
    }
}

pub fn join_or_placeholder(items: Option<&[String]>) -> String {
    match items {
        Some(items) if !items.is_empty() => items.join(", "),
        _ => FIELD_PLACEHOLDER.to_string(),
    }
}

// OpenAI-compatible chat-completions wire format, shared by all three providers.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

/// One `{id, reason}` reference in a model reply. The prompt contract documents
/// these exact keys for search and related-items.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RankedRef {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchReply {
    #[serde(default)]
    pub matches: Vec<RankedRef>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct RelatedReply {
    #[serde(default)]
    pub related: Vec<RankedRef>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInsights {
    pub summary: String,
    #[serde(default)]
    pub innovations: Vec<String>,
    #[serde(default)]
    pub author_expertise: String,
    #[serde(default)]
    pub key_roles: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HealthReply {
    pub score: u8,
    pub feedback: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SuggestedReading {
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub relevance: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadingsReply {
    #[serde(default)]
    pub readings: Vec<SuggestedReading>,
}

/// Discriminated result of one action invocation.
///
/// `Degraded` and `Failed` are successful-looking terminal states by design: a
/// malformed model reply or a provider outage must leave the caller something to
/// render instead of a crash.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutcome {
    Search {
        matches: Vec<RecommendedProject>,
        summary: String,
    },
    Insights(ProjectInsights),
    Health {
        score: u8,
        feedback: String,
    },
    Related {
        related: Vec<RecommendedProject>,
    },
    Readings {
        readings: Vec<SuggestedReading>,
    },
    Narrative {
        text: String,
    },
    Degraded {
        message: String,
    },
    Failed {
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_record_deserializes_store_row() {
        let row = serde_json::json!({
            "id": "42",
            "title": "Crop Disease Detection",
            "abstract": "CNN-based leaf classification.",
            "tech_stack": ["Python", "TensorFlow"],
            "authors": ["A. Rao"],
            "guide_name": "Dr. Iyer",
            "academic_year": "2024-25",
            "status": "approved",
            "created_at": "2025-01-10T12:00:00Z"
        });
        let record: ProjectRecord = serde_json::from_value(row).unwrap();
        assert_eq!(
            record.abstract_text.as_deref(),
            Some("CNN-based leaf classification.")
        );
        assert_eq!(record.status, "approved");
    }

    #[test]
    fn context_defaults_substitute_placeholder() {
        let ctx = PromptContext::default();
        assert_eq!(ctx.title_or_default(), "N/A");
        assert_eq!(ctx.tech_stack_or_default(), "N/A");
        assert_eq!(join_or_placeholder(Some(&[])), "N/A");
    }

    #[test]
    fn insights_reply_accepts_camel_case_keys() {
        let reply: ProjectInsights = serde_json::from_str(
            r#"{"summary":"s","innovations":["i"],"authorExpertise":"ml","keyRoles":["lead"]}"#,
        )
        .unwrap();
        assert_eq!(reply.author_expertise, "ml");
        assert_eq!(reply.key_roles, vec!["lead"]);
    }

    #[test]
    fn padded_recommendation_omits_reason_in_json() {
        let record: ProjectRecord = serde_json::from_value(serde_json::json!({
            "id": "7", "title": "T", "abstract": null, "tech_stack": null,
            "authors": null, "guide_name": null, "academic_year": null,
            "status": "approved", "created_at": "2025-01-10T12:00:00Z"
        }))
        .unwrap();
        let padded = RecommendedProject {
            project: record,
            ai_reason: None,
        };
        let json = serde_json::to_value(&padded).unwrap();
        assert!(json.get("ai_reason").is_none());
        assert_eq!(json["id"], "7");
    }
}
