use std::fmt;
use std::str::FromStr;

use crate::error::CatalogIntelligenceError;
use crate::models::PromptContext;
use crate::parser::ParseMode;

/// Closed set of AI operations the service supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiAction {
    FreeformSearch,
    Insights,
    SimplifyAbstract,
    TeamExpertise,
    TechExplain,
    ComprehensiveAnalysis,
    SuggestedReadings,
    PresentationPitch,
    ProjectHealth,
    RelatedItems,
}

impl AiAction {
    pub const ALL: [AiAction; 10] = [
        AiAction::FreeformSearch,
        AiAction::Insights,
        AiAction::SimplifyAbstract,
        AiAction::TeamExpertise,
        AiAction::TechExplain,
        AiAction::ComprehensiveAnalysis,
        AiAction::SuggestedReadings,
        AiAction::PresentationPitch,
        AiAction::ProjectHealth,
        AiAction::RelatedItems,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AiAction::FreeformSearch => "freeform-search",
            AiAction::Insights => "insights",
            AiAction::SimplifyAbstract => "simplify-abstract",
            AiAction::TeamExpertise => "team-expertise",
            AiAction::TechExplain => "tech-explain",
            AiAction::ComprehensiveAnalysis => "comprehensive-analysis",
            AiAction::SuggestedReadings => "suggested-readings",
            AiAction::PresentationPitch => "presentation-pitch",
            AiAction::ProjectHealth => "project-health",
            AiAction::RelatedItems => "related-items",
        }
    }

    pub fn parse_mode(self) -> ParseMode {
        match self {
            AiAction::FreeformSearch
            | AiAction::Insights
            | AiAction::SuggestedReadings
            | AiAction::ProjectHealth
            | AiAction::RelatedItems => ParseMode::Structured,
            _ => ParseMode::Passthrough,
        }
    }

    /// Low temperature for ID-returning/classification actions, moderate for
    /// free-text generation.
    pub fn temperature(self) -> f32 {
        match self.parse_mode() {
            ParseMode::Structured => 0.2,
            ParseMode::Passthrough => 0.7,
        }
    }

    /// Fixed result-count contract for actions that return catalog references.
    pub fn required_results(self) -> Option<usize> {
        match self {
            AiAction::FreeformSearch | AiAction::RelatedItems => Some(4),
            _ => None,
        }
    }

    /// Whether the action grounds the model in the formatted catalog block.
    pub fn uses_catalog(self) -> bool {
        matches!(self, AiAction::FreeformSearch | AiAction::RelatedItems)
    }
}

impl fmt::Display for AiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiAction {
    type Err = CatalogIntelligenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AiAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| {
                CatalogIntelligenceError::Validation(format!("Unknown AI action: '{s}'"))
            })
    }
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

const JSON_ONLY: &str = "Respond with a single JSON object only. Do not wrap it in markdown \
code fences and do not add any text before or after the object.";

/// Build the system/user prompt pair for one action.
///
/// `knowledge_base` is the formatted catalog block; it is required for the
/// catalog-grounded actions and ignored by the rest.
pub fn build_prompt(action: AiAction, ctx: &PromptContext, knowledge_base: Option<&str>) -> Prompt {
    match action {
        AiAction::FreeformSearch => {
            let kb = knowledge_base.unwrap_or("No catalog data was provided.");
            Prompt {
                system: format!(
                    "You are the search assistant for a departmental academic-project repository. \
You answer questions using only the project catalog below.\n\n\
PROJECT CATALOG:\n{kb}\n\n\
Pick the projects most relevant to the user's request, best match first. \
Return JSON with exactly these keys: \
{{\"matches\": [{{\"id\": \"<project id from the catalog>\", \"reason\": \"<one sentence>\"}}], \
\"summary\": \"<2-3 sentence overview of what you found>\"}}. \
Use only IDs that appear in the catalog. {JSON_ONLY}"
                ),
                user: format!("Search request: {}", ctx.query_or_default()),
            }
        }
        AiAction::RelatedItems => {
            let kb = knowledge_base.unwrap_or("No catalog data was provided.");
            Prompt {
                system: format!(
                    "You are the recommendation assistant for a departmental academic-project \
repository. You suggest catalog projects related to a given project.\n\n\
PROJECT CATALOG:\n{kb}\n\n\
Return JSON with exactly this key: \
{{\"related\": [{{\"id\": \"<project id from the catalog>\", \"reason\": \"<one sentence>\"}}]}}. \
Do not include the given project itself. Use only IDs that appear in the catalog. {JSON_ONLY}"
                ),
                user: format!(
                    "Find projects related to:\nTitle: {}\nAbstract: {}\nTech stack: {}",
                    ctx.title_or_default(),
                    ctx.abstract_or_default(),
                    ctx.tech_stack_or_default(),
                ),
            }
        }
        AiAction::Insights => Prompt {
            system: format!(
                "You are an academic project analyst. You study one student project and produce \
structured insights. Return JSON with exactly these keys: \
{{\"summary\": \"<3-4 sentences>\", \"innovations\": [\"<novel aspect>\"], \
\"authorExpertise\": \"<skills the authors demonstrably applied>\", \
\"keyRoles\": [\"<likely team role>\"]}}. {JSON_ONLY}"
            ),
            user: project_block(ctx),
        },
        AiAction::ProjectHealth => Prompt {
            system: format!(
                "You are a project reviewer scoring how complete and well-documented a project \
submission is. Return JSON with exactly these keys: \
{{\"score\": <integer 0-100>, \"feedback\": \"<1-2 sentences of concrete advice>\"}}. {JSON_ONLY}"
            ),
            user: project_block(ctx),
        },
        AiAction::SuggestedReadings => Prompt {
            system: format!(
                "You are an academic librarian recommending background material for a student \
project. Return JSON with exactly this key: \
{{\"readings\": [{{\"title\": \"<paper, book or resource>\", \"source\": \"<where to find it>\", \
\"relevance\": \"<one sentence>\"}}]}}. Suggest 3 to 5 readings. {JSON_ONLY}"
            ),
            user: project_block(ctx),
        },
        AiAction::SimplifyAbstract => Prompt {
            system: "You are a science communicator. Rewrite the project abstract in plain \
language a first-year student would understand, in at most 4 sentences. Respond with plain \
text only."
                .to_string(),
            user: format!(
                "Title: {}\nAbstract: {}",
                ctx.title_or_default(),
                ctx.abstract_or_default()
            ),
        },
        AiAction::TeamExpertise => Prompt {
            system: "You are an academic mentor. Describe the combined expertise this project \
team demonstrates and where the team would benefit from another skill set. Respond with plain \
text only."
                .to_string(),
            user: project_block(ctx),
        },
        AiAction::TechExplain => Prompt {
            system: "You are a patient technical tutor. Explain the project's technology stack: \
what each listed technology does and why it fits this project. Respond with plain text only."
                .to_string(),
            user: format!(
                "Title: {}\nTech stack: {}\nAbstract: {}",
                ctx.title_or_default(),
                ctx.tech_stack_or_default(),
                ctx.abstract_or_default()
            ),
        },
        AiAction::ComprehensiveAnalysis => Prompt {
            system: "You are a senior faculty reviewer writing a thorough assessment of a student \
project: strengths, weaknesses, methodology, and possible extensions. Respond with plain text \
only."
                .to_string(),
            user: project_block(ctx),
        },
        AiAction::PresentationPitch => Prompt {
            system: "You are a presentation coach. Write a confident 60-second elevator pitch the \
team can read aloud when presenting this project. Respond with plain text only."
                .to_string(),
            user: project_block(ctx),
        },
    }
}

fn project_block(ctx: &PromptContext) -> String {
    format!(
        "Project details:\nTitle: {}\nAbstract: {}\nTech stack: {}\nAuthors: {}\nGuide: {}\nAcademic year: {}",
        ctx.title_or_default(),
        ctx.abstract_or_default(),
        ctx.tech_stack_or_default(),
        ctx.authors_or_default(),
        ctx.guide_or_default(),
        ctx.year_or_default(),
    )
}
