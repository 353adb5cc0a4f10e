use crate::models::{FIELD_PLACEHOLDER, ProjectRecord, join_or_placeholder};

/// Free-text cutoff applied before a field enters a prompt. Keeps the knowledge
/// base block inside the provider's context budget.
pub const ABSTRACT_CUTOFF: usize = 200;

pub const EMPTY_CATALOG_SENTINEL: &str = "No approved projects are available in the catalog.";

/// Truncate on a char boundary and mark the cut with an ellipsis.
pub fn truncate_field(text: &str, cutoff: usize) -> String {
    if text.chars().count() <= cutoff {
        return text.to_string();
    }
    let mut out: String = text.chars().take(cutoff).collect();
    out.push('…');
    out
}

/// Render a bounded catalog slice as a newline-delimited knowledge base block.
///
/// One entry per record, pipe-delimited `Key: value` pairs, blank line between
/// entries. Missing fields render as "N/A" so the block's structure stays
/// predictable for the model. Empty input yields an explicit sentinel rather
/// than an empty string.
pub fn format_catalog(projects: &[ProjectRecord]) -> String {
    if projects.is_empty() {
        return EMPTY_CATALOG_SENTINEL.to_string();
    }

    projects
        .iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_entry(project: &ProjectRecord) -> String {
    let abstract_text = project
        .abstract_text
        .as_deref()
        .map(|a| truncate_field(a, ABSTRACT_CUTOFF))
        .unwrap_or_else(|| FIELD_PLACEHOLDER.to_string());

    format!(
        "ID: {} | Title: {} | Abstract: {} | Tech: {} | Authors: {} | Guide: {} | Year: {} | Status: {}",
        project.id,
        project.title,
        abstract_text,
        join_or_placeholder(project.tech_stack.as_deref()),
        join_or_placeholder(project.authors.as_deref()),
        project.guide_name.as_deref().unwrap_or(FIELD_PLACEHOLDER),
        project.academic_year.as_deref().unwrap_or(FIELD_PLACEHOLDER),
        project.status,
    )
}
