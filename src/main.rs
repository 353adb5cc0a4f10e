use anyhow::{Context, Result, bail};

use catalog_intelligence::{
    AiAction, CatalogIntelligenceError, CatalogIntelligenceService, Config, PromptContext,
};

/// Thin runner around the library: `catalog-intelligence <action> [context-json]`.
/// Prints the serialized outcome to stdout; diagnostics go to stderr.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(action_name) = args.next() else {
        bail!(
            "usage: catalog-intelligence <action> [context-json]\nactions: {}",
            AiAction::ALL
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    };

    let context: PromptContext = match args.next() {
        Some(raw) => serde_json::from_str(&raw).context("context must be a JSON object")?,
        None => PromptContext::default(),
    };

    let config = Config::load();
    let service = CatalogIntelligenceService::from_config(&config)?;

    let action: AiAction = action_name.parse()?;
    match service.invoke(action, &context).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(e) => {
            // Hard failures still leave the caller a renderable JSON object.
            let kind = match &e {
                CatalogIntelligenceError::Validation(_) => "validation",
                CatalogIntelligenceError::Config(_) => "configuration",
                CatalogIntelligenceError::Store(_) => "store",
                _ => "internal",
            };
            println!(
                "{}",
                serde_json::json!({ "error": e.to_string(), "category": kind })
            );
            std::process::exit(1);
        }
    }
}
