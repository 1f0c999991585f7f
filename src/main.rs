#![allow(missing_docs)]

//! Stackwise CLI -- one-shot plan generation and operational inspection.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use stackwise::advisor::response::{filter_tier, render, Shape};
use stackwise::advisor::{Advisor, AdvisorSettings};
use stackwise::cache::{content_hash, PlanCache};
use stackwise::config::{LlmSection, StackwiseConfig};
use stackwise::fallback::CATALOG;
use stackwise::providers::anthropic::AnthropicModel;
use stackwise::providers::ollama::OllamaModel;
use stackwise::providers::PlanModel;
use stackwise::schema::answers::WizardAnswers;
use stackwise::schema::Tier;

#[derive(Parser)]
#[command(
    name = "stackwise",
    about = "Credit-building app stack advisor",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a plan set from a wizard answers JSON file.
    Generate {
        /// Path to the answers JSON file, or '-' for stdin.
        #[arg(long)]
        answers: PathBuf,
        /// Skip the model entirely and use the fallback planner.
        #[arg(long)]
        offline: bool,
        /// Render rows as a paying viewer.
        #[arg(long)]
        has_access: bool,
        /// Response shape: "canonical" or "legacy".
        #[arg(long)]
        shape: Option<String>,
        /// Only print one tier (letter or alias, e.g. "B" or "growth").
        #[arg(long)]
        tier: Option<String>,
    },
    /// Print the fallback catalog as JSON.
    Catalog,
    /// Print the cache key for a wizard answers JSON file.
    Hash {
        /// Path to the answers JSON file, or '-' for stdin.
        #[arg(long)]
        answers: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    stackwise::logging::init_cli();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            answers,
            offline,
            has_access,
            shape,
            tier,
        } => generate(&answers, offline, has_access, shape.as_deref(), tier.as_deref()).await,
        Command::Catalog => catalog(),
        Command::Hash { answers } => hash(&answers),
    }
}

async fn generate(
    answers_path: &PathBuf,
    offline: bool,
    has_access: bool,
    shape_flag: Option<&str>,
    tier_flag: Option<&str>,
) -> Result<()> {
    let config = StackwiseConfig::load()?;

    let shape = match shape_flag {
        Some(s) => Shape::parse(s)
            .ok_or_else(|| anyhow::anyhow!("unknown shape '{s}', expected canonical or legacy"))?,
        None => config.advisor.shape,
    };
    let tier = match tier_flag {
        Some(t) => Some(
            Tier::parse(t).ok_or_else(|| anyhow::anyhow!("unknown tier '{t}'"))?,
        ),
        None => None,
    };

    let model = if offline || config.advisor.offline {
        None
    } else {
        build_model(&config.llm)
    };

    let cache = Arc::new(PlanCache::new(
        config.cache.ttl_seconds,
        config.cache.capacity,
    ));
    let settings = AdvisorSettings {
        model_timeout: std::time::Duration::from_secs(config.advisor.model_timeout_seconds),
        unlocked_default: config.advisor.unlocked_default,
    };
    let advisor = Advisor::new(model, cache, settings);

    let answers = read_json(answers_path)?;
    let plans = advisor.generate(&answers).await?;
    let mut rendered = render(&plans, has_access, shape);
    if let Some(tier) = tier {
        rendered = filter_tier(rendered, shape, tier);
    }

    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}

fn catalog() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(CATALOG)?);
    Ok(())
}

fn hash(answers_path: &PathBuf) -> Result<()> {
    let value = read_json(answers_path)?;
    let answers = WizardAnswers::from_value(&value)?;
    println!("{}", content_hash(&answers)?);
    Ok(())
}

/// Pick the configured model: Anthropic when a key is present, otherwise
/// Ollama, otherwise none (fallback planner only).
fn build_model(llm: &LlmSection) -> Option<Arc<dyn PlanModel>> {
    if let Some(anthropic) = &llm.anthropic {
        return Some(Arc::new(AnthropicModel::new(
            anthropic.model.clone(),
            anthropic.api_key.clone(),
        )));
    }
    if let Some(ollama) = &llm.ollama {
        return Some(Arc::new(OllamaModel::new(
            ollama.base_url.clone(),
            ollama.model.clone(),
        )));
    }
    tracing::info!("no model configured, running offline");
    None
}

fn read_json(path: &PathBuf) -> Result<Value> {
    let contents = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read answers from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read answers file {}", path.display()))?
    };

    serde_json::from_str(&contents).context("answers file is not valid JSON")
}
