//! Transform -- converts sanitized wire lists into the canonical plan set.
//!
//! This is the last stop before data reaches the UI contract, so the
//! output is re-validated before returning. A failure there is a bug in
//! this module, not bad input: everything arriving here has already passed
//! the wire schema and the sanitizer.

use crate::schema::answers::{GoalTimeline, WizardAnswers};
use crate::schema::canonical::{CanonicalAppItem, Plan, PlanSet, MAX_APPS, MAX_SETUP_STEPS, MIN_APPS};
use crate::schema::wire::{RawAppEntry, WirePlanSet};
use crate::schema::{Tier, ValidationError};

/// URL padding placeholders point at; the row is rendered locked, so this
/// is only followed after purchase.
const UPGRADE_URL: &str = "https://stackwise.app/upgrade";

/// Raised when the assembled plan set fails canonical validation.
///
/// This is a programming-error-class failure: inputs were already
/// sanitized, so the transform itself produced an out-of-contract shape.
#[derive(Debug, thiserror::Error)]
#[error("canonical plan contract violated: {source}")]
pub struct ContractViolation {
    /// The validation failure the assembled output produced.
    #[from]
    pub source: ValidationError,
}

/// Derive a stable slug id from an app name.
///
/// Lowercases, collapses every non-alphanumeric run into a single hyphen,
/// trims edge hyphens, and caps at 64 characters. A pure function of the
/// name: the same name always yields the same id.
pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }

    let truncated: String = slug.chars().take(64).collect();
    let trimmed = truncated.trim_matches('-');
    if trimmed.is_empty() {
        "app".to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Assemble the canonical plan set from sanitized per-tier candidates.
///
/// Per tier: map entries to canonical items, pad with locked placeholders
/// up to 4, cap at 7 (order preserved), compute the title/summary from the
/// tier template and the user's timeline/budget, and clamp the unlocked
/// index. Tier order in the output is always A, B, C, D.
///
/// # Errors
///
/// Returns [`ContractViolation`] when the assembled output fails canonical
/// validation -- a bug in this module, logged loudly at the call site.
pub fn to_plan_set(
    sanitized: &WirePlanSet,
    answers: &WizardAnswers,
    requested_unlock: usize,
) -> Result<PlanSet, ContractViolation> {
    let plans = Tier::ALL
        .iter()
        .map(|tier| build_plan(*tier, sanitized.tier_apps(*tier), answers, requested_unlock))
        .collect();

    let set = PlanSet { plans, notes: None };

    if let Err(source) = set.validate() {
        tracing::error!(error = %source, "transform produced an out-of-contract plan set");
        return Err(ContractViolation { source });
    }

    Ok(set)
}

fn build_plan(
    tier: Tier,
    entries: &[RawAppEntry],
    answers: &WizardAnswers,
    requested_unlock: usize,
) -> Plan {
    let mut apps: Vec<CanonicalAppItem> = entries.iter().map(to_canonical_item).collect();

    apps.truncate(MAX_APPS);
    let mut placeholder = 0usize;
    while apps.len() < MIN_APPS {
        placeholder = placeholder.saturating_add(1);
        apps.push(locked_placeholder(tier, placeholder));
    }

    let unlocked_index = requested_unlock.min(apps.len().saturating_sub(1));

    Plan {
        tier,
        title: format!("{} Stack", tier.alias()),
        summary: tier_summary(tier, answers),
        apps,
        unlocked_index,
    }
}

fn to_canonical_item(entry: &RawAppEntry) -> CanonicalAppItem {
    let setup_steps = match &entry.setup_steps {
        Some(steps) if !steps.is_empty() => steps
            .iter()
            .take(MAX_SETUP_STEPS)
            .map(|s| s.trim().to_owned())
            .collect(),
        _ => default_setup_steps(&entry.name),
    };

    CanonicalAppItem {
        id: slugify(&entry.name),
        name: entry.name.clone(),
        url: entry.url.clone(),
        rationale: entry.description.trim().to_owned(),
        setup_steps,
    }
}

/// The generic three-step onboarding template used when the upstream gave
/// no steps of its own.
fn default_setup_steps(name: &str) -> Vec<String> {
    vec![
        format!("Open {name} and create your account"),
        "Verify your identity and link your details".to_owned(),
        format!("Complete {name}'s onboarding checklist"),
    ]
}

/// A synthetic entry keeping the layout stable when a tier came back
/// under-populated.
fn locked_placeholder(tier: Tier, n: usize) -> CanonicalAppItem {
    CanonicalAppItem {
        id: format!("locked-{}-{n}", tier.key()),
        name: "Locked recommendation".to_owned(),
        url: UPGRADE_URL.to_owned(),
        rationale: format!(
            "Unlock the full {} stack to see this hand-picked app.",
            tier.alias()
        ),
        setup_steps: vec!["Upgrade to reveal this recommendation".to_owned()],
    }
}

fn tier_summary(tier: Tier, answers: &WizardAnswers) -> String {
    let base = match tier {
        Tier::A => "Core accounts and monitoring to get your file moving",
        Tier::B => "Everyday bills put to work reporting on your behalf",
        Tier::C => "Installment builders and automation to compound gains",
        Tier::D => "Dispute tooling and long-haul upkeep for a clean file",
    };

    let pace = match answers.goal_timeline {
        Some(GoalTimeline::ThirtyDay) => ", aimed at 30-day improvements",
        Some(GoalTimeline::NinetyDay) => ", paced for a 90-day push",
        Some(GoalTimeline::Flexible) | None => ", paced for steady progress",
    };

    match answers.monthly_budget {
        Some(budget) => format!("{base}{pace} within a ~${budget:.0}/mo budget."),
        None => format!("{base}{pace}."),
    }
}
