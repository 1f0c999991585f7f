//! Viewer-facing response shaping.
//!
//! Two shapes exist while clients migrate: the canonical `{plans, notes}`
//! contract and the legacy tier-keyed map. The shape is an explicit
//! parameter -- never inferred from the request.

use serde_json::{json, Value};

use crate::schema::canonical::PlanSet;
use crate::visibility::{row_states, RowState};

/// Which response shape to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// The canonical `{plans: [...], notes}` contract.
    Canonical,
    /// The tier-keyed map older clients still read.
    Legacy,
}

impl Shape {
    /// The wire string for this shape.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::Legacy => "legacy",
        }
    }

    /// Parse a wire string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "canonical" => Some(Self::Canonical),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::Canonical
    }
}

/// Render a plan set for one viewer, annotating each row's lock state.
pub fn render(plans: &PlanSet, has_access: bool, shape: Shape) -> Value {
    match shape {
        Shape::Canonical => render_canonical(plans, has_access),
        Shape::Legacy => render_legacy(plans, has_access),
    }
}

/// Narrow a rendered response to a single requested tier.
///
/// The full set is always generated and cached; this only trims what the
/// caller sees.
pub fn filter_tier(rendered: Value, shape: Shape, tier: crate::schema::Tier) -> Value {
    match shape {
        Shape::Canonical => {
            let plans = rendered["plans"]
                .as_array()
                .map(|plans| {
                    plans
                        .iter()
                        .filter(|p| p["id"] == tier.as_str())
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            match rendered.get("notes") {
                Some(notes) => json!({ "plans": plans, "notes": notes }),
                None => json!({ "plans": plans }),
            }
        }
        Shape::Legacy => {
            let mut out = serde_json::Map::new();
            if let Some(plan) = rendered.get(tier.key()) {
                out.insert(tier.key().to_owned(), plan.clone());
            }
            Value::Object(out)
        }
    }
}

fn render_canonical(plans: &PlanSet, has_access: bool) -> Value {
    let rendered: Vec<Value> = plans
        .plans
        .iter()
        .map(|plan| {
            let states = row_states(has_access, plan.unlocked_index, plan.apps.len());
            let apps: Vec<Value> = plan
                .apps
                .iter()
                .zip(states.iter())
                .map(|(app, state)| {
                    json!({
                        "app_id": app.id,
                        "app_name": app.name,
                        "app_url": app.url,
                        "why": app.rationale,
                        "setup_steps": app.setup_steps,
                        "locked": *state == RowState::Locked,
                    })
                })
                .collect();

            json!({
                "id": plan.tier.as_str(),
                "title": plan.title,
                "summary": plan.summary,
                "apps": apps,
                "unlocked_app_index": plan.unlocked_index,
            })
        })
        .collect();

    match &plans.notes {
        Some(notes) => json!({ "plans": rendered, "notes": notes }),
        None => json!({ "plans": rendered }),
    }
}

fn render_legacy(plans: &PlanSet, has_access: bool) -> Value {
    let mut out = serde_json::Map::new();

    for plan in &plans.plans {
        let states = row_states(has_access, plan.unlocked_index, plan.apps.len());
        let apps: Vec<Value> = plan
            .apps
            .iter()
            .zip(states.iter())
            .map(|(app, state)| {
                json!({
                    "name": app.name,
                    "url": app.url,
                    "why": app.rationale,
                    "steps": app.setup_steps,
                    "locked": *state == RowState::Locked,
                })
            })
            .collect();

        out.insert(
            plan.tier.key().to_owned(),
            json!({
                "title": plan.title,
                "summary": plan.summary,
                "apps": apps,
            }),
        );
    }

    Value::Object(out)
}
