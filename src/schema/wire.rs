//! The wire format -- what the model is expected to emit, pre-sanitization.
//!
//! The model is an unreliable upstream: entries can be overlong, point at
//! garbage URLs, or invent categories. Field bounds are enforced here;
//! category membership and topic drift are the sanitizer's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Issues, Tier, ValidationError};

/// Maximum length of an app name.
pub const MAX_NAME_CHARS: usize = 140;
/// Maximum length of an app description.
pub const MAX_DESCRIPTION_CHARS: usize = 400;
/// Maximum length of the free-text cost field.
pub const MAX_COST_CHARS: usize = 60;
/// Maximum length of an app URL.
pub const MAX_URL_CHARS: usize = 400;

/// One candidate app as described by the model or the fallback planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAppEntry {
    /// App name, 1–140 chars.
    pub name: String,
    /// Claimed category string; membership is checked by the sanitizer.
    pub category: String,
    /// Short description, 1–400 chars.
    pub description: String,
    /// Free-text cost, 1–60 chars (e.g. `"$5/mo"`, `"Free"`).
    pub cost: String,
    /// App URL; must parse and be at most 400 chars.
    pub url: String,
    /// Optional setup steps supplied by the upstream; used verbatim
    /// downstream when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_steps: Option<Vec<String>>,
}

impl RawAppEntry {
    /// Check field bounds, recording violations under `path`.
    fn check(&self, path: &str, issues: &mut Issues) {
        check_chars(&self.name, 1, MAX_NAME_CHARS, &format!("{path}.name"), issues);
        check_chars(
            &self.description,
            1,
            MAX_DESCRIPTION_CHARS,
            &format!("{path}.description"),
            issues,
        );
        check_chars(&self.cost, 1, MAX_COST_CHARS, &format!("{path}.cost"), issues);

        if self.url.chars().count() > MAX_URL_CHARS {
            issues.push(
                format!("{path}.url"),
                format!("must be at most {MAX_URL_CHARS} characters"),
            );
        } else if url::Url::parse(&self.url).is_err() {
            issues.push(format!("{path}.url"), "must be a valid URL");
        }

        if let Some(steps) = &self.setup_steps {
            for (i, step) in steps.iter().enumerate() {
                if step.trim().is_empty() {
                    issues.push(format!("{path}.setup_steps[{i}]"), "must not be empty");
                }
            }
        }
    }
}

fn check_chars(value: &str, min: usize, max: usize, path: &str, issues: &mut Issues) {
    let count = value.chars().count();
    if count < min {
        issues.push(path, "must not be empty");
    } else if count > max {
        issues.push(path, format!("must be at most {max} characters"));
    }
}

/// The model's full output: exactly four tier-keyed candidate lists.
///
/// Accepts the lowercase tier aliases or bare letters as keys; anything else
/// at the top level is a violation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePlanSet {
    /// Tier A candidates.
    #[serde(alias = "A", alias = "a")]
    pub foundation: Vec<RawAppEntry>,
    /// Tier B candidates.
    #[serde(alias = "B", alias = "b")]
    pub growth: Vec<RawAppEntry>,
    /// Tier C candidates.
    #[serde(alias = "C", alias = "c")]
    pub accelerator: Vec<RawAppEntry>,
    /// Tier D candidates.
    #[serde(alias = "D", alias = "d")]
    pub elite: Vec<RawAppEntry>,
}

impl WirePlanSet {
    /// Validate untrusted JSON into a wire plan set, reporting every
    /// violation.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the top level is not an object
    /// with exactly the four tier keys, or when any entry violates its
    /// field bounds.
    pub fn from_value(input: &Value) -> Result<Self, ValidationError> {
        let Some(obj) = input.as_object() else {
            return Err(ValidationError::single("plans", "must be a JSON object"));
        };

        let mut issues = Issues::default();

        for key in obj.keys() {
            if normalize_tier_key(key).is_none() {
                issues.push(key.clone(), "is not a tier key");
            }
        }
        for tier in Tier::ALL {
            let present = obj.keys().any(|k| normalize_tier_key(k) == Some(tier));
            if !present {
                issues.push(tier.key(), "tier is missing");
            }
        }
        if !issues.is_empty() {
            return issues.into_result(Self::default());
        }

        let set: Self = match serde_json::from_value(input.clone()) {
            Ok(set) => set,
            Err(e) => {
                return Err(ValidationError::single("plans", format!("malformed: {e}")));
            }
        };

        for tier in Tier::ALL {
            for (i, entry) in set.tier_apps(tier).iter().enumerate() {
                entry.check(&format!("{}[{i}]", tier.key()), &mut issues);
            }
        }

        issues.into_result(set)
    }

    /// The candidate list for one tier.
    pub fn tier_apps(&self, tier: Tier) -> &[RawAppEntry] {
        match tier {
            Tier::A => &self.foundation,
            Tier::B => &self.growth,
            Tier::C => &self.accelerator,
            Tier::D => &self.elite,
        }
    }

    /// Mutable access to one tier's candidate list.
    pub fn tier_apps_mut(&mut self, tier: Tier) -> &mut Vec<RawAppEntry> {
        match tier {
            Tier::A => &mut self.foundation,
            Tier::B => &mut self.growth,
            Tier::C => &mut self.accelerator,
            Tier::D => &mut self.elite,
        }
    }
}

fn normalize_tier_key(key: &str) -> Option<Tier> {
    Tier::parse(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str) -> Value {
        json!({
            "name": name,
            "category": "credit-builder",
            "description": "Builds credit.",
            "cost": "$5/mo",
            "url": "https://example.com/app",
        })
    }

    #[test]
    fn test_valid_wire_set_parses() {
        let input = json!({
            "foundation": [entry("Kikoff")],
            "growth": [entry("Boom")],
            "accelerator": [],
            "elite": [entry("Dovly")],
        });

        let set = WirePlanSet::from_value(&input).expect("should parse");
        assert_eq!(set.foundation.len(), 1);
        assert_eq!(set.foundation[0].name, "Kikoff");
        assert!(set.accelerator.is_empty());
    }

    #[test]
    fn test_letter_keys_accepted() {
        let input = json!({
            "A": [entry("Kikoff")],
            "B": [],
            "C": [],
            "D": [],
        });

        let set = WirePlanSet::from_value(&input).expect("letter keys are aliases");
        assert_eq!(set.foundation[0].name, "Kikoff");
    }

    #[test]
    fn test_missing_tier_rejected() {
        let input = json!({
            "foundation": [],
            "growth": [],
            "accelerator": [],
        });

        let err = WirePlanSet::from_value(&input).expect_err("elite missing");
        assert!(err.issues.iter().any(|i| i.field == "elite"));
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let input = json!({
            "foundation": [], "growth": [], "accelerator": [], "elite": [],
            "platinum": [],
        });

        let err = WirePlanSet::from_value(&input).expect_err("platinum is not a tier");
        assert!(err.issues.iter().any(|i| i.field == "platinum"));
    }

    #[test]
    fn test_field_bounds_enforced() {
        let mut bad = entry("Kikoff");
        bad["name"] = json!("x".repeat(141));
        bad["url"] = json!("not a url");
        let input = json!({
            "foundation": [bad],
            "growth": [], "accelerator": [], "elite": [],
        });

        let err = WirePlanSet::from_value(&input).expect_err("two bad fields");
        let fields: Vec<&str> = err.issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"foundation[0].name"));
        assert!(fields.contains(&"foundation[0].url"));
    }

    #[test]
    fn test_empty_description_rejected() {
        let mut bad = entry("Kikoff");
        bad["description"] = json!("");
        let input = json!({
            "foundation": [], "growth": [bad], "accelerator": [], "elite": [],
        });

        let err = WirePlanSet::from_value(&input).expect_err("empty description");
        assert!(err
            .issues
            .iter()
            .any(|i| i.field == "growth[0].description"));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = WirePlanSet::from_value(&json!([1, 2])).expect_err("array is not a plan set");
        assert_eq!(err.issues[0].field, "plans");
    }

    #[test]
    fn test_setup_steps_carried_through() {
        let mut with_steps = entry("Credit Versio");
        with_steps["setup_steps"] = json!(["Sign up", "Import your report"]);
        let input = json!({
            "foundation": [with_steps],
            "growth": [], "accelerator": [], "elite": [],
        });

        let set = WirePlanSet::from_value(&input).expect("should parse");
        let steps = set.foundation[0].setup_steps.as_ref().expect("steps kept");
        assert_eq!(steps.len(), 2);
    }
}
