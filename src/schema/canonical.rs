//! The canonical contract -- the validated, UI-stable shape returned to
//! callers.
//!
//! By the time data reaches this shape it has been sanitized, padded, and
//! capped; [`PlanSet::validate`] exists to catch transform bugs, not bad
//! input.

use serde::{Deserialize, Serialize};

use super::{Issues, Tier, ValidationError};

/// Minimum apps per plan after padding.
pub const MIN_APPS: usize = 4;
/// Maximum apps per plan after capping.
pub const MAX_APPS: usize = 7;
/// Maximum setup steps per app.
pub const MAX_SETUP_STEPS: usize = 8;
/// Maximum length of a slug id.
pub const MAX_ID_CHARS: usize = 64;

/// One app as rendered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalAppItem {
    /// Stable slug derived from `name`; doubles as the list key in the UI.
    pub id: String,
    /// Display name.
    pub name: String,
    /// App URL.
    pub url: String,
    /// Short "why this app" text.
    pub rationale: String,
    /// Ordered setup steps, 1–8 short strings.
    pub setup_steps: Vec<String>,
}

/// One of the four named recommendation tiers, fully assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Which tier this plan is.
    pub tier: Tier,
    /// Display title.
    pub title: String,
    /// One-sentence summary.
    pub summary: String,
    /// Ordered app list, 4–7 entries after padding/capping.
    pub apps: Vec<CanonicalAppItem>,
    /// Zero-based boundary of free-tier visibility.
    pub unlocked_index: usize,
}

/// The full deliverable: exactly four plans in tier order, plus notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSet {
    /// The four plans, always in A, B, C, D order.
    pub plans: Vec<Plan>,
    /// Optional free-text notes from the upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PlanSet {
    /// Check the canonical contract, reporting every violation.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a tier is missing or duplicated,
    /// tiers are out of order, an app count is outside 4–7, or an app's
    /// fields break their bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Issues::default();

        if self.plans.len() != Tier::ALL.len() {
            issues.push(
                "plans",
                format!("must contain exactly 4 plans, found {}", self.plans.len()),
            );
        }
        for (i, tier) in Tier::ALL.iter().enumerate() {
            match self.plans.get(i) {
                Some(plan) if plan.tier == *tier => plan.check(&mut issues),
                Some(plan) => issues.push(
                    format!("plans[{i}].tier"),
                    format!("expected tier {}, found {}", tier.as_str(), plan.tier.as_str()),
                ),
                None => {}
            }
        }

        issues.into_result(())
    }

    /// The plan for one tier, if present.
    pub fn plan(&self, tier: Tier) -> Option<&Plan> {
        self.plans.iter().find(|p| p.tier == tier)
    }
}

impl Plan {
    fn check(&self, issues: &mut Issues) {
        let path = self.tier.key();

        if self.title.trim().is_empty() {
            issues.push(format!("{path}.title"), "must not be empty");
        }
        if self.apps.len() < MIN_APPS || self.apps.len() > MAX_APPS {
            issues.push(
                format!("{path}.apps"),
                format!(
                    "must contain {MIN_APPS}-{MAX_APPS} apps, found {}",
                    self.apps.len()
                ),
            );
        }
        if !self.apps.is_empty() && self.unlocked_index >= self.apps.len() {
            issues.push(
                format!("{path}.unlocked_index"),
                format!("must be below the app count {}", self.apps.len()),
            );
        }

        for (i, app) in self.apps.iter().enumerate() {
            app.check(&format!("{path}.apps[{i}]"), issues);
        }
    }
}

impl CanonicalAppItem {
    fn check(&self, path: &str, issues: &mut Issues) {
        if self.id.is_empty() || self.id.chars().count() > MAX_ID_CHARS {
            issues.push(
                format!("{path}.id"),
                format!("must be 1-{MAX_ID_CHARS} characters"),
            );
        }
        if !self
            .id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            issues.push(
                format!("{path}.id"),
                "must contain only lowercase alphanumerics and hyphens",
            );
        }
        if self.name.trim().is_empty() {
            issues.push(format!("{path}.name"), "must not be empty");
        }
        if self.setup_steps.is_empty() || self.setup_steps.len() > MAX_SETUP_STEPS {
            issues.push(
                format!("{path}.setup_steps"),
                format!("must contain 1-{MAX_SETUP_STEPS} steps"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str) -> CanonicalAppItem {
        CanonicalAppItem {
            id: id.to_owned(),
            name: "App".to_owned(),
            url: "https://example.com".to_owned(),
            rationale: "Builds credit".to_owned(),
            setup_steps: vec!["Open the app".to_owned()],
        }
    }

    fn plan(tier: Tier, count: usize) -> Plan {
        Plan {
            tier,
            title: format!("{} Stack", tier.alias()),
            summary: "A summary".to_owned(),
            apps: (0..count).map(|i| app(&format!("app-{i}"))).collect(),
            unlocked_index: 0,
        }
    }

    fn full_set() -> PlanSet {
        PlanSet {
            plans: Tier::ALL.iter().map(|t| plan(*t, 4)).collect(),
            notes: None,
        }
    }

    #[test]
    fn test_valid_set_passes() {
        full_set().validate().expect("set is well-formed");
    }

    #[test]
    fn test_missing_tier_fails() {
        let mut set = full_set();
        set.plans.pop();
        let err = set.validate().expect_err("only three plans");
        assert!(err.issues.iter().any(|i| i.field == "plans"));
    }

    #[test]
    fn test_out_of_order_tiers_fail() {
        let mut set = full_set();
        set.plans.swap(0, 1);
        let err = set.validate().expect_err("B before A");
        assert!(err.issues.iter().any(|i| i.field.ends_with(".tier")));
    }

    #[test]
    fn test_app_count_bounds() {
        let mut set = full_set();
        set.plans[2].apps.truncate(3);
        let err = set.validate().expect_err("three apps is under the floor");
        assert!(err.issues.iter().any(|i| i.field == "accelerator.apps"));

        let mut set = full_set();
        set.plans[0].apps = (0..8).map(|i| app(&format!("app-{i}"))).collect();
        let err = set.validate().expect_err("eight apps is over the cap");
        assert!(err.issues.iter().any(|i| i.field == "foundation.apps"));
    }

    #[test]
    fn test_bad_slug_rejected() {
        let mut set = full_set();
        set.plans[0].apps[0].id = "Not A Slug".to_owned();
        let err = set.validate().expect_err("uppercase and spaces");
        assert!(err
            .issues
            .iter()
            .any(|i| i.field == "foundation.apps[0].id"));
    }

    #[test]
    fn test_unlocked_index_bound() {
        let mut set = full_set();
        set.plans[3].unlocked_index = 9;
        let err = set.validate().expect_err("index past the end");
        assert!(err.issues.iter().any(|i| i.field == "elite.unlocked_index"));
    }

    #[test]
    fn test_too_many_setup_steps() {
        let mut set = full_set();
        set.plans[1].apps[0].setup_steps = (0..9).map(|i| format!("step {i}")).collect();
        let err = set.validate().expect_err("nine steps");
        assert!(err
            .issues
            .iter()
            .any(|i| i.field == "growth.apps[0].setup_steps"));
    }

    #[test]
    fn test_plan_lookup_by_tier() {
        let set = full_set();
        assert!(set.plan(Tier::C).is_some());
        assert_eq!(set.plan(Tier::C).map(|p| p.tier), Some(Tier::C));
    }
}
