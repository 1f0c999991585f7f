//! Data contracts for the advisor pipeline.
//!
//! Three shapes live here:
//! - [`answers::WizardAnswers`] -- what the wizard collects from the user
//! - [`wire::WirePlanSet`] -- what the model is expected to emit, pre-sanitization
//! - [`canonical::PlanSet`] -- the validated shape returned to callers
//!
//! Validation is aggregated: a failed parse reports every violated
//! constraint, not just the first one encountered.

use serde::{Deserialize, Serialize};

pub mod answers;
pub mod canonical;
pub mod wire;

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// A single violated constraint, addressed by field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Dotted path of the offending field (e.g. `"growth[2].url"`).
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

/// Aggregated schema validation failure.
///
/// Carries every violated constraint so callers can surface a complete
/// rejection in one round trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", render_issues(.issues))]
pub struct ValidationError {
    /// Every violated constraint found during validation.
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Build an error from a single violation.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue {
                field: field.into(),
                message: message.into(),
            }],
        }
    }
}

fn render_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates violations during a validation pass.
///
/// Local to the schema layer; converted into a [`ValidationError`] (or
/// discarded) when the pass finishes.
#[derive(Debug, Default)]
pub(crate) struct Issues {
    list: Vec<FieldIssue>,
}

impl Issues {
    /// Record one violation.
    pub(crate) fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.list.push(FieldIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    /// True when no violations were recorded.
    pub(crate) fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Finish the pass: `Ok(value)` when clean, the full issue list otherwise.
    pub(crate) fn into_result<T>(self, value: T) -> Result<T, ValidationError> {
        if self.list.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError { issues: self.list })
        }
    }
}

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// One of the four recommendation tiers.
///
/// Wire and storage use the letters A–D; the UI aliases them to
/// Foundation/Growth/Accelerator/Elite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Foundation -- first accounts, monitoring, no-cost starters.
    A,
    /// Growth -- rent/utility reporting and low-cost additions.
    B,
    /// Accelerator -- installment builders and automation.
    C,
    /// Elite -- disputes, tradelines, and long-haul upkeep.
    D,
}

impl Tier {
    /// All tiers in canonical order.
    pub const ALL: [Tier; 4] = [Tier::A, Tier::B, Tier::C, Tier::D];

    /// The letter identifier used in the output contract.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// The UI-facing alias for this tier.
    pub fn alias(&self) -> &'static str {
        match self {
            Self::A => "Foundation",
            Self::B => "Growth",
            Self::C => "Accelerator",
            Self::D => "Elite",
        }
    }

    /// The lowercase alias used as a wire key and in synthetic ids.
    pub fn key(&self) -> &'static str {
        match self {
            Self::A => "foundation",
            Self::B => "growth",
            Self::C => "accelerator",
            Self::D => "elite",
        }
    }

    /// Parse a tier from its letter or alias, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "a" | "foundation" => Some(Self::A),
            "b" | "growth" => Some(Self::B),
            "c" | "accelerator" => Some(Self::C),
            "d" | "elite" => Some(Self::D),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Category allow-list
// ---------------------------------------------------------------------------

/// The fixed allow-list of app categories the advisor recommends from.
///
/// Anything the model emits outside this list is dropped by the sanitizer;
/// a new category requires a code change, which is the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Dedicated credit-builder accounts and spend-based builders.
    CreditBuilder,
    /// Score and report monitoring.
    CreditMonitoring,
    /// Secured and builder credit cards.
    SecuredCard,
    /// Rent payment reporting to bureaus.
    RentReporting,
    /// Utility and telecom payment reporting.
    UtilityReporting,
    /// Credit-builder installment loans.
    InstallmentLoan,
    /// Dispute filing and tracking tools.
    DisputeTools,
    /// Debt payoff planners.
    DebtPayoff,
    /// Budgeting apps.
    Budgeting,
    /// Automated savings apps.
    Savings,
    /// Banking products with builder features.
    Banking,
    /// Identity monitoring and protection.
    IdentityProtection,
    /// Subscription tracking and reporting.
    SubscriptionTracking,
    /// Credit education content and tooling.
    CreditEducation,
    /// Authorized-user tradeline services.
    Tradelines,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Category; 15] = [
        Category::CreditBuilder,
        Category::CreditMonitoring,
        Category::SecuredCard,
        Category::RentReporting,
        Category::UtilityReporting,
        Category::InstallmentLoan,
        Category::DisputeTools,
        Category::DebtPayoff,
        Category::Budgeting,
        Category::Savings,
        Category::Banking,
        Category::IdentityProtection,
        Category::SubscriptionTracking,
        Category::CreditEducation,
        Category::Tradelines,
    ];

    /// The kebab-case string used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreditBuilder => "credit-builder",
            Self::CreditMonitoring => "credit-monitoring",
            Self::SecuredCard => "secured-card",
            Self::RentReporting => "rent-reporting",
            Self::UtilityReporting => "utility-reporting",
            Self::InstallmentLoan => "installment-loan",
            Self::DisputeTools => "dispute-tools",
            Self::DebtPayoff => "debt-payoff",
            Self::Budgeting => "budgeting",
            Self::Savings => "savings",
            Self::Banking => "banking",
            Self::IdentityProtection => "identity-protection",
            Self::SubscriptionTracking => "subscription-tracking",
            Self::CreditEducation => "credit-education",
            Self::Tradelines => "tradelines",
        }
    }

    /// Parse a wire string into a category. Exact match only -- no fuzzy
    /// repair of model-invented categories.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}
