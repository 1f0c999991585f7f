//! Wizard answers -- the user-submitted preferences driving personalization.
//!
//! Inbound answers arrive as untrusted JSON. [`WizardAnswers::from_value`]
//! validates every field and reports all violations at once. Unknown extra
//! fields are preserved rather than rejected so older servers keep accepting
//! newer clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Category, Issues, ValidationError};

// ---------------------------------------------------------------------------
// Answer enums
// ---------------------------------------------------------------------------

/// Housing situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Housing {
    /// Renting -- rent reporting applies.
    Rent,
    /// Paying a mortgage.
    Mortgage,
    /// Neither (living with family, dorm, etc.).
    Neither,
}

impl Housing {
    /// The wire string for this value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Mortgage => "mortgage",
            Self::Neither => "neither",
        }
    }

    /// Parse a wire string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rent" => Some(Self::Rent),
            "mortgage" => Some(Self::Mortgage),
            "neither" => Some(Self::Neither),
            _ => None,
        }
    }
}

/// How hands-on the user wants their tools to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolPreference {
    /// Set-and-forget tools preferred.
    Automated,
    /// Hands-on, DIY tools preferred.
    Manual,
    /// No stated preference.
    Unsure,
}

impl ToolPreference {
    /// The wire string for this value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Automated => "automated",
            Self::Manual => "manual",
            Self::Unsure => "unsure",
        }
    }

    /// Parse a wire string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "automated" => Some(Self::Automated),
            "manual" => Some(Self::Manual),
            "unsure" => Some(Self::Unsure),
            _ => None,
        }
    }
}

/// Employment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Employment {
    /// W-2 employed.
    Employed,
    /// Self-employed or contracting.
    SelfEmployed,
    /// Currently unemployed.
    Unemployed,
    /// Student.
    Student,
}

impl Employment {
    /// The wire string for this value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employed => "employed",
            Self::SelfEmployed => "self-employed",
            Self::Unemployed => "unemployed",
            Self::Student => "student",
        }
    }

    /// Parse a wire string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "employed" => Some(Self::Employed),
            "self-employed" => Some(Self::SelfEmployed),
            "unemployed" => Some(Self::Unemployed),
            "student" => Some(Self::Student),
            _ => None,
        }
    }
}

/// How quickly the user wants results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalTimeline {
    /// Visible movement inside a month.
    #[serde(rename = "30-day")]
    ThirtyDay,
    /// A quarter-long push.
    #[serde(rename = "90-day")]
    NinetyDay,
    /// No deadline.
    #[serde(rename = "flexible")]
    Flexible,
}

impl GoalTimeline {
    /// The wire string for this value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThirtyDay => "30-day",
            Self::NinetyDay => "90-day",
            Self::Flexible => "flexible",
        }
    }

    /// Parse a wire string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "30-day" => Some(Self::ThirtyDay),
            "90-day" => Some(Self::NinetyDay),
            "flexible" => Some(Self::Flexible),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// WizardAnswers
// ---------------------------------------------------------------------------

/// Validated wizard answers.
///
/// Serialization uses the wizard's camelCase field names so the cache key
/// derived from this struct is stable across the stack. `monthly_budget`,
/// once coerced, is always finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardAnswers {
    /// Housing situation, if answered.
    pub housing: Option<Housing>,
    /// Free-text subscription labels, in the order the user listed them.
    #[serde(default)]
    pub subscriptions: Vec<String>,
    /// Tool style preference, if answered.
    pub tool_preference: Option<ToolPreference>,
    /// Employment status, if answered.
    pub employment: Option<Employment>,
    /// Goal timeline, if answered.
    pub goal_timeline: Option<GoalTimeline>,
    /// Monthly budget in dollars; coerced from numeric strings on intake.
    pub monthly_budget: Option<f64>,
    /// Request an atypical recommendation mix.
    #[serde(default)]
    pub remix: bool,
    /// Categories the caller wants guaranteed present in the plans.
    pub required_categories: Option<Vec<Category>>,
    /// Unknown fields, preserved verbatim for forward compatibility.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl WizardAnswers {
    /// Validate untrusted JSON into answers, reporting every violation.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing all violated constraints when
    /// the input is not an object or any field fails its checks.
    pub fn from_value(input: &Value) -> Result<Self, ValidationError> {
        let Some(obj) = input.as_object() else {
            return Err(ValidationError::single(
                "wizardAnswers",
                "must be a JSON object",
            ));
        };

        let mut issues = Issues::default();
        let mut answers = Self {
            housing: None,
            subscriptions: Vec::new(),
            tool_preference: None,
            employment: None,
            goal_timeline: None,
            monthly_budget: None,
            remix: false,
            required_categories: None,
            extra: serde_json::Map::new(),
        };

        for (key, value) in obj {
            match key.as_str() {
                "housing" => {
                    answers.housing =
                        parse_enum_field(value, "housing", Housing::parse, &mut issues);
                }
                "subscriptions" => {
                    answers.subscriptions = parse_string_list(value, "subscriptions", &mut issues);
                }
                "toolPreference" => {
                    answers.tool_preference = parse_enum_field(
                        value,
                        "toolPreference",
                        ToolPreference::parse,
                        &mut issues,
                    );
                }
                "employment" => {
                    answers.employment =
                        parse_enum_field(value, "employment", Employment::parse, &mut issues);
                }
                "goalTimeline" => {
                    answers.goal_timeline =
                        parse_enum_field(value, "goalTimeline", GoalTimeline::parse, &mut issues);
                }
                "monthlyBudget" => {
                    answers.monthly_budget = coerce_budget(value, &mut issues);
                }
                "remix" => match value {
                    Value::Bool(b) => answers.remix = *b,
                    Value::Null => {}
                    _ => issues.push("remix", "must be a boolean"),
                },
                "requiredCategories" => {
                    answers.required_categories =
                        parse_required_categories(value, &mut issues);
                }
                _ => {
                    answers.extra.insert(key.clone(), value.clone());
                }
            }
        }

        issues.into_result(answers)
    }
}

/// Parse a nullable enum field from a JSON string value.
fn parse_enum_field<T>(
    value: &Value,
    field: &str,
    parse: fn(&str) -> Option<T>,
    issues: &mut Issues,
) -> Option<T> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let parsed = parse(s);
            if parsed.is_none() {
                issues.push(field, format!("unknown value '{s}'"));
            }
            parsed
        }
        _ => {
            issues.push(field, "must be a string or null");
            None
        }
    }
}

/// Parse a list of free-text labels, preserving order.
fn parse_string_list(value: &Value, field: &str, issues: &mut Issues) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                match item.as_str() {
                    Some(s) => out.push(s.to_owned()),
                    None => issues.push(format!("{field}[{i}]"), "must be a string"),
                }
            }
            out
        }
        _ => {
            issues.push(field, "must be an array of strings");
            Vec::new()
        }
    }
}

/// Coerce the budget from a JSON number or a numeric string.
///
/// The wizard's budget input ships as a string in some clients, so both
/// forms are accepted. The result is always finite and non-negative.
fn coerce_budget(value: &Value, issues: &mut Issues) -> Option<f64> {
    let parsed = match value {
        Value::Null => return None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => {
            issues.push("monthlyBudget", "must be a number or numeric string");
            return None;
        }
    };

    match parsed {
        Some(n) if n.is_finite() && n >= 0.0 => Some(n),
        Some(_) => {
            issues.push("monthlyBudget", "must be a non-negative finite number");
            None
        }
        None => {
            issues.push("monthlyBudget", "could not be parsed as a number");
            None
        }
    }
}

/// Parse the optional required-category list against the allow-list.
fn parse_required_categories(value: &Value, issues: &mut Issues) -> Option<Vec<Category>> {
    match value {
        Value::Null => None,
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                match item.as_str().and_then(Category::parse) {
                    Some(category) => out.push(category),
                    None => issues.push(
                        format!("requiredCategories[{i}]"),
                        "is not a known category",
                    ),
                }
            }
            Some(out)
        }
        _ => {
            issues.push("requiredCategories", "must be an array of category names");
            None
        }
    }
}
