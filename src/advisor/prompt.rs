//! Prompt composition for the plan model.
//!
//! The system prompt pins the output contract hard -- tier keys, field
//! bounds, the category allow-list -- because everything the model gets
//! wrong lands on the sanitizer and fallback paths.

use crate::schema::answers::WizardAnswers;
use crate::schema::Category;

/// Fixed instructions establishing the advisor persona and the JSON
/// contract.
const SYSTEM_PROMPT: &str = "\
You are a credit-building advisor assembling app recommendations.

Respond with a single JSON object and nothing else. The object has exactly
four keys: \"foundation\", \"growth\", \"accelerator\", \"elite\". Each key
maps to an array of 4 to 6 app objects with these fields:

- \"name\": the app's name (under 140 characters)
- \"category\": one of the allowed categories listed below, verbatim
- \"description\": one or two sentences on why this app fits (under 400 characters)
- \"cost\": the monthly cost as short text, e.g. \"Free\" or \"$5/mo\"
- \"url\": the app's official site

Rules:
- Only recommend real, currently operating credit-building apps.
- Never invent a category. If an app fits no allowed category, skip it.
- Foundation is for first accounts, Growth puts existing bills to work,
  Accelerator adds paid builders, Elite covers cleanup and upkeep.
- Do not wrap the JSON in markdown fences or commentary.";

/// Compose the system prompt, including the category allow-list.
pub fn system_prompt() -> String {
    let categories = Category::ALL
        .iter()
        .map(|c| format!("- {}", c.as_str()))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{SYSTEM_PROMPT}\n\nAllowed categories:\n{categories}")
}

/// Compose the user prompt from validated wizard answers.
pub fn user_prompt(answers: &WizardAnswers) -> String {
    let mut lines = vec!["Build four app stacks for this person:".to_owned()];

    if let Some(housing) = answers.housing {
        lines.push(format!("- Housing: {}", housing.as_str()));
    }
    if let Some(employment) = answers.employment {
        lines.push(format!("- Employment: {}", employment.as_str()));
    }
    if let Some(timeline) = answers.goal_timeline {
        lines.push(format!("- Goal timeline: {}", timeline.as_str()));
    }
    if let Some(budget) = answers.monthly_budget {
        lines.push(format!("- Monthly budget: ${budget:.0}"));
    }
    if let Some(preference) = answers.tool_preference {
        lines.push(format!("- Tool preference: {}", preference.as_str()));
    }
    if !answers.subscriptions.is_empty() {
        lines.push(format!(
            "- Existing subscriptions: {}",
            answers.subscriptions.join(", ")
        ));
    }
    if let Some(required) = &answers.required_categories {
        if !required.is_empty() {
            let names = required
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("- Must include these categories: {names}"));
        }
    }
    if answers.remix {
        lines.push(
            "- They have seen the usual picks; favor strong but less obvious alternatives."
                .to_owned(),
        );
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_system_prompt_lists_every_category() {
        let prompt = system_prompt();
        for category in Category::ALL {
            assert!(
                prompt.contains(category.as_str()),
                "system prompt should list {}",
                category.as_str()
            );
        }
        assert!(prompt.contains("\"foundation\""));
    }

    #[test]
    fn test_user_prompt_reflects_answers() {
        let answers = WizardAnswers::from_value(&json!({
            "housing": "rent",
            "goalTimeline": "30-day",
            "monthlyBudget": 45,
            "subscriptions": ["Netflix"],
        }))
        .expect("valid answers");

        let prompt = user_prompt(&answers);
        assert!(prompt.contains("Housing: rent"));
        assert!(prompt.contains("Goal timeline: 30-day"));
        assert!(prompt.contains("$45"));
        assert!(prompt.contains("Netflix"));
    }

    #[test]
    fn test_user_prompt_omits_unanswered_fields() {
        let answers = WizardAnswers::from_value(&json!({})).expect("valid answers");
        let prompt = user_prompt(&answers);
        assert!(!prompt.contains("Housing:"));
        assert!(!prompt.contains("budget"));
    }

    #[test]
    fn test_remix_changes_the_ask() {
        let answers =
            WizardAnswers::from_value(&json!({"remix": true})).expect("valid answers");
        assert!(user_prompt(&answers).contains("less obvious"));
    }
}
