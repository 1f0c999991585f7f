//! Offline (fallback-planner-only) pipeline behavior.

use std::sync::Arc;

use serde_json::json;

use stackwise::advisor::response::{render, Shape};
use stackwise::advisor::Advisor;
use stackwise::cache::PlanCache;
use stackwise::fallback::{select_fallback_apps, MAX_PICKS, MIN_PICKS};
use stackwise::schema::answers::WizardAnswers;
use stackwise::schema::canonical::{MAX_APPS, MIN_APPS};
use stackwise::schema::Tier;

fn answers(value: serde_json::Value) -> WizardAnswers {
    WizardAnswers::from_value(&value).expect("test answers are valid")
}

#[tokio::test]
async fn test_offline_pipeline_is_fully_bounded() {
    let advisor = Advisor::offline(Arc::new(PlanCache::default()));
    let plans = advisor
        .generate(&json!({
            "housing": "rent",
            "employment": "self-employed",
            "goalTimeline": "30-day",
            "monthlyBudget": "45",
            "subscriptions": ["Netflix"],
        }))
        .await
        .expect("offline generation");

    assert_eq!(plans.plans.len(), 4);
    for plan in &plans.plans {
        assert!(plan.apps.len() >= MIN_APPS && plan.apps.len() <= MAX_APPS);
        assert_eq!(plan.unlocked_index, 0);
    }
    plans.validate().expect("canonical contract holds");
}

#[tokio::test]
async fn test_offline_generation_is_byte_stable() {
    let input = json!({"housing": "mortgage", "toolPreference": "manual"});

    let a = Advisor::offline(Arc::new(PlanCache::default()))
        .generate(&input)
        .await
        .expect("first run");
    let b = Advisor::offline(Arc::new(PlanCache::default()))
        .generate(&input)
        .await
        .expect("second run");

    let a_json = serde_json::to_string(&a).expect("serialize");
    let b_json = serde_json::to_string(&b).expect("serialize");
    assert_eq!(a_json, b_json, "two fresh processes must agree byte-for-byte");
}

#[test]
fn test_selection_bounds_hold_for_every_tier_and_profile() {
    let profiles = [
        json!({}),
        json!({"housing": "rent"}),
        json!({"monthlyBudget": 100, "goalTimeline": "90-day"}),
        json!({"employment": "unemployed", "toolPreference": "manual"}),
        json!({"remix": true, "subscriptions": ["Spotify", "Netflix", "Hulu"]}),
    ];

    for profile in profiles {
        let a = answers(profile);
        for tier in Tier::ALL {
            let picks = select_fallback_apps(&a, tier);
            assert!(
                picks.len() >= MIN_PICKS && picks.len() <= MAX_PICKS,
                "tier {} returned {} picks",
                tier.as_str(),
                picks.len()
            );
        }
    }
}

#[tokio::test]
async fn test_rendered_offline_response_has_output_contract_fields() {
    let advisor = Advisor::offline(Arc::new(PlanCache::default()));
    let plans = advisor
        .generate(&json!({"housing": "rent"}))
        .await
        .expect("offline generation");

    let value = render(&plans, false, Shape::Canonical);
    let first_plan = &value["plans"][0];
    assert_eq!(first_plan["id"], "A");
    let first_app = &first_plan["apps"][0];
    for field in ["app_id", "app_name", "app_url", "why", "setup_steps", "locked"] {
        assert!(
            first_app.get(field).is_some(),
            "output contract field {field} missing"
        );
    }
    assert_eq!(first_app["locked"], false);
    assert_eq!(first_plan["apps"][1]["locked"], true);
}
