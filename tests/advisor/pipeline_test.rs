//! End-to-end pipeline tests with scripted models.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use stackwise::advisor::{Advisor, AdvisorSettings};
use stackwise::cache::PlanCache;
use stackwise::providers::{PlanModel, PlanRequest, ProviderError};
use stackwise::schema::canonical::{MAX_APPS, MIN_APPS};
use stackwise::schema::Tier;

/// A model that always returns the same text and counts its calls.
struct ScriptedModel {
    script: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl PlanModel for ScriptedModel {
    async fn complete(&self, _request: PlanRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.clone())
    }

    fn model_id(&self) -> &str {
        "scripted/test"
    }
}

/// A model whose call never finishes inside any reasonable timeout.
struct StalledModel;

#[async_trait::async_trait]
impl PlanModel for StalledModel {
    async fn complete(&self, _request: PlanRequest) -> Result<String, ProviderError> {
        tokio::time::sleep(Duration::from_secs(3_600)).await;
        Ok(String::new())
    }

    fn model_id(&self) -> &str {
        "stalled/test"
    }
}

fn advisor_with(script: &str, calls: &Arc<AtomicUsize>) -> Advisor {
    let model = ScriptedModel {
        script: script.to_owned(),
        calls: Arc::clone(calls),
    };
    Advisor::new(
        Some(Arc::new(model)),
        Arc::new(PlanCache::default()),
        AdvisorSettings::default(),
    )
}

fn entry(name: &str, category: &str) -> Value {
    json!({
        "name": name,
        "category": category,
        "description": "Reports on-time payments to the bureaus.",
        "cost": "$5/mo",
        "url": format!("https://example.com/{}", name.to_lowercase().replace(' ', "-")),
    })
}

fn well_formed_wire() -> Value {
    json!({
        "foundation": [
            entry("Credit Karma", "credit-monitoring"),
            entry("Kikoff", "credit-builder"),
            entry("Chime Credit Builder", "secured-card"),
            entry("Grow Credit", "subscription-tracking"),
        ],
        "growth": [
            entry("Boom", "rent-reporting"),
            entry("Experian Boost", "utility-reporting"),
            entry("Rocket Money", "budgeting"),
            entry("RentReporters", "rent-reporting"),
        ],
        "accelerator": [
            entry("Self", "installment-loan"),
            entry("Credit Strong", "installment-loan"),
            entry("Extra", "banking"),
            entry("Bright Money", "debt-payoff"),
        ],
        "elite": [
            entry("Dovly", "dispute-tools"),
            entry("Credit Versio", "dispute-tools"),
            entry("Identity Guard", "identity-protection"),
            entry("Credit Strong CS Max", "installment-loan"),
        ],
    })
}

#[tokio::test]
async fn test_well_formed_model_output_flows_through() {
    let calls = Arc::new(AtomicUsize::new(0));
    let advisor = advisor_with(&well_formed_wire().to_string(), &calls);

    let plans = advisor
        .generate(&json!({"housing": "rent"}))
        .await
        .expect("should generate");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(plans.plans.len(), 4);
    let foundation = plans.plan(Tier::A).expect("tier A");
    assert_eq!(foundation.apps[0].name, "Credit Karma");
    assert_eq!(foundation.apps[0].id, "credit-karma");
}

#[tokio::test]
async fn test_malformed_model_output_falls_back_without_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let advisor = advisor_with("not json", &calls);

    let plans = advisor
        .generate(&json!({"housing": "rent", "monthlyBudget": 45, "goalTimeline": "30-day"}))
        .await
        .expect("a garbage model must never surface an error");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(plans.plans.len(), 4);
    for plan in &plans.plans {
        assert!(plan.apps.len() >= MIN_APPS && plan.apps.len() <= MAX_APPS);
    }
}

#[tokio::test]
async fn test_fenced_model_output_is_accepted() {
    let calls = Arc::new(AtomicUsize::new(0));
    let script = format!("Here is your plan:\n```json\n{}\n```", well_formed_wire());
    let advisor = advisor_with(&script, &calls);

    let plans = advisor.generate(&json!({})).await.expect("should generate");
    let growth = plans.plan(Tier::B).expect("tier B");
    assert_eq!(growth.apps[0].name, "Boom");
}

#[tokio::test]
async fn test_under_populated_tier_is_padded() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut wire = well_formed_wire();
    // Two survivors: one good entry, one hallucinated category, one
    // off-topic entry, one duplicate URL.
    wire["elite"] = json!([
        entry("Dovly", "dispute-tools"),
        entry("Credit Versio", "dispute-tools"),
        entry("ScoreYoga", "wellness"),
        {
            "name": "Dovly Premium",
            "category": "dispute-tools",
            "description": "Same engine, same site.",
            "cost": "$10/mo",
            "url": "https://example.com/dovly",
        },
    ]);
    let advisor = advisor_with(&wire.to_string(), &calls);

    let plans = advisor.generate(&json!({})).await.expect("should generate");
    let elite = plans.plan(Tier::D).expect("tier D");
    assert_eq!(elite.apps.len(), MIN_APPS);
    assert_eq!(elite.apps[2].id, "locked-elite-1");
    assert_eq!(elite.apps[3].id, "locked-elite-2");
}

#[tokio::test]
async fn test_over_populated_tier_is_capped() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut wire = well_formed_wire();
    let many: Vec<Value> = (0..9)
        .map(|i| entry(&format!("App Number {i}"), "budgeting"))
        .collect();
    wire["growth"] = json!(many);
    let advisor = advisor_with(&wire.to_string(), &calls);

    let plans = advisor.generate(&json!({})).await.expect("should generate");
    let growth = plans.plan(Tier::B).expect("tier B");
    // The sanitizer's per-tier cap kicks in first.
    assert!(growth.apps.len() <= MAX_APPS);
    assert_eq!(growth.apps[0].name, "App Number 0");
}

#[tokio::test(start_paused = true)]
async fn test_stalled_model_times_out_into_fallback() {
    let advisor = Advisor::new(
        Some(Arc::new(StalledModel)),
        Arc::new(PlanCache::default()),
        AdvisorSettings {
            model_timeout: Duration::from_millis(100),
            unlocked_default: 0,
        },
    );

    let plans = advisor
        .generate(&json!({"housing": "rent"}))
        .await
        .expect("timeout must route to the fallback planner");
    assert_eq!(plans.plans.len(), 4);
}

#[tokio::test]
async fn test_cached_second_call_skips_the_model() {
    let calls = Arc::new(AtomicUsize::new(0));
    let advisor = advisor_with(&well_formed_wire().to_string(), &calls);
    let answers = json!({"employment": "student"});

    let first = advisor.generate(&answers).await.expect("first call");
    let second = advisor.generate(&answers).await.expect("second call");

    assert_eq!(first, second);
    assert_eq!(
        calls.load(Ordering::SeqCst),
        1,
        "second call must be served from cache without a model call"
    );
}

#[tokio::test]
async fn test_key_order_does_not_split_the_cache() {
    let calls = Arc::new(AtomicUsize::new(0));
    let advisor = advisor_with(&well_formed_wire().to_string(), &calls);

    advisor
        .generate(&json!({"housing": "rent", "employment": "employed"}))
        .await
        .expect("first call");
    advisor
        .generate(&json!({"employment": "employed", "housing": "rent"}))
        .await
        .expect("second call");

    assert_eq!(
        calls.load(Ordering::SeqCst),
        1,
        "logically identical answers must share one cache entry"
    );
}
