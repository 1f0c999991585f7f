//! Cache key and cache behavior tests against the public API.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use stackwise::advisor::Advisor;
use stackwise::cache::{content_hash, CacheEntry, PlanCache};
use stackwise::schema::answers::WizardAnswers;

fn answers(value: serde_json::Value) -> WizardAnswers {
    WizardAnswers::from_value(&value).expect("test answers are valid")
}

#[test]
fn test_hash_stable_across_repeated_calls() {
    let a = answers(json!({"housing": "rent", "subscriptions": ["Netflix", "Hulu"]}));
    let first = content_hash(&a).expect("hashable");
    let second = content_hash(&a).expect("hashable");
    assert_eq!(first, second);
}

#[test]
fn test_hash_ignores_inbound_key_order() {
    let a = answers(json!({"housing": "rent", "employment": "student"}));
    let b = answers(json!({"employment": "student", "housing": "rent"}));
    assert_eq!(
        content_hash(&a).expect("hashable"),
        content_hash(&b).expect("hashable")
    );
}

#[test]
fn test_hash_respects_array_order() {
    let a = answers(json!({"subscriptions": ["Netflix", "Hulu"]}));
    let b = answers(json!({"subscriptions": ["Hulu", "Netflix"]}));
    assert_ne!(
        content_hash(&a).expect("hashable"),
        content_hash(&b).expect("hashable")
    );
}

#[test]
fn test_different_answers_different_keys() {
    let a = answers(json!({"monthlyBudget": 20}));
    let b = answers(json!({"monthlyBudget": 21}));
    assert_ne!(
        content_hash(&a).expect("hashable"),
        content_hash(&b).expect("hashable")
    );
}

#[tokio::test]
async fn test_expired_entry_is_regenerated() {
    // TTL of one hour; plant an entry 61 minutes old under the real key.
    let cache = Arc::new(PlanCache::new(3_600, 10));
    let advisor = Advisor::offline(Arc::clone(&cache));
    let input = json!({"goalTimeline": "flexible"});

    let fresh = advisor.generate(&input).await.expect("first generation");
    let key = content_hash(&answers(input.clone())).expect("hashable");

    let stale = CacheEntry {
        plans: cache.get(&key).expect("entry was cached"),
        cached_at: Utc::now()
            .checked_sub_signed(Duration::seconds(3_660))
            .expect("timestamp in range"),
    };
    cache.insert_entry(key.clone(), stale);

    assert!(cache.get(&key).is_none(), "stale entry must read as absent");

    let regenerated = advisor.generate(&input).await.expect("regeneration");
    assert_eq!(fresh, regenerated, "regeneration is deterministic offline");
    assert!(cache.get(&key).is_some(), "fresh entry cached again");
}

#[tokio::test]
async fn test_capacity_eviction_drops_oldest_answers() {
    let cache = Arc::new(PlanCache::new(3_600, 2));
    let advisor = Advisor::offline(Arc::clone(&cache));

    for budget in [10, 20, 30] {
        advisor
            .generate(&json!({"monthlyBudget": budget}))
            .await
            .expect("generation");
    }

    assert_eq!(cache.len(), 2, "capacity bound must hold");
}
