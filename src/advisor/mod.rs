//! The advisor pipeline -- the path from wizard answers to a plan set.
//!
//! Stages: validate answers → hash for cache lookup → (hit: return) →
//! model call bounded by a timeout, or the fallback planner when no model
//! is configured or anything upstream goes wrong → sanitize per tier →
//! transform to the canonical contract → cache → return.
//!
//! The only errors a caller ever sees are bad answers (client-class) and
//! a transform contract violation (server-class). Everything the model
//! gets wrong is absorbed by the fallback path -- an end user is never
//! shown a failure screen because the model had a bad day.

pub mod parse;
pub mod prompt;
pub mod response;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::{content_hash, PlanCache};
use crate::fallback;
use crate::providers::{PlanModel, PlanRequest};
use crate::sanitizer::sanitize;
use crate::schema::answers::WizardAnswers;
use crate::schema::canonical::PlanSet;
use crate::schema::wire::WirePlanSet;
use crate::schema::{Tier, ValidationError};
use crate::transform::{to_plan_set, ContractViolation};

/// Maximum tokens requested from the model per generation.
const MODEL_MAX_TOKENS: u32 = 4_096;

/// Default bound on one model call.
pub const DEFAULT_MODEL_TIMEOUT_SECONDS: u64 = 20;

/// Errors the pipeline surfaces to its caller.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    /// The wizard answers failed schema checks. Client-class: surfaced as
    /// a 400-style rejection listing every violated field.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The transform produced an out-of-contract plan set. Server-class:
    /// a bug, not bad input.
    #[error(transparent)]
    Internal(#[from] ContractViolation),
    /// The cache key could not be computed. Server-class.
    #[error("cache key computation failed: {0}")]
    CacheKey(#[from] serde_json::Error),
}

/// Tunables for one advisor instance.
#[derive(Debug, Clone)]
pub struct AdvisorSettings {
    /// Bound on one model call; on expiry the fallback planner takes over.
    pub model_timeout: Duration,
    /// Requested default unlocked index, clamped per plan by the transform.
    pub unlocked_default: usize,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            model_timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECONDS),
            unlocked_default: 0,
        }
    }
}

/// The pipeline orchestrator.
///
/// Holds its collaborators behind `Arc` so one instance can serve
/// concurrent requests; the cache is shared, everything else is
/// stateless.
pub struct Advisor {
    model: Option<Arc<dyn PlanModel>>,
    cache: Arc<PlanCache>,
    settings: AdvisorSettings,
}

impl Advisor {
    /// Create an advisor with an optional model behind it.
    pub fn new(
        model: Option<Arc<dyn PlanModel>>,
        cache: Arc<PlanCache>,
        settings: AdvisorSettings,
    ) -> Self {
        Self {
            model,
            cache,
            settings,
        }
    }

    /// Create an advisor with no model at all; the fallback planner is
    /// authoritative.
    pub fn offline(cache: Arc<PlanCache>) -> Self {
        Self::new(None, cache, AdvisorSettings::default())
    }

    /// Generate a plan set from untrusted answers JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AdvisorError::Validation`] when the answers fail schema
    /// checks; [`AdvisorError::Internal`] / [`AdvisorError::CacheKey`] on
    /// programming-error-class failures.
    pub async fn generate(&self, answers_json: &Value) -> Result<PlanSet, AdvisorError> {
        let answers = WizardAnswers::from_value(answers_json)?;
        self.generate_validated(&answers).await
    }

    /// Generate a plan set from already-validated answers.
    ///
    /// # Errors
    ///
    /// Returns [`AdvisorError::Internal`] or [`AdvisorError::CacheKey`] on
    /// programming-error-class failures; never a model error.
    pub async fn generate_validated(
        &self,
        answers: &WizardAnswers,
    ) -> Result<PlanSet, AdvisorError> {
        let request_id = Uuid::new_v4();
        let key = content_hash(answers)?;

        if let Some(hit) = self.cache.get(&key) {
            debug!(%request_id, key = %key, "plan cache hit");
            return Ok(hit);
        }

        info!(%request_id, key = %key, "generating plan set");
        let mut wire = self.fetch_wire(answers, request_id).await;

        for tier in Tier::ALL {
            let raw = std::mem::take(wire.tier_apps_mut(tier));
            *wire.tier_apps_mut(tier) = sanitize(raw);
        }

        let plans = to_plan_set(&wire, answers, self.settings.unlocked_default)?;
        self.cache.put(key, plans.clone());

        Ok(plans)
    }

    /// Obtain a wire plan set: from the model when one is configured and
    /// behaves, from the fallback planner otherwise.
    async fn fetch_wire(&self, answers: &WizardAnswers, request_id: Uuid) -> WirePlanSet {
        let Some(model) = &self.model else {
            debug!(%request_id, "no model configured, using fallback planner");
            return fallback::fallback_wire_set(answers);
        };

        let request = PlanRequest {
            system: prompt::system_prompt(),
            user: prompt::user_prompt(answers),
            max_tokens: MODEL_MAX_TOKENS,
        };

        let raw = match tokio::time::timeout(self.settings.model_timeout, model.complete(request))
            .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(%request_id, model = %model.model_id(), error = %e, "model call failed, falling back");
                return fallback::fallback_wire_set(answers);
            }
            Err(_) => {
                warn!(
                    %request_id,
                    model = %model.model_id(),
                    timeout_secs = self.settings.model_timeout.as_secs(),
                    "model call timed out, falling back"
                );
                return fallback::fallback_wire_set(answers);
            }
        };

        match parse::parse_wire_text(&raw) {
            Ok(wire) => wire,
            Err(e) => {
                warn!(%request_id, model = %model.model_id(), error = %e, "model output unusable, falling back");
                fallback::fallback_wire_set(answers)
            }
        }
    }
}
