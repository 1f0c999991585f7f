//! Deterministic fallback planner.
//!
//! When the model is unavailable, disabled, or returns garbage, plans are
//! assembled from a fixed in-memory catalog with a tag-matching scorer.
//! Deliberately boring: same answers in, same apps out, no model in the
//! loop.

use crate::schema::answers::{Employment, GoalTimeline, Housing, ToolPreference, WizardAnswers};
use crate::schema::wire::{RawAppEntry, WirePlanSet};
use crate::schema::{Category, Tier};

// ---------------------------------------------------------------------------
// Scoring constants
// ---------------------------------------------------------------------------

/// Bonus for each tag matching a signal derived from the user's answers.
const SIGNAL_WEIGHT: i32 = 2;
/// Bonus for each tag in the tier's preferred subset.
const TIER_WEIGHT: i32 = 3;
/// Bonus when the app's category is in the caller's required list.
const REQUIRED_CATEGORY_WEIGHT: i32 = 4;

/// Fewest apps the planner returns (given a catalog of at least this many).
pub const MIN_PICKS: usize = 3;
/// Most apps the planner returns per tier.
pub const MAX_PICKS: usize = 5;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// One known app in the fallback catalog.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct CatalogApp {
    /// Display name.
    pub name: &'static str,
    /// Canonical site URL.
    pub url: &'static str,
    /// Allow-list category.
    pub category: Category,
    /// One-line description used as the rationale.
    pub blurb: &'static str,
    /// Fixed cost string.
    pub cost: &'static str,
    /// Descriptive tags the scorer matches against.
    pub tags: &'static [&'static str],
}

/// The built-in catalog, in editorial priority order (ties in scoring
/// resolve to earlier entries).
pub const CATALOG: &[CatalogApp] = &[
    CatalogApp {
        name: "Experian Boost",
        url: "https://www.experian.com/boost",
        category: Category::UtilityReporting,
        blurb: "Adds on-time utility, phone, and streaming payments to your Experian file instantly.",
        cost: "Free",
        tags: &["utilities", "no-cost", "fast-start", "subscriptions"],
    },
    CatalogApp {
        name: "Credit Karma",
        url: "https://www.creditkarma.com",
        category: Category::CreditMonitoring,
        blurb: "Free score tracking across two bureaus with change alerts and score simulators.",
        cost: "Free",
        tags: &["monitoring", "no-cost", "starter", "education"],
    },
    CatalogApp {
        name: "Kikoff",
        url: "https://kikoff.com",
        category: Category::CreditBuilder,
        blurb: "Tiny credit line that reports a perfect payment history for a few dollars a month.",
        cost: "$5/mo",
        tags: &["starter", "low-cost", "fast-start", "tradeline"],
    },
    CatalogApp {
        name: "Chime Credit Builder",
        url: "https://www.chime.com/credit-builder",
        category: Category::SecuredCard,
        blurb: "No-fee secured card that turns everyday spending into reported payment history.",
        cost: "Free",
        tags: &["secured-card", "no-cost", "banking", "automated", "starter"],
    },
    CatalogApp {
        name: "Self",
        url: "https://www.self.inc",
        category: Category::InstallmentLoan,
        blurb: "Credit-builder loan that banks your payments into savings while reporting to all three bureaus.",
        cost: "$25/mo",
        tags: &["installment", "automated", "long-haul"],
    },
    CatalogApp {
        name: "Credit Strong",
        url: "https://www.creditstrong.com",
        category: Category::InstallmentLoan,
        blurb: "Larger installment accounts for building thick-file payment history over a year or more.",
        cost: "$28/mo",
        tags: &["installment", "long-haul", "tradeline"],
    },
    CatalogApp {
        name: "Boom",
        url: "https://www.boompay.app",
        category: Category::RentReporting,
        blurb: "Reports your rent to all three bureaus, with up to 24 months of backdated history.",
        cost: "$3/mo",
        tags: &["rent", "low-cost", "fast-start"],
    },
    CatalogApp {
        name: "RentReporters",
        url: "https://www.rentreporters.com",
        category: Category::RentReporting,
        blurb: "Verifies rent directly with your landlord and keeps it reporting month after month.",
        cost: "$9.95/mo",
        tags: &["rent", "long-haul"],
    },
    CatalogApp {
        name: "Dovly",
        url: "https://www.dovly.com",
        category: Category::DisputeTools,
        blurb: "Automated dispute engine that finds and challenges report errors on a schedule.",
        cost: "Free tier",
        tags: &["dispute", "automated", "no-cost"],
    },
    CatalogApp {
        name: "Credit Versio",
        url: "https://www.creditversio.com",
        category: Category::DisputeTools,
        blurb: "DIY dispute software with letter generation for people who want full control.",
        cost: "$19.95/mo",
        tags: &["dispute", "manual", "diy"],
    },
    CatalogApp {
        name: "Grow Credit",
        url: "https://www.growcredit.com",
        category: Category::SubscriptionTracking,
        blurb: "Free Mastercard that pays your subscriptions and reports them as an installment line.",
        cost: "Free plan",
        tags: &["subscriptions", "no-cost", "automated", "starter"],
    },
    CatalogApp {
        name: "Rocket Money",
        url: "https://www.rocketmoney.com",
        category: Category::Budgeting,
        blurb: "Finds and cancels forgotten subscriptions and keeps bills from slipping past due.",
        cost: "$6/mo",
        tags: &["budgeting", "subscriptions", "manual", "low-cost"],
    },
    CatalogApp {
        name: "Extra",
        url: "https://extra.app",
        category: Category::Banking,
        blurb: "Debit card that reports everyday purchases as credit-building tradelines.",
        cost: "$20/mo",
        tags: &["banking", "tradeline", "automated"],
    },
    CatalogApp {
        name: "Bright Money",
        url: "https://www.brightmoney.co",
        category: Category::DebtPayoff,
        blurb: "Automated payoff plans that time card payments to cut utilization before statement close.",
        cost: "$9/mo",
        tags: &["debt", "automated", "long-haul", "budgeting"],
    },
];

// ---------------------------------------------------------------------------
// Signals and tier preferences
// ---------------------------------------------------------------------------

/// Tags derived from the user's answers; each match is worth
/// [`SIGNAL_WEIGHT`].
fn signal_tags(answers: &WizardAnswers) -> Vec<&'static str> {
    let mut tags = Vec::new();

    match answers.goal_timeline {
        Some(GoalTimeline::ThirtyDay) => tags.push("fast-start"),
        Some(GoalTimeline::NinetyDay) => tags.push("tradeline"),
        Some(GoalTimeline::Flexible) | None => tags.push("long-haul"),
    }

    match answers.housing {
        Some(Housing::Rent) => tags.push("rent"),
        Some(Housing::Mortgage) => tags.push("utilities"),
        Some(Housing::Neither) | None => {}
    }

    match answers.monthly_budget {
        None => tags.push("no-cost"),
        Some(b) if b < 10.0 => tags.push("no-cost"),
        Some(b) if b < 30.0 => tags.push("low-cost"),
        Some(_) => {
            tags.push("installment");
            tags.push("tradeline");
        }
    }

    match answers.employment {
        Some(Employment::SelfEmployed) => tags.push("banking"),
        Some(Employment::Student) => tags.push("starter"),
        Some(Employment::Unemployed) => tags.push("no-cost"),
        Some(Employment::Employed) | None => {}
    }

    match answers.tool_preference {
        Some(ToolPreference::Automated) => tags.push("automated"),
        Some(ToolPreference::Manual) => {
            tags.push("manual");
            tags.push("diy");
        }
        Some(ToolPreference::Unsure) | None => {}
    }

    if !answers.subscriptions.is_empty() {
        tags.push("subscriptions");
    }

    tags
}

/// Each tier's preferred tags, in coverage priority order.
fn tier_preferred_tags(tier: Tier) -> &'static [&'static str] {
    match tier {
        Tier::A => &["starter", "no-cost", "monitoring", "secured-card"],
        Tier::B => &["rent", "utilities", "subscriptions", "low-cost"],
        Tier::C => &["installment", "automated", "tradeline", "budgeting"],
        Tier::D => &["dispute", "tradeline", "banking", "long-haul"],
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

fn score(app: &CatalogApp, signals: &[&str], preferred: &[&str], answers: &WizardAnswers) -> i32 {
    let mut total = 0i32;

    for tag in app.tags {
        if signals.contains(tag) {
            total = total.saturating_add(SIGNAL_WEIGHT);
        }
        if preferred.contains(tag) {
            total = total.saturating_add(TIER_WEIGHT);
        }
    }

    if let Some(required) = &answers.required_categories {
        if required.contains(&app.category) {
            total = total.saturating_add(REQUIRED_CATEGORY_WEIGHT);
        }
    }

    total
}

/// Select 3–5 catalog apps for one tier without any model involvement.
///
/// Apps are ranked by score descending (ties broken by catalog order),
/// then picked coverage-first: one app per required category, one per
/// tier-preferred tag in priority order, remaining slots filled from the
/// overall ranking. Never fails given a non-empty catalog; with ≥3 catalog
/// apps it always returns at least 3.
pub fn select_fallback_apps(answers: &WizardAnswers, tier: Tier) -> Vec<RawAppEntry> {
    let signals = signal_tags(answers);
    let preferred = tier_preferred_tags(tier);

    // Stable rank: sort_by_key is stable, so equal scores keep catalog order.
    let mut ranked: Vec<&CatalogApp> = CATALOG.iter().collect();
    ranked.sort_by_key(|&app| std::cmp::Reverse(score(app, &signals, preferred, answers)));

    let mut chosen: Vec<&CatalogApp> = Vec::new();

    // Coverage pass 0: honor explicitly required categories first.
    if let Some(required) = &answers.required_categories {
        for category in required {
            if chosen.len() >= MAX_PICKS {
                break;
            }
            if let Some(app) = ranked
                .iter()
                .copied()
                .find(|&a| a.category == *category && !is_chosen(&chosen, a))
            {
                chosen.push(app);
            }
        }
    }

    // Coverage pass 1: one app per tier-preferred tag. A remix request
    // takes the runner-up for each tag instead of the favorite, giving an
    // alternate -- but still deterministic -- mix.
    for tag in preferred {
        if chosen.len() >= MAX_PICKS {
            break;
        }
        let mut candidates = ranked
            .iter()
            .copied()
            .filter(|&a| a.tags.contains(tag) && !is_chosen(&chosen, a));
        let pick = if answers.remix {
            let first = candidates.next();
            candidates.next().or(first)
        } else {
            candidates.next()
        };
        if let Some(app) = pick {
            chosen.push(app);
        }
    }

    // Fill pass: take remaining slots from the overall ranking.
    for app in ranked.iter().copied() {
        if chosen.len() >= MAX_PICKS {
            break;
        }
        if !is_chosen(&chosen, app) {
            chosen.push(app);
        }
    }

    chosen.iter().copied().map(to_entry).collect()
}

/// Build a full wire plan set from the fallback planner, one tier at a
/// time.
pub fn fallback_wire_set(answers: &WizardAnswers) -> WirePlanSet {
    let mut set = WirePlanSet::default();
    for tier in Tier::ALL {
        *set.tier_apps_mut(tier) = select_fallback_apps(answers, tier);
    }
    set
}

fn is_chosen(chosen: &[&CatalogApp], candidate: &CatalogApp) -> bool {
    chosen.iter().any(|c| c.name == candidate.name)
}

fn to_entry(app: &CatalogApp) -> RawAppEntry {
    RawAppEntry {
        name: app.name.to_owned(),
        category: app.category.as_str().to_owned(),
        description: app.blurb.to_owned(),
        cost: app.cost.to_owned(),
        url: app.url.to_owned(),
        setup_steps: None,
    }
}
