//! Paywall visibility -- which plan rows the current viewer may see.

use serde::{Deserialize, Serialize};

/// Rows visible without payment.
pub const FREE_ROW_CAP: usize = 1;
/// Rows visible with full access.
pub const PAID_ROW_CAP: usize = 6;

/// Whether one plan row is visible to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowState {
    /// Fully rendered.
    Unlocked,
    /// Blurred/teased pending purchase.
    Locked,
}

impl RowState {
    /// The wire string for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unlocked => "unlocked",
            Self::Locked => "locked",
        }
    }
}

/// Compute the per-row lock state for a plan.
///
/// Row `i` is unlocked when `i <= unlocked_index` or `i` falls under the
/// viewer's cap ([`FREE_ROW_CAP`] without access, [`PAID_ROW_CAP`] with).
/// Pure; never fails for any `app_count`.
pub fn row_states(has_access: bool, unlocked_index: usize, app_count: usize) -> Vec<RowState> {
    let cap = if has_access { PAID_ROW_CAP } else { FREE_ROW_CAP };

    (0..app_count)
        .map(|i| {
            if i <= unlocked_index || i < cap {
                RowState::Unlocked
            } else {
                RowState::Locked
            }
        })
        .collect()
}
