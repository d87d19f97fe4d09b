//! Ledger configuration.
//!
//! Typically loaded from a JSON file by the application crate (with the
//! `serde` feature) and handed to `PlanStore::with_config`.

use crate::{CoreError, CoreResult, Date};

/// Tunables of the capacity ledger.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LedgerConfig {
    /// When a load reassignment expects a changeover sub-plan and finds none,
    /// fail with an internal-consistency error instead of continuing as if
    /// the old load never required a changeover.  Default: `false`.
    pub strict_changeover_lookup: bool,

    /// Start date given to a freshly created changeover sub-plan.
    /// Default: `Date::INFINITE_PAST`.
    pub changeover_horizon: Date,

    /// Re-evaluate setups only around a moved END record.  `false` forces a
    /// full pass over the resource on every END update.  Default: `true`.
    pub scoped_setup_updates: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            strict_changeover_lookup: false,
            changeover_horizon:       Date::INFINITE_PAST,
            scoped_setup_updates:     true,
        }
    }
}

impl LedgerConfig {
    /// Reject configurations the ledger cannot honour.
    pub fn validate(&self) -> CoreResult<()> {
        if self.changeover_horizon == Date::INFINITE_FUTURE {
            return Err(CoreError::Config(
                "changeover_horizon cannot be the infinite future".into(),
            ));
        }
        Ok(())
    }
}
