//! `lp-core`: foundational types for the load-plan capacity ledger.
//!
//! This crate is a dependency of every other `lp-*` crate.  It intentionally
//! has no `lp-*` dependencies and minimal external ones (only `rustc-hash`
//! and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `ResourceId`, `OperationId`, `LoadId`, `OperationPlanId`, `EventId`, `LoadPlanId` |
//! | [`time`]        | `Date`, `DateRange`                                        |
//! | [`config`]      | `LedgerConfig`                                             |
//! | [`changes`]     | `ChangeSet`, dirty entities awaiting problem recomputation |
//! | [`error`]       | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod changes;
pub mod config;
pub mod error;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use changes::ChangeSet;
pub use config::LedgerConfig;
pub use error::{CoreError, CoreResult};
pub use ids::{EventId, LoadId, LoadPlanId, OperationId, OperationPlanId, ResourceId};
pub use time::{Date, DateRange};
