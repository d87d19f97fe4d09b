//! `lp-plan`: load-plan pairs on per-resource capacity timelines.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`model`]     | `Resource`, `Operation`, `Load`, `Role`, `EventOwner`      |
//! | [`plan`]      | `OperationPlan`, `LoadPlan`                                |
//! | [`store`]     | `PlanStore`: registration, plan lifecycle, capacity markers |
//! | [`loadplan`]  | pair creation, `update_load_plan`, `sibling`               |
//! | [`setup`]     | `setup_of` backward scan, `update_setups`, `SetupScope`    |
//! | [`reassign`]  | `set_load`, `ChangeoverTransition`                         |
//! | [`iter`]      | `ResourceLoadPlans`, `PlanLoadPlans`                       |
//! | [`inspect`]   | `LoadPlanRef`, `LoadPlanView`, `AttributeValue`            |
//! | [`loader`]    | `load_model_csv`, `load_model_reader`                      |
//! | [`error`]     | `PlanError`, `PlanResult<T>`                               |
//!
//! # Pair model (summary)
//!
//! ```text
//! OperationPlan P ── records: [START(L1), END(L1), START(L2), END(L2)]
//!                    pairs:   {L1 → (0, 1), L2 → (2, 3)}
//!
//! Resource(L1).timeline:  … START(L1)@P.start … END(L1)@P.end …
//! ```
//!
//! Every mutation records the touched resources and operations in the
//! store's `ChangeSet`; drain it with `PlanStore::take_changes`.

pub mod error;
pub mod inspect;
pub mod iter;
pub mod loader;
pub mod loadplan;
pub mod model;
pub mod plan;
pub mod reassign;
pub mod setup;
pub mod store;

#[cfg(test)]
mod tests;

pub use error::{PlanError, PlanResult};
pub use inspect::{ATTRIBUTES, AttributeValue, LoadPlanRef, LoadPlanView};
pub use iter::{PlanLoadPlans, ResourceLoadPlans};
pub use loader::{load_model_csv, load_model_reader};
pub use model::{Changeover, EventOwner, Load, Operation, OperationKind, Resource, Role};
pub use plan::{LoadPlan, OperationPlan};
pub use reassign::ChangeoverTransition;
pub use setup::SetupScope;
pub use store::{CHANGEOVER_OPERATION, PlanStore};
