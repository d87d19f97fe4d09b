//! Setup resolution.
//!
//! # Backward scan
//!
//! The changeover code in force at a record is the code of the nearest
//! earlier load plan on the same resource whose load carries one:
//!
//! ```text
//! setup_of(x, current):
//!   resource has no setup matrix        → ""
//!   current and load(x) has a code      → code(x)
//!   scan back from x (inclusive):       → first non-empty code,
//!                                         skipping x itself unless current
//!   nothing found                       → resource baseline code
//! ```
//!
//! The scan stops at the previous changeover-bearing event, so its cost is
//! the distance to that event rather than the timeline length, except when
//! no earlier changeover exists at all.

use tracing::trace;

use lp_core::{Date, LoadPlanId, OperationPlanId, ResourceId};

use crate::model::{Changeover, EventOwner, Role};
use crate::{PlanResult, PlanStore};

/// Which part of a resource timeline [`PlanStore::update_setups`] revisits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SetupScope {
    /// Every setup-bearing START on the resource.
    Full,
    /// STARTs dated in `[from, until]`, plus the first one after `until`.
    Around { from: Date, until: Date },
}

impl PlanStore {
    /// The changeover code active at `id`.
    ///
    /// With `current` the record's own load code counts; without it the
    /// result is the code in force just before the record.
    pub fn setup_of(&self, id: LoadPlanId, current: bool) -> PlanResult<&str> {
        let rec = self.record(id)?;
        let load = self.load(rec.load)?;
        let resource = self.resource(load.resource)?;

        if !resource.has_setup_matrix() {
            return Ok("");
        }
        if current && load.has_setup() {
            return Ok(&load.setup);
        }

        for event in resource.timeline.iter_back_from(rec.event)? {
            let EventOwner::LoadPlan(other) = event.owner else {
                continue;
            };
            if !current && other == id {
                continue;
            }
            let other_load = self.load(self.record(other)?.load)?;
            if other_load.has_setup() {
                return Ok(&other_load.setup);
            }
        }
        Ok(&resource.setup)
    }

    /// Recompute the changeover transitions of the setup-bearing STARTs on
    /// `resource` within `scope`.  Returns how many transitions changed.
    ///
    /// A transition is stored on the record's changeover sub-plan when it is
    /// one, otherwise on its own plan if that plan has no changeover sub-plan.
    pub fn update_setups(&mut self, resource: ResourceId, scope: SetupScope) -> PlanResult<usize> {
        let res = self.resource(resource)?;
        if !res.has_setup_matrix() {
            return Ok(0);
        }
        let (from, until) = match scope {
            SetupScope::Full => (Date::INFINITE_PAST, None),
            SetupScope::Around { from, until } => (from, Some(until)),
        };

        let mut transitions: Vec<(OperationPlanId, Changeover)> = Vec::new();
        for event in res.timeline.iter_from_date(from) {
            let Some(id) = event.owner.load_plan() else {
                continue;
            };
            let rec = self.record(id)?;
            if rec.role != Role::Start {
                continue;
            }
            let load = self.load(rec.load)?;
            if !load.has_setup() {
                continue;
            }
            if let Some(target) = self.transition_holder(id.plan)? {
                let change = Changeover {
                    from: self.setup_of(id, false)?.to_owned(),
                    to:   load.setup.clone(),
                };
                transitions.push((target, change));
            }
            if until.is_some_and(|u| event.date > u) {
                break;
            }
        }

        let mut changed = 0;
        for (target, change) in transitions {
            let plan = self.plan_mut(target)?;
            if plan.changeover.as_ref() == Some(&change) {
                continue;
            }
            trace!(plan = %target, from = %change.from, to = %change.to, "changeover transition");
            plan.changeover = Some(change);
            let (operation, owner) = (plan.operation, plan.owner);
            self.changes.mark_operation(operation);
            if let Some(owner) = owner {
                let owner_op = self.plan(owner)?.operation;
                self.changes.mark_operation(owner_op);
            }
            changed += 1;
        }
        if changed > 0 {
            self.changes.mark_resource(resource);
        }
        Ok(changed)
    }

    /// The plan that carries the transition of a START owned by `plan`.
    fn transition_holder(&self, plan: OperationPlanId) -> PlanResult<Option<OperationPlanId>> {
        if self.is_changeover_plan(plan)? {
            return Ok(Some(plan));
        }
        Ok(match self.changeover_plan_of(plan)? {
            Some(_) => None,
            None => Some(plan),
        })
    }
}
