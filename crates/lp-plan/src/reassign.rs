//! Load reassignment.
//!
//! [`PlanStore::set_load`] moves both records of a pair from their current
//! load to another load of the same operation, possibly on another resource.
//! Every precondition is checked before the first mutation, so a failed call
//! leaves the store untouched.
//!
//! # Changeover reconciliation
//!
//! Unless the pair belongs to a changeover plan itself, the owning plan's
//! changeover sub-plan follows the new load:
//!
//! | old needs setup | new needs setup | transition  | effect                                  |
//! |-----------------|-----------------|-------------|-----------------------------------------|
//! | yes             | yes             | `Retarget`  | move the sub-plan's pair, extend its end |
//! | yes             | no              | `Drop`      | delete the sub-plan                      |
//! | no              | yes             | `Create`    | new sub-plan, horizon → owner end        |
//! | no              | no              | `Keep`      | nothing                                  |
//!
//! "Needs setup" means the load has a code, its resource has a setup matrix
//! and (for the old side) a changeover sub-plan actually exists.

use tracing::{debug, info, warn};

use lp_core::{DateRange, LoadId, LoadPlanId, OperationPlanId, ResourceId};

use crate::model::EventOwner;
use crate::setup::SetupScope;
use crate::{PlanError, PlanResult, PlanStore};

/// What happens to the changeover sub-plan during a reassignment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChangeoverTransition {
    Retarget,
    Drop,
    Create,
    Keep,
}

impl ChangeoverTransition {
    pub fn from_flags(old_has_setup: bool, new_has_setup: bool) -> Self {
        match (old_has_setup, new_has_setup) {
            (true, true) => ChangeoverTransition::Retarget,
            (true, false) => ChangeoverTransition::Drop,
            (false, true) => ChangeoverTransition::Create,
            (false, false) => ChangeoverTransition::Keep,
        }
    }
}

/// Everything `set_load` decided before touching the store.
struct Reassignment {
    record:     LoadPlanId,
    sibling:    LoadPlanId,
    old_load:   LoadId,
    new_load:   LoadId,
    old_res:    ResourceId,
    new_res:    ResourceId,
    changeover: Option<ChangeoverStep>,
}

enum ChangeoverStep {
    Retarget { sub: OperationPlanId, record: LoadPlanId },
    Drop { sub: OperationPlanId },
    Create { existing: Option<OperationPlanId> },
}

impl PlanStore {
    /// Reassign the pair of `id` to `new_load`.
    ///
    /// A no-op when `new_load` is the current load.  Fails with
    /// [`PlanError::InvalidArgument`] for a missing load, a load of another
    /// operation, or a load the plan already holds a pair for.
    pub fn set_load(&mut self, id: LoadPlanId, new_load: Option<LoadId>) -> PlanResult<()> {
        let Some(step) = self.plan_reassignment(id, new_load)? else {
            return Ok(());
        };
        self.apply_reassignment(step)
    }

    // ── Validation (no mutation) ──────────────────────────────────────────

    fn plan_reassignment(
        &self,
        id: LoadPlanId,
        new_load: Option<LoadId>,
    ) -> PlanResult<Option<Reassignment>> {
        let old_load_id = self.record(id)?.load;
        if new_load == Some(old_load_id) {
            return Ok(None);
        }
        let new_load_id = new_load
            .ok_or_else(|| PlanError::InvalidArgument("cannot switch to a null load".into()))?;

        let old = self.load(old_load_id)?;
        let new = self.load(new_load_id)?;
        if old.operation != new.operation {
            return Err(PlanError::InvalidArgument(format!(
                "load {new_load_id} belongs to another operation than load {old_load_id}"
            )));
        }
        if self.plan(id.plan)?.pairs.contains_key(&new_load_id) {
            return Err(PlanError::InvalidArgument(format!(
                "operation plan {} already holds a pair for load {new_load_id}",
                id.plan
            )));
        }
        let sibling = self.sibling(id)?;

        let old_res = self.resource(old.resource)?;
        let new_res = self.resource(new.resource)?;
        let changeover = if self.is_changeover_plan(id.plan)? {
            None
        } else {
            let old_has = old.has_setup() && old_res.has_setup_matrix();
            let new_has = new.has_setup() && new_res.has_setup_matrix();
            let sub = if old_has { self.changeover_plan_of(id.plan)? } else { None };
            if old_has && sub.is_none() {
                if self.config.strict_changeover_lookup {
                    return Err(PlanError::Corrupt(format!(
                        "operation plan {} needs a changeover on {} but has no changeover plan",
                        id.plan, old_res.id
                    )));
                }
                warn!(plan = %id.plan, resource = %old_res.id,
                      "changeover plan expected but missing; continuing without one");
            }

            match (ChangeoverTransition::from_flags(old_has && sub.is_some(), new_has), sub) {
                (ChangeoverTransition::Retarget, Some(sub)) => {
                    let record = self.changeover_record(sub, old_load_id, new_load_id)?;
                    Some(ChangeoverStep::Retarget { sub, record })
                }
                (ChangeoverTransition::Drop, Some(sub)) => Some(ChangeoverStep::Drop { sub }),
                (ChangeoverTransition::Create, _) => {
                    let existing = self.changeover_plan_of(id.plan)?;
                    if let Some(sub) = existing {
                        if self.plan(sub)?.pairs.contains_key(&new_load_id) {
                            return Err(PlanError::Corrupt(format!(
                                "changeover plan {sub} already holds a pair for load {new_load_id}"
                            )));
                        }
                    }
                    Some(ChangeoverStep::Create { existing })
                }
                _ => None,
            }
        };

        Ok(Some(Reassignment {
            record: id,
            sibling,
            old_load: old_load_id,
            new_load: new_load_id,
            old_res: old_res.id,
            new_res: new_res.id,
            changeover,
        }))
    }

    /// The START record of the changeover sub-plan planned against
    /// `old_load`, checked so that moving it cannot fail halfway.
    fn changeover_record(
        &self,
        sub: OperationPlanId,
        old_load: LoadId,
        new_load: LoadId,
    ) -> PlanResult<LoadPlanId> {
        let plan = self.plan(sub)?;
        let record = plan.start_of(old_load).ok_or_else(|| {
            PlanError::Corrupt(format!("changeover plan {sub} has no load plan for load {old_load}"))
        })?;
        if plan.pairs.contains_key(&new_load) {
            return Err(PlanError::Corrupt(format!(
                "changeover plan {sub} already holds a pair for load {new_load}"
            )));
        }
        self.sibling(record)?;
        Ok(record)
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    fn apply_reassignment(&mut self, step: Reassignment) -> PlanResult<()> {
        let owner = step.record.plan;
        let owner_op = self.plan(owner)?.operation;
        self.changes.mark_operation(owner_op);
        self.changes.mark_resource(step.old_res);
        self.changes.mark_resource(step.new_res);

        match step.changeover {
            Some(ChangeoverStep::Retarget { sub, record }) => {
                self.set_load(record, Some(step.new_load))?;
                let end = self.plan(owner)?.dates.end;
                let dates = self.plan(sub)?.dates.with_end(end);
                self.set_dates(sub, dates)?;
            }
            Some(ChangeoverStep::Drop { sub }) => {
                let only_this_load = self.plan(sub)?.pairs.keys().all(|l| *l == step.old_load);
                if only_this_load {
                    self.erase_sub_operation_plan(owner, sub)?;
                } else {
                    self.erase_pair(sub, step.old_load)?;
                }
            }
            Some(ChangeoverStep::Create { existing: Some(sub) }) => {
                self.create_pair(sub, step.new_load)?;
            }
            Some(ChangeoverStep::Create { existing: None }) => {
                let dates = DateRange::new(self.config.changeover_horizon, self.plan(owner)?.dates.end);
                self.create_changeover_plan(owner, &[step.new_load], 1.0, dates)?;
            }
            None => {}
        }

        // Both records leave the old timeline before either enters the new one.
        for rec in [step.record, step.sibling] {
            let event = self.record(rec)?.event;
            self.resource_mut(step.old_res)?.timeline.erase(event)?;
        }
        // Covers the changeover plan's own move: the old resource loses its
        // changeover and every later transition there must be recomputed.
        self.update_setups(step.old_res, SetupScope::Full)?;

        for rec in [step.record, step.sibling] {
            self.record_mut(rec)?.load = step.new_load;
            let (role, plan) = (self.record(rec)?.role, self.plan(owner)?);
            let load = self.load(step.new_load)?;
            let quantity = load.loadplan_quantity(role, plan);
            let date = load.loadplan_date(role, plan);
            let event = self
                .resource_mut(step.new_res)?
                .timeline
                .insert(EventOwner::LoadPlan(rec), quantity, date);
            self.record_mut(rec)?.event = event;
            debug!(load_plan = %rec, resource = %step.new_res, %date, quantity, "load plan moved");
        }

        let p = self.plan_mut(owner)?;
        if let Some(slots) = p.pairs.remove(&step.old_load) {
            p.pairs.insert(step.new_load, slots);
        }
        if step.new_res != step.old_res {
            self.update_setups(step.new_res, SetupScope::Full)?;
        } else {
            self.update_setups(step.old_res, SetupScope::Full)?;
        }

        info!(
            plan = %owner,
            from = %step.old_load,
            to = %step.new_load,
            old_resource = %step.old_res,
            new_resource = %step.new_res,
            "load reassigned"
        );
        Ok(())
    }
}
