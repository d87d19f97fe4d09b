//! Load-plan pair lifecycle.
//!
//! A pair is born in [`PlanStore::create_pair`] (START first, then END, both
//! appended to the plan's record list and inserted in the resource timeline),
//! refreshed by [`PlanStore::update_load_plan`] whenever the owning plan
//! moves, and dies with its plan.

use tracing::debug;

use lp_core::{Date, LoadId, LoadPlanId, OperationPlanId, ResourceId};
use lp_timeline::Event;

use crate::model::{EventOwner, Role};
use crate::plan::LoadPlan;
use crate::setup::SetupScope;
use crate::{PlanError, PlanResult, PlanStore};

impl PlanStore {
    /// Create the START/END pair of `plan` against `load`.
    pub(crate) fn create_pair(
        &mut self,
        plan: OperationPlanId,
        load: LoadId,
    ) -> PlanResult<(LoadPlanId, LoadPlanId)> {
        let p = self.plan(plan)?;
        if p.pairs.contains_key(&load) {
            return Err(PlanError::InvalidArgument(format!(
                "operation plan {plan} already holds a pair for load {load}"
            )));
        }
        if u16::try_from(p.records.len() + 1).is_err() {
            return Err(PlanError::InvalidArgument(format!(
                "operation plan {plan} cannot hold more load plans"
            )));
        }
        let (resource, load_op) = {
            let l = self.load(load)?;
            (l.resource, l.operation)
        };

        let start = self.append_record(plan, load, Role::Start)?;
        let end = self.append_record(plan, load, Role::End)?;
        let p = self.plan_mut(plan)?;
        p.pairs.insert(load, [start.slot, end.slot]);
        let plan_op = p.operation;

        self.changes.mark_resource(resource);
        self.changes.mark_operation(load_op);
        self.changes.mark_operation(plan_op);
        debug!(%plan, %load, %resource, "load plan pair created");
        Ok((start, end))
    }

    fn append_record(
        &mut self,
        plan: OperationPlanId,
        load: LoadId,
        role: Role,
    ) -> PlanResult<LoadPlanId> {
        let p = self.plan(plan)?;
        let slot = p.next_slot().ok_or_else(|| {
            PlanError::InvalidArgument(format!("operation plan {plan} cannot hold more load plans"))
        })?;
        let l = self.load(load)?;
        let quantity = l.loadplan_quantity(role, p);
        let date = l.loadplan_date(role, p);
        let resource = l.resource;

        let id = LoadPlanId::new(plan, slot);
        let event = self
            .resource_mut(resource)?
            .timeline
            .insert(EventOwner::LoadPlan(id), quantity, date);
        self.plan_mut(plan)?
            .records
            .push(Some(LoadPlan { id, role, load, event }));
        Ok(id)
    }

    /// Recompute a record's quantity and date from its load and move its
    /// timeline event in place.
    ///
    /// Must be called whenever the owning plan's dates or quantity change;
    /// [`PlanStore::set_dates`] and [`PlanStore::set_quantity`] do so.
    pub fn update_load_plan(&mut self, id: LoadPlanId) -> PlanResult<()> {
        let rec = self.record(id)?;
        let (role, event) = (rec.role, rec.event);
        let load = self.load(rec.load)?;
        let plan = self.plan(id.plan)?;
        let quantity = load.loadplan_quantity(role, plan);
        let date = load.loadplan_date(role, plan);
        let (resource, load_op, plan_op) = (load.resource, load.operation, plan.operation);

        let scoped = self.config.scoped_setup_updates;
        let res = self.resource_mut(resource)?;
        let old_date = res
            .timeline
            .get(event)
            .map(|e| e.date)
            .ok_or_else(|| PlanError::Corrupt(format!("{id} lost its timeline event")))?;
        res.timeline.update(event, quantity, date)?;

        match role {
            Role::Start => {
                let low = old_date.min(date);
                res.setup_dirty_from = Some(res.setup_dirty_from.map_or(low, |d| d.min(low)));
            }
            Role::End => {
                let pending = res.setup_dirty_from.take();
                let scope = if scoped {
                    let from = pending.map_or(old_date.min(date), |d| d.min(old_date).min(date));
                    SetupScope::Around { from, until: old_date.max(date) }
                } else {
                    SetupScope::Full
                };
                self.update_setups(resource, scope)?;
            }
        }

        self.changes.mark_resource(resource);
        self.changes.mark_operation(load_op);
        self.changes.mark_operation(plan_op);
        debug!(load_plan = %id, %date, quantity, "load plan updated");
        Ok(())
    }

    /// The other record of `id`'s pair.
    ///
    /// Fails with [`PlanError::SiblingNotFound`] if the pair is broken, which
    /// callers must treat as fatal.
    pub fn sibling(&self, id: LoadPlanId) -> PlanResult<LoadPlanId> {
        let plan = self.plan(id.plan)?;
        let rec = plan.record(id.slot).ok_or(PlanError::UnknownLoadPlan(id))?;
        let [a, b] = *plan
            .pairs
            .get(&rec.load)
            .ok_or(PlanError::SiblingNotFound(id))?;
        let other = match id.slot {
            s if s == a => b,
            s if s == b => a,
            _ => return Err(PlanError::SiblingNotFound(id)),
        };
        match plan.record(other) {
            Some(o) if o.load == rec.load && o.id != id => Ok(o.id),
            _ => Err(PlanError::SiblingNotFound(id)),
        }
    }

    /// The resource a record currently sits on.
    pub fn resource_of(&self, id: LoadPlanId) -> PlanResult<ResourceId> {
        Ok(self.load(self.record(id)?.load)?.resource)
    }

    /// The record's timeline event.
    pub fn event_of(&self, id: LoadPlanId) -> PlanResult<&Event<EventOwner>> {
        let rec = self.record(id)?;
        let resource = self.load(rec.load)?.resource;
        self.resource(resource)?
            .timeline
            .get(rec.event)
            .ok_or_else(|| PlanError::Corrupt(format!("{id} lost its timeline event")))
    }

    pub fn load_plan_quantity(&self, id: LoadPlanId) -> PlanResult<f64> {
        Ok(self.event_of(id)?.quantity)
    }

    pub fn load_plan_date(&self, id: LoadPlanId) -> PlanResult<Date> {
        Ok(self.event_of(id)?.date)
    }

    /// Remove the pair `plan` holds against `load`, leaving the plan alive.
    pub(crate) fn erase_pair(&mut self, plan: OperationPlanId, load: LoadId) -> PlanResult<()> {
        let resource = self.load(load)?.resource;
        let p = self.plan_mut(plan)?;
        let Some(slots) = p.pairs.remove(&load) else {
            return Ok(());
        };
        let plan_op = p.operation;
        let mut events = Vec::with_capacity(2);
        for slot in slots {
            if let Some(rec) = p.records.get_mut(slot as usize).and_then(Option::take) {
                events.push(rec.event);
            }
        }
        let timeline = &mut self.resource_mut(resource)?.timeline;
        for event in events {
            timeline.erase(event)?;
        }
        self.changes.mark_resource(resource);
        self.changes.mark_operation(plan_op);
        debug!(%plan, %load, "load plan pair erased");
        Ok(())
    }
}
