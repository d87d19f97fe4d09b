//! Read-only enumeration of informative load plans.
//!
//! Two sources, two filters:
//!
//! | Iterator             | Walks                       | Skips                         |
//! |----------------------|-----------------------------|-------------------------------|
//! | [`ResourceLoadPlans`]| a resource timeline         | quantity ≤ 0, non-load events |
//! | [`PlanLoadPlans`]    | one plan's records in order | quantity = 0                  |
//!
//! Both borrow the store, so the ledger cannot change underneath them.  Items
//! are `PlanResult`s: a record whose timeline event has gone missing, or a
//! timeline event whose record has, is reported once as an error and ends
//! the iteration.  They are fused and not restartable; build a new one to
//! scan again.

use std::iter::FusedIterator;

use lp_core::{OperationPlanId, ResourceId};
use lp_timeline::{Cursor, Timeline};

use crate::inspect::LoadPlanRef;
use crate::model::EventOwner;
use crate::plan::LoadPlan;
use crate::{PlanError, PlanResult, PlanStore};

// ── Resource mode ─────────────────────────────────────────────────────────────

pub struct ResourceLoadPlans<'a> {
    store:    &'a PlanStore,
    timeline: &'a Timeline<EventOwner>,
    cursor:   Cursor,
    done:     bool,
}

impl<'a> ResourceLoadPlans<'a> {
    fn advance(&mut self) -> PlanResult<Option<LoadPlanRef<'a>>> {
        let (store, timeline) = (self.store, self.timeline);
        while let Some(event) = timeline.step_forward(&mut self.cursor)? {
            if event.quantity <= 0.0 {
                continue;
            }
            if let EventOwner::LoadPlan(id) = event.owner {
                if store.record(id)?.event != event.id {
                    return Err(PlanError::Corrupt(format!(
                        "event {} claims {id}, which points elsewhere",
                        event.id
                    )));
                }
                return Ok(Some(LoadPlanRef::new(store, id)));
            }
        }
        Ok(None)
    }
}

impl<'a> Iterator for ResourceLoadPlans<'a> {
    type Item = PlanResult<LoadPlanRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.advance().transpose();
        self.done = !matches!(item, Some(Ok(_)));
        item
    }
}

impl FusedIterator for ResourceLoadPlans<'_> {}

// ── Operation plan mode ───────────────────────────────────────────────────────

pub struct PlanLoadPlans<'a> {
    store:   &'a PlanStore,
    records: std::slice::Iter<'a, Option<LoadPlan>>,
    done:    bool,
}

impl<'a> PlanLoadPlans<'a> {
    fn advance(&mut self) -> PlanResult<Option<LoadPlanRef<'a>>> {
        for rec in self.records.by_ref().flatten() {
            if self.store.load_plan_quantity(rec.id)? != 0.0 {
                return Ok(Some(LoadPlanRef::new(self.store, rec.id)));
            }
        }
        Ok(None)
    }
}

impl<'a> Iterator for PlanLoadPlans<'a> {
    type Item = PlanResult<LoadPlanRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.advance().transpose();
        self.done = !matches!(item, Some(Ok(_)));
        item
    }
}

impl FusedIterator for PlanLoadPlans<'_> {}

impl PlanStore {
    /// Informative load plans on `resource`, in timeline order.
    pub fn resource_load_plans(&self, resource: ResourceId) -> PlanResult<ResourceLoadPlans<'_>> {
        let timeline = &self.resource(resource)?.timeline;
        Ok(ResourceLoadPlans { store: self, timeline, cursor: timeline.cursor_front(), done: false })
    }

    /// Non-zero load plans of `plan`, in creation order.
    pub fn plan_load_plans(&self, plan: OperationPlanId) -> PlanResult<PlanLoadPlans<'_>> {
        Ok(PlanLoadPlans { store: self, records: self.plan(plan)?.records.iter(), done: false })
    }
}
