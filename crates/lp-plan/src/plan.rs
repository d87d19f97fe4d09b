//! `OperationPlan` and the load-plan records it owns.
//!
//! # Record arena
//!
//! A plan owns its records in a slot arena (`Vec<Option<LoadPlan>>`) whose
//! order is creation order.  Slots are never reused while the plan lives, so
//! a `LoadPlanId { plan, slot }` stays valid until its plan is erased.
//!
//! Siblings are found through `pairs`, a map from load to the two slots of
//! the START/END pair planned against it.  There is no pointer from one
//! record to the other.

use rustc_hash::FxHashMap;

use lp_core::{DateRange, EventId, LoadId, LoadPlanId, OperationId, OperationPlanId};

use crate::model::{Changeover, Role};

// ── LoadPlan ──────────────────────────────────────────────────────────────────

/// One half of a load-plan pair.
#[derive(Clone, Debug)]
pub struct LoadPlan {
    pub(crate) id:    LoadPlanId,
    pub(crate) role:  Role,
    pub(crate) load:  LoadId,
    /// Position on the load's resource timeline.
    pub(crate) event: EventId,
}

impl LoadPlan {
    pub fn id(&self) -> LoadPlanId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    #[inline]
    pub fn is_start(&self) -> bool {
        self.role == Role::Start
    }

    pub fn load(&self) -> LoadId {
        self.load
    }

    pub fn event(&self) -> EventId {
        self.event
    }
}

// ── OperationPlan ─────────────────────────────────────────────────────────────

/// One concrete instance of an operation at specific dates and quantity.
#[derive(Clone, Debug)]
pub struct OperationPlan {
    pub(crate) id:         OperationPlanId,
    pub(crate) operation:  OperationId,
    pub(crate) dates:      DateRange,
    pub(crate) quantity:   f64,
    /// Parent plan for sub-plans (the changeover sub-plan among them).
    pub(crate) owner:      Option<OperationPlanId>,
    pub(crate) sub_plans:  Vec<OperationPlanId>,
    pub(crate) records:    Vec<Option<LoadPlan>>,
    pub(crate) pairs:      FxHashMap<LoadId, [u16; 2]>,
    /// Last transition computed by setup re-evaluation.
    pub(crate) changeover: Option<Changeover>,
}

impl OperationPlan {
    pub(crate) fn new(
        id: OperationPlanId,
        operation: OperationId,
        quantity: f64,
        dates: DateRange,
        owner: Option<OperationPlanId>,
    ) -> Self {
        Self {
            id,
            operation,
            dates,
            quantity,
            owner,
            sub_plans:  Vec::new(),
            records:    Vec::new(),
            pairs:      FxHashMap::default(),
            changeover: None,
        }
    }

    pub fn id(&self) -> OperationPlanId {
        self.id
    }

    pub fn operation(&self) -> OperationId {
        self.operation
    }

    pub fn dates(&self) -> DateRange {
        self.dates
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn owner(&self) -> Option<OperationPlanId> {
        self.owner
    }

    pub fn sub_plans(&self) -> &[OperationPlanId] {
        &self.sub_plans
    }

    pub fn changeover(&self) -> Option<&Changeover> {
        self.changeover.as_ref()
    }

    /// Records in creation order.
    pub fn load_plans(&self) -> impl Iterator<Item = &LoadPlan> + '_ {
        self.records.iter().flatten()
    }

    /// Number of live records (always even while the pairing invariant holds).
    pub fn load_plan_count(&self) -> usize {
        self.load_plans().count()
    }

    /// Loads this plan holds a pair for.
    pub fn loads(&self) -> impl Iterator<Item = LoadId> + '_ {
        self.pairs.keys().copied()
    }

    /// The START record of the pair planned against `load`.
    pub fn start_of(&self, load: LoadId) -> Option<LoadPlanId> {
        let [start, _] = *self.pairs.get(&load)?;
        self.record(start).map(LoadPlan::id)
    }

    pub(crate) fn record(&self, slot: u16) -> Option<&LoadPlan> {
        self.records.get(slot as usize).and_then(Option::as_ref)
    }

    pub(crate) fn record_mut(&mut self, slot: u16) -> Option<&mut LoadPlan> {
        self.records.get_mut(slot as usize).and_then(Option::as_mut)
    }

    /// Slot the next record will occupy.
    pub(crate) fn next_slot(&self) -> Option<u16> {
        u16::try_from(self.records.len()).ok()
    }
}
