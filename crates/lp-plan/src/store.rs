//! `PlanStore`: owner of every planning entity and of the change set.
//!
//! # Ownership
//!
//! ```text
//! PlanStore
//!  ├─ resources[ResourceId]      ── Timeline<EventOwner> (non-owning positions)
//!  ├─ operations[OperationId]    ── load ids
//!  ├─ loads[LoadId]
//!  ├─ plans[OperationPlanId]     ── record arena + pair index + sub-plan ids
//!  └─ changes                    ── dirty resources / operations
//! ```
//!
//! All mutation goes through `&mut PlanStore`, so no caller can observe a
//! reassignment halfway.  Callers that parallelize planning must serialize
//! access to the store themselves.

use tracing::debug;

use lp_core::{
    ChangeSet, Date, DateRange, LedgerConfig, LoadId, LoadPlanId, OperationId, OperationPlanId,
    ResourceId,
};

use crate::model::{EventOwner, Load, Operation, OperationKind, Resource};
use crate::plan::{LoadPlan, OperationPlan};
use crate::setup::SetupScope;
use crate::{PlanError, PlanResult};

/// Name of the synthetic changeover operation every store starts with.
pub const CHANGEOVER_OPERATION: &str = "setup";

pub struct PlanStore {
    pub(crate) config:       LedgerConfig,
    pub(crate) resources:    Vec<Resource>,
    pub(crate) operations:   Vec<Operation>,
    pub(crate) loads:        Vec<Load>,
    pub(crate) plans:        Vec<Option<OperationPlan>>,
    pub(crate) changes:      ChangeSet,
    pub(crate) changeover_op: OperationId,
}

impl Default for PlanStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanStore {
    /// An empty store with the default configuration.
    pub fn new() -> Self {
        let changeover_op = OperationId(0);
        Self {
            config:     LedgerConfig::default(),
            resources:  Vec::new(),
            operations: vec![Operation {
                id:    changeover_op,
                name:  CHANGEOVER_OPERATION.to_owned(),
                kind:  OperationKind::Changeover,
                loads: Vec::new(),
            }],
            loads:      Vec::new(),
            plans:      Vec::new(),
            changes:    ChangeSet::new(),
            changeover_op,
        }
    }

    /// An empty store with a validated configuration.
    pub fn with_config(config: LedgerConfig) -> PlanResult<Self> {
        config
            .validate()
            .map_err(|e| PlanError::InvalidArgument(e.to_string()))?;
        Ok(Self { config, ..Self::new() })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ── Registration ──────────────────────────────────────────────────────

    pub fn add_resource(&mut self, mut resource: Resource) -> PlanResult<ResourceId> {
        let id = ResourceId::try_from(self.resources.len())
            .map_err(|_| PlanError::InvalidArgument("too many resources".into()))?;
        resource.id = id;
        self.resources.push(resource);
        Ok(id)
    }

    pub fn add_operation(&mut self, name: impl Into<String>) -> PlanResult<OperationId> {
        let id = OperationId::try_from(self.operations.len())
            .map_err(|_| PlanError::InvalidArgument("too many operations".into()))?;
        self.operations.push(Operation {
            id,
            name: name.into(),
            kind: OperationKind::Production,
            loads: Vec::new(),
        });
        Ok(id)
    }

    /// Register a load of `operation` on `resource`.
    pub fn add_load(
        &mut self,
        operation: OperationId,
        resource: ResourceId,
        usage: f64,
        setup: impl Into<String>,
    ) -> PlanResult<LoadId> {
        self.resource(resource)?;
        if !usage.is_finite() {
            return Err(PlanError::InvalidArgument(format!("usage {usage} is not finite")));
        }
        if self.operation(operation)?.kind == OperationKind::Changeover {
            return Err(PlanError::InvalidArgument(
                "the changeover operation borrows its owner's loads".into(),
            ));
        }
        let id = LoadId::try_from(self.loads.len())
            .map_err(|_| PlanError::InvalidArgument("too many loads".into()))?;
        self.loads.push(Load { id, operation, resource, usage, setup: setup.into() });
        self.operations[operation.index()].loads.push(id);
        Ok(id)
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn resource(&self, id: ResourceId) -> PlanResult<&Resource> {
        self.resources.get(id.index()).ok_or(PlanError::UnknownResource(id))
    }

    pub(crate) fn resource_mut(&mut self, id: ResourceId) -> PlanResult<&mut Resource> {
        self.resources.get_mut(id.index()).ok_or(PlanError::UnknownResource(id))
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> + '_ {
        self.resources.iter()
    }

    pub fn resource_by_name(&self, name: &str) -> Option<ResourceId> {
        self.resources.iter().find(|r| r.name == name).map(|r| r.id)
    }

    pub fn operation(&self, id: OperationId) -> PlanResult<&Operation> {
        self.operations.get(id.index()).ok_or(PlanError::UnknownOperation(id))
    }

    pub fn operation_by_name(&self, name: &str) -> Option<OperationId> {
        self.operations.iter().find(|o| o.name == name).map(|o| o.id)
    }

    /// The synthetic operation whose plans model changeovers.
    pub fn changeover_operation(&self) -> OperationId {
        self.changeover_op
    }

    pub fn load(&self, id: LoadId) -> PlanResult<&Load> {
        self.loads.get(id.index()).ok_or(PlanError::UnknownLoad(id))
    }

    pub fn plan(&self, id: OperationPlanId) -> PlanResult<&OperationPlan> {
        self.plans
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(PlanError::UnknownOperationPlan(id))
    }

    pub(crate) fn plan_mut(&mut self, id: OperationPlanId) -> PlanResult<&mut OperationPlan> {
        self.plans
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(PlanError::UnknownOperationPlan(id))
    }

    /// Live operation plans in id order.
    pub fn plans(&self) -> impl Iterator<Item = &OperationPlan> + '_ {
        self.plans.iter().flatten()
    }

    pub fn record(&self, id: LoadPlanId) -> PlanResult<&LoadPlan> {
        self.plan(id.plan)?
            .record(id.slot)
            .ok_or(PlanError::UnknownLoadPlan(id))
    }

    pub(crate) fn record_mut(&mut self, id: LoadPlanId) -> PlanResult<&mut LoadPlan> {
        self.plan_mut(id.plan)?
            .record_mut(id.slot)
            .ok_or(PlanError::UnknownLoadPlan(id))
    }

    pub fn is_changeover_plan(&self, id: OperationPlanId) -> PlanResult<bool> {
        Ok(self.plan(id)?.operation == self.changeover_op)
    }

    /// The changeover sub-plan of `owner`, if it has one.
    pub fn changeover_plan_of(&self, owner: OperationPlanId) -> PlanResult<Option<OperationPlanId>> {
        let plan = self.plan(owner)?;
        Ok(plan.sub_plans.iter().copied().find(|sub| {
            self.plan(*sub).is_ok_and(|p| p.operation == self.changeover_op)
        }))
    }

    // ── Change tracking ───────────────────────────────────────────────────

    /// Entities marked as changed since the last drain.
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// Drain the change set for problem recomputation.
    pub fn take_changes(&mut self) -> ChangeSet {
        self.changes.take()
    }

    // ── Operation plan lifecycle ──────────────────────────────────────────

    /// Plan `operation` for `quantity` over `dates`: one load-plan pair per
    /// load of the operation.
    pub fn create_operation_plan(
        &mut self,
        operation: OperationId,
        quantity: f64,
        dates: DateRange,
    ) -> PlanResult<OperationPlanId> {
        let loads = self.operation(operation)?.loads.clone();
        self.create_operation_plan_on(operation, quantity, dates, &loads)
    }

    /// Plan `operation` against a subset of its loads, e.g. one of several
    /// alternatives.
    pub fn create_operation_plan_on(
        &mut self,
        operation: OperationId,
        quantity: f64,
        dates: DateRange,
        loads: &[LoadId],
    ) -> PlanResult<OperationPlanId> {
        let op = self.operation(operation)?;
        if op.kind == OperationKind::Changeover {
            return Err(PlanError::InvalidArgument(
                "changeover plans are created through create_changeover_plan".into(),
            ));
        }
        if let Some(load) = loads.iter().find(|l| !op.loads.contains(*l)) {
            return Err(PlanError::InvalidArgument(format!(
                "load {load} does not belong to operation {operation}"
            )));
        }
        reject_duplicate_loads(loads)?;

        let id = self.alloc_plan(operation, quantity, dates, None)?;
        let mut touched: Vec<ResourceId> = Vec::new();
        for &load in loads {
            self.create_pair(id, load)?;
            let resource = self.load(load)?.resource;
            if !touched.contains(&resource) {
                touched.push(resource);
            }
        }
        for resource in touched {
            let scope = SetupScope::Around { from: dates.start, until: dates.end };
            self.update_setups(resource, scope)?;
        }
        self.changes.mark_operation(operation);
        debug!(plan = %id, %dates, quantity, "operation plan created");
        Ok(id)
    }

    /// Create the changeover sub-plan of `owner`, with one pair per load in
    /// `loads` (all of which must belong to the owner's operation).
    pub fn create_changeover_plan(
        &mut self,
        owner: OperationPlanId,
        loads: &[LoadId],
        quantity: f64,
        dates: DateRange,
    ) -> PlanResult<OperationPlanId> {
        let owner_op = self.plan(owner)?.operation;
        if self.is_changeover_plan(owner)? {
            return Err(PlanError::InvalidArgument("a changeover plan cannot own another".into()));
        }
        if self.changeover_plan_of(owner)?.is_some() {
            return Err(PlanError::InvalidArgument(format!(
                "operation plan {owner} already has a changeover plan"
            )));
        }
        for &load in loads {
            if self.load(load)?.operation != owner_op {
                return Err(PlanError::InvalidArgument(format!(
                    "load {load} does not belong to the operation of plan {owner}"
                )));
            }
        }
        reject_duplicate_loads(loads)?;

        let changeover_op = self.changeover_op;
        let id = self.alloc_plan(changeover_op, quantity, dates, Some(owner))?;
        self.plan_mut(owner)?.sub_plans.push(id);
        for &load in loads {
            self.create_pair(id, load)?;
        }
        self.changes.mark_operation(changeover_op);
        for &load in loads {
            let resource = self.load(load)?.resource;
            self.update_setups(resource, SetupScope::Full)?;
        }
        debug!(plan = %id, %owner, %dates, "changeover plan created");
        Ok(id)
    }

    /// Move a plan to new dates and refresh every record it owns.
    pub fn set_dates(&mut self, id: OperationPlanId, dates: DateRange) -> PlanResult<()> {
        self.plan_mut(id)?.dates = dates;
        self.refresh_records(id)
    }

    /// Change a plan's quantity and refresh every record it owns.
    pub fn set_quantity(&mut self, id: OperationPlanId, quantity: f64) -> PlanResult<()> {
        if !quantity.is_finite() {
            return Err(PlanError::InvalidArgument(format!("quantity {quantity} is not finite")));
        }
        self.plan_mut(id)?.quantity = quantity;
        self.refresh_records(id)
    }

    /// Destroy a plan, its sub-plans and all their records.
    pub fn erase_operation_plan(&mut self, id: OperationPlanId) -> PlanResult<()> {
        let plan = self.plan(id)?;
        let subs = plan.sub_plans.clone();
        let owner = plan.owner;
        let operation = plan.operation;

        for sub in subs {
            self.erase_operation_plan(sub)?;
        }

        let Some(plan) = self.plans.get_mut(id.index()).and_then(Option::take) else {
            return Err(PlanError::UnknownOperationPlan(id));
        };
        let mut touched: Vec<ResourceId> = Vec::new();
        for record in plan.records.iter().flatten() {
            let resource = self.load(record.load)?.resource;
            self.resource_mut(resource)?.timeline.erase(record.event)?;
            self.changes.mark_resource(resource);
            if !touched.contains(&resource) {
                touched.push(resource);
            }
        }
        if let Some(owner) = owner {
            if let Ok(parent) = self.plan_mut(owner) {
                parent.sub_plans.retain(|s| *s != id);
            }
        }
        self.changes.mark_operation(operation);
        for resource in touched {
            self.update_setups(resource, SetupScope::Full)?;
        }
        debug!(plan = %id, "operation plan erased");
        Ok(())
    }

    /// Destroy `sub`, which must be a sub-plan of `owner`.
    pub fn erase_sub_operation_plan(
        &mut self,
        owner: OperationPlanId,
        sub: OperationPlanId,
    ) -> PlanResult<()> {
        if self.plan(sub)?.owner != Some(owner) {
            return Err(PlanError::InvalidArgument(format!(
                "operation plan {sub} is not a sub-plan of {owner}"
            )));
        }
        self.erase_operation_plan(sub)
    }

    // ── Capacity markers ──────────────────────────────────────────────────

    /// Record that `resource` offers `maximum` from `date` onwards.
    pub fn set_capacity(&mut self, resource: ResourceId, date: Date, maximum: f64) -> PlanResult<()> {
        self.resource_mut(resource)?
            .timeline
            .insert(EventOwner::Capacity { maximum }, 0.0, date);
        self.changes.mark_resource(resource);
        Ok(())
    }

    /// Capacity in force at `date`, from the latest marker on or before it.
    pub fn capacity_at(&self, resource: ResourceId, date: Date) -> PlanResult<Option<f64>> {
        Ok(self
            .resource(resource)?
            .timeline
            .iter()
            .rev()
            .skip_while(|e| e.date > date)
            .find_map(|e| match e.owner {
                EventOwner::Capacity { maximum } => Some(maximum),
                EventOwner::LoadPlan(_) => None,
            }))
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn alloc_plan(
        &mut self,
        operation: OperationId,
        quantity: f64,
        dates: DateRange,
        owner: Option<OperationPlanId>,
    ) -> PlanResult<OperationPlanId> {
        if !quantity.is_finite() {
            return Err(PlanError::InvalidArgument(format!("quantity {quantity} is not finite")));
        }
        let id = OperationPlanId::try_from(self.plans.len())
            .map_err(|_| PlanError::InvalidArgument("too many operation plans".into()))?;
        self.plans.push(Some(OperationPlan::new(id, operation, quantity, dates, owner)));
        Ok(id)
    }

    fn refresh_records(&mut self, id: OperationPlanId) -> PlanResult<()> {
        let ids: Vec<LoadPlanId> = self.plan(id)?.load_plans().map(LoadPlan::id).collect();
        for lp in ids {
            self.update_load_plan(lp)?;
        }
        let operation = self.plan(id)?.operation;
        self.changes.mark_operation(operation);
        Ok(())
    }
}

/// A plan holds at most one pair per load.
fn reject_duplicate_loads(loads: &[LoadId]) -> PlanResult<()> {
    for (i, load) in loads.iter().enumerate() {
        if loads[..i].contains(load) {
            return Err(PlanError::InvalidArgument(format!("load {load} is listed twice")));
        }
    }
    Ok(())
}
