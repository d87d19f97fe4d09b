//! Read-only projection of load plans for inspection and export.
//!
//! [`LoadPlanRef`] resolves attributes lazily against the store;
//! [`LoadPlanView`] is an owned snapshot of all of them.  Nothing here can
//! modify the ledger.

use lp_core::{Date, LoadPlanId, OperationPlanId, ResourceId};

use crate::model::Role;
use crate::{PlanResult, PlanStore};

/// Named attributes exposed to inspection layers.
pub const ATTRIBUTES: [&str; 6] =
    ["operationplan", "quantity", "startdate", "enddate", "resource", "setup"];

/// The value of one named attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    OperationPlan(OperationPlanId),
    Quantity(f64),
    Date(Date),
    Resource(ResourceId),
    Setup(String),
}

/// A borrowed handle on one load-plan record.
#[derive(Copy, Clone)]
pub struct LoadPlanRef<'a> {
    store: &'a PlanStore,
    id:    LoadPlanId,
}

impl std::fmt::Debug for LoadPlanRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LoadPlanRef").field(&self.id).finish()
    }
}

impl<'a> LoadPlanRef<'a> {
    pub(crate) fn new(store: &'a PlanStore, id: LoadPlanId) -> Self {
        Self { store, id }
    }

    pub fn id(&self) -> LoadPlanId {
        self.id
    }

    pub fn operation_plan(&self) -> OperationPlanId {
        self.id.plan
    }

    pub fn role(&self) -> PlanResult<Role> {
        Ok(self.store.record(self.id)?.role)
    }

    pub fn quantity(&self) -> PlanResult<f64> {
        self.store.load_plan_quantity(self.id)
    }

    /// This record's own date.
    pub fn start_date(&self) -> PlanResult<Date> {
        self.store.load_plan_date(self.id)
    }

    /// The sibling record's date.
    pub fn end_date(&self) -> PlanResult<Date> {
        self.store.load_plan_date(self.store.sibling(self.id)?)
    }

    pub fn resource(&self) -> PlanResult<ResourceId> {
        self.store.resource_of(self.id)
    }

    /// Changeover code in force at this record, its own code included.
    pub fn setup(&self) -> PlanResult<&'a str> {
        self.store.setup_of(self.id, true)
    }

    /// Look an attribute up by name; `None` for unknown names.
    pub fn attribute(&self, name: &str) -> PlanResult<Option<AttributeValue>> {
        Ok(Some(match name {
            "operationplan" => AttributeValue::OperationPlan(self.operation_plan()),
            "quantity" => AttributeValue::Quantity(self.quantity()?),
            "startdate" => AttributeValue::Date(self.start_date()?),
            "enddate" => AttributeValue::Date(self.end_date()?),
            "resource" => AttributeValue::Resource(self.resource()?),
            "setup" => AttributeValue::Setup(self.setup()?.to_owned()),
            _ => return Ok(None),
        }))
    }

    /// Snapshot every attribute.
    pub fn view(&self) -> PlanResult<LoadPlanView> {
        Ok(LoadPlanView {
            id:             self.id,
            operation_plan: self.operation_plan(),
            quantity:       self.quantity()?,
            start_date:     self.start_date()?,
            end_date:       self.end_date()?,
            resource:       self.resource()?,
            setup:          self.setup()?.to_owned(),
        })
    }
}

/// Owned snapshot of a load plan's attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadPlanView {
    pub id:             LoadPlanId,
    pub operation_plan: OperationPlanId,
    pub quantity:       f64,
    pub start_date:     Date,
    pub end_date:       Date,
    pub resource:       ResourceId,
    pub setup:          String,
}

impl PlanStore {
    /// Inspection handle on one record.
    pub fn inspect(&self, id: LoadPlanId) -> PlanResult<LoadPlanRef<'_>> {
        self.record(id)?;
        Ok(LoadPlanRef::new(self, id))
    }
}
