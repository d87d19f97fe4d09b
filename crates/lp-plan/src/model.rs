//! Static planning entities: `Resource`, `Operation`, `Load`.
//!
//! # Load policy
//!
//! A load decides the quantity and date of every record planned against it:
//!
//! ```text
//! quantity(START) =  usage × plan.quantity        date(START) = plan.start
//! quantity(END)   = -usage × plan.quantity        date(END)   = plan.end
//! ```
//!
//! so a resource's running total rises for the duration of the plan and
//! falls back when it ends.

use lp_core::{Date, LoadId, LoadPlanId, OperationId, ResourceId};
use lp_timeline::Timeline;

use crate::OperationPlan;

// ── Role ──────────────────────────────────────────────────────────────────────

/// Which end of an occupation a load-plan record marks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Start,
    End,
}

// ── EventOwner ────────────────────────────────────────────────────────────────

/// Who put an event on a resource timeline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EventOwner {
    LoadPlan(LoadPlanId),
    /// Capacity-limit marker; carries no quantity of its own.
    Capacity { maximum: f64 },
}

impl EventOwner {
    pub fn load_plan(self) -> Option<LoadPlanId> {
        match self {
            EventOwner::LoadPlan(id) => Some(id),
            EventOwner::Capacity { .. } => None,
        }
    }
}

// ── Resource ──────────────────────────────────────────────────────────────────

/// A capacity-providing entity and its timeline of capacity events.
#[derive(Debug)]
pub struct Resource {
    pub id:           ResourceId,
    pub name:         String,
    /// Baseline changeover code, active before any load sets another one.
    pub setup:        String,
    /// Name of the setup matrix; `None` means changeovers are not modeled.
    pub setup_matrix: Option<String>,
    pub(crate) timeline: Timeline<EventOwner>,
    /// Earliest date touched by a START move whose END has not followed yet.
    pub(crate) setup_dirty_from: Option<Date>,
}

impl Resource {
    /// A resource without setup matrix.  The id is assigned by
    /// `PlanStore::add_resource`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id:           ResourceId::INVALID,
            name:         name.into(),
            setup:        String::new(),
            setup_matrix: None,
            timeline:     Timeline::new(),
            setup_dirty_from: None,
        }
    }

    pub fn with_setup(mut self, setup: impl Into<String>) -> Self {
        self.setup = setup.into();
        self
    }

    pub fn with_setup_matrix(mut self, matrix: impl Into<String>) -> Self {
        self.setup_matrix = Some(matrix.into());
        self
    }

    #[inline]
    pub fn has_setup_matrix(&self) -> bool {
        self.setup_matrix.is_some()
    }

    /// The resource's timeline of load plans and capacity markers.
    pub fn load_plans(&self) -> &Timeline<EventOwner> {
        &self.timeline
    }
}

// ── Operation ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Production,
    /// The synthetic operation whose plans model changeovers.
    Changeover,
}

#[derive(Debug)]
pub struct Operation {
    pub id:   OperationId,
    pub name: String,
    pub kind: OperationKind,
    pub(crate) loads: Vec<LoadId>,
}

impl Operation {
    pub fn loads(&self) -> &[LoadId] {
        &self.loads
    }
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// A requirement linking one operation to one resource.
#[derive(Clone, Debug)]
pub struct Load {
    pub id:        LoadId,
    pub operation: OperationId,
    pub resource:  ResourceId,
    /// Capacity consumed per unit of plan quantity.
    pub usage:     f64,
    /// Changeover code required on the resource; empty means none.
    pub setup:     String,
}

impl Load {
    #[inline]
    pub fn has_setup(&self) -> bool {
        !self.setup.is_empty()
    }

    pub fn loadplan_quantity(&self, role: Role, plan: &OperationPlan) -> f64 {
        let q = self.usage * plan.quantity();
        match role {
            Role::Start => q,
            Role::End => -q,
        }
    }

    pub fn loadplan_date(&self, role: Role, plan: &OperationPlan) -> Date {
        match role {
            Role::Start => plan.dates().start,
            Role::End => plan.dates().end,
        }
    }
}

// ── Changeover ────────────────────────────────────────────────────────────────

/// The setup transition a plan needs on its resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Changeover {
    pub from: String,
    pub to:   String,
}

impl Changeover {
    /// `true` if the resource actually has to change configuration.
    pub fn is_required(&self) -> bool {
        self.from != self.to
    }
}
