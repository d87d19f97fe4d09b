//! Unit tests for lp-plan.

use std::io::Cursor as IoCursor;

use lp_core::{
    Date, DateRange, EventId, LedgerConfig, LoadId, LoadPlanId, OperationId, OperationPlanId,
    ResourceId,
};

use crate::{
    AttributeValue, Changeover, ChangeoverTransition, PlanError, PlanStore, Resource, Role,
    load_model_reader,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// One operation "stamp" with alternative loads:
///
/// | load | resource | matrix | baseline | load setup |
/// |------|----------|--------|----------|------------|
/// | l1   | r1       | yes    | "base"   | "A"        |
/// | l2   | r2       | no     | ""       | ""         |
/// | l3   | r3       | yes    | "base"   | "B"        |
/// | l4   | r4       | no     | ""       | ""         |
struct Fixture {
    store: PlanStore,
    r1:    ResourceId,
    r2:    ResourceId,
    r3:    ResourceId,
    r4:    ResourceId,
    op:    OperationId,
    l1:    LoadId,
    l2:    LoadId,
    l3:    LoadId,
    l4:    LoadId,
}

fn fixture_with(config: LedgerConfig) -> Fixture {
    let mut store = PlanStore::with_config(config).unwrap();
    let r1 = store
        .add_resource(Resource::new("R1").with_setup("base").with_setup_matrix("m"))
        .unwrap();
    let r2 = store.add_resource(Resource::new("R2")).unwrap();
    let r3 = store
        .add_resource(Resource::new("R3").with_setup("base").with_setup_matrix("m"))
        .unwrap();
    let r4 = store.add_resource(Resource::new("R4")).unwrap();
    let op = store.add_operation("stamp").unwrap();
    let l1 = store.add_load(op, r1, 1.0, "A").unwrap();
    let l2 = store.add_load(op, r2, 1.0, "").unwrap();
    let l3 = store.add_load(op, r3, 1.0, "B").unwrap();
    let l4 = store.add_load(op, r4, 1.0, "").unwrap();
    store.take_changes();
    Fixture { store, r1, r2, r3, r4, op, l1, l2, l3, l4 }
}

fn fixture() -> Fixture {
    fixture_with(LedgerConfig::default())
}

fn range(start: i64, end: i64) -> DateRange {
    DateRange::new(Date(start), Date(end))
}

impl Fixture {
    /// Plan `op` for qty 3 over [10, 20] on `load` only; returns the plan and
    /// its START record.
    fn plan_on(&mut self, load: LoadId) -> (OperationPlanId, LoadPlanId) {
        let p = self
            .store
            .create_operation_plan_on(self.op, 3.0, range(10, 20), &[load])
            .unwrap();
        let start = self.store.plan(p).unwrap().start_of(load).unwrap();
        (p, start)
    }
}

/// `(date, quantity, running total)` for every event on `r`.
fn entries(store: &PlanStore, r: ResourceId) -> Vec<(i64, f64, f64)> {
    store
        .resource(r)
        .unwrap()
        .load_plans()
        .iter()
        .map(|e| (e.date.0, e.quantity, e.cumulative))
        .collect()
}

/// Everything observable about the timelines, for atomicity checks.
fn snapshot(store: &PlanStore) -> Vec<(u64, Vec<(EventId, i64, f64, f64)>)> {
    store
        .resources()
        .map(|r| {
            let t = r.load_plans();
            (t.generation(), t.iter().map(|e| (e.id, e.date.0, e.quantity, e.cumulative)).collect())
        })
        .collect()
}

// ── Pair creation ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod pairs {
    use super::*;

    #[test]
    fn creation_inserts_start_and_end() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l1);

        assert_eq!(entries(&f.store, f.r1), vec![(10, 3.0, 3.0), (20, -3.0, 0.0)]);
        assert_eq!(f.store.plan(p).unwrap().load_plan_count(), 2);
        assert_eq!(f.store.setup_of(start, true).unwrap(), "A");
        f.store.resource(f.r1).unwrap().load_plans().verify().unwrap();
    }

    #[test]
    fn create_operation_plan_covers_every_load() {
        let mut f = fixture();
        let p = f.store.create_operation_plan(f.op, 2.0, range(0, 5)).unwrap();
        assert_eq!(f.store.plan(p).unwrap().load_plan_count(), 8);
        for r in [f.r1, f.r2, f.r3, f.r4] {
            assert_eq!(entries(&f.store, r), vec![(0, 2.0, 2.0), (5, -2.0, 0.0)]);
        }
    }

    #[test]
    fn usage_scales_quantity() {
        let mut f = fixture();
        let heavy = f.store.add_load(f.op, f.r2, 2.5, "").unwrap();
        f.store.create_operation_plan_on(f.op, 2.0, range(1, 2), &[heavy]).unwrap();
        assert_eq!(entries(&f.store, f.r2), vec![(1, 5.0, 5.0), (2, -5.0, 0.0)]);
    }

    #[test]
    fn sibling_is_an_involution() {
        let mut f = fixture();
        let p = f.store.create_operation_plan(f.op, 1.0, range(0, 5)).unwrap();
        let records: Vec<LoadPlanId> =
            f.store.plan(p).unwrap().load_plans().map(|r| r.id()).collect();
        for id in records {
            let sib = f.store.sibling(id).unwrap();
            assert_ne!(sib, id);
            assert_eq!(f.store.sibling(sib).unwrap(), id);
            assert_ne!(f.store.record(sib).unwrap().role(), f.store.record(id).unwrap().role());
        }
    }

    #[test]
    fn broken_pair_is_fatal() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l1);
        f.store.plans[p.index()].as_mut().unwrap().records[1] = None;

        let err = f.store.sibling(start).unwrap_err();
        assert!(matches!(err, PlanError::SiblingNotFound(id) if id == start));
        assert!(err.is_internal());
    }

    #[test]
    fn foreign_load_rejected() {
        let mut f = fixture();
        let other = f.store.add_operation("paint").unwrap();
        let foreign = f.store.add_load(other, f.r2, 1.0, "").unwrap();
        let err = f.store.create_operation_plan_on(f.op, 1.0, range(0, 1), &[foreign]);
        assert!(matches!(err, Err(PlanError::InvalidArgument(_))));
        assert_eq!(f.store.plans().count(), 0);
    }

    #[test]
    fn duplicate_load_rejected_before_allocation() {
        let mut f = fixture();
        let before = snapshot(&f.store);
        let err = f.store.create_operation_plan_on(f.op, 1.0, range(0, 5), &[f.l2, f.l2]);
        assert!(matches!(err, Err(PlanError::InvalidArgument(_))));
        assert_eq!(f.store.plans().count(), 0);
        assert_eq!(snapshot(&f.store), before);
        assert!(f.store.changes().is_empty());
    }

    #[test]
    fn duplicate_changeover_load_rejected() {
        let mut f = fixture();
        let (p, _) = f.plan_on(f.l1);
        f.store.take_changes();
        let before = snapshot(&f.store);
        let err = f.store.create_changeover_plan(p, &[f.l1, f.l1], 1.0, range(5, 10));
        assert!(matches!(err, Err(PlanError::InvalidArgument(_))));
        assert_eq!(f.store.plans().count(), 1);
        assert_eq!(f.store.changeover_plan_of(p).unwrap(), None);
        assert_eq!(snapshot(&f.store), before);
    }

    #[test]
    fn non_finite_usage_rejected() {
        let mut f = fixture();
        for usage in [f64::NAN, f64::INFINITY] {
            let err = f.store.add_load(f.op, f.r2, usage, "");
            assert!(matches!(err, Err(PlanError::InvalidArgument(_))));
        }
        assert_eq!(f.store.operation(f.op).unwrap().loads().len(), 4);
    }

    #[test]
    fn changes_track_touched_entities() {
        let mut f = fixture();
        f.plan_on(f.l1);
        let changes = f.store.take_changes();
        assert!(changes.contains_resource(f.r1));
        assert!(!changes.contains_resource(f.r2));
        assert!(changes.contains_operation(f.op));
        assert!(f.store.changes().is_empty());
    }
}

// ── Plan lifecycle ────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn set_dates_moves_both_events() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l2);
        let event = f.store.record(start).unwrap().event();

        f.store.set_dates(p, range(30, 45)).unwrap();
        assert_eq!(entries(&f.store, f.r2), vec![(30, 3.0, 3.0), (45, -3.0, 0.0)]);
        assert_eq!(f.store.record(start).unwrap().event(), event);
    }

    #[test]
    fn set_quantity_updates_in_place() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l2);
        f.store.set_quantity(p, 5.0).unwrap();
        assert_eq!(entries(&f.store, f.r2), vec![(10, 5.0, 5.0), (20, -5.0, 0.0)]);
        assert_eq!(f.store.load_plan_quantity(start).unwrap(), 5.0);
        assert!(f.store.set_quantity(p, f64::NAN).is_err());
    }

    #[test]
    fn overlapping_plans_accumulate() {
        let mut f = fixture();
        f.plan_on(f.l2);
        f.store.create_operation_plan_on(f.op, 2.0, range(15, 25), &[f.l2]).unwrap();
        assert_eq!(
            entries(&f.store, f.r2),
            vec![(10, 3.0, 3.0), (15, 2.0, 5.0), (20, -3.0, 2.0), (25, -2.0, 0.0)]
        );
        let t = f.store.resource(f.r2).unwrap().load_plans();
        assert_eq!(t.onhand_at(Date(17)), 5.0);
        assert_eq!(t.onhand_at(Date(30)), 0.0);
    }

    #[test]
    fn erase_removes_plan_and_changeover() {
        let mut f = fixture();
        let (p, _) = f.plan_on(f.l1);
        let sub = f.store.create_changeover_plan(p, &[f.l1], 1.0, range(5, 10)).unwrap();

        f.store.erase_operation_plan(p).unwrap();
        assert!(f.store.resource(f.r1).unwrap().load_plans().is_empty());
        assert!(f.store.plan(p).is_err());
        assert!(f.store.plan(sub).is_err());
        assert_eq!(f.store.plans().count(), 0);
    }

    #[test]
    fn erase_sub_plan_detaches_from_owner() {
        let mut f = fixture();
        let (p, _) = f.plan_on(f.l1);
        let sub = f.store.create_changeover_plan(p, &[f.l1], 1.0, range(5, 10)).unwrap();
        let (q, _) = f.plan_on(f.l2);

        assert!(f.store.erase_sub_operation_plan(q, sub).is_err());
        f.store.erase_sub_operation_plan(p, sub).unwrap();
        assert!(f.store.plan(p).unwrap().sub_plans().is_empty());
        assert_eq!(f.store.changeover_plan_of(p).unwrap(), None);
        assert_eq!(entries(&f.store, f.r1).len(), 2);
    }

    #[test]
    fn changeover_plan_is_unique() {
        let mut f = fixture();
        let (p, _) = f.plan_on(f.l1);
        let sub = f.store.create_changeover_plan(p, &[f.l1], 1.0, range(5, 10)).unwrap();
        assert!(f.store.is_changeover_plan(sub).unwrap());
        assert_eq!(f.store.plan(sub).unwrap().owner(), Some(p));
        assert!(matches!(
            f.store.create_changeover_plan(p, &[f.l1], 1.0, range(5, 10)),
            Err(PlanError::InvalidArgument(_))
        ));
        assert!(matches!(
            f.store.create_changeover_plan(sub, &[f.l1], 1.0, range(5, 10)),
            Err(PlanError::InvalidArgument(_))
        ));
    }

    #[test]
    fn changeover_operation_is_reserved() {
        let mut f = fixture();
        let setup = f.store.changeover_operation();
        assert_eq!(f.store.operation_by_name(crate::CHANGEOVER_OPERATION), Some(setup));
        assert!(f.store.add_load(setup, f.r1, 1.0, "A").is_err());
        assert!(f.store.create_operation_plan(setup, 1.0, range(0, 1)).is_err());
    }

    #[test]
    fn capacity_markers_do_not_count() {
        let mut f = fixture();
        f.plan_on(f.l2);
        f.store.set_capacity(f.r2, Date(15), 10.0).unwrap();

        assert_eq!(f.store.capacity_at(f.r2, Date(12)).unwrap(), None);
        assert_eq!(f.store.capacity_at(f.r2, Date(15)).unwrap(), Some(10.0));
        assert_eq!(f.store.capacity_at(f.r2, Date(99)).unwrap(), Some(10.0));
        assert_eq!(
            entries(&f.store, f.r2),
            vec![(10, 3.0, 3.0), (15, 0.0, 3.0), (20, -3.0, 0.0)]
        );
        assert_eq!(f.store.resource_load_plans(f.r2).unwrap().count(), 1);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = LedgerConfig { changeover_horizon: Date::INFINITE_FUTURE, ..Default::default() };
        assert!(matches!(PlanStore::with_config(config), Err(PlanError::InvalidArgument(_))));
    }
}

// ── Setup resolution ──────────────────────────────────────────────────────────

#[cfg(test)]
mod setups {
    use super::*;

    /// f plus a "paint" operation on R1 with code "B" and a "trim" operation
    /// on R1 without a code.
    fn setup_fixture() -> (Fixture, OperationId, LoadId, OperationId, LoadId) {
        let mut f = fixture();
        let paint = f.store.add_operation("paint").unwrap();
        let lb = f.store.add_load(paint, f.r1, 1.0, "B").unwrap();
        let trim = f.store.add_operation("trim").unwrap();
        let lt = f.store.add_load(trim, f.r1, 1.0, "").unwrap();
        (f, paint, lb, trim, lt)
    }

    #[test]
    fn resource_without_matrix_has_no_setup() {
        let mut f = fixture();
        let (_, start) = f.plan_on(f.l2);
        assert_eq!(f.store.setup_of(start, true).unwrap(), "");
        assert_eq!(f.store.setup_of(start, false).unwrap(), "");
    }

    #[test]
    fn first_event_falls_back_to_baseline() {
        let mut f = fixture();
        let (_, start) = f.plan_on(f.l1);
        assert_eq!(f.store.setup_of(start, false).unwrap(), "base");
    }

    #[test]
    fn backward_scan_finds_previous_code() {
        let (mut f, paint, lb, trim, lt) = setup_fixture();
        let (_, first) = f.plan_on(f.l1);
        let p2 = f.store.create_operation_plan_on(paint, 1.0, range(30, 40), &[lb]).unwrap();
        let p3 = f.store.create_operation_plan_on(trim, 1.0, range(50, 60), &[lt]).unwrap();
        f.store.set_capacity(f.r1, Date(45), 5.0).unwrap();
        let second = f.store.plan(p2).unwrap().start_of(lb).unwrap();
        let third = f.store.plan(p3).unwrap().start_of(lt).unwrap();

        assert_eq!(f.store.setup_of(first, false).unwrap(), "base");
        assert_eq!(f.store.setup_of(second, false).unwrap(), "A");
        assert_eq!(f.store.setup_of(second, true).unwrap(), "B");
        // No code of its own: inherits the code in force.
        assert_eq!(f.store.setup_of(third, true).unwrap(), "B");
        assert_eq!(f.store.setup_of(third, false).unwrap(), "B");
    }

    #[test]
    fn resolution_is_deterministic() {
        let (mut f, paint, lb, _, _) = setup_fixture();
        f.plan_on(f.l1);
        let p2 = f.store.create_operation_plan_on(paint, 1.0, range(10, 20), &[lb]).unwrap();
        let second = f.store.plan(p2).unwrap().start_of(lb).unwrap();
        let a = f.store.setup_of(second, false).unwrap().to_owned();
        let b = f.store.setup_of(second, false).unwrap().to_owned();
        assert_eq!(a, b);
        // Same-date ties resolve in insertion order.
        assert_eq!(a, "A");
    }

    #[test]
    fn transitions_follow_moves() {
        let (mut f, paint, lb, _, _) = setup_fixture();
        let (p1, _) = f.plan_on(f.l1);
        let p2 = f.store.create_operation_plan_on(paint, 1.0, range(30, 40), &[lb]).unwrap();

        let co = |from: &str, to: &str| Changeover { from: from.into(), to: to.into() };
        assert_eq!(f.store.plan(p1).unwrap().changeover(), Some(&co("base", "A")));
        assert_eq!(f.store.plan(p2).unwrap().changeover(), Some(&co("A", "B")));

        f.store.set_dates(p1, range(50, 60)).unwrap();
        assert_eq!(f.store.plan(p2).unwrap().changeover(), Some(&co("base", "B")));
        assert_eq!(f.store.plan(p1).unwrap().changeover(), Some(&co("B", "A")));
        assert!(f.store.plan(p1).unwrap().changeover().unwrap().is_required());
    }

    #[test]
    fn full_and_scoped_updates_agree() {
        let run = |scoped: bool| {
            let config = LedgerConfig { scoped_setup_updates: scoped, ..Default::default() };
            let mut f = fixture_with(config);
            let paint = f.store.add_operation("paint").unwrap();
            let lb = f.store.add_load(paint, f.r1, 1.0, "B").unwrap();
            let (p1, _) = f.plan_on(f.l1);
            let p2 = f.store.create_operation_plan_on(paint, 1.0, range(30, 40), &[lb]).unwrap();
            let p3 = f.store.create_operation_plan_on(f.op, 1.0, range(70, 80), &[f.l1]).unwrap();
            f.store.set_dates(p1, range(50, 60)).unwrap();
            f.store.set_dates(p3, range(0, 5)).unwrap();
            [p1, p2, p3].map(|p| f.store.plan(p).unwrap().changeover().cloned())
        };
        assert_eq!(run(true), run(false));
    }

    #[test]
    fn changeover_plan_carries_transition() {
        let mut f = fixture();
        let (p, _) = f.plan_on(f.l1);
        let sub = f.store.create_changeover_plan(p, &[f.l1], 1.0, range(5, 10)).unwrap();
        let co = Changeover { from: "base".into(), to: "A".into() };
        assert_eq!(f.store.plan(sub).unwrap().changeover(), Some(&co));
    }
}

// ── Load reassignment ─────────────────────────────────────────────────────────

#[cfg(test)]
mod reassign {
    use super::*;

    #[test]
    fn transition_table() {
        use ChangeoverTransition::*;
        assert_eq!(ChangeoverTransition::from_flags(true, true), Retarget);
        assert_eq!(ChangeoverTransition::from_flags(true, false), Drop);
        assert_eq!(ChangeoverTransition::from_flags(false, true), Create);
        assert_eq!(ChangeoverTransition::from_flags(false, false), Keep);
    }

    #[test]
    fn same_load_is_a_no_op() {
        let mut f = fixture();
        let (_, start) = f.plan_on(f.l1);
        f.store.take_changes();
        let before = snapshot(&f.store);

        f.store.set_load(start, Some(f.l1)).unwrap();
        assert_eq!(snapshot(&f.store), before);
        assert!(f.store.changes().is_empty());
    }

    #[test]
    fn null_load_rejected_without_mutation() {
        let mut f = fixture();
        let (_, start) = f.plan_on(f.l1);
        f.store.take_changes();
        let before = snapshot(&f.store);

        assert!(matches!(f.store.set_load(start, None), Err(PlanError::InvalidArgument(_))));
        assert_eq!(snapshot(&f.store), before);
        assert!(f.store.changes().is_empty());
    }

    #[test]
    fn load_of_other_operation_rejected() {
        let mut f = fixture();
        let other = f.store.add_operation("paint").unwrap();
        let foreign = f.store.add_load(other, f.r2, 1.0, "").unwrap();
        let (_, start) = f.plan_on(f.l1);
        let before = snapshot(&f.store);

        let err = f.store.set_load(start, Some(foreign)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidArgument(_)));
        assert!(!err.is_internal());
        assert_eq!(snapshot(&f.store), before);
    }

    #[test]
    fn load_already_held_rejected() {
        let mut f = fixture();
        let p = f.store.create_operation_plan(f.op, 1.0, range(0, 5)).unwrap();
        let start = f.store.plan(p).unwrap().start_of(f.l2).unwrap();
        assert!(matches!(
            f.store.set_load(start, Some(f.l4)),
            Err(PlanError::InvalidArgument(_))
        ));
    }

    #[test]
    fn broken_pair_aborts_reassignment() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l2);
        f.store.plans[p.index()].as_mut().unwrap().pairs.clear();
        let before = snapshot(&f.store);

        let err = f.store.set_load(start, Some(f.l4)).unwrap_err();
        assert!(matches!(err, PlanError::SiblingNotFound(_)));
        assert_eq!(snapshot(&f.store), before);
    }

    #[test]
    fn keep_moves_pair_between_plain_resources() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l2);
        let end = f.store.sibling(start).unwrap();

        f.store.set_load(start, Some(f.l4)).unwrap();
        assert!(entries(&f.store, f.r2).is_empty());
        assert_eq!(entries(&f.store, f.r4), vec![(10, 3.0, 3.0), (20, -3.0, 0.0)]);
        assert_eq!(f.store.record(start).unwrap().load(), f.l4);
        assert_eq!(f.store.record(end).unwrap().load(), f.l4);
        assert_eq!(f.store.sibling(start).unwrap(), end);
        assert_eq!(f.store.plan(p).unwrap().start_of(f.l4), Some(start));
        assert_eq!(f.store.changeover_plan_of(p).unwrap(), None);

        let changes = f.store.changes();
        assert!(changes.contains_resource(f.r2));
        assert!(changes.contains_resource(f.r4));
    }

    #[test]
    fn reassigning_the_end_moves_the_pair() {
        let mut f = fixture();
        let (_, start) = f.plan_on(f.l2);
        let end = f.store.sibling(start).unwrap();
        f.store.set_load(end, Some(f.l4)).unwrap();
        assert_eq!(f.store.resource_of(start).unwrap(), f.r4);
        assert_eq!(f.store.resource_of(end).unwrap(), f.r4);
    }

    #[test]
    fn drop_deletes_changeover_plan() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l1);
        let sub = f.store.create_changeover_plan(p, &[f.l1], 1.0, range(5, 10)).unwrap();
        assert_eq!(entries(&f.store, f.r1).len(), 4);

        f.store.set_load(start, Some(f.l2)).unwrap();
        assert!(entries(&f.store, f.r1).is_empty());
        assert_eq!(entries(&f.store, f.r2), vec![(10, 3.0, 3.0), (20, -3.0, 0.0)]);
        assert_eq!(f.store.changeover_plan_of(p).unwrap(), None);
        assert!(f.store.plan(sub).is_err());
    }

    #[test]
    fn retarget_moves_changeover_plan_along() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l1);
        let sub = f.store.create_changeover_plan(p, &[f.l1], 1.0, range(5, 10)).unwrap();

        f.store.set_load(start, Some(f.l3)).unwrap();
        assert!(entries(&f.store, f.r1).is_empty());
        assert_eq!(
            entries(&f.store, f.r3),
            vec![(5, 1.0, 1.0), (10, 3.0, 4.0), (20, -1.0, 3.0), (20, -3.0, 0.0)]
        );
        assert_eq!(f.store.changeover_plan_of(p).unwrap(), Some(sub));
        let sub_plan = f.store.plan(sub).unwrap();
        assert!(sub_plan.start_of(f.l3).is_some());
        assert!(sub_plan.start_of(f.l1).is_none());
        assert_eq!(sub_plan.dates(), range(5, 20));
        assert_eq!(f.store.setup_of(start, true).unwrap(), "B");
    }

    #[test]
    fn retarget_ends_changeover_at_owner_end() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l1);
        let sub = f.store.create_changeover_plan(p, &[f.l1], 1.0, range(5, 10)).unwrap();
        f.store.set_dates(p, range(0, 3)).unwrap();

        f.store.set_load(start, Some(f.l3)).unwrap();
        assert_eq!(f.store.plan(sub).unwrap().dates(), range(3, 3));
        f.store.resource(f.r3).unwrap().load_plans().verify().unwrap();
    }

    #[test]
    fn create_adds_changeover_plan() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l2);

        f.store.set_load(start, Some(f.l1)).unwrap();
        let sub = f.store.changeover_plan_of(p).unwrap().expect("changeover plan created");
        let sub_plan = f.store.plan(sub).unwrap();
        assert_eq!(sub_plan.dates(), DateRange::new(Date::INFINITE_PAST, Date(20)));
        assert_eq!(sub_plan.quantity(), 1.0);
        assert!(sub_plan.start_of(f.l1).is_some());

        assert!(entries(&f.store, f.r2).is_empty());
        let quantities: Vec<f64> = entries(&f.store, f.r1).iter().map(|e| e.1).collect();
        assert_eq!(quantities, vec![1.0, 3.0, -1.0, -3.0]);
        assert_eq!(f.store.setup_of(start, true).unwrap(), "A");
    }

    #[test]
    fn create_honours_configured_horizon() {
        let config = LedgerConfig { changeover_horizon: Date(0), ..Default::default() };
        let mut f = fixture_with(config);
        let (p, start) = f.plan_on(f.l2);
        f.store.set_load(start, Some(f.l1)).unwrap();
        let sub = f.store.changeover_plan_of(p).unwrap().unwrap();
        assert_eq!(f.store.plan(sub).unwrap().dates(), range(0, 20));
    }

    #[test]
    fn missing_changeover_plan_falls_back() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l1);
        assert_eq!(f.store.changeover_plan_of(p).unwrap(), None);

        f.store.set_load(start, Some(f.l2)).unwrap();
        assert_eq!(entries(&f.store, f.r2).len(), 2);
        assert!(entries(&f.store, f.r1).is_empty());
    }

    #[test]
    fn missing_changeover_plan_fails_in_strict_mode() {
        let config = LedgerConfig { strict_changeover_lookup: true, ..Default::default() };
        let mut f = fixture_with(config);
        let (_, start) = f.plan_on(f.l1);
        f.store.take_changes();
        let before = snapshot(&f.store);

        let err = f.store.set_load(start, Some(f.l2)).unwrap_err();
        assert!(matches!(err, PlanError::Corrupt(_)));
        assert!(err.is_internal());
        assert_eq!(snapshot(&f.store), before);
        assert!(f.store.changes().is_empty());
    }

    #[test]
    fn timelines_stay_sorted_after_reassignments() {
        let mut f = fixture();
        let mut starts = Vec::new();
        for i in 0..6 {
            let p = f
                .store
                .create_operation_plan_on(f.op, 1.0 + i as f64, range(i * 7 % 11, 20 + i), &[f.l2])
                .unwrap();
            starts.push(f.store.plan(p).unwrap().start_of(f.l2).unwrap());
        }
        for (i, start) in starts.iter().enumerate() {
            let target = if i % 2 == 0 { f.l4 } else { f.l2 };
            f.store.set_load(*start, Some(target)).unwrap();
        }
        for r in [f.r2, f.r4] {
            let t = f.store.resource(r).unwrap().load_plans();
            t.verify().unwrap();
            assert_eq!(t.last().map(|e| e.cumulative), Some(0.0));
        }
        assert_eq!(entries(&f.store, f.r4).len(), 6);
    }
}

// ── Iteration ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod iteration {
    use super::*;

    /// On R2: +3@10, 0@20, -3@30, 0@40.
    fn mixed(f: &mut Fixture) -> (OperationPlanId, OperationPlanId) {
        let busy = f.store.create_operation_plan_on(f.op, 3.0, range(10, 30), &[f.l2]).unwrap();
        let idle = f.store.create_operation_plan_on(f.op, 0.0, range(20, 40), &[f.l2]).unwrap();
        (busy, idle)
    }

    #[test]
    fn resource_mode_yields_positive_events() {
        let mut f = fixture();
        let (busy, _) = mixed(&mut f);
        assert_eq!(
            entries(&f.store, f.r2).iter().map(|e| e.1).collect::<Vec<_>>(),
            vec![3.0, 0.0, -3.0, 0.0]
        );

        let seen: Vec<LoadPlanId> =
            f.store.resource_load_plans(f.r2).unwrap().map(|r| r.unwrap().id()).collect();
        assert_eq!(seen, vec![f.store.plan(busy).unwrap().start_of(f.l2).unwrap()]);
    }

    #[test]
    fn plan_mode_yields_non_zero_records() {
        let mut f = fixture();
        let (busy, idle) = mixed(&mut f);

        let quantities: Vec<f64> = f
            .store
            .plan_load_plans(busy)
            .unwrap()
            .map(|r| r.unwrap().quantity().unwrap())
            .collect();
        assert_eq!(quantities, vec![3.0, -3.0]);
        assert_eq!(f.store.plan_load_plans(idle).unwrap().count(), 0);
    }

    #[test]
    fn plan_mode_follows_creation_order() {
        let mut f = fixture();
        let p = f.store.create_operation_plan(f.op, 1.0, range(0, 5)).unwrap();
        let roles: Vec<Role> =
            f.store.plan_load_plans(p).unwrap().map(|r| r.unwrap().role().unwrap()).collect();
        assert_eq!(roles, [Role::Start, Role::End].repeat(4));
    }

    #[test]
    fn exhausted_iterators_stay_exhausted() {
        let mut f = fixture();
        mixed(&mut f);
        let mut it = f.store.resource_load_plans(f.r2).unwrap();
        assert!(matches!(it.next(), Some(Ok(_))));
        assert!(it.next().is_none());
        assert!(it.next().is_none());
        assert_eq!(f.store.resource_load_plans(f.r1).unwrap().count(), 0);
    }

    #[test]
    fn plan_mode_reports_lost_event() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l2);
        let event = f.store.record(start).unwrap().event();
        f.store.resources[f.r2.index()].timeline.erase(event).unwrap();

        let mut it = f.store.plan_load_plans(p).unwrap();
        let err = it.next().unwrap().unwrap_err();
        assert!(matches!(err, PlanError::Corrupt(_)));
        assert!(err.is_internal());
        assert!(it.next().is_none());
    }

    #[test]
    fn resource_mode_reports_dangling_event() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l2);
        let event = f.store.record(start).unwrap().event();
        f.store.plans[p.index()].as_mut().unwrap().records[0] = None;

        let items: Vec<_> = f.store.resource_load_plans(f.r2).unwrap().collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(PlanError::UnknownLoadPlan(id)) if id == start));
        assert!(f.store.resource(f.r2).unwrap().load_plans().get(event).is_some());
    }

    #[test]
    fn resource_mode_reports_mismatched_event() {
        let mut f = fixture();
        let (_, start) = f.plan_on(f.l2);
        let stray = f.store.resources[f.r2.index()].timeline.insert(
            crate::EventOwner::LoadPlan(start),
            1.0,
            Date(5),
        );

        let mut it = f.store.resource_load_plans(f.r2).unwrap();
        assert!(matches!(it.next(), Some(Err(PlanError::Corrupt(_)))));
        assert!(it.next().is_none());
        assert!(f.store.resource(f.r2).unwrap().load_plans().get(stray).is_some());
    }
}

// ── Inspection ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod inspect {
    use super::*;

    #[test]
    fn view_exposes_every_attribute() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l1);
        let view = f.store.inspect(start).unwrap().view().unwrap();
        assert_eq!(view.operation_plan, p);
        assert_eq!(view.quantity, 3.0);
        assert_eq!(view.start_date, Date(10));
        assert_eq!(view.end_date, Date(20));
        assert_eq!(view.resource, f.r1);
        assert_eq!(view.setup, "A");

        let end = f.store.sibling(start).unwrap();
        let end_view = f.store.inspect(end).unwrap().view().unwrap();
        assert_eq!(end_view.quantity, -3.0);
        assert_eq!(end_view.start_date, Date(20));
        assert_eq!(end_view.end_date, Date(10));
    }

    #[test]
    fn attributes_by_name() {
        let mut f = fixture();
        let (p, start) = f.plan_on(f.l1);
        let r = f.store.inspect(start).unwrap();

        assert_eq!(r.attribute("operationplan").unwrap(), Some(AttributeValue::OperationPlan(p)));
        assert_eq!(r.attribute("enddate").unwrap(), Some(AttributeValue::Date(Date(20))));
        assert_eq!(r.attribute("resource").unwrap(), Some(AttributeValue::Resource(f.r1)));
        assert_eq!(r.attribute("setup").unwrap(), Some(AttributeValue::Setup("A".into())));
        assert_eq!(r.attribute("colour").unwrap(), None);
        for name in crate::ATTRIBUTES {
            assert!(r.attribute(name).unwrap().is_some(), "{name}");
        }
    }

    #[test]
    fn unknown_record_rejected() {
        let f = fixture();
        let bogus = LoadPlanId::new(OperationPlanId(7), 0);
        assert!(matches!(f.store.inspect(bogus), Err(PlanError::UnknownOperationPlan(_))));
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use super::*;

    const RESOURCES: &str = "name,setup,setup_matrix\npress1,A,default\npress2,,\n";
    const LOADS: &str = "operation,resource,usage,setup\nstamp,press1,1,A\nstamp,press2,2,\n";
    const PLANS: &str = "operation,quantity,start,end\nstamp,3,10,20\n";

    fn load(resources: &str, loads: &str, plans: &str) -> crate::PlanResult<PlanStore> {
        load_model_reader(
            IoCursor::new(resources.to_owned()),
            IoCursor::new(loads.to_owned()),
            IoCursor::new(plans.to_owned()),
            LedgerConfig::default(),
        )
    }

    #[test]
    fn loads_minimal_model() {
        let store = load(RESOURCES, LOADS, PLANS).unwrap();
        let press1 = store.resource_by_name("press1").unwrap();
        let press2 = store.resource_by_name("press2").unwrap();
        assert!(store.resource(press1).unwrap().has_setup_matrix());
        assert!(!store.resource(press2).unwrap().has_setup_matrix());
        assert_eq!(store.resource(press1).unwrap().setup, "A");

        let stamp = store.operation_by_name("stamp").unwrap();
        assert_eq!(store.operation(stamp).unwrap().loads().len(), 2);
        assert_eq!(store.plans().count(), 1);
        assert_eq!(entries(&store, press1), vec![(10, 3.0, 3.0), (20, -3.0, 0.0)]);
        assert_eq!(entries(&store, press2), vec![(10, 6.0, 6.0), (20, -6.0, 0.0)]);
    }

    #[test]
    fn unknown_resource_is_a_parse_error() {
        let loads = "operation,resource,usage,setup\nstamp,press9,1,\n";
        assert!(matches!(load(RESOURCES, loads, PLANS), Err(PlanError::Parse(_))));
    }

    #[test]
    fn unknown_operation_is_a_parse_error() {
        let plans = "operation,quantity,start,end\ndrill,1,0,5\n";
        assert!(matches!(load(RESOURCES, LOADS, plans), Err(PlanError::Parse(_))));
    }

    #[test]
    fn reversed_dates_rejected() {
        let plans = "operation,quantity,start,end\nstamp,1,9,5\n";
        assert!(matches!(load(RESOURCES, LOADS, plans), Err(PlanError::Parse(_))));
    }

    #[test]
    fn duplicate_resource_rejected() {
        let resources = "name,setup,setup_matrix\npress1,,\npress1,,\n";
        assert!(matches!(load(resources, LOADS, PLANS), Err(PlanError::Parse(_))));
    }

    #[test]
    fn reserved_operation_name_is_a_parse_error() {
        let loads = "operation,resource,usage,setup\nsetup,press1,1,\n";
        let err = load(RESOURCES, loads, PLANS).err().unwrap();
        assert!(matches!(&err, PlanError::Parse(msg) if msg.contains("reserved")));
    }

    #[test]
    fn non_finite_usage_is_a_parse_error() {
        let loads = "operation,resource,usage,setup\nstamp,press1,NaN,\n";
        assert!(matches!(load(RESOURCES, loads, PLANS), Err(PlanError::Parse(_))));
    }
}
