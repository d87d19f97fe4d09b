//! Row projection and CSV export.
//!
//! Rows are built from the read-only projection only, so exporting never
//! changes the ledger.  Load-plan rows follow `PlanStore::plan_load_plans`
//! (zero-quantity records are skipped); timeline rows list every event,
//! capacity markers included.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use lp_core::ResourceId;
use lp_plan::{EventOwner, PlanStore, Role};

use crate::row::{LoadPlanRow, TimelineRow};
use crate::OutputResult;

pub const LOAD_PLANS_FILE: &str = "load_plans.csv";
pub const TIMELINE_FILE: &str = "resource_timeline.csv";

/// Counts of what [`write_csv`] wrote.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub load_plans:      usize,
    pub timeline_events: usize,
}

/// Rows for every informative load plan, plan by plan in creation order.
pub fn load_plan_rows(store: &PlanStore) -> OutputResult<Vec<LoadPlanRow>> {
    let mut rows = Vec::new();
    for plan in store.plans() {
        for lp in store.plan_load_plans(plan.id())? {
            let lp = lp?;
            let view = lp.view()?;
            let role = match lp.role()? {
                Role::Start => "start",
                Role::End => "end",
            };
            rows.push(LoadPlanRow {
                operation_plan: view.operation_plan.0,
                slot:           view.id.slot,
                role,
                resource:       store.resource(view.resource)?.name.clone(),
                quantity:       view.quantity,
                start_date:     view.start_date.0,
                end_date:       view.end_date.0,
                setup:          view.setup,
            });
        }
    }
    Ok(rows)
}

/// Rows for every event on `resource`, in timeline order.
pub fn timeline_rows(store: &PlanStore, resource: ResourceId) -> OutputResult<Vec<TimelineRow>> {
    let res = store.resource(resource)?;
    Ok(res
        .load_plans()
        .iter()
        .map(|e| {
            let (kind, operation_plan, maximum) = match e.owner {
                EventOwner::LoadPlan(id) => ("loadplan", Some(id.plan.0), None),
                EventOwner::Capacity { maximum } => ("capacity", None, Some(maximum)),
            };
            TimelineRow {
                resource: res.name.clone(),
                date: e.date.0,
                quantity: e.quantity,
                onhand: e.cumulative,
                kind,
                operation_plan,
                maximum,
            }
        })
        .collect())
}

/// Write the whole ledger as two CSV files under `dir`, creating it if
/// needed.  Headers come from the row fields; a table without rows is an
/// empty file.
pub fn write_csv(store: &PlanStore, dir: &Path) -> OutputResult<ExportSummary> {
    fs::create_dir_all(dir)?;

    let plans = load_plan_rows(store)?;
    write_rows(&dir.join(LOAD_PLANS_FILE), &plans)?;

    let mut events = Vec::new();
    for res in store.resources() {
        events.extend(timeline_rows(store, res.id)?);
    }
    write_rows(&dir.join(TIMELINE_FILE), &events)?;

    info!(load_plans = plans.len(), timeline_events = events.len(), dir = %dir.display(),
          "ledger exported");
    Ok(ExportSummary { load_plans: plans.len(), timeline_events: events.len() })
}

fn write_rows<R: Serialize>(path: &Path, rows: &[R]) -> OutputResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
