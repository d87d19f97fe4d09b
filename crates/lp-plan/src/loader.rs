//! CSV model loader.
//!
//! # CSV format
//!
//! Three sources, loaded in order.  Names link rows across files.
//!
//! ```csv
//! # resources.csv: empty setup_matrix means changeovers are not modeled
//! name,setup,setup_matrix
//! press1,A,default
//! press2,,
//!
//! # loads.csv: operations are created on first mention
//! operation,resource,usage,setup
//! stamp,press1,1,A
//! stamp,press2,1,
//!
//! # plans.csv: dates are planner seconds
//! operation,quantity,start,end
//! stamp,3,10,20
//! ```
//!
//! A plan row creates one load-plan pair per load of its operation.  To plan
//! an operation with alternative loads on one of them only, load the plans
//! and then reassign with `PlanStore::set_load`.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use lp_core::{Date, DateRange, LedgerConfig};

use crate::model::Resource;
use crate::store::CHANGEOVER_OPERATION;
use crate::{PlanError, PlanResult, PlanStore};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ResourceRecord {
    name:         String,
    #[serde(default)]
    setup:        String,
    #[serde(default)]
    setup_matrix: String,
}

#[derive(Deserialize)]
struct LoadRecord {
    operation: String,
    resource:  String,
    usage:     f64,
    #[serde(default)]
    setup:     String,
}

#[derive(Deserialize)]
struct PlanRecord {
    operation: String,
    quantity:  f64,
    start:     i64,
    end:       i64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load `resources.csv`, `loads.csv` and `plans.csv` from `dir`.
pub fn load_model_csv(dir: &Path, config: LedgerConfig) -> PlanResult<PlanStore> {
    let resources = std::fs::File::open(dir.join("resources.csv"))?;
    let loads = std::fs::File::open(dir.join("loads.csv"))?;
    let plans = std::fs::File::open(dir.join("plans.csv"))?;
    load_model_reader(resources, loads, plans, config)
}

/// Like [`load_model_csv`] but accepts any `Read` sources.
///
/// Useful for testing (pass `std::io::Cursor`s) or embedded models.
pub fn load_model_reader<R1: Read, R2: Read, R3: Read>(
    resources: R1,
    loads: R2,
    plans: R3,
    config: LedgerConfig,
) -> PlanResult<PlanStore> {
    let mut store = PlanStore::with_config(config)?;

    // ── Resources ─────────────────────────────────────────────────────────
    let mut rdr = csv::Reader::from_reader(resources);
    for row in rdr.deserialize::<ResourceRecord>() {
        let row = row.map_err(|e| PlanError::Parse(e.to_string()))?;
        if store.resource_by_name(row.name.trim()).is_some() {
            return Err(PlanError::Parse(format!("duplicate resource {:?}", row.name)));
        }
        let mut resource = Resource::new(row.name.trim()).with_setup(row.setup.trim());
        if !row.setup_matrix.trim().is_empty() {
            resource = resource.with_setup_matrix(row.setup_matrix.trim());
        }
        store.add_resource(resource)?;
    }

    // ── Loads (and their operations) ──────────────────────────────────────
    let mut rdr = csv::Reader::from_reader(loads);
    for row in rdr.deserialize::<LoadRecord>() {
        let row = row.map_err(|e| PlanError::Parse(e.to_string()))?;
        let resource = store.resource_by_name(row.resource.trim()).ok_or_else(|| {
            PlanError::Parse(format!("load references unknown resource {:?}", row.resource))
        })?;
        let name = row.operation.trim();
        if name == CHANGEOVER_OPERATION {
            return Err(PlanError::Parse(format!(
                "operation name {name:?} is reserved for changeovers and cannot carry loads"
            )));
        }
        if !row.usage.is_finite() {
            return Err(PlanError::Parse(format!(
                "load of {name:?} on {:?} has non-finite usage {}",
                row.resource, row.usage
            )));
        }
        let operation = match store.operation_by_name(name) {
            Some(op) => op,
            None => store.add_operation(name)?,
        };
        store.add_load(operation, resource, row.usage, row.setup.trim())?;
    }

    // ── Plans ─────────────────────────────────────────────────────────────
    let mut plan_count = 0usize;
    let mut rdr = csv::Reader::from_reader(plans);
    for row in rdr.deserialize::<PlanRecord>() {
        let row = row.map_err(|e| PlanError::Parse(e.to_string()))?;
        let operation = store.operation_by_name(row.operation.trim()).ok_or_else(|| {
            PlanError::Parse(format!("plan references unknown operation {:?}", row.operation))
        })?;
        if row.end < row.start {
            return Err(PlanError::Parse(format!(
                "plan of {:?} ends ({}) before it starts ({})",
                row.operation, row.end, row.start
            )));
        }
        store.create_operation_plan(
            operation,
            row.quantity,
            DateRange::new(Date(row.start), Date(row.end)),
        )?;
        plan_count += 1;
    }

    info!(
        resources = store.resources.len(),
        loads = store.loads.len(),
        plans = plan_count,
        "model loaded"
    );
    Ok(store)
}
