//! xsmall: smallest example for the load-plan capacity ledger.
//!
//! Loads a three-press stamping shop from embedded CSV, adds a handful of
//! seeded random orders, moves one order across alternative presses (which
//! drags its changeover plan along, then drops it) and exports the ledger
//! to `output/xsmall`.
//!
//! Usage: `xsmall [config.json]`, where the optional JSON file holds a
//! `LedgerConfig`, e.g. `{ "strict_changeover_lookup": true }`.

mod telemetry;

use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use lp_core::{Date, DateRange, LedgerConfig, LoadId, OperationId, ResourceId};
use lp_output::write_csv;
use lp_plan::{PlanStore, load_model_reader};

use telemetry::init_tracing;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:         u64   = 42;
const EXTRA_ORDERS: usize = 6;
const OUTPUT_DIR:   &str  = "output/xsmall";

// ── Model CSV ─────────────────────────────────────────────────────────────────

// press1/press2 model changeovers between die codes; press3 does not.
const RESOURCES_CSV: &str = "\
name,setup,setup_matrix\n\
press1,A,dies\n\
press2,B,dies\n\
press3,,\n\
";

// stamp runs on press1 by default; its alternatives are added in main.
const LOADS_CSV: &str = "\
operation,resource,usage,setup\n\
stamp,press1,1,A\n\
trim,press2,1,B\n\
";

// Dates are planner seconds.
const PLANS_CSV: &str = "\
operation,quantity,start,end\n\
stamp,3,100,160\n\
stamp,2,200,230\n\
trim,4,120,180\n\
";

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_config() -> Result<LedgerConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(LedgerConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
}

fn load_on(store: &PlanStore, operation: OperationId, resource: ResourceId) -> Result<LoadId> {
    store
        .operation(operation)?
        .loads()
        .iter()
        .copied()
        .find(|l| store.load(*l).is_ok_and(|load| load.resource == resource))
        .with_context(|| format!("{operation} has no load on {resource}"))
}

fn resource(store: &PlanStore, name: &str) -> Result<ResourceId> {
    store
        .resource_by_name(name)
        .with_context(|| format!("unknown resource {name}"))
}

fn print_resources(store: &PlanStore) {
    println!("{:<8} {:<8} {:<8} {:<8}", "Resource", "Events", "Peak", "Active");
    println!("{}", "-".repeat(35));
    for res in store.resources() {
        let timeline = res.load_plans();
        let peak = timeline.iter().map(|e| e.cumulative).fold(0.0_f64, f64::max);
        let active = store
            .resource_load_plans(res.id)
            .map_or(0, |it| it.filter(Result::is_ok).count());
        println!("{:<8} {:<8} {:<8} {:<8}", res.name, timeline.len(), peak, active);
    }
    println!();
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();
    println!("=== xsmall: load-plan capacity ledger ===");

    // 1. Configuration and model.
    let config = read_config()?;
    println!(
        "Config: strict_changeover_lookup={}  scoped_setup_updates={}",
        config.strict_changeover_lookup, config.scoped_setup_updates
    );
    let mut store = load_model_reader(
        Cursor::new(RESOURCES_CSV),
        Cursor::new(LOADS_CSV),
        Cursor::new(PLANS_CSV),
        config,
    )?;
    println!("Loaded {} operation plans", store.plans().count());

    let press1 = resource(&store, "press1")?;
    let press2 = resource(&store, "press2")?;
    let press3 = resource(&store, "press3")?;
    let stamp = store.operation_by_name("stamp").context("operation stamp missing")?;
    let on_press1 = load_on(&store, stamp, press1)?;

    // 2. Alternative presses for stamp.
    let on_press2 = store.add_load(stamp, press2, 1.0, "B")?;
    let on_press3 = store.add_load(stamp, press3, 1.5, "")?;

    // 3. Seeded random extra orders on press1.
    let mut rng = SmallRng::seed_from_u64(SEED);
    for _ in 0..EXTRA_ORDERS {
        let start = rng.gen_range(0..400);
        let length = rng.gen_range(10..60);
        let quantity = rng.gen_range(1..5) as f64;
        store.create_operation_plan_on(
            stamp,
            quantity,
            DateRange::new(Date(start), Date(start + length)),
            &[on_press1],
        )?;
    }
    println!("Planned {EXTRA_ORDERS} extra orders (seed {SEED})");
    println!();
    print_resources(&store);

    // 4. Give the first stamp order a changeover, then move it around.
    let order = store
        .plans()
        .find(|p| p.operation() == stamp)
        .map(|p| p.id())
        .context("no stamp order")?;
    let dates = store.plan(order)?.dates();
    store.create_changeover_plan(
        order,
        &[on_press1],
        1.0,
        DateRange::new(dates.start.offset(-15), dates.start),
    )?;
    let record = store.plan(order)?.start_of(on_press1).context("order not on press1")?;

    let t0 = Instant::now();
    store.set_load(record, Some(on_press2))?;
    println!(
        "{order} → press2: changeover plan {:?}, setup {}",
        store.changeover_plan_of(order)?,
        store.setup_of(record, true)?
    );
    store.set_load(record, Some(on_press3))?;
    println!(
        "{order} → press3: changeover plan {:?}, quantity {}",
        store.changeover_plan_of(order)?,
        store.load_plan_quantity(record)?
    );
    println!("Reassignments took {:.3} ms", t0.elapsed().as_secs_f64() * 1e3);
    println!();
    print_resources(&store);

    let changes = store.take_changes();
    println!(
        "Changed: {} resources, {} operations",
        changes.resources().len(),
        changes.operations().len()
    );

    // 5. Export.
    let summary = write_csv(&store, Path::new(OUTPUT_DIR))?;
    println!("Export complete:");
    println!("  load_plans.csv        : {} rows", summary.load_plans);
    println!("  resource_timeline.csv : {} rows", summary.timeline_events);

    Ok(())
}
