//! `lp-output`: CSV export of the capacity ledger.
//!
//! [`write_csv`] walks a `PlanStore` through its read-only projection and
//! writes two files:
//!
//! - `load_plans.csv`: one [`LoadPlanRow`] per informative load plan
//! - `resource_timeline.csv`: one [`TimelineRow`] per timeline event
//!
//! ```rust,ignore
//! let summary = lp_output::write_csv(&store, Path::new("./output"))?;
//! println!("{} load plans exported", summary.load_plans);
//! ```

pub mod error;
pub mod export;
pub mod row;


pub use error::{OutputError, OutputResult};
pub use export::{ExportSummary, load_plan_rows, timeline_rows, write_csv};
pub use row::{LoadPlanRow, TimelineRow};
