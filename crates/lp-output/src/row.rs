//! Rows as they appear in the CSV files; field order is column order.

use serde::Serialize;

/// One load-plan record with its resolved attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadPlanRow {
    pub operation_plan: u32,
    pub slot:           u16,
    /// `"start"` or `"end"`.
    pub role:           &'static str,
    pub resource:       String,
    pub quantity:       f64,
    /// The record's own date.
    pub start_date:     i64,
    /// The sibling record's date.
    pub end_date:       i64,
    /// Changeover code in force at the record; empty without setup matrix.
    pub setup:          String,
}

/// One event on a resource timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub resource:       String,
    pub date:           i64,
    pub quantity:       f64,
    /// Running total after the event.
    pub onhand:         f64,
    /// `"loadplan"` or `"capacity"`.
    pub kind:           &'static str,
    /// Owning operation plan; empty for capacity markers.
    pub operation_plan: Option<u32>,
    pub maximum:        Option<f64>,
}
