//! Planning time model.
//!
//! # Design
//!
//! A `Date` is a signed count of seconds on the planner's own epoch.  The
//! ledger never converts to wall-clock time; it only orders and compares.
//! Two sentinels bound the representable range:
//!
//!   INFINITE_PAST   = i64::MIN   (start of a freshly created changeover)
//!   INFINITE_FUTURE = i64::MAX
//!
//! Integer dates keep ordering exact, which the timeline relies on when it
//! breaks ties between events on the same date.

use std::fmt;

// ── Date ──────────────────────────────────────────────────────────────────────

/// An absolute point on the planning horizon.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Date(pub i64);

impl Date {
    /// Earliest representable date.
    pub const INFINITE_PAST: Date = Date(i64::MIN);
    /// Latest representable date.
    pub const INFINITE_FUTURE: Date = Date(i64::MAX);

    /// `true` for either of the two sentinels.
    #[inline]
    pub fn is_infinite(self) -> bool {
        self == Self::INFINITE_PAST || self == Self::INFINITE_FUTURE
    }

    /// Shift by `secs`, saturating at the sentinels.
    #[inline]
    pub fn offset(self, secs: i64) -> Date {
        Date(self.0.saturating_add(secs))
    }
}

impl std::ops::Add<i64> for Date {
    type Output = Date;
    #[inline]
    fn add(self, rhs: i64) -> Date {
        self.offset(rhs)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::INFINITE_PAST => f.write_str("-inf"),
            Self::INFINITE_FUTURE => f.write_str("+inf"),
            Date(d) => write!(f, "D{d}"),
        }
    }
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// A closed `[start, end]` interval occupied by an operation plan.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateRange {
    pub start: Date,
    pub end:   Date,
}

impl DateRange {
    /// Build a range, swapping the bounds if they are given in reverse.
    pub fn new(start: Date, end: Date) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// Duration in seconds; saturates for ranges touching a sentinel.
    #[inline]
    pub fn duration(&self) -> i64 {
        self.end.0.saturating_sub(self.start.0)
    }

    #[inline]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Same start, new end.  An end before the start pulls the start back
    /// to it, so the result always ends exactly at `end`.
    pub fn with_end(self, end: Date) -> Self {
        Self { start: self.start.min(end), end }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.start, self.end)
    }
}
