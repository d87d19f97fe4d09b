//! `lp-timeline`: the ordered, per-resource ledger of capacity events.
//!
//! # Crate layout
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`timeline`]  | `Timeline<O>`, `Event<O>`                             |
//! | [`cursor`]    | `Cursor`, a detached generation-checked position |
//! | [`error`]     | `TimelineError`, `TimelineResult<T>`                  |
//!
//! # Ordering model (summary)
//!
//! ```text
//! key(event)        = (date, seq)       seq = per-timeline insertion counter
//! cumulative(event) = Σ quantity of all events with key ≤ key(event)
//! ```
//!
//! Events on the same date keep their insertion order, so backward scans are
//! deterministic.  Borrowing iterators make structural changes during a scan
//! impossible; a [`Cursor`] held across mutations is rejected with
//! [`TimelineError::StaleCursor`].

pub mod cursor;
pub mod error;
pub mod timeline;


pub use cursor::Cursor;
pub use error::{TimelineError, TimelineResult};
pub use timeline::{Event, Timeline};
