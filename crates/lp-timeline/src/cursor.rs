//! Detached timeline positions.
//!
//! A [`Cursor`] does not borrow the timeline, so it can be stored between
//! calls.  Every step goes through the owning [`Timeline`] which compares the
//! cursor's generation with its own and refuses to move a cursor that
//! outlived a structural change.
//!
//! [`Timeline`]: crate::Timeline

use lp_core::EventId;

/// A position on a timeline, valid for one generation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    /// Event under the cursor; `None` once the cursor ran off either end.
    pub(crate) at:         Option<EventId>,
    pub(crate) generation: u64,
}

impl Cursor {
    /// The event the cursor points at, if any.
    pub fn event(&self) -> Option<EventId> {
        self.at
    }

    /// `true` once stepping ran past the first or last event.
    pub fn is_exhausted(&self) -> bool {
        self.at.is_none()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
