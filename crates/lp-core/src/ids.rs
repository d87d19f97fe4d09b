//! Identifier newtypes for ledger entities.
//!
//! Entity ids index the arenas of `PlanStore` directly (`id.index()`), so
//! they are dense, `Copy` and totally ordered.  Each prints with a short tag
//! (`R3`, `OP1`, `L0`, `P7`, `E12`) to keep log lines compact.

use std::fmt;

/// Declare id newtypes as `Name(inner) = "tag"`.
macro_rules! typed_id {
    ($($(#[$attr:meta])* $name:ident($inner:ty) = $tag:literal;)+) => {$(
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub $inner);

        impl $name {
            /// Placeholder for an entity not yet registered.
            pub const INVALID: $name = $name(<$inner>::MAX);

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "{}"), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;

            /// Fails once an arena outgrows the id's integer width.
            fn try_from(n: usize) -> Result<Self, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    )+};
}

typed_id! {
    /// A capacity-providing resource (machine, crew, tool).
    ResourceId(u32) = "R";

    /// An operation definition.
    OperationId(u32) = "OP";

    /// A load: the requirement linking one operation to one resource.
    LoadId(u32) = "L";

    /// A concrete operation plan.
    OperationPlanId(u32) = "P";

    /// One event on a resource timeline.  Never reused within a timeline, so
    /// a stale id is detected instead of aliasing a newer event.
    EventId(u64) = "E";
}

/// Identity of one load-plan record.
///
/// Records live in an arena owned by their operation plan; `slot` indexes
/// into that arena and stays stable for the lifetime of the plan.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadPlanId {
    pub plan: OperationPlanId,
    pub slot: u16,
}

impl LoadPlanId {
    #[inline]
    pub fn new(plan: OperationPlanId, slot: u16) -> Self {
        Self { plan, slot }
    }
}

impl fmt::Display for LoadPlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.plan, self.slot)
    }
}
