//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Ordering matters: the run loop
//! schedules processes in ascending `ProcessId` order, which is what makes a
//! round deterministic.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// The raw integer value.
            #[inline(always)]
            pub fn get(self) -> $inner {
                self.0
            }

            /// `false` for the `INVALID` sentinel.
            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Identity of a simulated process.  Issued monotonically by the process
    /// table starting at [`ProcessId::FIRST`] and never reused within a run.
    pub struct ProcessId(u64);
}

typed_id! {
    /// Engine-side index of a simulated host.
    pub struct HostId(u32);
}

impl ProcessId {
    /// The first id a fresh process table hands out.
    pub const FIRST: ProcessId = ProcessId(1);

    /// The id issued immediately after `self`, or `None` once the next one
    /// would be the `INVALID` sentinel.
    #[inline]
    pub fn next(self) -> Option<ProcessId> {
        self.0.checked_add(1).map(ProcessId).filter(|id| id.is_valid())
    }
}
