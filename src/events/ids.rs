//! Opaque identifier and index types
//!
//! Each id is a dense non-negative index with a distinguishable invalid
//! sentinel. Registry accessors reject the sentinel and embed the numeric
//! value in their diagnostics.

use std::fmt;

macro_rules! index_type {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(usize);

        impl $name {
            /// Sentinel for an unassigned id.
            pub const INVALID: $name = $name(usize::MAX);

            pub const fn new(index: usize) -> Self {
                $name(index)
            }

            pub const fn is_valid(self) -> bool {
                self.0 != usize::MAX
            }

            /// Underlying index. Meaningless for the invalid sentinel.
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}", self.0)
                } else {
                    f.write_str("invalid")
                }
            }
        }
    };
}

index_type! {
    /// Stable id of an adopted [`Event`](crate::events::Event).
    ///
    /// Assigned densely at adoption and never reused.
    EventId
}

index_type! {
    /// Stable id of an adopted [`Trigger`](crate::events::Trigger).
    EventTriggerId
}

index_type! {
    /// Dense position of a timer in the topology cache's timer list.
    EventTimerIndex
}

index_type! {
    /// Dense position of a witness in the topology cache's witness list.
    EventWitnessIndex
}

index_type! {
    /// Position of a witness in the sequence returned by the active-witness
    /// query, static entries first.
    ActiveWitnessIndex
}

index_type! {
    /// Position of a timer in the sequence returned by the active-timer
    /// query, static entries first.
    ActiveTimerIndex
}

index_type! {
    /// Position of an action in the adoption order of its event.
    EventActionIndex
}
