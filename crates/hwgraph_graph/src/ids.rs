//! Opaque ID newtypes for graph entities.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, and `Serialize`/`Deserialize`.
//! Node, port and edge ids share one numbering space handed out by
//! [`IdAllocator`](crate::alloc::IdAllocator), so a raw value identifies at
//! most one entity of any kind.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` value.
            pub fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Returns the raw `u32` value.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a node (module instance, primitive or constant driver).
    NodeId
);

define_id!(
    /// Opaque, copyable ID for a port, including synthetic group header ports.
    PortId
);

define_id!(
    /// Opaque, copyable ID for an edge between two ports.
    EdgeId
);
