//! Typed identifiers for network objects.
//!
//! Nodes, blocks and ports are numbered densely from 0 in creation order, so
//! an id doubles as an index into the owning vector. Each kind gets its own
//! type so that a port id can't be passed where a node id is expected.

use core::fmt;

/// An id backed by a dense 0-based index.
pub trait DenseId: Copy + Eq + core::hash::Hash + fmt::Debug {
    fn from_index(index: u32) -> Self;
    fn index(self) -> u32;
}

macro_rules! dense_id {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(u32);

        impl $name {
            pub const fn from_index(index: u32) -> Self {
                Self(index)
            }

            pub const fn index(self) -> u32 {
                self.0
            }
        }

        impl DenseId for $name {
            fn from_index(index: u32) -> Self {
                Self(index)
            }

            fn index(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "{}"), self.0)
            }
        }
    };
}

dense_id!(
    /// Connection point carrying one pressure and one flow unknown.
    NodeId,
    "node#"
);
dense_id!(
    /// Block (vessel, junction, boundary condition, heart).
    BlockId,
    "block#"
);
dense_id!(
    /// One end of a block attached to a node.
    PortId,
    "port#"
);

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<I: DenseId>(i: u32) -> u32 {
        I::from_index(i).index()
    }

    #[test]
    fn ids_are_their_index() {
        for i in [0_u32, 1, 42, u32::MAX] {
            assert_eq!(round_trip::<NodeId>(i), i);
            assert_eq!(round_trip::<PortId>(i), i);
        }
    }

    #[test]
    fn display_names_the_kind() {
        assert_eq!(NodeId::from_index(3).to_string(), "node#3");
        assert_eq!(format!("{:?}", BlockId::from_index(7)), "BlockId(7)");
    }
}
