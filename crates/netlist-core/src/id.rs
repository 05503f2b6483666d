use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Anything that carries a validity flag.
///
/// Implemented for every strong id and for references to them, so routines
/// like [`crate::compact::all_valid`] accept both owning and borrowing
/// iterators.
pub trait Validity {
    fn is_valid(&self) -> bool;
}

impl<T: Validity + ?Sized> Validity for &T {
    fn is_valid(&self) -> bool {
        (**self).is_valid()
    }
}

/// A strongly-typed handle over a dense `0..N` index space.
///
/// Each id kind has exactly one invalid value, distinct from index 0, which
/// is also its `Default`. Valid ids convert losslessly to and from their
/// index.
pub trait StrongId: Copy + Eq + Ord + Hash + Debug + Default + Validity {
    /// The sentinel that marks a dropped or absent entity.
    const INVALID: Self;

    /// Build the id for a dense index.
    fn from_index(index: usize) -> Self;

    /// The dense index of a valid id. Panics on the invalid sentinel.
    fn index(self) -> usize;
}

/// Declare one or more strong id newtypes over `u32`.
///
/// `u32::MAX` is reserved as the invalid sentinel. Extra attributes (for
/// example serde derives) are forwarded to the generated struct.
///
/// ```
/// netlist_core::strong_id! {
///     /// Identifies a port on a block.
///     pub struct PortId;
/// }
///
/// assert!(PortId::new(0).is_valid());
/// assert!(!PortId::INVALID.is_valid());
/// assert_eq!(PortId::default(), PortId::INVALID);
/// ```
#[macro_export]
macro_rules! strong_id {
    ($($(#[$meta:meta])* $vis:vis struct $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
            $vis struct $name(u32);

            impl $name {
                /// The invalid sentinel for this id kind.
                pub const INVALID: Self = Self(u32::MAX);

                /// Create an id for `index`. Panics if `index` collides with
                /// the sentinel or does not fit in `u32`.
                #[inline]
                pub fn new(index: usize) -> Self {
                    assert!(
                        index < u32::MAX as usize,
                        concat!(stringify!($name), " index out of range: {}"),
                        index
                    );
                    Self(index as u32)
                }

                #[inline]
                pub const fn is_valid(self) -> bool {
                    self.0 != u32::MAX
                }

                /// Dense index of this id. Panics if the id is invalid.
                #[inline]
                pub fn index(self) -> usize {
                    assert!(
                        self.is_valid(),
                        concat!("invalid ", stringify!($name), " has no index")
                    );
                    self.0 as usize
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::INVALID
                }
            }

            impl ::core::fmt::Debug for $name {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    if self.is_valid() {
                        write!(f, concat!(stringify!($name), "({})"), self.0)
                    } else {
                        f.write_str(concat!(stringify!($name), "(INVALID)"))
                    }
                }
            }

            impl ::core::fmt::Display for $name {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    if self.is_valid() {
                        write!(f, "{}", self.0)
                    } else {
                        f.write_str("invalid")
                    }
                }
            }

            impl $crate::id::Validity for $name {
                #[inline]
                fn is_valid(&self) -> bool {
                    $name::is_valid(*self)
                }
            }

            impl $crate::id::StrongId for $name {
                const INVALID: Self = $name::INVALID;

                #[inline]
                fn from_index(index: usize) -> Self {
                    $name::new(index)
                }

                #[inline]
                fn index(self) -> usize {
                    $name::index(self)
                }
            }
        )*
    };
}

strong_id! {
    /// Identifies a block (a cell with input, output and clock pins).
    #[derive(Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct BlockId;

    /// Identifies a pin, the connection point between a block and a net.
    #[derive(Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PinId;

    /// Identifies a net: one driver pin plus any number of sink pins.
    #[derive(Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct NetId;
}
