//! Host handles.
//!
//! The engine never looks inside these: a `TypeId` is whatever the host uses
//! to identify a type, and the `*Ref` handles name opaque units (value
//! expressions, guards, clause bodies) the host evaluates on request.

use std::fmt;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Index into the host's table for this handle kind.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_handle!(
    /// Identity of a host type (class).
    TypeId
);
define_handle!(
    /// A host-evaluated value expression (`ValueRef` patterns, computed
    /// mapping keys, the statement subject).
    ExprRef
);
define_handle!(
    /// A host-evaluated boolean guard.
    GuardRef
);
define_handle!(
    /// A clause body. Returned to the caller on a match; never evaluated here.
    BodyRef
);
