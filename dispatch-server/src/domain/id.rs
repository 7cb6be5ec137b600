//! Identifier newtypes for dispatch entities.
//!
//! All identifiers are opaque strings minted by the owning registry
//! (station registry, driver registry, and so on); this core never parses
//! or interprets them. `Arc<str>` keeps clones cheap — identifiers are
//! copied into cache keys, debounce keys and match attempts on every
//! location sample.

use std::fmt;
use std::sync::Arc;

macro_rules! impl_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $name(Arc<str>);

        impl $name {
            /// Create a new identifier from a string.
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(s.as_ref().into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }
    };
}

impl_id!(DriverId, "Identifier of a driver (user on the driving side).");
impl_id!(RiderId, "Identifier of a rider (user waiting at a station).");
impl_id!(StationId, "Identifier of a pickup station.");
impl_id!(RouteId, "Identifier of a driver's registered route.");
impl_id!(RequestId, "Identifier of a rider pickup request.");
impl_id!(TripId, "Identifier of a created trip.");
