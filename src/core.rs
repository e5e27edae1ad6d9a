//! Provides types that represent managed resources and the logic that decides how to converge
//! them.

pub mod canonical;
pub mod diff;
pub mod manifest;
pub mod resource;

#[doc(inline)]
pub use canonical::{canonicalize, CanonicalRecord, Canonicalize};

#[doc(inline)]
pub use diff::{decide, Action, Decision, Diff};

#[doc(inline)]
pub use manifest::Manifest;

#[doc(inline)]
pub use resource::{Group, Resource, ResourceKind, State, User};
