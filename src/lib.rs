//! Declarative management of OpenNMS users and groups.
//!
//! # Program flow
//!
//! 1. The user writes a [Manifest] listing users and groups and the state each should be in, and
//!    runs `onms apply`.
//!
//! 2. [config::load] finds the [Connection](config::Connection) settings, and
//!    [HttpStore](store::http::HttpStore) uses them to talk to the server's REST API.
//!
//! 3. For each declared resource, a [Reconciler] fetches what the server has, canonicalizes both
//!    sides (see [core::canonical]), [decides](core::decide) on a single action, and carries it
//!    out, unless asked for a dry run.
//!
//! 4. Each [Outcome](reconcile::Outcome) is printed by a [Report](reconcile::report::Report).
//!
//! Separately, [crypto] computes the password digests that go into [User](core::User) records.

pub mod config;
pub mod core;
pub mod crypto;
pub mod error;
pub mod reconcile;
pub mod store;
pub mod wire;

#[doc(inline)]
pub use core::Manifest;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use reconcile::{Reconciler, Settings};
