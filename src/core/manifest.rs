//! Types for representing manifest files.
//!
//! A manifest is a YAML file that declares resources and the state each should be in:
//!
//! ```yaml
//! name: NOC staff
//! resources:
//!   - user:
//!       name: alice
//!       password: 5F4DCC3B5AA765D61D8327DEB882CF99
//!       password_salt: false
//!       role: [ROLE_USER]
//!   - group:
//!       name: ops
//!       users: [alice]
//!   - state: absent
//!     user:
//!       name: mallory
//!       password: ""
//! ```
//!
//! Each entry is reconciled on its own, in order.

use crate::core::resource::{Group, Resource, State, User};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Represents a manifest file.
///
/// This type is typically parsed from a manifest file, but it can be constructed programmatically
/// as well.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Manifest {
    /// The file from which this value was parsed (if any).
    #[serde(skip)]
    pub source: Option<PathBuf>,

    /// The [Manifest]'s name. Used for informational, logging, and debugging purposes.
    #[serde(default, skip_serializing_if = "str::is_empty")]
    pub name: String,

    /// The resources to reconcile.
    ///
    /// Order is preserved from the source file. Resources are reconciled in order.
    pub resources: Vec<Declaration>,
}

/// A resource and the state it should be in.
///
/// In YAML, an entry has exactly one `user` or `group` key and an optional `state` key. Any other
/// key is an error.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "DeclarationFile")]
pub struct Declaration {
    /// Defaults to [State::Present].
    #[serde(default)]
    pub state: State,

    #[serde(flatten)]
    pub resource: Resource,
}

impl Declaration {
    pub fn new(resource: impl Into<Resource>, state: State) -> Self {
        Declaration {
            state,
            resource: resource.into(),
        }
    }
}

/// The YAML layout of a [Declaration], before checking that it names exactly one resource.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeclarationFile {
    #[serde(default)]
    state: State,

    #[serde(default)]
    user: Option<User>,

    #[serde(default)]
    group: Option<Group>,
}

impl TryFrom<DeclarationFile> for Declaration {
    type Error = String;

    fn try_from(file: DeclarationFile) -> Result<Self, Self::Error> {
        let resource = match (file.user, file.group) {
            (Some(user), None) => Resource::User(user),
            (None, Some(group)) => Resource::Group(group),
            (None, None) => return Err("entry must declare a user or a group".to_owned()),
            (Some(user), Some(group)) => {
                return Err(format!(
                    "entry declares both user {} and group {}; give each its own entry",
                    user.name, group.name,
                ))
            }
        };
        Ok(Declaration {
            state: file.state,
            resource,
        })
    }
}

impl FromStr for Manifest {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_yaml::from_str(s)?)
    }
}

/// Loads a [Manifest] from a file, recording the path in [Manifest::source].
pub fn load_manifest(path: impl AsRef<Path>) -> anyhow::Result<Manifest> {
    let path = path.as_ref();
    let yaml = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let mut manifest: Manifest = yaml
        .parse()
        .with_context(|| format!("failed to parse manifest {}", path.display()))?;
    manifest.source = Some(path.to_owned());
    Ok(manifest)
}
