//! Types for the resources that `onms` manages on an OpenNMS server.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Display};

/// The desired state of a resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// The resource should exist with the declared fields.
    #[default]
    Present,

    /// The resource should not exist.
    Absent,
}

/// The versions of the OpenNMS REST API that `onms` talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiVersion {
    /// The original tree, rooted at `/opennms/rest`.
    V1,
}

/// The kinds of resource that `onms` knows how to reconcile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    User,
    Group,
}

impl ResourceKind {
    /// The name of the kind's collection, relative to the root of its API tree.
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::User => "users",
            ResourceKind::Group => "groups",
        }
    }

    /// The API version used for every request about this kind of resource.
    ///
    /// Lookups, upserts, and deletes all go through the same version. Mixing versions between
    /// requests for the same kind is not supported.
    pub fn api_version(self) -> ApiVersion {
        match self {
            ResourceKind::User | ResourceKind::Group => ApiVersion::V1,
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::User => write!(f, "user"),
            ResourceKind::Group => write!(f, "group"),
        }
    }
}

/// A declared resource: the fields the caller wants a resource to have.
///
/// Which optional fields are set matters only until the resource is canonicalized; see
/// [crate::core::canonical].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    User(User),
    Group(Group),
}

impl Resource {
    /// The resource's kind.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::User(_) => ResourceKind::User,
            Resource::Group(_) => ResourceKind::Group,
        }
    }

    /// The resource's identity, i.e. the value of its key field.
    pub fn name(&self) -> &str {
        match self {
            Resource::User(user) => &user.name,
            Resource::Group(group) => &group.name,
        }
    }
}

impl From<User> for Resource {
    fn from(user: User) -> Self {
        Resource::User(user)
    }
}

impl From<Group> for Resource {
    fn from(group: Group) -> Self {
        Resource::Group(group)
    }
}

/// An OpenNMS user.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    /// The user's login name. Cannot be changed once the user exists.
    pub name: String,

    /// The user's password digest, as produced by [crate::crypto::digest].
    ///
    /// This is what the server stores and returns, so it's compared as-is. Plaintext passwords
    /// don't belong here.
    pub password: String,

    /// Whether [Self::password] is a salted digest. Must agree with the digest's format.
    #[serde(default = "default_password_salt")]
    pub password_salt: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Any comment for the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the user is on duty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duty_schedule: Option<Vec<DutySchedule>>,

    /// The security roles granted to the user, e.g. `ROLE_ADMIN`.
    ///
    /// Order is preserved; the server reports roles in the order they were set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Vec<String>>,
}

fn default_password_salt() -> bool {
    true
}

impl User {
    /// Creates a [User] with the given name and password digest and no optional fields.
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        User {
            name: name.into(),
            password: password.into(),
            password_salt: default_password_salt(),
            full_name: None,
            email: None,
            description: None,
            duty_schedule: None,
            role: None,
        }
    }
}

/// An OpenNMS group.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Group {
    /// The group's name. Cannot be changed once the group exists.
    pub name: String,

    /// Any comment for the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Names of the users in the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<String>>,

    /// Surveillance categories assigned to the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

impl Group {
    /// Creates a [Group] with the given name and no optional fields.
    pub fn new(name: impl Into<String>) -> Self {
        Group {
            name: name.into(),
            description: None,
            users: None,
            categories: None,
        }
    }
}

/// Days of the week, in the order OpenNMS expects them in a duty schedule.
///
/// The derived [Ord] follows declaration order, so a [BTreeSet] of weekdays always iterates
/// Monday through Sunday.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Weekday {
    #[serde(alias = "monday")]
    Monday,
    #[serde(alias = "tuesday")]
    Tuesday,
    #[serde(alias = "wednesday")]
    Wednesday,
    #[serde(alias = "thursday")]
    Thursday,
    #[serde(alias = "friday")]
    Friday,
    #[serde(alias = "saturday")]
    Saturday,
    #[serde(alias = "sunday")]
    Sunday,
}

impl Weekday {
    /// The two-letter abbreviation used in duty schedule strings.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Weekday::Monday => "Mo",
            Weekday::Tuesday => "Tu",
            Weekday::Wednesday => "We",
            Weekday::Thursday => "Th",
            Weekday::Friday => "Fr",
            Weekday::Saturday => "Sa",
            Weekday::Sunday => "Su",
        }
    }
}

/// One entry in a user's duty schedule.
///
/// Times are 24-hour `HHMM` values written as integers, so `0` is midnight and `1730` is half
/// past five in the afternoon.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DutySchedule {
    pub days: BTreeSet<Weekday>,
    pub start_time: u16,
    pub end_time: u16,
}

impl DutySchedule {
    pub fn new(days: impl IntoIterator<Item = Weekday>, start_time: u16, end_time: u16) -> Self {
        DutySchedule {
            days: days.into_iter().collect(),
            start_time,
            end_time,
        }
    }
}
