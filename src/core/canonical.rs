//! Canonical records: the normalized form in which resources are compared and serialized.
//!
//! A declared [Resource] leaves optional fields unset when the user doesn't mention them, while
//! the server reports those same fields as empty strings or empty lists, or leaves them out
//! entirely. Comparing the two directly would report changes that aren't there. Canonicalization
//! fixes that by projecting both sides onto a fixed per-kind [schema], in which every field is
//! present, in the same order, with unset fields replaced by their type's empty value.
//!
//! Canonicalization also converts structured values into the strings the server stores. For
//! instance, each [DutySchedule] becomes a compact string like `MoTuWeThFr800-1700`. Comparisons
//! are always made on these wire strings, because that's all the server ever returns.
//!
//! [CanonicalRecord] has no public constructor. The only ways to get one are to canonicalize a
//! [Resource] (see [Canonicalize]) or to parse a server response (see
//! [crate::wire::parse_observed]), and both go through the same projection. This keeps
//! non-canonical values from ever reaching [crate::core::diff::decide].

use crate::core::resource::{DutySchedule, Group, Resource, ResourceKind, User};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::{self, Display};

/// The value of one field in a [CanonicalRecord].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    List(Vec<String>),
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => write!(f, "{text:?}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::List(list) => write!(f, "{list:?}"),
        }
    }
}

/// The type of a field in a [schema].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Bool,
    List,
}

impl FieldType {
    /// The value that stands in for an unset field of this type.
    pub fn empty(self) -> FieldValue {
        match self {
            FieldType::Text => FieldValue::Text(String::new()),
            FieldType::Bool => FieldValue::Bool(false),
            FieldType::List => FieldValue::List(Vec::new()),
        }
    }
}

/// Describes one field of a resource kind, as the server names it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// The field's name on the wire, e.g. `user-id`.
    pub name: &'static str,

    pub ty: FieldType,

    /// Whether the value should be hidden from human-readable output.
    pub sensitive: bool,
}

const fn field(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec {
        name,
        ty,
        sensitive: false,
    }
}

const USER_SCHEMA: &[FieldSpec] = &[
    field("user-id", FieldType::Text),
    field("full-name", FieldType::Text),
    field("user-comments", FieldType::Text),
    field("email", FieldType::Text),
    FieldSpec {
        name: "password",
        ty: FieldType::Text,
        sensitive: true,
    },
    field("passwordSalt", FieldType::Bool),
    field("duty-schedule", FieldType::List),
    field("role", FieldType::List),
];

const GROUP_SCHEMA: &[FieldSpec] = &[
    field("name", FieldType::Text),
    field("comments", FieldType::Text),
    field("user", FieldType::List),
    field("category", FieldType::List),
];

/// Returns the fields of `kind` in wire order. The first field is always the key field.
pub fn schema(kind: ResourceKind) -> &'static [FieldSpec] {
    match kind {
        ResourceKind::User => USER_SCHEMA,
        ResourceKind::Group => GROUP_SCHEMA,
    }
}

/// A resource in canonical form. See the [module documentation](self).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CanonicalRecord {
    #[serde(skip)]
    kind: ResourceKind,

    #[serde(flatten)]
    fields: IndexMap<&'static str, FieldValue>,
}

impl CanonicalRecord {
    /// Builds a record of `kind` by asking `lookup` for the value of each field in the kind's
    /// [schema]. Fields for which `lookup` returns `None` get their type's empty value.
    ///
    /// This is the one place where canonical records are made.
    pub(crate) fn project(
        kind: ResourceKind,
        mut lookup: impl FnMut(&FieldSpec) -> Option<FieldValue>,
    ) -> Self {
        let fields = schema(kind)
            .iter()
            .map(|spec| (spec.name, lookup(spec).unwrap_or_else(|| spec.ty.empty())))
            .collect();
        CanonicalRecord { kind, fields }
    }

    /// Builds a record of `kind` whose key field is `name` and whose other fields are empty.
    ///
    /// Stands in for the desired record when a resource should be absent, since only its
    /// identity matters then.
    pub(crate) fn identity(kind: ResourceKind, name: &str) -> Self {
        let key = schema(kind)[0].name;
        Self::project(kind, |spec| {
            (spec.name == key).then(|| FieldValue::Text(name.to_owned()))
        })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The record's identity, i.e. the value of its key field.
    pub fn name(&self) -> &str {
        match self.fields.get(schema(self.kind)[0].name) {
            Some(FieldValue::Text(name)) => name.as_str(),
            _ => "",
        }
    }

    /// Returns the value of the field named `name`, if the record's kind has such a field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Iterates over the fields in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }
}

/// Conversion into a [CanonicalRecord].
pub trait Canonicalize {
    /// Returns the canonical form of `self`.
    fn canonicalize(&self) -> Result<CanonicalRecord>;
}

impl Canonicalize for Resource {
    fn canonicalize(&self) -> Result<CanonicalRecord> {
        match self {
            Resource::User(user) => user.canonicalize(),
            Resource::Group(group) => group.canonicalize(),
        }
    }
}

impl Canonicalize for User {
    fn canonicalize(&self) -> Result<CanonicalRecord> {
        let duty_schedule = match &self.duty_schedule {
            Some(entries) => Some(
                entries
                    .iter()
                    .map(schedule_string)
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => None,
        };

        Ok(CanonicalRecord::project(ResourceKind::User, |spec| {
            match spec.name {
                "user-id" => Some(FieldValue::Text(self.name.clone())),
                "full-name" => self.full_name.clone().map(FieldValue::Text),
                "user-comments" => self.description.clone().map(FieldValue::Text),
                "email" => self.email.clone().map(FieldValue::Text),
                "password" => Some(FieldValue::Text(self.password.clone())),
                "passwordSalt" => Some(FieldValue::Bool(self.password_salt)),
                "duty-schedule" => duty_schedule.clone().map(FieldValue::List),
                "role" => self.role.clone().map(FieldValue::List),
                _ => None,
            }
        }))
    }
}

impl Canonicalize for Group {
    fn canonicalize(&self) -> Result<CanonicalRecord> {
        Ok(CanonicalRecord::project(ResourceKind::Group, |spec| {
            match spec.name {
                "name" => Some(FieldValue::Text(self.name.clone())),
                "comments" => self.description.clone().map(FieldValue::Text),
                "user" => self.users.clone().map(FieldValue::List),
                "category" => self.categories.clone().map(FieldValue::List),
                _ => None,
            }
        }))
    }
}

impl Canonicalize for CanonicalRecord {
    /// Reprojects the record onto its schema. Canonical records are already canonical, so this
    /// returns an equal record.
    fn canonicalize(&self) -> Result<CanonicalRecord> {
        Ok(CanonicalRecord::project(self.kind, |spec| {
            self.fields.get(spec.name).cloned()
        }))
    }
}

/// Canonicalizes a declared resource. Shorthand for [Canonicalize::canonicalize].
pub fn canonicalize(resource: &Resource) -> Result<CanonicalRecord> {
    resource.canonicalize()
}

/// Converts a [DutySchedule] into the string form that OpenNMS stores.
///
/// The string is the abbreviations of the scheduled days, Monday first, followed by
/// `<start>-<end>`. For example, Friday and Saturday from 1000 to 1730 become `FrSa1000-1730`,
/// regardless of the order in which the days were declared.
///
/// # Errors
///
/// Returns [Error::InvalidSchedule] if either time isn't a valid `HHMM` value. `2400` is accepted
/// as an end-of-day time.
pub fn schedule_string(entry: &DutySchedule) -> Result<String> {
    check_time(entry.start_time)?;
    check_time(entry.end_time)?;

    let mut out: String = entry.days.iter().map(|day| day.abbreviation()).collect();
    out.push_str(&format!("{}-{}", entry.start_time, entry.end_time));
    Ok(out)
}

fn check_time(time: u16) -> Result<()> {
    if time > 2400 || time % 100 >= 60 {
        return Err(Error::InvalidSchedule(format!(
            "{time} is not a 24-hour HHMM time"
        )));
    }
    Ok(())
}
