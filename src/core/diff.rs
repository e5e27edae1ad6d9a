//! Decides what, if anything, must change to bring a resource to its desired state.

use crate::core::canonical::CanonicalRecord;
use crate::core::resource::State;
use serde::Serialize;
use std::fmt::{self, Display};

/// The single step that converges observed state on desired state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Observed state already matches desired state.
    Noop,

    /// The resource is missing and should exist.
    Create,

    /// The resource exists but some of its fields differ.
    Update,

    /// The resource exists and should not.
    Delete,
}

impl Action {
    /// Whether taking this action changes the server.
    pub fn changes(self) -> bool {
        self != Action::Noop
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Noop => write!(f, "noop"),
            Action::Create => write!(f, "create"),
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// A resource before and after an [Action].
///
/// `None` means the resource doesn't exist on that side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diff {
    pub before: Option<CanonicalRecord>,
    pub after: Option<CanonicalRecord>,
}

impl Diff {
    /// Names of the fields whose values differ between [Self::before] and [Self::after], in
    /// schema order.
    ///
    /// When only one side exists, every field of that side is listed. When neither does, the list
    /// is empty.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        match (&self.before, &self.after) {
            (Some(before), Some(after)) => before
                .fields()
                .filter(|(name, value)| after.get(name) != Some(*value))
                .map(|(name, _)| name)
                .collect(),
            (Some(only), None) | (None, Some(only)) => {
                only.fields().map(|(name, _)| name).collect()
            }
            (None, None) => Vec::new(),
        }
    }
}

/// The outcome of [decide]: what to do, and the resource before and after doing it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub action: Action,
    pub diff: Diff,
}

/// Compares observed state to desired state and chooses an [Action].
///
/// | `observed` | `state`   | fields  | [Action]           |
/// |------------|-----------|---------|--------------------|
/// | `None`     | `Present` |         | [Action::Create]   |
/// | `None`     | `Absent`  |         | [Action::Noop]     |
/// | `Some`     | `Present` | equal   | [Action::Noop]     |
/// | `Some`     | `Present` | differ  | [Action::Update]   |
/// | `Some`     | `Absent`  |         | [Action::Delete]   |
///
/// Fields are compared exactly, so list order matters. Both records are canonical by
/// construction, so a field the user left out compares equal to an empty field on the server.
///
/// The returned [Diff] always describes the transition: a no-op on an existing resource has the
/// observed record on both sides.
pub fn decide(
    observed: Option<&CanonicalRecord>,
    state: State,
    desired: &CanonicalRecord,
) -> Decision {
    let (action, before, after) = match (observed, state) {
        (None, State::Present) => (Action::Create, None, Some(desired)),
        (None, State::Absent) => (Action::Noop, None, None),
        (Some(observed), State::Present) if observed == desired => {
            (Action::Noop, Some(observed), Some(observed))
        }
        (Some(observed), State::Present) => (Action::Update, Some(observed), Some(desired)),
        (Some(observed), State::Absent) => (Action::Delete, Some(observed), None),
    };

    Decision {
        action,
        diff: Diff {
            before: before.cloned(),
            after: after.cloned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::canonical::canonicalize;
    use crate::core::fixtures::{group, user};
    use crate::core::resource::User;

    fn alice() -> CanonicalRecord {
        canonicalize(&user().into()).unwrap()
    }

    #[test]
    fn absent_and_wanted_creates() {
        let desired = alice();
        let decision = decide(None, State::Present, &desired);
        assert_eq!(Action::Create, decision.action);
        assert_eq!(None, decision.diff.before);
        assert_eq!(Some(desired), decision.diff.after);
    }

    #[test]
    fn absent_and_unwanted_does_nothing() {
        let decision = decide(None, State::Absent, &alice());
        assert_eq!(Action::Noop, decision.action);
        assert_eq!(
            Diff {
                before: None,
                after: None
            },
            decision.diff,
        );
        assert!(decision.diff.changed_fields().is_empty());
    }

    #[test]
    fn equal_records_do_nothing() {
        let observed = alice();
        let decision = decide(Some(&observed), State::Present, &alice());
        assert_eq!(Action::Noop, decision.action);
        assert_eq!(Some(&observed), decision.diff.before.as_ref());
        assert_eq!(Some(&observed), decision.diff.after.as_ref());
        assert!(decision.diff.changed_fields().is_empty());
    }

    #[test]
    fn differing_records_update() {
        let observed = alice();
        let mut changed = user();
        changed.email = Some("alice@example.net".into());
        changed.role = Some(vec!["ROLE_USER".into(), "ROLE_ADMIN".into()]);
        let desired = canonicalize(&changed.into()).unwrap();

        let decision = decide(Some(&observed), State::Present, &desired);
        assert_eq!(Action::Update, decision.action);
        assert_eq!(Some(observed), decision.diff.before);
        assert_eq!(Some(desired), decision.diff.after);
        assert_eq!(vec!["email", "role"], decision.diff.changed_fields());
    }

    #[test]
    fn present_and_unwanted_deletes_regardless_of_fields() {
        let observed = alice();
        let other = canonicalize(&User::new("alice", "different").into()).unwrap();
        for desired in [alice(), other] {
            let decision = decide(Some(&observed), State::Absent, &desired);
            assert_eq!(Action::Delete, decision.action);
            assert_eq!(Some(&observed), decision.diff.before.as_ref());
            assert_eq!(None, decision.diff.after);
        }
    }

    #[test]
    fn noop_iff_equal_after_canonicalization() {
        // The same group declared with and without explicitly empty fields.
        let mut explicit = crate::core::resource::Group::new("ops");
        explicit.description = Some(String::new());
        explicit.categories = Some(vec![]);
        let implicit = crate::core::resource::Group::new("ops");

        let a = canonicalize(&explicit.into()).unwrap();
        let b = canonicalize(&implicit.into()).unwrap();
        assert_eq!(Action::Noop, decide(Some(&a), State::Present, &b).action);

        let c = canonicalize(&group().into()).unwrap();
        assert_eq!(Action::Update, decide(Some(&a), State::Present, &c).action);
    }

    #[test]
    fn only_changing_actions_change() {
        assert!(!Action::Noop.changes());
        assert!(Action::Create.changes());
        assert!(Action::Update.changes());
        assert!(Action::Delete.changes());
    }
}
