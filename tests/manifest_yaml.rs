//! Verifies deserialization of manifests from YAML.

use onms::core::manifest::{load_manifest, Declaration};
use onms::core::resource::{DutySchedule, Group, User, Weekday};
use onms::core::{Manifest, Resource, State};
use std::io::Write;
use tempfile::NamedTempFile;

const YAML: &str = "\
name: NOC staff
resources:
  - user:
      name: alice
      password: 5F4DCC3B5AA765D61D8327DEB882CF99
      password_salt: false
      full_name: Alice Liddell
      duty_schedule:
        - days: [friday, Monday]
          start_time: 800
          end_time: 1700
      role: [ROLE_USER, ROLE_ADMIN]
  - group:
      name: ops
      users: [alice]
  - state: absent
    user:
      name: mallory
      password: \"\"
";

fn expected() -> Manifest {
    let mut alice = User::new("alice", "5F4DCC3B5AA765D61D8327DEB882CF99");
    alice.password_salt = false;
    alice.full_name = Some("Alice Liddell".into());
    alice.duty_schedule = Some(vec![DutySchedule::new(
        [Weekday::Monday, Weekday::Friday],
        800,
        1700,
    )]);
    alice.role = Some(vec!["ROLE_USER".into(), "ROLE_ADMIN".into()]);

    let mut ops = Group::new("ops");
    ops.users = Some(vec!["alice".into()]);

    Manifest {
        source: None,
        name: "NOC staff".into(),
        resources: vec![
            Declaration::new(alice, State::Present),
            Declaration::new(ops, State::Present),
            Declaration::new(User::new("mallory", ""), State::Absent),
        ],
    }
}

#[test]
fn parses_manifest() {
    let manifest: Manifest = YAML.parse().unwrap();
    assert_eq!(expected(), manifest);
}

#[test]
fn state_defaults_to_present() {
    let manifest: Manifest = "resources:\n  - group:\n      name: ops\n".parse().unwrap();
    assert_eq!("", manifest.name);
    assert_eq!(State::Present, manifest.resources[0].state);
    assert_eq!(Resource::Group(Group::new("ops")), manifest.resources[0].resource);
}

#[test]
fn password_salt_defaults_to_true() {
    let manifest: Manifest = "resources:\n  - user:\n      name: bob\n      password: x\n"
        .parse()
        .unwrap();
    match &manifest.resources[0].resource {
        Resource::User(user) => assert!(user.password_salt),
        x => panic!("expected a user but received:\n{x:?}"),
    }
}

#[test]
fn rejects_unknown_kinds_and_fields() {
    for yaml in [
        "resources:\n  - role:\n      name: admin\n",
        "resources:\n  - user:\n      name: bob\n      password: x\n      pager: 555\n",
        "resources:\n  - state: gone\n    group:\n      name: ops\n",
        "resources:\n  - group:\n      comments: no name\n",
        "resources:\n  - {}\n",
    ] {
        assert!(yaml.parse::<Manifest>().is_err(), "{yaml}");
    }
}

#[test]
fn rejects_misspelled_state() {
    // Reading this as "present" would create the user it means to delete.
    let yaml = "\
resources:
  - stat: absent
    user:
      name: mallory
      password: x
";
    let err = yaml.parse::<Manifest>().unwrap_err();
    assert!(format!("{err:#}").contains("unknown field `stat`"), "{err:#}");
}

#[test]
fn rejects_two_resources_in_one_entry() {
    let yaml = "\
resources:
  - user:
      name: bob
      password: x
    group:
      name: ops
";
    let err = yaml.parse::<Manifest>().unwrap_err();
    assert!(format!("{err:#}").contains("both user bob and group ops"), "{err:#}");
}

#[test]
fn serializes_round_trip() {
    let yaml = serde_yaml::to_string(&expected()).unwrap();
    let manifest: Manifest = yaml.parse().unwrap();
    assert_eq!(expected().resources, manifest.resources);
}

#[test]
fn load_manifest_records_source() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(YAML.as_bytes()).unwrap();

    let manifest = load_manifest(file.path()).unwrap();
    assert_eq!(Some(file.path()), manifest.source.as_deref());
    assert_eq!(expected().resources, manifest.resources);
}

#[test]
fn load_manifest_names_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.yaml");
    let err = load_manifest(&path).unwrap_err();
    assert!(err.to_string().contains("missing.yaml"), "{err}");
}
