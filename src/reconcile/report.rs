//! Reports the [Outcome] of each reconciliation pass.
//!
//! As with most output in this crate, the logic lives in a function that writes to any [Write]
//! ([_report]), and the [Report] implementation used in production just hands it a locked stdout.
//! Tests hand it a `Vec<u8>` instead.

use super::Outcome;
use crate::core::canonical::{schema, FieldValue};
use std::io::{self, Write};

/// Prints feedback about each [Outcome] to keep the user informed.
pub trait Report {
    fn report(&mut self, outcome: &Outcome) -> io::Result<()>;
}

/// The real, production-ready [Report] implementation. Uses the real stdout.
#[derive(Clone, Debug)]
pub struct Reporter;

impl Report for Reporter {
    fn report(&mut self, outcome: &Outcome) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        _report(&mut stdout, outcome)
    }
}

/// Shown in place of sensitive values such as password digests.
pub const HIDDEN: &str = "<hidden>";

/// A testable function containing the logic for reporting an [Outcome].
///
/// Prints the outcome's message, then one indented line per changed field. Deletions list no
/// fields. Sensitive fields are shown as [HIDDEN].
pub fn _report(mut stdout: impl Write, outcome: &Outcome) -> io::Result<()> {
    let status = if outcome.changed { "changed" } else { "ok" };
    writeln!(stdout, "[{status}] {}", outcome.message)?;

    let Some(diff) = &outcome.diff else {
        return Ok(());
    };
    // Deleted resources have no fields worth listing.
    let Some(after) = &diff.after else {
        return Ok(());
    };

    for name in diff.changed_fields() {
        let sensitive = schema(after.kind())
            .iter()
            .any(|spec| spec.name == name && spec.sensitive);
        let show = |value: &FieldValue| match sensitive {
            true => HIDDEN.to_owned(),
            false => value.to_string(),
        };

        let new = match after.get(name) {
            Some(new) => new,
            None => continue,
        };
        match diff.before.as_ref().and_then(|before| before.get(name)) {
            Some(old) => writeln!(stdout, "    {name}: {} -> {}", show(old), show(new))?,
            None if is_empty(new) => {}
            None => writeln!(stdout, "    {name}: {}", show(new))?,
        }
    }
    Ok(())
}

fn is_empty(value: &FieldValue) -> bool {
    match value {
        FieldValue::Text(text) => text.is_empty(),
        FieldValue::Bool(_) => false,
        FieldValue::List(list) => list.is_empty(),
    }
}
