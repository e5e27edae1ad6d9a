//! Brings resources on a server to their declared state.
//!
//! Each call to [Reconciler::reconcile] is one pass over one resource:
//!
//! 1. Canonicalize the declared resource. An invalid declaration fails here, before the server is
//!    contacted. A resource that should be absent is only identified by name, so its other fields
//!    are neither checked nor compared.
//! 2. Fetch the resource from the server ([Reconciler::observe]).
//! 3. [decide] what to do.
//! 4. Unless [Settings::dry_run] is set, make the one store call the decision calls for.
//! 5. Describe what happened in an [Outcome].
//!
//! A pass makes at most one mutating call. Any error aborts the pass; nothing partial is ever
//! reported as a success.

use crate::core::canonical::{CanonicalRecord, Canonicalize};
use crate::core::diff::{decide, Action, Diff};
use crate::core::manifest::Manifest;
use crate::core::resource::{Resource, ResourceKind, State};
use crate::error::{Error, Result};
use crate::store::{Endpoint, ResourceStore};
use crate::wire::{parse_observed, Serializer, XmlSerializer};
use anyhow::Context;
use serde::Serialize;

pub mod report;

use report::Report;

/// How a [Reconciler] behaves. Fixed for the reconciler's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Decide and report, but don't change anything on the server.
    pub dry_run: bool,

    /// Treat [Error::NotFound] from the initial lookup as "resource absent". When `false`, a
    /// missing resource aborts the pass.
    pub ignore_not_found: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            dry_run: false,
            ignore_not_found: true,
        }
    }
}

/// The result of one reconciliation pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Whether the server was changed (or, in a dry run, would have been).
    pub changed: bool,

    /// A sentence for humans, e.g. `The user alice was created.`
    pub message: String,

    pub action: Action,

    /// The resource before and after the pass. `None` when nothing changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<Diff>,

    /// The record sent to the server by a create or update. `None` for every other pass,
    /// including dry runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<CanonicalRecord>,
}

/// Reconciles resources against a [ResourceStore], writing them with a [Serializer].
pub struct Reconciler<S, Z = XmlSerializer> {
    store: S,
    serializer: Z,
    settings: Settings,
}

impl<S: ResourceStore, Z: Serializer> Reconciler<S, Z> {
    pub fn new(store: S, serializer: Z, settings: Settings) -> Self {
        Reconciler {
            store,
            serializer,
            settings,
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Fetches the resource of `kind` named `name` from the store.
    ///
    /// Returns `Ok(None)` if the store reports [Error::NotFound] and [Settings::ignore_not_found]
    /// is set. This is the only place where a missing resource is not an error.
    pub fn observe(&mut self, kind: ResourceKind, name: &str) -> Result<Option<CanonicalRecord>> {
        let endpoint = Endpoint::item(kind, name);
        tracing::debug!(method = "GET", %endpoint, "fetching observed state");

        let response = match self.store.get(&endpoint) {
            Ok(response) => response,
            Err(err) if err.is_not_found() && self.settings.ignore_not_found => return Ok(None),
            Err(err) => return Err(err),
        };
        let body = response.body.ok_or_else(|| Error::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: "response has no body".to_owned(),
        })?;
        parse_observed(kind, &endpoint, &body).map(Some)
    }

    /// Runs one pass that brings `resource` to `state`. See the [module documentation](self).
    pub fn reconcile(&mut self, resource: &Resource, state: State) -> Result<Outcome> {
        let kind = resource.kind();
        let name = resource.name();

        let desired = match state {
            State::Present => resource.canonicalize()?,
            State::Absent => CanonicalRecord::identity(kind, name),
        };
        let observed = self.observe(kind, name)?;
        let decision = decide(observed.as_ref(), state, &desired);
        tracing::info!(
            %kind,
            resource = name,
            action = %decision.action,
            dry_run = self.settings.dry_run,
            "decided"
        );

        let dry_run = self.settings.dry_run;
        let message = message(kind, name, decision.action, &decision.diff, dry_run);
        let changed = decision.action.changes();
        let diff = changed.then_some(decision.diff);

        if !changed || dry_run {
            return Ok(Outcome {
                changed,
                message,
                action: decision.action,
                diff,
                record: None,
            });
        }

        let record = match decision.action {
            Action::Create | Action::Update => {
                let collection = Endpoint::collection(kind);
                let body = self.serializer.body(&desired)?;
                if decision.action == Action::Create {
                    tracing::debug!(method = "POST", endpoint = %collection, "creating");
                    self.store.create(&collection, &body)?;
                } else {
                    tracing::debug!(method = "POST", endpoint = %collection, "updating");
                    self.store.update(&collection, &body)?;
                }
                Some(desired)
            }
            Action::Delete => {
                let endpoint = Endpoint::item(kind, name);
                tracing::debug!(method = "DELETE", %endpoint, "deleting");
                self.store.delete(&endpoint)?;
                None
            }
            Action::Noop => None,
        };

        tracing::info!(%kind, resource = name, "{message}");
        Ok(Outcome {
            changed,
            message,
            action: decision.action,
            diff,
            record,
        })
    }

    /// Reconciles every resource in `manifest`, in order, reporting each [Outcome] to `reporter`.
    ///
    /// Stops at the first failure. Returns the outcomes of the passes that ran.
    pub fn apply(
        &mut self,
        manifest: &Manifest,
        reporter: &mut impl Report,
    ) -> anyhow::Result<Vec<Outcome>> {
        let mut outcomes = Vec::with_capacity(manifest.resources.len());
        for declaration in &manifest.resources {
            let resource = &declaration.resource;
            let outcome = self
                .reconcile(resource, declaration.state)
                .with_context(|| {
                    format!("failed to reconcile {} {}", resource.kind(), resource.name())
                })?;
            reporter.report(&outcome)?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

/// Describes a decision in a sentence, e.g. `The user alice would be deleted.`
fn message(kind: ResourceKind, name: &str, action: Action, diff: &Diff, dry_run: bool) -> String {
    let verb = match action {
        Action::Noop if diff.before.is_some() => "is up to date",
        Action::Noop => "is already absent",
        Action::Create if dry_run => "would be created",
        Action::Create => "was created",
        Action::Update if dry_run => "would be modified",
        Action::Update => "was modified",
        Action::Delete if dry_run => "would be deleted",
        Action::Delete => "was deleted",
    };
    format!("The {kind} {name} {verb}.")
}
