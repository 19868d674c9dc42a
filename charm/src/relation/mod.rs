//! Tracking of the data peers publish over relations.
//!
//! Each network function declares the relations it depends on with a
//! [`RelationSpec`]. The [`RelationState`] keeps the last complete set of
//! values a peer announced for each of them, and answers whether every
//! required relation has been populated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::relation_keys;

/// The databag a remote application published on a relation.
pub type RelationData = BTreeMap<String, String>;

/// Which stored field decides whether a relation counts as populated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Readiness {
    Hostname,
    Uri,
}

/// Declaration of a relation a network function consumes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RelationSpec {
    /// Name of the relation endpoint, e.g. `nrf`.
    pub name: &'static str,

    /// Databag key holding a connection URI, when the relation carries one.
    pub uri_key: Option<&'static str>,

    pub readiness: Readiness,
}

impl RelationSpec {
    /// A relation that only announces the peer hostname.
    #[must_use]
    pub const fn hostname(name: &'static str) -> Self {
        Self { name, uri_key: None, readiness: Readiness::Hostname }
    }

    /// A relation that announces a hostname and a connection URI, and is
    /// ready once the URI is known.
    #[must_use]
    pub const fn uri(name: &'static str, uri_key: &'static str) -> Self {
        Self { name, uri_key: Some(uri_key), readiness: Readiness::Uri }
    }
}

/// Values stored for one relation.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl RelationEntry {
    fn readiness_field(&self, readiness: Readiness) -> Option<&str> {
        let field = match readiness {
            Readiness::Hostname => self.hostname.as_deref(),
            Readiness::Uri => self.uri.as_deref(),
        };
        field.filter(|value| !value.is_empty())
    }
}

/// Relation name to the values a peer supplied for it.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RelationState {
    entries: BTreeMap<String, RelationEntry>,
}

impl RelationState {
    #[must_use]
    pub fn get(&self, relation: &str) -> Option<&RelationEntry> { self.entries.get(relation) }

    #[must_use]
    pub fn hostname(&self, relation: &str) -> Option<&str> {
        self.get(relation).and_then(|entry| entry.hostname.as_deref())
    }

    #[must_use]
    pub fn uri(&self, relation: &str) -> Option<&str> {
        self.get(relation).and_then(|entry| entry.uri.as_deref())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Records the values a peer published on `spec`'s relation.
    ///
    /// Returns `true` when the stored values changed and the pod has to be
    /// reconfigured. Data is ignored until the remote application has
    /// published every field the relation declares; identical values are not
    /// a change.
    pub fn on_relation_changed(&mut self, spec: &RelationSpec, data: Option<&RelationData>) -> bool {
        let Some(data) = data else {
            tracing::debug!("Relation {} carries no data from the remote application", spec.name);
            return false;
        };

        let Some(hostname) = non_empty(data, relation_keys::HOSTNAME) else {
            tracing::debug!("Relation {} has no hostname yet", spec.name);
            return false;
        };
        let uri = match spec.uri_key {
            Some(key) => match non_empty(data, key) {
                Some(uri) => Some(uri),
                None => {
                    tracing::debug!("Relation {} has no {key} yet", spec.name);
                    return false;
                }
            },
            None => None,
        };

        let entry = RelationEntry { hostname: Some(hostname), uri };
        if self.entries.get(spec.name) == Some(&entry) {
            return false;
        }

        tracing::info!(
            "Relation {} now points at {}",
            spec.name,
            entry.hostname.as_deref().unwrap_or_default()
        );
        if let Some(previous) = self.entries.insert(spec.name.to_string(), entry) {
            tracing::debug!("Replaced relation {} data {previous:?}", spec.name);
        }
        true
    }

    /// Forgets everything known about `spec`'s relation.
    ///
    /// Always asks for a reconfigure.
    pub fn on_relation_departed(&mut self, spec: &RelationSpec) -> bool {
        tracing::info!("Relation {} departed, clearing its data", spec.name);
        self.entries.retain(|name, _| name != spec.name);
        true
    }

    /// Lists the `required` relations which are not populated yet, joined
    /// with `", "`. An empty string means every relation is ready.
    #[must_use]
    pub fn missing_relations(&self, required: &[RelationSpec]) -> String {
        required
            .iter()
            .filter(|spec| {
                self.get(spec.name).and_then(|entry| entry.readiness_field(spec.readiness)).is_none()
            })
            .map(|spec| spec.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Status message for a unit waiting on the `missing` relations.
#[must_use]
pub fn waiting_message(missing: &str) -> String {
    let plural = if missing.contains(',') { "s" } else { "" };
    format!("Waiting for {missing} relation{plural}")
}

fn non_empty(data: &RelationData, key: &str) -> Option<String> {
    data.get(key).filter(|value| !value.is_empty()).cloned()
}
