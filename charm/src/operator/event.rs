use std::{fmt, str::FromStr};

use snafu::{OptionExt, Snafu};

use crate::relation::RelationData;

/// Every kind of event a charm reacts to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EventKind {
    Start,
    ConfigChanged,
    UpgradeCharm,
    LeaderElected,
    UpdateStatus,
    RelationJoined,
    RelationChanged,
    RelationDeparted,
}

const LIFECYCLE_HOOKS: [(&str, EventKind); 5] = [
    ("start", EventKind::Start),
    ("config-changed", EventKind::ConfigChanged),
    ("upgrade-charm", EventKind::UpgradeCharm),
    ("leader-elected", EventKind::LeaderElected),
    ("update-status", EventKind::UpdateStatus),
];

const RELATION_HOOK_SUFFIXES: [(&str, EventKind); 3] = [
    ("-relation-joined", EventKind::RelationJoined),
    ("-relation-changed", EventKind::RelationChanged),
    ("-relation-departed", EventKind::RelationDeparted),
];

impl EventKind {
    #[must_use]
    pub const fn is_relation(self) -> bool {
        matches!(self, Self::RelationJoined | Self::RelationChanged | Self::RelationDeparted)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val = match self {
            Self::Start => "start",
            Self::ConfigChanged => "config-changed",
            Self::UpgradeCharm => "upgrade-charm",
            Self::LeaderElected => "leader-elected",
            Self::UpdateStatus => "update-status",
            Self::RelationJoined => "relation-joined",
            Self::RelationChanged => "relation-changed",
            Self::RelationDeparted => "relation-departed",
        };
        f.write_str(val)
    }
}

/// A hook name as delivered by the charm runtime, e.g. `config-changed` or
/// `nrf-relation-changed`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Hook {
    pub kind: EventKind,
    pub relation: Option<String>,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.relation {
            Some(relation) => write!(f, "{relation}-{}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl FromStr for Hook {
    type Err = ParseHookError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Some((_, kind)) = LIFECYCLE_HOOKS.iter().find(|(name, _)| *name == value) {
            return Ok(Self { kind: *kind, relation: None });
        }
        RELATION_HOOK_SUFFIXES
            .iter()
            .find_map(|(suffix, kind)| {
                value
                    .strip_suffix(*suffix)
                    .filter(|relation| !relation.is_empty())
                    .map(|relation| Self { kind: *kind, relation: Some(relation.to_string()) })
            })
            .context(UnknownSnafu { value })
    }
}

#[derive(Debug, Snafu)]
pub enum ParseHookError {
    #[snafu(display("'{value}' is not a hook this charm handles"))]
    Unknown { value: String },
}

/// Relation details attached to a relation event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelationContext {
    pub name: String,

    pub remote_app: Option<String>,

    /// The remote application's databag, absent when it published nothing.
    pub data: Option<RelationData>,
}

/// One event delivered to the charm.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub relation: Option<RelationContext>,
}

impl Event {
    #[must_use]
    pub const fn lifecycle(kind: EventKind) -> Self { Self { kind, relation: None } }

    #[must_use]
    pub fn relation_joined(name: impl Into<String>, remote_app: impl Into<String>) -> Self {
        Self::relation(EventKind::RelationJoined, name, Some(remote_app.into()), None)
    }

    #[must_use]
    pub fn relation_changed(
        name: impl Into<String>,
        remote_app: impl Into<String>,
        data: Option<RelationData>,
    ) -> Self {
        Self::relation(EventKind::RelationChanged, name, Some(remote_app.into()), data)
    }

    #[must_use]
    pub fn relation_departed(name: impl Into<String>, remote_app: impl Into<String>) -> Self {
        Self::relation(EventKind::RelationDeparted, name, Some(remote_app.into()), None)
    }

    /// Combines a parsed hook with the relation details the runtime supplied
    /// alongside it.
    #[must_use]
    pub fn from_hook(hook: Hook, remote_app: Option<String>, data: Option<RelationData>) -> Self {
        let Hook { kind, relation } = hook;
        Self {
            kind,
            relation: relation.map(|name| RelationContext { name, remote_app, data }),
        }
    }

    fn relation(
        kind: EventKind,
        name: impl Into<String>,
        remote_app: Option<String>,
        data: Option<RelationData>,
    ) -> Self {
        Self { kind, relation: Some(RelationContext { name: name.into(), remote_app, data }) }
    }

    #[must_use]
    pub fn relation_name(&self) -> Option<&str> {
        self.relation.as_ref().map(|relation| relation.name.as_str())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.relation_name() {
            Some(relation) => write!(f, "{relation}-{}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}
