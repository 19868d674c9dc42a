//! The charm's persisted state.
//!
//! Events are delivered one per invocation, so everything a charm learns
//! (relation data, the last applied pod spec, the last status) is written
//! back to disk after each event and read again before the next one.

mod error;

use std::{collections::BTreeMap, io::ErrorKind, path::Path};

use serde::{Deserialize, Serialize};
use snafu::ResultExt;

pub use self::error::Error;
use crate::{operator::UnitStatus, pod_spec::PodSpec, relation::RelationState};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredState {
    #[serde(default)]
    pub relations: RelationState,

    /// The pod spec last handed to the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_spec: Option<PodSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UnitStatus>,

    /// Data this unit published, per provided relation.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub published: BTreeMap<String, BTreeMap<String, String>>,
}

impl StoredState {
    /// Loads the state saved at `path`. A missing file is a freshly
    /// installed charm and yields the empty state.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!("No charm state at {}, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(source).context(error::ReadStateSnafu { path }),
        };
        serde_json::from_slice(&data).context(error::ParseStateSnafu { path })
    }

    /// Writes the state to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Fails when the state cannot be serialized or written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .context(error::CreateStateDirectorySnafu { path: parent })?;
        }
        let data = serde_json::to_vec_pretty(self).context(error::SerializeStateSnafu)?;
        std::fs::write(path, data).context(error::WriteStateSnafu { path })?;
        tracing::debug!("Saved charm state to {}", path.display());
        Ok(())
    }
}
