//! The declarative pod specification handed to the platform.
//!
//! The shape follows version 3 of the charm pod spec: a list of containers
//! and, optionally, Kubernetes resources such as services. A spec is built
//! fresh on every configure cycle by [`build`] and compared by value with
//! the last applied one.

mod builder;
mod error;
mod kubernetes;

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

pub use self::{
    builder::{Blueprint, LoadBalancer, RelationEnvFn, build, init_container_script, pod_command},
    error::ValidationError,
};
pub(crate) use self::error::{
    InvalidOptionSnafu, InvalidRelationDataSnafu, MissingOptionSnafu, MissingRelationDataSnafu,
};
use crate::{config::ImagePullPolicy, image::ImageDetails};

/// Pod spec schema version understood by the platform.
pub const POD_SPEC_VERSION: u8 = 3;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    pub version: u8,

    pub containers: Vec<ContainerSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_resources: Option<KubernetesResources>,
}

impl PodSpec {
    /// Containers that run to completion before the workload starts.
    pub fn init_containers(&self) -> impl Iterator<Item = &ContainerSpec> {
        self.containers.iter().filter(|container| container.init)
    }

    /// Long-running workload containers.
    pub fn workload_containers(&self) -> impl Iterator<Item = &ContainerSpec> {
        self.containers.iter().filter(|container| !container.init)
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceSpec> {
        self.kubernetes_resources.iter().flat_map(|resources| resources.services.iter())
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub name: String,

    /// Registry reference of a charm-supplied image resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_details: Option<ImageDetails>,

    /// Plain image reference, used by helper containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<ImagePullPolicy>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env_config: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub init: bool,
}

impl ContainerSpec {
    /// The image reference the container runs, whichever way it was given.
    #[must_use]
    pub fn image_reference(&self) -> Option<&str> {
        self.image_details.as_ref().map(|details| details.image_path.as_str()).or(self.image.as_deref())
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    pub name: String,

    pub container_port: u16,

    pub protocol: Protocol,
}

/// Transport protocols the network functions listen on: TCP for the SBI and
/// SCTP for NGAP.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Sctp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val = match self {
            Self::Tcp => "TCP",
            Self::Sctp => "SCTP",
        };
        f.write_str(val)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct KubernetesResources {
    #[serde(default)]
    pub services: Vec<ServiceSpec>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ServiceSpec {
    pub name: String,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    pub spec: ServiceBody,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ServiceBody {
    #[serde(default)]
    pub selector: BTreeMap<String, String>,

    pub ports: Vec<ServicePort>,

    #[serde(rename = "type")]
    pub service_type: ServiceType,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    pub protocol: Protocol,

    pub port: u16,

    pub target_port: u16,
}

/// Exposure of a declared service. Only the AMF's NGAP endpoint is declared,
/// and it has to be reachable from outside the cluster.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ServiceType {
    LoadBalancer,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val = match self {
            Self::LoadBalancer => "LoadBalancer",
        };
        f.write_str(val)
    }
}
