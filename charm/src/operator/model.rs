use std::collections::BTreeMap;

use crate::{
    config::CharmOptions,
    image::{ImageDetails, ImageFetchError},
    operator::UnitStatus,
    pod_spec::PodSpec,
};

/// The platform a charm runs on, as seen from the charm.
///
/// Everything outside the charm itself (leadership, configuration, the image
/// resource, the orchestrator applying pod specs, the status and relation
/// channels) is reached through this trait.
pub trait Model {
    type Error: std::error::Error;

    /// Name of the application the unit belongs to.
    fn app_name(&self) -> &str;

    fn is_leader(&self) -> bool;

    fn options(&self) -> &CharmOptions;

    /// Reads the workload image reference from the charm's image resource.
    ///
    /// # Errors
    ///
    /// Fails when the resource is missing or unreadable.
    fn fetch_image(&self) -> Result<ImageDetails, ImageFetchError>;

    /// Hands a pod spec to the orchestrator.
    ///
    /// # Errors
    ///
    /// Fails when the orchestrator rejects the spec.
    async fn set_pod_spec(&mut self, pod_spec: &PodSpec) -> Result<(), Self::Error>;

    fn set_status(&mut self, status: &UnitStatus);

    /// Publishes `data` in this application's databag on `relation`.
    fn publish_relation_data(&mut self, relation: &str, data: &BTreeMap<String, String>);
}
