//! [`Model`] backed by a Kubernetes cluster.

mod error;

use std::collections::BTreeMap;

use free5gc_charm_base::consts::k8s::FIELD_MANAGER;
use k8s_openapi::api::{apps::v1::Deployment, core::v1::Service};
use kube::{
    Api,
    api::{Patch, PatchParams},
};
use snafu::ResultExt;

pub use self::error::Error;
use crate::{
    config::CharmOptions,
    image::{ImageDetails, ImageFetchError, ImageResource},
    operator::{Model, UnitStatus},
    pod_spec::PodSpec,
};

/// Applies pod specs as a deployment plus services with server-side apply.
///
/// Status and relation data have no Kubernetes counterpart; they are logged
/// here and kept in the stored state by the charm.
pub struct KubeModel {
    client: kube::Client,
    namespace: String,
    app_name: String,
    leader: bool,
    options: CharmOptions,
    image_resource: ImageResource,
}

impl KubeModel {
    #[must_use]
    pub const fn new(
        client: kube::Client,
        namespace: String,
        app_name: String,
        leader: bool,
        options: CharmOptions,
        image_resource: ImageResource,
    ) -> Self {
        Self { client, namespace, app_name, leader, options, image_resource }
    }
}

impl Model for KubeModel {
    type Error = Error;

    fn app_name(&self) -> &str { &self.app_name }

    fn is_leader(&self) -> bool { self.leader }

    fn options(&self) -> &CharmOptions { &self.options }

    fn fetch_image(&self) -> Result<ImageDetails, ImageFetchError> { self.image_resource.fetch() }

    async fn set_pod_spec(&mut self, pod_spec: &PodSpec) -> Result<(), Self::Error> {
        let params = PatchParams::apply(FIELD_MANAGER).force();

        let deployment = pod_spec.to_deployment(&self.app_name, &self.namespace);
        let _deployment = Api::<Deployment>::namespaced(self.client.clone(), &self.namespace)
            .patch(&self.app_name, &params, &Patch::Apply(&deployment))
            .await
            .context(error::ApplyDeploymentSnafu {
                namespace: &self.namespace,
                name: &self.app_name,
            })?;
        tracing::info!("Applied deployment {} in namespace {}", self.app_name, self.namespace);

        let api = Api::<Service>::namespaced(self.client.clone(), &self.namespace);
        for service in pod_spec.to_services(&self.namespace) {
            let name = service.metadata.name.clone().unwrap_or_default();
            let _service = api
                .patch(&name, &params, &Patch::Apply(&service))
                .await
                .context(error::ApplyServiceSnafu { namespace: &self.namespace, name: &name })?;
            tracing::info!("Applied service {name} in namespace {}", self.namespace);
        }

        Ok(())
    }

    fn set_status(&mut self, status: &UnitStatus) {
        if status.is_blocked() {
            tracing::warn!("Unit {} is {status}", self.app_name);
        } else {
            tracing::info!("Unit {} is {status}", self.app_name);
        }
    }

    fn publish_relation_data(&mut self, relation: &str, data: &BTreeMap<String, String>) {
        tracing::info!("Relation {relation} data of {}: {data:?}", self.app_name);
    }
}
