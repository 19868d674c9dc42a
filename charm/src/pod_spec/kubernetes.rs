//! Translation of a [`PodSpec`] into the Kubernetes objects that run it.

use std::collections::BTreeMap;

use free5gc_charm_base::{PROJECT_NAME, PROJECT_VERSION, consts::k8s::labels};
use k8s_openapi::{
    api::{
        apps::v1::{Deployment, DeploymentSpec},
        core::v1::{
            Container, ContainerPort as KubeContainerPort, EnvVar, PodSpec as KubePodSpec,
            PodTemplateSpec, Service, ServicePort as KubeServicePort,
            ServiceSpec as KubeServiceSpec,
        },
    },
    apimachinery::pkg::{apis::meta::v1::LabelSelector, util::intstr::IntOrString},
};
use kube::api::ObjectMeta;

use crate::pod_spec::{ContainerSpec, PodSpec, ServiceSpec};

impl PodSpec {
    /// Renders the workload as a single-replica deployment named after the
    /// application.
    #[must_use]
    pub fn to_deployment(&self, app_name: &str, namespace: &str) -> Deployment {
        let init_containers =
            self.init_containers().map(ContainerSpec::to_container).collect::<Vec<_>>();
        let containers = self.workload_containers().map(ContainerSpec::to_container).collect();

        Deployment {
            metadata: ObjectMeta {
                name: Some(app_name.to_string()),
                namespace: Some(namespace.to_string()),
                labels: Some(workload_labels(app_name)),
                ..ObjectMeta::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(1),
                selector: LabelSelector {
                    match_labels: Some(selector_labels(app_name)),
                    ..LabelSelector::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(workload_labels(app_name)),
                        ..ObjectMeta::default()
                    }),
                    spec: Some(KubePodSpec {
                        containers,
                        init_containers: (!init_containers.is_empty()).then_some(init_containers),
                        ..KubePodSpec::default()
                    }),
                },
                ..DeploymentSpec::default()
            }),
            ..Deployment::default()
        }
    }

    /// Renders the declared services.
    #[must_use]
    pub fn to_services(&self, namespace: &str) -> Vec<Service> {
        self.services().map(|service| service.to_service(namespace)).collect()
    }
}

impl ContainerSpec {
    fn to_container(&self) -> Container {
        let ports = self
            .ports
            .iter()
            .map(|port| KubeContainerPort {
                name: Some(port.name.clone()),
                container_port: i32::from(port.container_port),
                protocol: Some(port.protocol.to_string()),
                ..KubeContainerPort::default()
            })
            .collect::<Vec<_>>();
        let env = self
            .env_config
            .iter()
            .map(|(name, value)| EnvVar {
                name: name.clone(),
                value: Some(value.clone()),
                ..EnvVar::default()
            })
            .collect::<Vec<_>>();

        Container {
            name: self.name.clone(),
            image: self.image_reference().map(ToString::to_string),
            image_pull_policy: self.image_pull_policy.map(|policy| policy.to_string()),
            command: (!self.command.is_empty()).then(|| self.command.clone()),
            ports: (!ports.is_empty()).then_some(ports),
            env: (!env.is_empty()).then_some(env),
            ..Container::default()
        }
    }
}

impl ServiceSpec {
    fn to_service(&self, namespace: &str) -> Service {
        let ports = self
            .spec
            .ports
            .iter()
            .map(|port| KubeServicePort {
                port: i32::from(port.port),
                target_port: Some(IntOrString::Int(i32::from(port.target_port))),
                protocol: Some(port.protocol.to_string()),
                ..KubeServicePort::default()
            })
            .collect();

        Service {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(namespace.to_string()),
                labels: Some(self.labels.clone()),
                ..ObjectMeta::default()
            },
            spec: Some(KubeServiceSpec {
                selector: Some(self.spec.selector.clone()),
                ports: Some(ports),
                type_: Some(self.spec.service_type.to_string()),
                ..KubeServiceSpec::default()
            }),
            ..Service::default()
        }
    }
}

fn selector_labels(app_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(labels::JUJU_APP.to_string(), app_name.to_string())])
}

fn workload_labels(app_name: &str) -> BTreeMap<String, String> {
    let mut workload = selector_labels(app_name);
    workload.extend([
        (labels::NAME.to_string(), app_name.to_string()),
        (labels::VERSION.to_string(), PROJECT_VERSION.to_string()),
        (labels::MANAGED_BY.to_string(), PROJECT_NAME.to_string()),
    ]);
    workload
}
