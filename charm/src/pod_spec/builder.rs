use std::collections::BTreeMap;

use free5gc_charm_base::consts::k8s::labels;

use crate::{
    config::{CharmOptions, ImagePullPolicy, ValidatedOptions},
    consts::{self, env},
    image::ImageDetails,
    pod_spec::{
        ContainerPort, ContainerSpec, KubernetesResources, POD_SPEC_VERSION, PodSpec, Protocol,
        ServiceBody, ServicePort, ServiceSpec, ServiceType, ValidationError,
    },
    relation::{RelationSpec, RelationState},
};

/// Derives workload environment from relation data, rejecting values the
/// workload cannot use.
pub type RelationEnvFn = fn(&RelationState) -> Result<BTreeMap<String, String>, ValidationError>;

/// Externally reachable port published through a load balancer service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LoadBalancer {
    pub port: u16,
    pub protocol: Protocol,
}

/// Fixed description of one network function workload.
#[derive(Clone, Copy, Debug)]
pub struct Blueprint {
    /// Short name of the network function, e.g. `amf`.
    pub name: &'static str,

    /// The SBI port the workload listens on.
    pub port: u16,

    pub required_relations: &'static [RelationSpec],

    /// Relations on which this network function publishes its hostname.
    pub provided_relations: &'static [&'static str],

    /// Endpoints the init container waits for before the workload starts.
    pub init_endpoints: &'static [(&'static str, u16)],

    pub load_balancer: Option<LoadBalancer>,

    pub relation_env: RelationEnvFn,
}

/// Assembles the pod spec for `blueprint`.
///
/// Returns `Ok(None)` while no image reference is available.
///
/// # Errors
///
/// Returns a [`ValidationError`] when an option or relation value violates a
/// constraint of the workload.
pub fn build(
    blueprint: &Blueprint,
    image: Option<&ImageDetails>,
    options: &CharmOptions,
    relations: &RelationState,
    app_name: &str,
) -> Result<Option<PodSpec>, ValidationError> {
    let Some(image) = image.filter(|image| !image.image_path.is_empty()) else {
        tracing::debug!("No image reference for {app_name} yet");
        return Ok(None);
    };

    let options = options.validate(blueprint.port)?;
    let relation_env = (blueprint.relation_env)(relations)?;

    let workload = ContainerSpec {
        name: app_name.to_string(),
        image_details: Some(image.clone()),
        image: None,
        image_pull_policy: Some(ImagePullPolicy::Always),
        ports: make_pod_ports(blueprint, &options),
        env_config: make_pod_env_config(&options, relation_env),
        command: pod_command(blueprint.name),
        init: false,
    };
    let containers =
        make_init_container(blueprint).into_iter().chain(std::iter::once(workload)).collect();

    Ok(Some(PodSpec {
        version: POD_SPEC_VERSION,
        containers,
        kubernetes_resources: make_kubernetes_resources(blueprint, app_name),
    }))
}

/// The start-up command of a free5GC network function.
#[must_use]
pub fn pod_command(name: &str) -> Vec<String> {
    vec![
        format!("./{name}"),
        format!("-{name}cfg"),
        format!("../config/{name}cfg.conf"),
        "&".to_string(),
    ]
}

/// Shell loop that blocks until every endpoint accepts connections.
#[must_use]
pub fn init_container_script(endpoints: &[(&str, u16)]) -> String {
    let checks = endpoints
        .iter()
        .map(|(host, port)| format!("nc -zvw1 {host} {port}"))
        .collect::<Vec<_>>()
        .join(" && ");
    format!(
        "until({checks}); do echo waiting; sleep {}; done",
        consts::INIT_POLL_INTERVAL_SECS
    )
}

fn make_pod_ports(blueprint: &Blueprint, options: &ValidatedOptions) -> Vec<ContainerPort> {
    vec![ContainerPort {
        name: blueprint.name.to_string(),
        container_port: options.port,
        protocol: Protocol::Tcp,
    }]
}

fn make_pod_env_config(
    options: &ValidatedOptions,
    relation_env: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    [
        (env::ALLOW_ANONYMOUS_LOGIN.to_string(), "yes".to_string()),
        (env::GIN_MODE.to_string(), options.gin_mode.to_string()),
    ]
    .into_iter()
    .chain(relation_env)
    .collect()
}

fn make_init_container(blueprint: &Blueprint) -> Option<ContainerSpec> {
    if blueprint.init_endpoints.is_empty() {
        return None;
    }
    Some(ContainerSpec {
        name: format!("{}-init", blueprint.name),
        image_details: None,
        image: Some(consts::INIT_CONTAINER_IMAGE.to_string()),
        image_pull_policy: None,
        ports: Vec::new(),
        env_config: BTreeMap::new(),
        command: vec![
            "sh".to_string(),
            "-c".to_string(),
            init_container_script(blueprint.init_endpoints),
        ],
        init: true,
    })
}

fn make_kubernetes_resources(blueprint: &Blueprint, app_name: &str) -> Option<KubernetesResources> {
    let LoadBalancer { port, protocol } = blueprint.load_balancer?;
    let selector = BTreeMap::from([(labels::JUJU_APP.to_string(), app_name.to_string())]);
    Some(KubernetesResources {
        services: vec![ServiceSpec {
            name: format!("{app_name}-lb"),
            labels: selector.clone(),
            spec: ServiceBody {
                selector,
                ports: vec![ServicePort { protocol, port, target_port: port }],
                service_type: ServiceType::LoadBalancer,
            },
        }],
    })
}
