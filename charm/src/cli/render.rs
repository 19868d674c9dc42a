use std::io::Write;

use clap::Args;
use snafu::{OptionExt, ResultExt};

use crate::{
    cli::error::{self, Error},
    config::Config,
    pod_spec::PodSpec,
    state::StoredState,
};

const DEFAULT_NAMESPACE: &str = "default";

#[derive(Args, Clone)]
pub struct RenderCommand {
    #[arg(
        short,
        long,
        help = "Render the Deployment and Service manifests applied to Kubernetes instead of the \
                pod spec."
    )]
    pub kubernetes: bool,

    #[arg(
        short,
        long,
        help = "Namespace written into Kubernetes manifests. Defaults to the configured namespace."
    )]
    pub namespace: Option<String>,
}

impl RenderCommand {
    /// Builds the pod spec from the configuration, the stored relation data
    /// and the image resource, without touching the cluster.
    pub fn run(self, config: &Config) -> Result<(), Error> {
        let Self { kubernetes, namespace } = self;

        let state = StoredState::load(&config.state_file_path)?;
        let image = config.image_resource().fetch().context(error::FetchImageSnafu)?;
        let pod_spec = config
            .variant
            .build_pod_spec(Some(&image), &config.options, &state.relations, config.app_name())
            .context(error::InvalidPodSpecSnafu)?
            .context(error::ImageNotReadySnafu)?;

        let rendered = if kubernetes {
            let namespace = namespace
                .or_else(|| config.namespace.clone())
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
            render_manifests(&pod_spec, config.app_name(), &namespace)?
        } else {
            serde_yaml::to_string(&pod_spec)
                .context(error::SerializeManifestSnafu { what: "pod spec" })?
        };

        std::io::stdout().write_all(rendered.as_bytes()).context(error::WriteStdoutSnafu)
    }
}

/// Renders the deployment and its services as a multi-document YAML stream.
fn render_manifests(pod_spec: &PodSpec, app_name: &str, namespace: &str) -> Result<String, Error> {
    let deployment = serde_yaml::to_string(&pod_spec.to_deployment(app_name, namespace))
        .context(error::SerializeManifestSnafu { what: "deployment" })?;
    let services = pod_spec
        .to_services(namespace)
        .iter()
        .map(|service| {
            serde_yaml::to_string(service).context(error::SerializeManifestSnafu { what: "service" })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(std::iter::once(deployment).chain(services).collect::<Vec<_>>().join("---\n"))
}
