use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{source}"))]
    Configuration { source: crate::config::Error },

    #[snafu(display("{source}"))]
    State { source: crate::state::Error },

    #[snafu(display("Failed to fetch image information, error: {source}"))]
    FetchImage { source: crate::image::ImageFetchError },

    #[snafu(display("Invalid pod spec, error: {source}"))]
    InvalidPodSpec { source: crate::pod_spec::ValidationError },

    #[snafu(display("The image resource does not name an image yet"))]
    ImageNotReady,

    #[snafu(display("Failed to serialize {what}, error: {source}"))]
    SerializeManifest { what: &'static str, source: serde_yaml::Error },

    #[snafu(display("Failed to write to stdout, error: {source}"))]
    WriteStdout { source: std::io::Error },

    #[snafu(display("Failed to initialize Kubernetes client configuration, error: {source}"))]
    KubeConfig {
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display("Failed to create tokio runtime, error: {source}"))]
    InitializeTokioRuntime { source: std::io::Error },
}

impl From<crate::config::Error> for Error {
    fn from(source: crate::config::Error) -> Self { Self::Configuration { source } }
}

impl From<crate::state::Error> for Error {
    fn from(source: crate::state::Error) -> Self { Self::State { source } }
}
