mod error;
mod image_pull_policy;
mod log;
mod options;

use std::path::{Path, PathBuf};

use free5gc_charm_base::consts::CHARM_DIR_ENV;
use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

pub use self::{
    error::Error,
    image_pull_policy::ImagePullPolicy,
    log::LogConfig,
    options::{CharmOptions, GinMode, ValidatedOptions},
};
use crate::{image::ImageResource, variant::Variant};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// The network function this charm operates.
    pub variant: Variant,

    /// Application name, defaults to the network function name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Namespace the workload is applied to, defaults to the namespace of the
    /// Kubernetes client configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default = "free5gc_charm_base::config::default_state_file_path")]
    pub state_file_path: PathBuf,

    /// The OCI image resource file, defaults to the resource inside the
    /// directory named by `JUJU_CHARM_DIR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_resource_path: Option<PathBuf>,

    #[serde(default)]
    pub options: CharmOptions,

    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: Variant::Amf,
            app_name: None,
            namespace: None,
            state_file_path: free5gc_charm_base::config::default_state_file_path(),
            image_resource_path: None,
            options: CharmOptions::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    pub fn search_config_file_path() -> PathBuf {
        let paths = vec![Self::default_path()]
            .into_iter()
            .chain(free5gc_charm_base::fallback_project_config_directories().into_iter().map(
                |mut path| {
                    path.push(free5gc_charm_base::CLI_CONFIG_NAME);
                    path
                },
            ))
            .collect::<Vec<_>>();
        for path in paths {
            let Ok(exists) = path.try_exists() else {
                continue;
            };
            if exists {
                return path;
            }
        }
        Self::default_path()
    }

    #[inline]
    pub fn default_path() -> PathBuf {
        [
            free5gc_charm_base::PROJECT_CONFIG_DIR.to_path_buf(),
            PathBuf::from(free5gc_charm_base::CLI_CONFIG_NAME),
        ]
        .into_iter()
        .collect()
    }

    /// Loads the configuration file at `path`, resolving `~` and relative
    /// paths inside it.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed, or a path in it cannot
    /// be resolved.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut config = Self::from_yaml(path)?;

        config.state_file_path = resolve(&config.state_file_path)?;
        config.image_resource_path =
            config.image_resource_path.as_deref().map(resolve).transpose()?;
        config.log.file_path = config.log.file_path.as_deref().map(resolve).transpose()?;

        Ok(config)
    }

    fn from_yaml(path: &Path) -> Result<Self, Error> {
        let path = resolve(path)?;
        let data = std::fs::read(&path).context(error::OpenConfigSnafu { filename: path.clone() })?;
        serde_yaml::from_slice(&data).context(error::ParseConfigSnafu { filename: path })
    }

    /// The default configuration rendered as YAML.
    ///
    /// # Errors
    ///
    /// Fails when the configuration cannot be serialized.
    pub fn template_basic() -> Result<String, Error> {
        serde_yaml::to_string(&Self::default()).context(error::SerializeConfigSnafu)
    }

    #[must_use]
    pub fn app_name(&self) -> &str { self.app_name.as_deref().unwrap_or(self.variant.name()) }

    /// The image resource of the charm, if one can be located.
    #[must_use]
    pub fn image_resource(&self) -> ImageResource {
        let path = self.image_resource_path.clone().or_else(|| {
            std::env::var_os(CHARM_DIR_ENV).map(|charm_dir| {
                free5gc_charm_base::config::default_image_resource_path(Path::new(&charm_dir))
            })
        });
        ImageResource::new(path)
    }
}

fn resolve(path: &Path) -> Result<PathBuf, Error> {
    path.try_resolve()
        .map(|path| path.to_path_buf())
        .context(error::ResolveFilePathSnafu { file_path: path.to_path_buf() })
}
