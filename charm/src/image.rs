//! Access to the OCI image resource attached to a charm.
//!
//! The resource is a small YAML document naming the registry path of the
//! workload image and, optionally, the credentials needed to pull it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, Snafu};

/// Image reference as it appears in the pod spec.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDetails {
    pub image_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Deserialize)]
struct ResourceFile {
    registrypath: Option<String>,

    username: Option<String>,

    password: Option<String>,
}

/// Handle on the image resource file.
#[derive(Clone, Debug)]
pub struct ImageResource {
    path: Option<PathBuf>,
}

impl ImageResource {
    #[must_use]
    pub const fn new(path: Option<PathBuf>) -> Self { Self { path } }

    #[must_use]
    pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

    /// Reads the image reference from the resource file.
    ///
    /// An empty `registrypath` means the image is not published yet and comes
    /// back as an empty [`ImageDetails::image_path`].
    ///
    /// # Errors
    ///
    /// Fails when no resource is attached, the file cannot be read or
    /// parsed, or it has no `registrypath` key at all.
    pub fn fetch(&self) -> Result<ImageDetails, ImageFetchError> {
        let path = self.path.as_ref().context(MissingResourceSnafu)?;
        let data = std::fs::read(path).context(ReadResourceSnafu { path: path.clone() })?;
        let ResourceFile { registrypath, username, password } =
            serde_yaml::from_slice(&data).context(ParseResourceSnafu { path: path.clone() })?;
        let image_path = registrypath.context(MissingRegistryPathSnafu { path: path.clone() })?;

        if image_path.is_empty() {
            tracing::debug!("Image resource {} has no registry path yet", path.display());
        } else {
            tracing::debug!("Fetched image {image_path} from {}", path.display());
        }
        Ok(ImageDetails { image_path, username, password })
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ImageFetchError {
    #[snafu(display("No image resource is attached to the charm"))]
    MissingResource,

    #[snafu(display("Failed to read image resource {}, error: {source}", path.display()))]
    ReadResource { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to parse image resource {}, error: {source}", path.display()))]
    ParseResource { path: PathBuf, source: serde_yaml::Error },

    #[snafu(display("Image resource {} does not name a registry path", path.display()))]
    MissingRegistryPath { path: PathBuf },
}
