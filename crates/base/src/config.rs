use std::path::{Path, PathBuf};

use directories::BaseDirs;

/// Location of the persisted charm state when the configuration does not name
/// one.
///
/// # Panics
/// This function should never panic
#[inline]
#[must_use]
pub fn default_state_file_path() -> PathBuf {
    let base_dirs = BaseDirs::new().expect("`BaseDirs::new` always success");
    [
        base_dirs.data_local_dir().to_path_buf(),
        PathBuf::from(crate::PROJECT_NAME),
        PathBuf::from(crate::STATE_FILE_NAME),
    ]
    .into_iter()
    .collect()
}

/// Location of the OCI image resource file, following the layout charm
/// runtimes use for attached resources.
#[inline]
#[must_use]
pub fn default_image_resource_path(charm_dir: &Path) -> PathBuf {
    [charm_dir, Path::new("resources"), Path::new("image"), Path::new("content")]
        .iter()
        .collect()
}
