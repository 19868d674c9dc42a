//! Names and well-known locations shared by the free5GC charm crates.

pub mod config;
pub mod consts;

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use directories::ProjectDirs;

pub const PROJECT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const PROJECT_NAME: &str = "free5gc-charm";

pub const CLI_PROGRAM_NAME: &str = "free5gc-charm";
pub const CLI_CONFIG_NAME: &str = "config.yaml";

/// File name of the persisted charm state inside the data directory.
pub const STATE_FILE_NAME: &str = "state.json";

pub static PROJECT_CONFIG_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    ProjectDirs::from("", PROJECT_NAME, PROJECT_NAME)
        .expect("Creating `ProjectDirs` should always success")
        .config_dir()
        .to_path_buf()
});

/// Directories searched for the configuration file after
/// [`PROJECT_CONFIG_DIR`].
#[must_use]
pub fn fallback_project_config_directories() -> Vec<PathBuf> {
    let Some(user_dirs) = directories::UserDirs::new() else {
        return Vec::new();
    };
    vec![
        [user_dirs.home_dir(), Path::new(".config"), Path::new(PROJECT_NAME)].iter().collect(),
        [user_dirs.home_dir(), Path::new(&format!(".{PROJECT_NAME}"))].iter().collect(),
    ]
}
