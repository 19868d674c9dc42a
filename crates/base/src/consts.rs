pub mod k8s {
    pub mod labels {
        pub const NAME: &str = "app.kubernetes.io/name";
        pub const VERSION: &str = "app.kubernetes.io/version";
        pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";

        /// Label carrying the application name; services select pods by it.
        pub const JUJU_APP: &str = "juju-app";
    }

    /// Field manager used for server-side apply.
    pub const FIELD_MANAGER: &str = crate::PROJECT_NAME;
}

/// Environment variable naming the hook being delivered.
pub const HOOK_NAME_ENV: &str = "JUJU_HOOK_NAME";

/// Environment variable naming the remote application of a relation hook.
pub const REMOTE_APP_ENV: &str = "JUJU_REMOTE_APP";

/// Environment variable pointing at the unpacked charm directory.
pub const CHARM_DIR_ENV: &str = "JUJU_CHARM_DIR";
