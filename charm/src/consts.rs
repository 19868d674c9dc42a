//! Values shared by every network function charm.

/// Status message reported once the workload is configured, or when a
/// follower unit has nothing to do.
pub const READY: &str = "ready";

/// Image of the init container that gates workload start-up.
pub const INIT_CONTAINER_IMAGE: &str = "busybox:1.28";

/// Seconds the init container sleeps between two connection checks.
pub const INIT_POLL_INTERVAL_SECS: u64 = 2;

/// Scheme every MongoDB connection string has to carry.
pub const MONGODB_URI_SCHEME: &str = "mongodb://";

/// Only accepted value of the `gin_mode` option.
pub const GIN_MODE_RELEASE: &str = "release";

pub mod options {
    //! Names of the charm configuration options.

    pub const PORT: &str = "port";
    pub const GIN_MODE: &str = "gin_mode";
}

pub mod relation_keys {
    //! Keys read from and written to relation databags.

    pub const HOSTNAME: &str = "hostname";
    pub const MONGODB_URI: &str = "mongodb_uri";
}

pub mod env {
    //! Environment variables understood by the free5GC workloads.

    pub const ALLOW_ANONYMOUS_LOGIN: &str = "ALLOW_ANONYMOUS_LOGIN";
    pub const GIN_MODE: &str = "GIN_MODE";
    pub const MONGODB_URI: &str = "MONGODB_URI";
}
