use std::fmt;

use serde::{Deserialize, Serialize};

/// When the kubelet pulls a workload image. Charm workloads always pull, so a
/// retagged image is picked up on the next rollout.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Serialize, PartialEq)]
pub enum ImagePullPolicy {
    Always,
}

impl fmt::Display for ImagePullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val = match self {
            Self::Always => "Always",
        };
        f.write_str(val)
    }
}
