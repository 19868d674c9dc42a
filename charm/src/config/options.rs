use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ensure};

use crate::{
    consts::{self, options},
    pod_spec::{InvalidOptionSnafu, MissingOptionSnafu, ValidationError},
};

/// Options an operator sets on a network function charm.
///
/// Values are kept loosely typed so that a wrong value surfaces as a blocked
/// unit with a readable message instead of a configuration parse failure.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CharmOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,

    /// Gin run mode of the workload. An absent key defaults to `release`,
    /// the charm's default and the only mode accepted. Clearing it with an
    /// explicit `gin_mode: null` blocks the unit with `gin_mode is required`.
    #[serde(default = "CharmOptions::default_gin_mode")]
    pub gin_mode: Option<String>,
}

impl Default for CharmOptions {
    fn default() -> Self { Self { port: None, gin_mode: Self::default_gin_mode() } }
}

impl CharmOptions {
    #[inline]
    #[must_use]
    pub fn default_gin_mode() -> Option<String> { Some(consts::GIN_MODE_RELEASE.to_string()) }

    /// Checks the options against the constraints of a network function
    /// listening on `fixed_port`, stopping at the first violation.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the offending option.
    pub fn validate(&self, fixed_port: u16) -> Result<ValidatedOptions, ValidationError> {
        if let Some(port) = self.port {
            ensure!(
                port == i64::from(fixed_port),
                InvalidOptionSnafu { option: options::PORT, expected: fixed_port.to_string() }
            );
        }

        let gin_mode = self
            .gin_mode
            .as_deref()
            .context(MissingOptionSnafu { option: options::GIN_MODE })?
            .parse::<GinMode>()
            .map_err(|_| {
                InvalidOptionSnafu {
                    option: options::GIN_MODE,
                    expected: format!("'{}'", consts::GIN_MODE_RELEASE),
                }
                .build()
            })?;

        Ok(ValidatedOptions { port: fixed_port, gin_mode })
    }
}

/// Options that passed validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ValidatedOptions {
    pub port: u16,
    pub gin_mode: GinMode,
}

/// Run mode of the Gin web framework embedded in the workloads.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GinMode {
    #[default]
    Release,
}

impl fmt::Display for GinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release => f.write_str(consts::GIN_MODE_RELEASE),
        }
    }
}

impl FromStr for GinMode {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == consts::GIN_MODE_RELEASE { Ok(Self::Release) } else { Err(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let validated = CharmOptions::default().validate(29507).unwrap();
        assert_eq!(validated, ValidatedOptions { port: 29507, gin_mode: GinMode::Release });
    }

    #[test]
    fn test_port_must_equal_fixed_port() {
        let options = CharmOptions { port: Some(8080), ..CharmOptions::default() };
        let err = options.validate(29507).unwrap_err();
        assert_eq!(err.to_string(), "port must equal 29507");

        let options = CharmOptions { port: Some(29507), ..CharmOptions::default() };
        assert!(options.validate(29507).is_ok());
    }

    #[test]
    fn test_gin_mode_must_be_release() {
        let options = CharmOptions { gin_mode: Some("debug".to_string()), ..CharmOptions::default() };
        let err = options.validate(29504).unwrap_err();
        assert_eq!(err.to_string(), "gin_mode must equal 'release'");
    }

    #[test]
    fn test_gin_mode_is_required() {
        let options = CharmOptions { gin_mode: None, ..CharmOptions::default() };
        let err = options.validate(29504).unwrap_err();
        assert_eq!(err, ValidationError::MissingOption { option: "gin_mode" });
    }

    #[test]
    fn test_deserialize_fills_in_gin_mode() {
        let options: CharmOptions = serde_yaml::from_str("port: 29518").unwrap();
        assert_eq!(options.port, Some(29518));
        assert_eq!(options.gin_mode.as_deref(), Some("release"));
    }

    #[test]
    fn test_cleared_gin_mode_is_required() {
        let options: CharmOptions = serde_yaml::from_str("gin_mode: null").unwrap();
        assert_eq!(options.gin_mode, None);

        let err = options.validate(29518).unwrap_err();
        assert_eq!(err.to_string(), "gin_mode is required");
    }
}
