//! The network functions this crate can operate.

mod amf;
mod pcf;
mod udr;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, Snafu};

use crate::{
    config::CharmOptions,
    image::ImageDetails,
    pod_spec::{self, Blueprint, PodSpec, ValidationError},
    relation::{RelationSpec, RelationState},
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Access and Mobility Management Function.
    Amf,
    /// Policy Control Function.
    Pcf,
    /// Unified Data Repository.
    Udr,
}

impl Variant {
    pub const ALL: [Self; 3] = [Self::Amf, Self::Pcf, Self::Udr];

    #[must_use]
    pub fn blueprint(self) -> &'static Blueprint {
        match self {
            Self::Amf => &amf::BLUEPRINT,
            Self::Pcf => &pcf::BLUEPRINT,
            Self::Udr => &udr::BLUEPRINT,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str { self.blueprint().name }

    #[must_use]
    pub fn required_relations(self) -> &'static [RelationSpec] {
        self.blueprint().required_relations
    }

    /// Looks up a relation this network function consumes.
    #[must_use]
    pub fn relation(self, name: &str) -> Option<&'static RelationSpec> {
        self.required_relations().iter().find(|spec| spec.name == name)
    }

    #[must_use]
    pub fn provided_relations(self) -> &'static [&'static str] {
        self.blueprint().provided_relations
    }

    #[must_use]
    pub fn provides(self, relation: &str) -> bool {
        self.provided_relations().contains(&relation)
    }

    /// Builds the pod spec of this network function.
    ///
    /// # Errors
    ///
    /// See [`pod_spec::build`].
    pub fn build_pod_spec(
        self,
        image: Option<&ImageDetails>,
        options: &CharmOptions,
        relations: &RelationState,
        app_name: &str,
    ) -> Result<Option<PodSpec>, ValidationError> {
        pod_spec::build(self.blueprint(), image, options, relations, app_name)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Variant {
    type Err = ParseVariantError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.name().eq_ignore_ascii_case(value))
            .context(InvalidSnafu { value })
    }
}

#[derive(Debug, Snafu)]
pub enum ParseVariantError {
    #[snafu(display("'{value}' is not a supported network function, expected amf, pcf or udr"))]
    Invalid { value: String },
}
