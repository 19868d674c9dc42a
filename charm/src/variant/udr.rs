use std::collections::BTreeMap;

use snafu::{OptionExt, ensure};

use crate::{
    consts::{self, env, relation_keys},
    pod_spec::{Blueprint, InvalidRelationDataSnafu, MissingRelationDataSnafu, ValidationError},
    relation::{RelationSpec, RelationState},
};

const MONGODB: &str = "mongodb";

pub static BLUEPRINT: Blueprint = Blueprint {
    name: "udr",
    port: 29504,
    required_relations: &[
        RelationSpec::hostname("nrf"),
        RelationSpec::uri(MONGODB, relation_keys::MONGODB_URI),
    ],
    provided_relations: &[],
    init_endpoints: &[],
    load_balancer: None,
    relation_env,
};

fn relation_env(relations: &RelationState) -> Result<BTreeMap<String, String>, ValidationError> {
    let mongodb_uri = relations
        .uri(MONGODB)
        .filter(|uri| !uri.is_empty())
        .context(MissingRelationDataSnafu { field: relation_keys::MONGODB_URI })?;
    ensure!(
        mongodb_uri.starts_with(consts::MONGODB_URI_SCHEME),
        InvalidRelationDataSnafu {
            field: relation_keys::MONGODB_URI,
            prefix: consts::MONGODB_URI_SCHEME,
        }
    );

    Ok(BTreeMap::from([(env::MONGODB_URI.to_string(), mongodb_uri.to_string())]))
}
