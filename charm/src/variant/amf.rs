use std::collections::BTreeMap;

use crate::{
    pod_spec::{Blueprint, LoadBalancer, Protocol, ValidationError},
    relation::{RelationSpec, RelationState},
};

/// NGAP port the AMF exposes to the radio access network.
const NGAP_PORT: u16 = 38412;

pub static BLUEPRINT: Blueprint = Blueprint {
    name: "amf",
    port: 29518,
    required_relations: &[RelationSpec::hostname("nrf")],
    provided_relations: &["amf"],
    init_endpoints: &[],
    load_balancer: Some(LoadBalancer { port: NGAP_PORT, protocol: Protocol::Sctp }),
    relation_env,
};

fn relation_env(_: &RelationState) -> Result<BTreeMap<String, String>, ValidationError> {
    Ok(BTreeMap::new())
}
