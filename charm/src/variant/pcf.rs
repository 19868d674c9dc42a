use std::collections::BTreeMap;

use crate::{
    pod_spec::{Blueprint, ValidationError},
    relation::{RelationSpec, RelationState},
};

pub static BLUEPRINT: Blueprint = Blueprint {
    name: "pcf",
    port: 29507,
    required_relations: &[RelationSpec::hostname("nrf"), RelationSpec::hostname("amf")],
    provided_relations: &[],
    init_endpoints: &[("nrf-endpoints", 29510), ("amf-endpoints", 29518)],
    load_balancer: None,
    relation_env,
};

fn relation_env(_: &RelationState) -> Result<BTreeMap<String, String>, ValidationError> {
    Ok(BTreeMap::new())
}

#[cfg(test)]
mod tests {
    use crate::{
        config::{CharmOptions, ImagePullPolicy},
        image::ImageDetails,
        relation::RelationState,
        variant::Variant,
    };

    #[test]
    fn test_make_pod_spec_prepends_init_container() {
        let image = ImageDetails {
            image_path: "localhost:32000/free5gc-pcf:1.0".to_string(),
            username: None,
            password: None,
        };
        let pod_spec = Variant::Pcf
            .build_pod_spec(Some(&image), &CharmOptions::default(), &RelationState::default(), "pcf")
            .unwrap()
            .unwrap();

        assert_eq!(pod_spec.containers.len(), 2);
        assert!(pod_spec.kubernetes_resources.is_none());

        let init = &pod_spec.containers[0];
        assert!(init.init);
        assert_eq!(init.name, "pcf-init");
        assert_eq!(init.image.as_deref(), Some("busybox:1.28"));
        assert_eq!(
            init.command,
            [
                "sh",
                "-c",
                "until(nc -zvw1 nrf-endpoints 29510 && nc -zvw1 amf-endpoints 29518); do echo \
                 waiting; sleep 2; done",
            ]
        );

        let workload = &pod_spec.containers[1];
        assert!(!workload.init);
        assert_eq!(workload.name, "pcf");
        assert_eq!(workload.image_pull_policy, Some(ImagePullPolicy::Always));
        assert_eq!(workload.ports[0].container_port, 29507);
        assert_eq!(workload.command, ["./pcf", "-pcfcfg", "../config/pcfcfg.conf", "&"]);
    }
}
