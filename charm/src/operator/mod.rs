//! Event handling for a network function charm.
//!
//! Every event is routed through [`DISPATCH_TABLE`] to a handler which
//! updates the stored state and tells the charm what to do next. Whatever
//! the event, configuring the pod is the same one-shot sequence: check the
//! required relations, check leadership, fetch the image, build the pod spec
//! and apply it when it differs from the last one applied. Every outcome ends
//! in a unit status; nothing is propagated to the caller.

mod event;
mod model;
mod status;

use std::collections::BTreeMap;

pub use self::{
    event::{Event, EventKind, Hook, ParseHookError, RelationContext},
    model::Model,
    status::UnitStatus,
};
use crate::{
    consts::{self, relation_keys},
    relation,
    state::StoredState,
    variant::Variant,
};

const ASSEMBLING_POD_SPEC: &str = "Assembling pod spec";
const FETCHING_IMAGE: &str = "Fetching image information";
const FETCH_IMAGE_FAILED: &str = "Error fetching image information";
const WAITING_FOR_IMAGE: &str = "Waiting for image information";
const APPLY_FAILED: &str = "Failed to apply pod spec";

/// Follow-up work requested by an event handler.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reaction {
    /// Run the configure sequence.
    Configure,

    /// Publish this unit's hostname on the provided relations.
    Publish,
}

/// An event handler. An empty reaction list means the event is ignored.
type Handler = fn(&mut Charm, &Event) -> &'static [Reaction];

const DISPATCH_TABLE: [(EventKind, Handler); 8] = [
    (EventKind::Start, Charm::on_configure_event),
    (EventKind::ConfigChanged, Charm::on_configure_event),
    (EventKind::UpgradeCharm, Charm::on_configure_event),
    (EventKind::UpdateStatus, Charm::on_configure_event),
    (EventKind::LeaderElected, Charm::on_leader_elected),
    (EventKind::RelationJoined, Charm::on_relation_joined),
    (EventKind::RelationChanged, Charm::on_relation_changed),
    (EventKind::RelationDeparted, Charm::on_relation_departed),
];

/// One network function charm together with the state it owns.
#[derive(Clone, Debug)]
pub struct Charm {
    variant: Variant,
    state: StoredState,
}

impl Charm {
    #[must_use]
    pub const fn new(variant: Variant, state: StoredState) -> Self { Self { variant, state } }

    #[must_use]
    pub const fn variant(&self) -> Variant { self.variant }

    #[must_use]
    pub const fn state(&self) -> &StoredState { &self.state }

    #[must_use]
    pub fn into_state(self) -> StoredState { self.state }

    /// Delivers `event` and runs the reactions its handler asks for.
    ///
    /// Returns the status the configure sequence ended with, or `None` when
    /// the event did not lead to a configure.
    pub async fn handle<M: Model>(&mut self, model: &mut M, event: &Event) -> Option<UnitStatus> {
        if event.kind.is_relation() && event.relation.is_none() {
            tracing::warn!("Event {event} names no relation, ignoring");
            return None;
        }
        let handler = DISPATCH_TABLE
            .iter()
            .find_map(|(kind, handler)| (*kind == event.kind).then_some(*handler))?;

        tracing::info!("Handling event {event} on {}", self.variant);
        let mut status = None;
        for reaction in handler(self, event) {
            match reaction {
                Reaction::Publish => self.publish(model, event.relation_name()),
                Reaction::Configure => status = Some(self.configure_pod(model).await),
            }
        }
        status
    }

    /// Runs the configure sequence and reports its outcome as the unit
    /// status.
    pub async fn configure_pod<M: Model>(&mut self, model: &mut M) -> UnitStatus {
        let missing = self.state.relations.missing_relations(self.variant.required_relations());
        if !missing.is_empty() {
            return self.update_status(model, UnitStatus::blocked(relation::waiting_message(&missing)));
        }

        if !model.is_leader() {
            tracing::debug!("Unit is not the leader, leaving the pod spec alone");
            return self.update_status(model, UnitStatus::active(consts::READY));
        }

        let _assembling = self.update_status(model, UnitStatus::maintenance(ASSEMBLING_POD_SPEC));
        let status = self.apply_pod_spec(model).await;
        self.update_status(model, status)
    }

    /// Publishes `{hostname: <app name>}` on `relation`, or on every provided
    /// relation when no particular one is named. Only the leader publishes.
    pub fn publish<M: Model>(&mut self, model: &mut M, relation: Option<&str>) {
        if !model.is_leader() {
            tracing::debug!("Unit is not the leader, not publishing relation data");
            return;
        }

        let data = BTreeMap::from([(relation_keys::HOSTNAME.to_string(), model.app_name().to_string())]);
        let relations = self
            .variant
            .provided_relations()
            .iter()
            .filter(|provided| relation.is_none_or(|relation| relation == **provided));
        for provided in relations {
            model.publish_relation_data(provided, &data);
            tracing::info!("Published hostname {} on relation {provided}", model.app_name());
            let _previous = self.state.published.insert((*provided).to_string(), data.clone());
        }
    }

    async fn apply_pod_spec<M: Model>(&mut self, model: &mut M) -> UnitStatus {
        let _fetching = self.update_status(model, UnitStatus::maintenance(FETCHING_IMAGE));
        let image = match model.fetch_image() {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!("{err}");
                return UnitStatus::blocked(FETCH_IMAGE_FAILED);
            }
        };

        let pod_spec = match self.variant.build_pod_spec(
            Some(&image),
            model.options(),
            &self.state.relations,
            model.app_name(),
        ) {
            Ok(Some(pod_spec)) => pod_spec,
            Ok(None) => return UnitStatus::maintenance(WAITING_FOR_IMAGE),
            Err(err) => {
                tracing::warn!("Invalid pod spec for {}, error: {err}", model.app_name());
                return UnitStatus::blocked(err.to_string());
            }
        };

        if self.state.pod_spec.as_ref() == Some(&pod_spec) {
            tracing::info!("Pod spec of {} is unchanged, not applying", model.app_name());
            return UnitStatus::active(consts::READY);
        }

        if let Err(err) = model.set_pod_spec(&pod_spec).await {
            tracing::error!("Failed to apply pod spec of {}, error: {err}", model.app_name());
            return UnitStatus::blocked(APPLY_FAILED);
        }
        self.state.pod_spec = Some(pod_spec);
        UnitStatus::active(consts::READY)
    }

    fn update_status<M: Model>(&mut self, model: &mut M, status: UnitStatus) -> UnitStatus {
        model.set_status(&status);
        self.state.status = Some(status.clone());
        status
    }

    fn on_configure_event(&mut self, _event: &Event) -> &'static [Reaction] { &[Reaction::Configure] }

    fn on_leader_elected(&mut self, _event: &Event) -> &'static [Reaction] {
        &[Reaction::Publish, Reaction::Configure]
    }

    fn on_relation_joined(&mut self, event: &Event) -> &'static [Reaction] {
        match event.relation_name() {
            Some(name) if self.variant.provides(name) => &[Reaction::Publish],
            _ => &[],
        }
    }

    fn on_relation_changed(&mut self, event: &Event) -> &'static [Reaction] {
        let Some((spec, context)) = self.declared_relation(event) else {
            return &[];
        };
        if self.state.relations.on_relation_changed(spec, context.data.as_ref()) {
            &[Reaction::Configure]
        } else {
            &[]
        }
    }

    fn on_relation_departed(&mut self, event: &Event) -> &'static [Reaction] {
        let Some((spec, _)) = self.declared_relation(event) else {
            return &[];
        };
        if self.state.relations.on_relation_departed(spec) { &[Reaction::Configure] } else { &[] }
    }

    fn declared_relation<'a>(
        &self,
        event: &'a Event,
    ) -> Option<(&'static relation::RelationSpec, &'a RelationContext)> {
        let context = event.relation.as_ref()?;
        let spec = self.variant.relation(&context.name);
        if spec.is_none() {
            tracing::debug!("Relation {} is not consumed by {}, ignoring", context.name, self.variant);
        }
        spec.map(|spec| (spec, context))
    }
}

#[cfg(test)]
mod tests {
    use snafu::Snafu;

    use super::*;
    use crate::{
        config::CharmOptions,
        image::{ImageDetails, ImageFetchError, ImageResource},
        pod_spec::PodSpec,
        relation::RelationData,
    };

    #[derive(Debug, Snafu)]
    enum FakeError {
        #[snafu(display("Pod spec rejected"))]
        Rejected,
    }

    struct FakeModel {
        app_name: String,
        leader: bool,
        options: CharmOptions,
        image: Option<ImageDetails>,
        reject_pod_spec: bool,
        applied: Vec<PodSpec>,
        statuses: Vec<UnitStatus>,
        published: Vec<(String, BTreeMap<String, String>)>,
    }

    impl FakeModel {
        fn new(app_name: &str) -> Self {
            Self {
                app_name: app_name.to_string(),
                leader: true,
                options: CharmOptions::default(),
                image: Some(ImageDetails {
                    image_path: format!("localhost:32000/free5gc-{app_name}:1.0"),
                    username: None,
                    password: None,
                }),
                reject_pod_spec: false,
                applied: Vec::new(),
                statuses: Vec::new(),
                published: Vec::new(),
            }
        }

        fn follower(app_name: &str) -> Self { Self { leader: false, ..Self::new(app_name) } }
    }

    impl Model for FakeModel {
        type Error = FakeError;

        fn app_name(&self) -> &str { &self.app_name }

        fn is_leader(&self) -> bool { self.leader }

        fn options(&self) -> &CharmOptions { &self.options }

        fn fetch_image(&self) -> Result<ImageDetails, ImageFetchError> {
            self.image.clone().ok_or(ImageFetchError::MissingResource)
        }

        async fn set_pod_spec(&mut self, pod_spec: &PodSpec) -> Result<(), Self::Error> {
            if self.reject_pod_spec {
                return RejectedSnafu.fail();
            }
            self.applied.push(pod_spec.clone());
            Ok(())
        }

        fn set_status(&mut self, status: &UnitStatus) { self.statuses.push(status.clone()); }

        fn publish_relation_data(&mut self, relation: &str, data: &BTreeMap<String, String>) {
            self.published.push((relation.to_string(), data.clone()));
        }
    }

    fn databag(pairs: &[(&str, &str)]) -> RelationData {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    fn nrf_changed() -> Event {
        Event::relation_changed("nrf", "nrf", Some(databag(&[("hostname", "nrf")])))
    }

    fn mongodb_changed(uri: &str) -> Event {
        Event::relation_changed(
            "mongodb",
            "mongodb",
            Some(databag(&[("hostname", "mongodb"), ("mongodb_uri", uri)])),
        )
    }

    fn charm(variant: Variant) -> Charm { Charm::new(variant, StoredState::default()) }

    #[tokio::test]
    async fn test_blocked_until_required_relations_are_ready() {
        let mut model = FakeModel::new("pcf");
        let mut charm = charm(Variant::Pcf);

        let status = charm.handle(&mut model, &Event::lifecycle(EventKind::Start)).await;
        assert_eq!(status, Some(UnitStatus::blocked("Waiting for nrf, amf relations")));

        let status = charm.handle(&mut model, &nrf_changed()).await;
        assert_eq!(status, Some(UnitStatus::blocked("Waiting for amf relation")));
        assert!(model.applied.is_empty());
        assert_eq!(charm.state().status, status);
    }

    #[tokio::test]
    async fn test_leader_applies_pod_spec_once() {
        let mut model = FakeModel::new("amf");
        let mut charm = charm(Variant::Amf);

        let status = charm.handle(&mut model, &nrf_changed()).await;
        assert_eq!(status, Some(UnitStatus::active("ready")));
        assert_eq!(model.applied.len(), 1);
        assert_eq!(
            model.statuses,
            [
                UnitStatus::maintenance("Assembling pod spec"),
                UnitStatus::maintenance("Fetching image information"),
                UnitStatus::active("ready"),
            ]
        );
        assert_eq!(charm.state().pod_spec.as_ref(), model.applied.first());

        let status = charm.handle(&mut model, &Event::lifecycle(EventKind::ConfigChanged)).await;
        assert_eq!(status, Some(UnitStatus::active("ready")));
        assert_eq!(model.applied.len(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_relation_data_does_not_reconfigure() {
        let mut model = FakeModel::new("amf");
        let mut charm = charm(Variant::Amf);

        assert!(charm.handle(&mut model, &nrf_changed()).await.is_some());
        assert_eq!(charm.handle(&mut model, &nrf_changed()).await, None);

        let incomplete = Event::relation_changed("nrf", "nrf", None);
        assert_eq!(charm.handle(&mut model, &incomplete).await, None);
    }

    #[tokio::test]
    async fn test_follower_never_applies() {
        let mut model = FakeModel::follower("amf");
        let mut charm = charm(Variant::Amf);

        let status = charm.handle(&mut model, &nrf_changed()).await;
        assert_eq!(status, Some(UnitStatus::active("ready")));
        let status = charm.handle(&mut model, &Event::lifecycle(EventKind::UpgradeCharm)).await;
        assert_eq!(status, Some(UnitStatus::active("ready")));

        assert!(model.applied.is_empty());
        assert!(model.statuses.iter().all(|status| *status == UnitStatus::active("ready")));
        assert!(charm.state().pod_spec.is_none());
    }

    #[tokio::test]
    async fn test_departed_relation_blocks() {
        let mut model = FakeModel::new("amf");
        let mut charm = charm(Variant::Amf);
        assert!(charm.handle(&mut model, &nrf_changed()).await.is_some());

        let status = charm
            .handle(&mut model, &Event::relation_departed("nrf", "nrf"))
            .await
            .unwrap();
        assert!(status.is_blocked());
        assert!(status.message().starts_with("Waiting for"));
        assert_eq!(charm.state().relations.hostname("nrf"), None);
    }

    #[tokio::test]
    async fn test_udr_scenario() {
        let mut model = FakeModel::new("udr");
        let mut charm = charm(Variant::Udr);

        let status = charm.handle(&mut model, &nrf_changed()).await;
        assert_eq!(status, Some(UnitStatus::blocked("Waiting for mongodb relation")));

        let status = charm.handle(&mut model, &mongodb_changed("mongodb://mongodb/free5gc")).await;
        assert_eq!(status, Some(UnitStatus::active("ready")));

        let pod_spec = &model.applied[0];
        assert_eq!(pod_spec.containers.len(), 1);
        let container = &pod_spec.containers[0];
        assert_eq!(
            container.env_config,
            databag(&[
                ("ALLOW_ANONYMOUS_LOGIN", "yes"),
                ("GIN_MODE", "release"),
                ("MONGODB_URI", "mongodb://mongodb/free5gc"),
            ])
        );
        assert_eq!(container.command, ["./udr", "-udrcfg", "../config/udrcfg.conf", "&"]);
    }

    #[tokio::test]
    async fn test_invalid_relation_data_blocks_with_message() {
        let mut model = FakeModel::new("udr");
        let mut charm = charm(Variant::Udr);
        assert!(charm.handle(&mut model, &nrf_changed()).await.is_some());

        let status = charm.handle(&mut model, &mongodb_changed("postgres://mongodb")).await;
        assert_eq!(status, Some(UnitStatus::blocked("mongodb_uri must start with 'mongodb://'")));
        assert!(model.applied.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_option_blocks_with_message() {
        let mut model = FakeModel::new("amf");
        model.options.gin_mode = Some("debug".to_string());
        let mut charm = charm(Variant::Amf);

        let status = charm.handle(&mut model, &nrf_changed()).await;
        assert_eq!(status, Some(UnitStatus::blocked("gin_mode must equal 'release'")));
        assert!(model.applied.is_empty());
    }

    #[tokio::test]
    async fn test_image_fetch_failure_blocks() {
        let mut model = FakeModel::new("amf");
        model.image = None;
        let mut charm = charm(Variant::Amf);

        let status = charm.handle(&mut model, &nrf_changed()).await;
        assert_eq!(status, Some(UnitStatus::blocked("Error fetching image information")));
    }

    #[tokio::test]
    async fn test_empty_image_waits() {
        let mut model = FakeModel::new("amf");
        model.image = Some(ImageDetails { image_path: String::new(), username: None, password: None });
        let mut charm = charm(Variant::Amf);

        let status = charm.handle(&mut model, &nrf_changed()).await;
        assert_eq!(status, Some(UnitStatus::maintenance("Waiting for image information")));
    }

    #[tokio::test]
    async fn test_unpublished_image_resource_waits() {
        let path = std::env::temp_dir()
            .join(format!("free5gc-charm-operator-{}-unpublished.yaml", std::process::id()));
        std::fs::write(&path, "registrypath: ''\n").unwrap();
        let image = ImageResource::new(Some(path.clone())).fetch();
        std::fs::remove_file(path).unwrap();

        let mut model = FakeModel::new("amf");
        model.image = Some(image.unwrap());
        let mut charm = charm(Variant::Amf);

        let status = charm.handle(&mut model, &nrf_changed()).await;
        assert_eq!(status, Some(UnitStatus::maintenance("Waiting for image information")));
        assert!(model.applied.is_empty());
        assert!(charm.state().pod_spec.is_none());
    }

    #[tokio::test]
    async fn test_rejected_pod_spec_is_retried() {
        let mut model = FakeModel::new("amf");
        model.reject_pod_spec = true;
        let mut charm = charm(Variant::Amf);

        let status = charm.handle(&mut model, &nrf_changed()).await;
        assert_eq!(status, Some(UnitStatus::blocked("Failed to apply pod spec")));
        assert!(charm.state().pod_spec.is_none());

        model.reject_pod_spec = false;
        let status = charm.handle(&mut model, &Event::lifecycle(EventKind::UpdateStatus)).await;
        assert_eq!(status, Some(UnitStatus::active("ready")));
        assert_eq!(model.applied.len(), 1);
    }

    #[tokio::test]
    async fn test_amf_publishes_hostname_on_join() {
        let mut model = FakeModel::new("amf");
        let mut charm = charm(Variant::Amf);

        let status = charm.handle(&mut model, &Event::relation_joined("amf", "pcf")).await;
        assert_eq!(status, None);

        let expected = databag(&[("hostname", "amf")]);
        assert_eq!(model.published, [("amf".to_string(), expected.clone())]);
        assert_eq!(charm.state().published.get("amf"), Some(&expected));

        let mut follower = FakeModel::follower("amf");
        let _status = charm.handle(&mut follower, &Event::relation_joined("amf", "pcf")).await;
        assert!(follower.published.is_empty());
    }

    #[tokio::test]
    async fn test_leader_elected_publishes_and_configures() {
        let mut model = FakeModel::new("amf");
        let mut charm = charm(Variant::Amf);

        let status = charm.handle(&mut model, &Event::lifecycle(EventKind::LeaderElected)).await;
        assert_eq!(status, Some(UnitStatus::blocked("Waiting for nrf relation")));
        assert_eq!(model.published.len(), 1);

        let mut model = FakeModel::new("pcf");
        let mut charm = Charm::new(Variant::Pcf, StoredState::default());
        let _status = charm.handle(&mut model, &Event::lifecycle(EventKind::LeaderElected)).await;
        assert!(model.published.is_empty());
    }

    #[tokio::test]
    async fn test_undeclared_relations_are_ignored() {
        let mut model = FakeModel::new("amf");
        let mut charm = charm(Variant::Amf);

        let event = Event::relation_changed("mongodb", "mongodb", Some(databag(&[("hostname", "db")])));
        assert_eq!(charm.handle(&mut model, &event).await, None);
        assert_eq!(charm.handle(&mut model, &Event::relation_departed("amf", "pcf")).await, None);
        assert!(charm.state().relations.is_empty());
        assert!(model.statuses.is_empty());
    }

    #[tokio::test]
    async fn test_relation_event_without_relation_is_ignored() {
        let mut model = FakeModel::new("amf");
        let mut charm = charm(Variant::Amf);

        let event = Event { kind: EventKind::RelationJoined, relation: None };
        assert_eq!(charm.handle(&mut model, &event).await, None);
        assert!(model.published.is_empty());
        assert!(model.statuses.is_empty());
    }
}
