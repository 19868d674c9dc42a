//! Delivers one hook to the charm, the way a charm runtime invokes a charm
//! executable once per hook.

use std::{io::Write, path::Path, str::FromStr};

use clap::{ArgAction, Args};
use free5gc_charm_base::consts::{HOOK_NAME_ENV, REMOTE_APP_ENV};
use snafu::{OptionExt, ResultExt, Snafu, ensure};

use crate::{
    cli::error::{self, Error},
    config::Config,
    operator::{Charm, Event, Hook, Model, UnitStatus},
    platform::KubeModel,
    relation::RelationData,
    state::StoredState,
    variant::Variant,
};

#[derive(Args, Clone)]
pub struct DispatchCommand {
    #[arg(
        short = 'e',
        long = "event",
        env = HOOK_NAME_ENV,
        help = "Hook to deliver, e.g. config-changed or nrf-relation-changed."
    )]
    pub hook: Hook,

    #[arg(
        long = "remote-app",
        env = REMOTE_APP_ENV,
        help = "Remote application of a relation hook."
    )]
    pub remote_app: Option<String>,

    #[arg(
        short,
        long = "data",
        action = ArgAction::Append,
        help = "Relation data published by the remote application, as key=value. Omit to \
                signal that the remote application published nothing."
    )]
    pub data: Vec<RelationDatum>,

    #[arg(long, help = "Whether this unit is the leader of its application.")]
    pub leader: bool,

    #[arg(
        short,
        long,
        help = "Kubernetes namespace of the workload. Defaults to the configured namespace, then \
                to the current Kubernetes context's namespace."
    )]
    pub namespace: Option<String>,
}

impl DispatchCommand {
    pub async fn run(self, kube_client: kube::Client, config: Config) -> Result<(), Error> {
        let Self { hook, remote_app, data, leader, namespace } = self;

        let namespace = namespace
            .or_else(|| config.namespace.clone())
            .unwrap_or_else(|| kube_client.default_namespace().to_string());
        let data = (!data.is_empty()).then(|| {
            data.into_iter().map(|RelationDatum { key, value }| (key, value)).collect::<RelationData>()
        });
        let event = Event::from_hook(hook, remote_app, data);

        tracing::info!("Delivering {event} to {} in namespace {namespace}", config.app_name());
        let mut model = KubeModel::new(
            kube_client,
            namespace,
            config.app_name().to_string(),
            leader,
            config.options.clone(),
            config.image_resource(),
        );

        let status = deliver(config.variant, &config.state_file_path, &mut model, &event).await?;
        if let Some(status) = status {
            std::io::stdout()
                .write_all(format!("{status}\n").as_bytes())
                .context(error::WriteStdoutSnafu)?;
        }
        Ok(())
    }
}

/// Loads the charm state saved at `state_file_path`, delivers `event` to a
/// `variant` charm running on `model` and saves the state back.
///
/// # Errors
///
/// Fails when the state cannot be loaded or saved. Whatever happens while
/// handling the event ends in the returned status instead.
pub async fn deliver<M: Model>(
    variant: Variant,
    state_file_path: &Path,
    model: &mut M,
    event: &Event,
) -> Result<Option<UnitStatus>, Error> {
    let state = StoredState::load(state_file_path)?;
    let mut charm = Charm::new(variant, state);
    let status = charm.handle(model, event).await;
    charm.into_state().save(state_file_path)?;
    Ok(status)
}

/// One `key=value` pair of relation data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelationDatum {
    pub key: String,
    pub value: String,
}

impl FromStr for RelationDatum {
    type Err = ParseRelationDatumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s.split_once('=').context(MissingSeparatorSnafu { value: s })?;
        ensure!(!key.is_empty(), EmptyKeySnafu { value: s });
        Ok(Self { key: key.to_string(), value: value.to_string() })
    }
}

#[derive(Debug, Snafu)]
pub enum ParseRelationDatumError {
    #[snafu(display("'{value}' is not a key=value pair"))]
    MissingSeparator { value: String },

    #[snafu(display("'{value}' has an empty key"))]
    EmptyKey { value: String },
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, convert::Infallible, path::PathBuf};

    use clap::Parser;

    use super::*;
    use crate::{
        config::CharmOptions,
        image::{ImageDetails, ImageFetchError},
        operator::EventKind,
        pod_spec::PodSpec,
    };

    /// A cluster that accepts every pod spec, fresh for every invocation.
    struct MemoryModel {
        options: CharmOptions,
        applied: Vec<PodSpec>,
    }

    impl MemoryModel {
        fn new() -> Self { Self { options: CharmOptions::default(), applied: Vec::new() } }
    }

    impl Model for MemoryModel {
        type Error = Infallible;

        fn app_name(&self) -> &str { "udr" }

        fn is_leader(&self) -> bool { true }

        fn options(&self) -> &CharmOptions { &self.options }

        fn fetch_image(&self) -> Result<ImageDetails, ImageFetchError> {
            Ok(ImageDetails {
                image_path: "localhost:32000/free5gc-udr:1.0".to_string(),
                username: None,
                password: None,
            })
        }

        async fn set_pod_spec(&mut self, pod_spec: &PodSpec) -> Result<(), Self::Error> {
            self.applied.push(pod_spec.clone());
            Ok(())
        }

        fn set_status(&mut self, _status: &UnitStatus) {}

        fn publish_relation_data(&mut self, _relation: &str, _data: &BTreeMap<String, String>) {}
    }

    fn state_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("free5gc-charm-dispatch-{}-{name}", std::process::id()))
            .join("state.json")
    }

    fn changed(relation: &str, pairs: &[(&str, &str)]) -> Event {
        let data = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        Event::relation_changed(relation, relation, Some(data))
    }

    #[tokio::test]
    async fn test_state_persists_across_invocations() {
        let path = state_file("persist");

        let nrf = changed("nrf", &[("hostname", "nrf")]);
        let mut model = MemoryModel::new();
        let status = deliver(Variant::Udr, &path, &mut model, &nrf).await.unwrap();
        assert_eq!(status, Some(UnitStatus::blocked("Waiting for mongodb relation")));
        assert_eq!(StoredState::load(&path).unwrap().relations.hostname("nrf"), Some("nrf"));

        let mongodb = changed(
            "mongodb",
            &[("hostname", "mongodb"), ("mongodb_uri", "mongodb://mongodb/free5gc")],
        );
        let mut model = MemoryModel::new();
        let status = deliver(Variant::Udr, &path, &mut model, &mongodb).await.unwrap();
        assert_eq!(status, Some(UnitStatus::active("ready")));
        assert_eq!(model.applied.len(), 1);

        let state = StoredState::load(&path).unwrap();
        assert_eq!(state.pod_spec.as_ref(), model.applied.first());
        assert_eq!(state.status, status);

        let update_status = Event::lifecycle(EventKind::UpdateStatus);
        let mut model = MemoryModel::new();
        let status = deliver(Variant::Udr, &path, &mut model, &update_status).await.unwrap();
        assert_eq!(status, Some(UnitStatus::active("ready")));
        assert!(model.applied.is_empty());

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_unreadable_state_is_an_error() {
        let path = state_file("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let mut model = MemoryModel::new();
        let err = deliver(Variant::Amf, &path, &mut model, &Event::lifecycle(EventKind::Start))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::State { .. }));
        assert!(model.applied.is_empty());

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        dispatch: DispatchCommand,
    }

    #[test]
    fn test_parse_relation_datum() {
        let datum = "mongodb_uri=mongodb://mongodb/free5gc?w=1".parse::<RelationDatum>().unwrap();
        assert_eq!(datum.key, "mongodb_uri");
        assert_eq!(datum.value, "mongodb://mongodb/free5gc?w=1");

        let datum = "hostname=".parse::<RelationDatum>().unwrap();
        assert_eq!(datum.value, "");

        assert!("hostname".parse::<RelationDatum>().is_err());
        assert!("=nrf".parse::<RelationDatum>().is_err());
    }

    #[test]
    fn test_parse_arguments() {
        let cli = TestCli::try_parse_from([
            "dispatch",
            "--event",
            "mongodb-relation-changed",
            "--remote-app",
            "mongodb",
            "-d",
            "hostname=mongodb",
            "-d",
            "mongodb_uri=mongodb://mongodb/free5gc",
            "--leader",
        ])
        .unwrap();

        let DispatchCommand { hook, remote_app, data, leader, namespace } = cli.dispatch;
        assert_eq!(hook.kind, EventKind::RelationChanged);
        assert_eq!(hook.relation.as_deref(), Some("mongodb"));
        assert_eq!(remote_app.as_deref(), Some("mongodb"));
        assert_eq!(data.len(), 2);
        assert!(leader);
        assert_eq!(namespace, None);
    }
}
