//! Command line driver of the free5GC charms.
//!
//! Each invocation delivers at most one hook. The charm state is loaded from
//! and saved back to the state file around it, so a charm runtime (or an
//! operator at a shell) can drive the charm one event at a time.
//!
//! # Examples
//!
//! ```bash
//! # Announce the NRF to a UDR charm
//! free5gc-charm dispatch --leader --event nrf-relation-changed \
//!     --remote-app nrf --data hostname=nrf
//!
//! # Print the pod spec the charm would apply
//! free5gc-charm render
//!
//! # Print the Kubernetes manifests the charm would apply
//! free5gc-charm render --kubernetes
//!
//! # Show what the charm remembers
//! free5gc-charm status
//! ```

mod dispatch;
pub mod error;
mod render;
mod status;

use std::{io::Write, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use free5gc_charm_base::CLI_PROGRAM_NAME;
use snafu::ResultExt;
use tokio::runtime::Runtime;

pub use self::{
    dispatch::{DispatchCommand, ParseRelationDatumError, RelationDatum},
    error::Error,
    render::RenderCommand,
    status::StatusCommand,
};
use crate::{config::Config, shadow};

#[derive(Parser)]
#[command(
    name = CLI_PROGRAM_NAME,
    author,
    version,
    long_version = shadow::CLAP_LONG_VERSION,
    about = "Kubernetes charm operators for the free5GC AMF, PCF and UDR network functions.",
    long_about = "Delivers charm hooks to a free5GC network function charm. Each hook updates \
                  the charm's stored relation data and, when the workload is configurable, \
                  assembles its pod spec and applies it to Kubernetes as a deployment and \
                  services.",
    color = clap::ColorChoice::Always
)]
pub struct Cli {
    #[clap(subcommand)]
    commands: Option<Commands>,

    #[clap(
        long = "config",
        short = 'c',
        env = "FREE5GC_CHARM_CONFIG_FILE_PATH",
        help = "Specify a configuration file. Defaults to ~/.config/free5gc-charm/config.yaml or \
                FREE5GC_CHARM_CONFIG_FILE_PATH env var."
    )]
    config_file: Option<PathBuf>,

    #[clap(
        long = "log-level",
        env = "FREE5GC_CHARM_LOG_LEVEL",
        help = "Set the logging level (e.g., info, debug, trace)."
    )]
    log_level: Option<tracing::Level>,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Display client and server version information")]
    Version {
        #[clap(long = "client", help = "If true, shows client version only (no server required).")]
        client: bool,
    },

    #[command(about = "Generate shell completion script for the specified shell (bash, zsh, fish)")]
    Completions { shell: clap_complete::Shell },

    #[command(about = "Output the default configuration in YAML format")]
    DefaultConfig,

    #[command(alias = "d", about = "Deliver one hook to the charm and apply the result")]
    Dispatch(DispatchCommand),

    #[command(alias = "r", about = "Print the pod spec the charm would apply")]
    Render(RenderCommand),

    #[command(alias = "s", about = "Print the stored charm state")]
    Status(StatusCommand),
}

impl Default for Cli {
    fn default() -> Self { Self::parse() }
}

impl Cli {
    fn load_config(&self) -> Result<Config, Error> {
        let mut config =
            Config::load(self.config_file.clone().unwrap_or_else(Config::search_config_file_path))?;

        if let Some(log_level) = self.log_level {
            config.log.level = log_level;
        }

        Ok(config)
    }

    /// Runs the selected subcommand and returns the process exit code.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration or state cannot be loaded, the
    /// Kubernetes client cannot be set up, or the subcommand fails.
    pub fn run(self) -> Result<i32, Error> {
        let client_version = Self::command().get_version().unwrap_or_default().to_string();
        match self.commands {
            Some(Commands::Version { client }) if client => {
                write_stdout(Self::command().render_long_version().as_bytes())?;
                write_stdout(format!("Client Version: {client_version}\n").as_bytes())?;
                return Ok(0);
            }
            Some(Commands::Completions { shell }) => {
                let mut app = Self::command();
                let bin_name = app.get_name().to_string();
                clap_complete::generate(shell, &mut app, bin_name, &mut std::io::stdout());
                return Ok(0);
            }
            Some(Commands::DefaultConfig) => {
                write_stdout(Config::template_basic()?.as_bytes())?;
                return Ok(0);
            }
            None => {
                let help = Self::command().render_long_help().ansi().to_string();
                std::io::stderr().write_all(help.as_bytes()).context(error::WriteStdoutSnafu)?;
                return Ok(-1);
            }
            _ => {}
        }

        let config = self.load_config()?;
        config.log.registry();

        match self.commands {
            Some(Commands::Render(cmd)) => cmd.run(&config)?,
            Some(Commands::Status(cmd)) => cmd.run(&config)?,
            Some(Commands::Version { .. }) => {
                let fut = async move {
                    let kube_client =
                        kube::Client::try_default().await.context(error::KubeConfigSnafu)?;
                    let server_version = kube_client.apiserver_version().await.map_or_else(
                        |_| "unknown".to_string(),
                        |info| format!("{}.{}", info.major, info.minor),
                    );
                    write_stdout(Self::command().render_long_version().as_bytes())?;
                    write_stdout(
                        format!(
                            "Client Version: {client_version}\nServer Version: {server_version}\n"
                        )
                        .as_bytes(),
                    )
                };
                Runtime::new().context(error::InitializeTokioRuntimeSnafu)?.block_on(fut)?;
            }
            Some(Commands::Dispatch(cmd)) => {
                let fut = async move {
                    let kube_client =
                        kube::Client::try_default().await.context(error::KubeConfigSnafu)?;
                    cmd.run(kube_client, config).await
                };
                Runtime::new().context(error::InitializeTokioRuntimeSnafu)?.block_on(fut)?;
            }
            Some(Commands::Completions { .. } | Commands::DefaultConfig) | None => {}
        }

        Ok(0)
    }
}

fn write_stdout(data: &[u8]) -> Result<(), Error> {
    std::io::stdout().write_all(data).context(error::WriteStdoutSnafu)
}
