use std::io::Write;

use clap::Args;
use snafu::ResultExt;

use crate::{
    cli::error::{self, Error},
    config::Config,
    relation,
    state::StoredState,
    variant::Variant,
};

#[derive(Args, Clone)]
pub struct StatusCommand {
    #[arg(long, help = "Print the relations still missing instead of the whole stored state.")]
    pub missing: bool,
}

impl StatusCommand {
    pub fn run(self, config: &Config) -> Result<(), Error> {
        let state = StoredState::load(&config.state_file_path)?;
        let output = render_status(&state, config.variant, self.missing)?;
        std::io::stdout().write_all(output.as_bytes()).context(error::WriteStdoutSnafu)
    }
}

/// Renders `state` as YAML, or with `missing` only the relations `variant`
/// still waits for.
fn render_status(state: &StoredState, variant: Variant, missing: bool) -> Result<String, Error> {
    if !missing {
        return serde_yaml::to_string(state).context(error::SerializeManifestSnafu { what: "state" });
    }

    let missing = state.relations.missing_relations(variant.required_relations());
    if missing.is_empty() {
        Ok("none\n".to_string())
    } else {
        Ok(format!("{}\n", relation::waiting_message(&missing)))
    }
}
