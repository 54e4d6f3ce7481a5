pub mod list;
pub mod run;

use std::path::Path;

use anyhow::Context;
use clap::ArgMatches;
use mattermost_channel_adapter::{load_config, MattermostConfig};

/// Load the configuration named by the global `--config` flag.
pub fn config_from(matches: &ArgMatches) -> anyhow::Result<MattermostConfig> {
    let path = matches
        .get_one::<String>("config")
        .context("config argument has a default value")?;
    load_config(Path::new(path)).with_context(|| format!("loading {}", path))
}
