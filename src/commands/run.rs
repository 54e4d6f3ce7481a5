use anyhow::Context;
use clap::ArgMatches;
use mattermost_channel_adapter::MattermostActions;

pub async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = super::config_from(matches)?;
    let action = matches
        .get_one::<String>("action")
        .context("action argument is required")?;
    let raw_params = matches
        .get_one::<String>("params")
        .context("params has a default value")?;
    let params: serde_json::Value =
        serde_json::from_str(raw_params).context("--params must be a JSON object")?;
    anyhow::ensure!(params.is_object(), "--params must be a JSON object");
    let account = matches.get_one::<String>("account").map(String::as_str);

    let result = MattermostActions::new()
        .handle_action(action, &params, &config, account)
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
