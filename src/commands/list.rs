use clap::ArgMatches;
use mattermost_channel_adapter::{list_actions, list_enabled_accounts};

pub async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = super::config_from(matches)?;

    let accounts = list_enabled_accounts(&config);
    if accounts.is_empty() {
        println!("No usable Mattermost account (check bot_token and base_url)");
        return Ok(());
    }
    for account in &accounts {
        println!(
            "account {}  {}",
            account.account_id,
            account.name.as_deref().unwrap_or(&account.base_url)
        );
    }

    let actions: Vec<&str> = list_actions(&config).iter().map(|a| a.as_str()).collect();
    println!("actions: {}", actions.join(", "));
    Ok(())
}
