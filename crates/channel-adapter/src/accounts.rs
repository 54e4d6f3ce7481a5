//! Account resolution from integration configuration.

use crate::config::{resolve_secret, AccountConfig, MattermostConfig};
use crate::error::ActionError;

pub const DEFAULT_ACCOUNT_ID: &str = "default";

const ENV_BOT_TOKEN: &str = "MATTERMOST_BOT_TOKEN";
const ENV_BASE_URL: &str = "MATTERMOST_URL";

/// One bot identity with its merged settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAccount {
    pub account_id: String,
    pub name: Option<String>,
    pub bot_token: String,
    pub base_url: String,
    pub enabled: bool,
    /// Merged per-account settings.
    pub config: AccountConfig,
}

impl ResolvedAccount {
    /// Both a token and a server URL are present.
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.base_url.is_empty()
    }

    pub fn is_usable(&self) -> bool {
        self.enabled && self.is_configured()
    }
}

/// Account ids in configuration order. Without named accounts the
/// integration-level settings form the single default account.
pub fn list_account_ids(config: &MattermostConfig) -> Vec<String> {
    if config.accounts.is_empty() {
        return vec![DEFAULT_ACCOUNT_ID.to_string()];
    }
    config.accounts.keys().cloned().collect()
}

pub fn default_account_id(config: &MattermostConfig) -> String {
    if let Some(id) = config
        .default_account
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
    {
        return id.to_string();
    }
    let ids = list_account_ids(config);
    if ids.iter().any(|id| id == DEFAULT_ACCOUNT_ID) {
        return DEFAULT_ACCOUNT_ID.to_string();
    }
    ids.into_iter()
        .next()
        .unwrap_or_else(|| DEFAULT_ACCOUNT_ID.to_string())
}

/// Accounts that are enabled and carry both a token and a server URL.
pub fn list_enabled_accounts(config: &MattermostConfig) -> Vec<ResolvedAccount> {
    list_account_ids(config)
        .iter()
        .filter_map(|id| resolve_account(config, Some(id.as_str())).ok())
        .filter(ResolvedAccount::is_usable)
        .collect()
}

/// Resolve one account, falling back to the default account id.
///
/// Credential problems are not reported here; callers that need a usable
/// account check [`ResolvedAccount::is_usable`].
pub fn resolve_account(
    config: &MattermostConfig,
    account_id: Option<&str>,
) -> Result<ResolvedAccount, ActionError> {
    let account_id = match account_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => default_account_id(config),
    };

    let overrides = if config.accounts.is_empty() {
        if account_id != DEFAULT_ACCOUNT_ID {
            return Err(unknown_account(&account_id));
        }
        AccountConfig::default()
    } else {
        config
            .accounts
            .get(&account_id)
            .cloned()
            .ok_or_else(|| unknown_account(&account_id))?
    };

    let is_default = account_id == DEFAULT_ACCOUNT_ID;
    let bot_token = merged_secret(
        overrides.bot_token.as_deref(),
        config.bot_token.as_deref(),
        is_default.then_some(ENV_BOT_TOKEN),
    );
    let base_url = merged_secret(
        overrides.base_url.as_deref(),
        config.base_url.as_deref(),
        is_default.then_some(ENV_BASE_URL),
    );
    let enabled = config.enabled != Some(false) && overrides.enabled != Some(false);
    let name = overrides
        .name
        .clone()
        .or_else(|| config.name.clone())
        .filter(|name| !name.trim().is_empty());

    let merged = AccountConfig {
        enabled: Some(enabled),
        name: name.clone(),
        bot_token: Some(bot_token.clone()),
        base_url: Some(base_url.clone()),
        extra: overrides.extra,
    };

    Ok(ResolvedAccount {
        account_id,
        name,
        bot_token,
        base_url,
        enabled,
        config: merged,
    })
}

fn unknown_account(account_id: &str) -> ActionError {
    ActionError::Config(format!(
        "Mattermost account '{}' is not configured",
        account_id
    ))
}

/// Account value, then integration value, then the environment variable.
fn merged_secret(account: Option<&str>, base: Option<&str>, env_var: Option<&str>) -> String {
    account
        .or(base)
        .and_then(resolve_secret)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| {
            env_var
                .and_then(|var| std::env::var(var).ok())
                .map(|value| value.trim().to_string())
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn single(token: &str, url: &str) -> MattermostConfig {
        MattermostConfig {
            bot_token: Some(token.to_string()),
            base_url: Some(url.to_string()),
            ..MattermostConfig::default()
        }
    }

    fn account(token: Option<&str>, enabled: Option<bool>) -> AccountConfig {
        AccountConfig {
            enabled,
            bot_token: token.map(str::to_string),
            ..AccountConfig::default()
        }
    }

    #[test]
    fn single_account_is_default() {
        let config = single("t", "https://h/");
        let account = resolve_account(&config, None).unwrap();
        assert_eq!(account.account_id, DEFAULT_ACCOUNT_ID);
        assert_eq!(account.bot_token, "t");
        assert_eq!(account.base_url, "https://h/");
        assert!(account.is_usable());
    }

    #[test]
    fn named_accounts_inherit_base_fields() {
        let mut config = single("base-token", "https://mm.example.com");
        config.accounts = BTreeMap::from([
            ("ops".to_string(), account(None, None)),
            ("alerts".to_string(), account(Some("alerts-token"), None)),
        ]);

        let ops = resolve_account(&config, Some("ops")).unwrap();
        assert_eq!(ops.bot_token, "base-token");
        assert_eq!(ops.base_url, "https://mm.example.com");

        let alerts = resolve_account(&config, Some("alerts")).unwrap();
        assert_eq!(alerts.bot_token, "alerts-token");
    }

    #[test]
    fn enabled_accounts_keep_config_order_and_skip_unusable() {
        let mut config = MattermostConfig {
            base_url: Some("https://mm.example.com".to_string()),
            ..MattermostConfig::default()
        };
        config.accounts = BTreeMap::from([
            ("zeta".to_string(), account(Some("z"), None)),
            ("alpha".to_string(), account(Some("a"), None)),
            ("off".to_string(), account(Some("o"), Some(false))),
            ("empty".to_string(), account(None, None)),
        ]);

        let ids: Vec<_> = list_enabled_accounts(&config)
            .into_iter()
            .map(|a| a.account_id)
            .collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }

    #[test]
    fn integration_disable_disables_every_account() {
        let mut config = single("t", "https://h");
        config.enabled = Some(false);
        config.accounts = BTreeMap::from([("ops".to_string(), account(None, Some(true)))]);
        assert!(list_enabled_accounts(&config).is_empty());
    }

    #[test]
    fn default_account_setting_wins() {
        let mut config = single("t", "https://h");
        config.default_account = Some("ops".to_string());
        config.accounts = BTreeMap::from([
            ("default".to_string(), account(None, None)),
            ("ops".to_string(), account(Some("ops-token"), None)),
        ]);
        assert_eq!(resolve_account(&config, None).unwrap().account_id, "ops");
    }

    #[test]
    fn first_named_account_when_no_default() {
        let mut config = single("t", "https://h");
        config.accounts = BTreeMap::from([
            ("beta".to_string(), account(None, None)),
            ("alpha".to_string(), account(None, None)),
        ]);
        assert_eq!(default_account_id(&config), "alpha");
    }

    #[test]
    fn unknown_account_is_config_error() {
        let config = single("t", "https://h");
        let err = resolve_account(&config, Some("ghost")).unwrap_err();
        assert!(matches!(err, ActionError::Config(ref msg) if msg.contains("ghost")));
    }

    #[test]
    fn missing_default_account_is_config_error() {
        let mut config = single("t", "https://h");
        config.default_account = Some("missing".to_string());
        config.accounts = BTreeMap::from([("ops".to_string(), account(None, None))]);
        assert!(resolve_account(&config, None).is_err());
    }

    #[test]
    fn blank_account_id_uses_default() {
        let config = single("t", "https://h");
        let account = resolve_account(&config, Some("  ")).unwrap();
        assert_eq!(account.account_id, DEFAULT_ACCOUNT_ID);
    }

    #[test]
    fn env_token_reference_is_resolved() {
        std::env::set_var("MM_ACTIONS_TEST_OPS_TOKEN", "secret-from-env");
        let mut config = single("t", "https://h");
        config.accounts = BTreeMap::from([(
            "ops".to_string(),
            account(Some("env:MM_ACTIONS_TEST_OPS_TOKEN"), None),
        )]);
        let ops = resolve_account(&config, Some("ops")).unwrap();
        assert_eq!(ops.bot_token, "secret-from-env");
        std::env::remove_var("MM_ACTIONS_TEST_OPS_TOKEN");
    }

    #[test]
    fn named_account_without_token_is_not_usable() {
        let mut config = MattermostConfig {
            base_url: Some("https://h".to_string()),
            ..MattermostConfig::default()
        };
        config.accounts = BTreeMap::from([("ops".to_string(), account(None, None))]);
        let ops = resolve_account(&config, Some("ops")).unwrap();
        assert!(!ops.is_configured());
        assert!(list_enabled_accounts(&config).is_empty());
    }
}
