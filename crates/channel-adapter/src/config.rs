use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ActionError;
use crate::types::ActionGate;

/// Integration-level Mattermost configuration.
///
/// The top-level fields describe the default account. Entries under
/// `accounts` describe additional bot identities and inherit any field
/// they leave unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MattermostConfig {
    /// `Some(false)` disables the whole integration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Display name for the default account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Bot token. Literal value or `env:VAR_NAME`.
    #[serde(default, alias = "botToken", skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    /// Server URL (e.g. "https://mattermost.example.com").
    #[serde(default, alias = "baseUrl", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Which action groups are advertised to the host.
    #[serde(default)]
    pub actions: ActionGates,
    /// Account used when a call does not name one.
    #[serde(
        default,
        alias = "defaultAccount",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_account: Option<String>,
    /// Named accounts, keyed by account id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub accounts: BTreeMap<String, AccountConfig>,
}

/// Per-account overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "botToken", skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    #[serde(default, alias = "baseUrl", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Settings this adapter does not interpret, carried for the host.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Action group switches. Absent or `true` means enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pins: Option<bool>,
}

impl ActionGates {
    pub fn is_enabled(&self, gate: ActionGate) -> bool {
        let flag = match gate {
            ActionGate::Reactions => self.reactions,
            ActionGate::Messages => self.messages,
            ActionGate::Pins => self.pins,
        };
        flag != Some(false)
    }
}

/// Resolve a secret value that may reference an environment variable.
///
/// `env:VAR_NAME` reads the variable and yields `None` when it is unset;
/// any other value is returned as-is.
pub fn resolve_secret(value: &str) -> Option<String> {
    match value.strip_prefix("env:") {
        Some(var_name) => std::env::var(var_name.trim()).ok(),
        None => Some(value.to_string()),
    }
}

/// Load a Mattermost configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<MattermostConfig, ActionError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ActionError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;

    parse_config(&content)
        .map_err(|e| ActionError::Config(format!("failed to parse {}: {}", path.display(), e)))
}

/// Parse a Mattermost configuration from TOML text.
pub fn parse_config(content: &str) -> Result<MattermostConfig, toml::de::Error> {
    toml::from_str(content)
}
