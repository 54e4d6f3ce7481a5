//! Mattermost message actions.
//!
//! Advertises the actions permitted by configuration and executes them
//! against the Mattermost v4 REST API with bot token authentication.
//! Every call resolves its account and client afresh; nothing is cached.

pub mod api;
pub mod send;
pub mod target;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;

use crate::accounts::{list_enabled_accounts, resolve_account};
use crate::config::MattermostConfig;
use crate::error::ActionError;
use crate::normalize::{normalize_messages, normalize_pins, normalize_reactions};
use crate::params::{
    read_bool, read_integer, read_string, require_present_string, require_string,
    resolve_channel_id,
};
use crate::traits::MessageSender;
use crate::types::{ActionOutcome, ActionResult, ChannelAction, SendOptions, ToolSendTarget};

use api::{ChannelPostsQuery, MattermostApiClient};
use send::RestMessageSender;

/// Actions advertised for this configuration.
///
/// No usable account means no actions, whatever the gates say.
pub fn list_actions(config: &MattermostConfig) -> BTreeSet<ChannelAction> {
    if list_enabled_accounts(config).is_empty() {
        return BTreeSet::new();
    }
    ChannelAction::ALL
        .into_iter()
        .filter(|action| action.gate().map_or(true, |gate| config.actions.is_enabled(gate)))
        .collect()
}

/// Recognize a generic `sendMessage` tool call and extract its target.
pub fn extract_tool_send(args: &Value) -> Option<ToolSendTarget> {
    if args.get("action").and_then(Value::as_str)?.trim() != "sendMessage" {
        return None;
    }
    read_string(args, "to").map(|to| ToolSendTarget { to })
}

/// Dispatches named actions for the host framework.
#[derive(Clone)]
pub struct MattermostActions {
    sender: Arc<dyn MessageSender>,
}

impl Default for MattermostActions {
    fn default() -> Self {
        Self::new()
    }
}

impl MattermostActions {
    pub fn new() -> Self {
        Self::with_sender(Arc::new(RestMessageSender))
    }

    /// Use a custom delivery path for the `send` action.
    pub fn with_sender(sender: Arc<dyn MessageSender>) -> Self {
        Self { sender }
    }

    pub fn list_actions(&self, config: &MattermostConfig) -> BTreeSet<ChannelAction> {
        list_actions(config)
    }

    pub fn extract_tool_send(&self, args: &Value) -> Option<ToolSendTarget> {
        extract_tool_send(args)
    }

    /// Validate and execute one action.
    ///
    /// `account_id` falls back to `params.accountId`. Parameters are
    /// validated before any account lookup or remote call.
    pub async fn handle_action(
        &self,
        action: &str,
        params: &Value,
        config: &MattermostConfig,
        account_id: Option<&str>,
    ) -> Result<ActionResult, ActionError> {
        let action: ChannelAction = action.trim().parse()?;
        let account_id = account_id
            .map(str::to_string)
            .or_else(|| read_string(params, "accountId"));

        tracing::debug!(
            action = %action,
            account = account_id.as_deref().unwrap_or("default"),
            "Dispatching Mattermost action"
        );

        let outcome = match action {
            ChannelAction::Send => self.send(params, config, account_id).await?,
            ChannelAction::React => react(params, config, account_id.as_deref()).await?,
            ChannelAction::Reactions => reactions(params, config, account_id.as_deref()).await?,
            ChannelAction::Read => read(params, config, account_id.as_deref()).await?,
            ChannelAction::Edit => edit(params, config, account_id.as_deref()).await?,
            ChannelAction::Delete => delete(params, config, account_id.as_deref()).await?,
            ChannelAction::Pin => pin(params, config, account_id.as_deref()).await?,
            ChannelAction::Unpin => unpin(params, config, account_id.as_deref()).await?,
            ChannelAction::ListPins => list_pins(params, config, account_id.as_deref()).await?,
        };

        Ok(ActionResult::ok(outcome))
    }

    async fn send(
        &self,
        params: &Value,
        config: &MattermostConfig,
        account_id: Option<String>,
    ) -> Result<ActionOutcome, ActionError> {
        let to = require_string(params, "to")?;
        let message = require_present_string(params, "message")?;
        let options = SendOptions {
            account_id,
            media_url: read_string(params, "mediaUrl"),
            reply_to_id: read_string(params, "replyToId"),
        };

        let sent = self
            .sender
            .send_message(config, &to, &message, options)
            .await?;
        Ok(ActionOutcome::Sent(sent))
    }
}

fn resolve_client(
    config: &MattermostConfig,
    account_id: Option<&str>,
) -> Result<MattermostApiClient, ActionError> {
    let account = resolve_account(config, account_id)?;
    MattermostApiClient::for_account(&account)
}

/// Emoji name as Mattermost stores it, without surrounding colons.
fn normalize_emoji(raw: &str) -> String {
    raw.trim().trim_matches(':').trim().to_string()
}

async fn react(
    params: &Value,
    config: &MattermostConfig,
    account_id: Option<&str>,
) -> Result<ActionOutcome, ActionError> {
    let post_id = require_string(params, "messageId")?;
    let remove = read_bool(params, "remove");
    let emoji = read_string(params, "emoji")
        .map(|raw| normalize_emoji(&raw))
        .filter(|emoji| !emoji.is_empty())
        .ok_or_else(|| {
            ActionError::Validation(if remove {
                "emoji required to remove a Mattermost reaction".to_string()
            } else {
                "emoji required".to_string()
            })
        })?;

    let client = resolve_client(config, account_id)?;
    let me = client.get_me().await?;

    if remove {
        client.remove_reaction(&me.id, &post_id, &emoji).await?;
        tracing::debug!(post_id = %post_id, emoji = %emoji, "Mattermost reaction removed");
        Ok(ActionOutcome::ReactionRemoved {
            removed: true,
            emoji,
        })
    } else {
        client.add_reaction(&me.id, &post_id, &emoji).await?;
        tracing::debug!(post_id = %post_id, emoji = %emoji, "Mattermost reaction added");
        Ok(ActionOutcome::ReactionAdded { added: emoji })
    }
}

async fn reactions(
    params: &Value,
    config: &MattermostConfig,
    account_id: Option<&str>,
) -> Result<ActionOutcome, ActionError> {
    let post_id = require_string(params, "messageId")?;
    let client = resolve_client(config, account_id)?;
    let reactions = client.list_reactions(&post_id).await?;
    Ok(ActionOutcome::Reactions {
        message_id: post_id,
        reactions: normalize_reactions(&reactions),
    })
}

async fn read(
    params: &Value,
    config: &MattermostConfig,
    account_id: Option<&str>,
) -> Result<ActionOutcome, ActionError> {
    let channel_id = resolve_channel_id(params)?;
    let query = ChannelPostsQuery {
        per_page: read_integer(params, "limit")?,
        before: read_string(params, "before"),
        after: read_string(params, "after"),
    };
    let client = resolve_client(config, account_id)?;
    let list = client.list_channel_posts(&channel_id, &query).await?;
    Ok(ActionOutcome::Messages {
        channel_id,
        messages: normalize_messages(&list),
    })
}

async fn edit(
    params: &Value,
    config: &MattermostConfig,
    account_id: Option<&str>,
) -> Result<ActionOutcome, ActionError> {
    let post_id = require_string(params, "messageId")?;
    let message = require_string(params, "message")?;
    let client = resolve_client(config, account_id)?;
    client.patch_post(&post_id, &message).await?;
    Ok(ActionOutcome::Edited {
        message_id: post_id,
        message,
    })
}

async fn delete(
    params: &Value,
    config: &MattermostConfig,
    account_id: Option<&str>,
) -> Result<ActionOutcome, ActionError> {
    let post_id = require_string(params, "messageId")?;
    let client = resolve_client(config, account_id)?;
    client.delete_post(&post_id).await?;
    Ok(ActionOutcome::Deleted {
        message_id: post_id,
        deleted: true,
    })
}

async fn pin(
    params: &Value,
    config: &MattermostConfig,
    account_id: Option<&str>,
) -> Result<ActionOutcome, ActionError> {
    let post_id = require_string(params, "messageId")?;
    let client = resolve_client(config, account_id)?;
    client.pin_post(&post_id).await?;
    Ok(ActionOutcome::Pinned {
        message_id: post_id,
        pinned: true,
    })
}

async fn unpin(
    params: &Value,
    config: &MattermostConfig,
    account_id: Option<&str>,
) -> Result<ActionOutcome, ActionError> {
    let post_id = require_string(params, "messageId")?;
    let client = resolve_client(config, account_id)?;
    client.unpin_post(&post_id).await?;
    Ok(ActionOutcome::Unpinned {
        message_id: post_id,
        unpinned: true,
    })
}

async fn list_pins(
    params: &Value,
    config: &MattermostConfig,
    account_id: Option<&str>,
) -> Result<ActionOutcome, ActionError> {
    let channel_id = resolve_channel_id(params)?;
    let client = resolve_client(config, account_id)?;
    let list = client.list_pinned_posts(&channel_id).await?;
    Ok(ActionOutcome::Pins {
        channel_id,
        pins: normalize_pins(&list),
    })
}
