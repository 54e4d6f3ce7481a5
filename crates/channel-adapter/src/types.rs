use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ActionError;
use crate::normalize::{NormalizedMessage, NormalizedPin, NormalizedReaction};

/// The fixed set of message actions exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelAction {
    Send,
    React,
    Reactions,
    Read,
    Edit,
    Delete,
    Pin,
    Unpin,
    ListPins,
}

impl ChannelAction {
    pub const ALL: [ChannelAction; 9] = [
        ChannelAction::Send,
        ChannelAction::React,
        ChannelAction::Reactions,
        ChannelAction::Read,
        ChannelAction::Edit,
        ChannelAction::Delete,
        ChannelAction::Pin,
        ChannelAction::Unpin,
        ChannelAction::ListPins,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelAction::Send => "send",
            ChannelAction::React => "react",
            ChannelAction::Reactions => "reactions",
            ChannelAction::Read => "read",
            ChannelAction::Edit => "edit",
            ChannelAction::Delete => "delete",
            ChannelAction::Pin => "pin",
            ChannelAction::Unpin => "unpin",
            ChannelAction::ListPins => "list-pins",
        }
    }

    /// The gate controlling this action. `send` is always available.
    pub fn gate(&self) -> Option<ActionGate> {
        match self {
            ChannelAction::Send => None,
            ChannelAction::React | ChannelAction::Reactions => Some(ActionGate::Reactions),
            ChannelAction::Read | ChannelAction::Edit | ChannelAction::Delete => {
                Some(ActionGate::Messages)
            }
            ChannelAction::Pin | ChannelAction::Unpin | ChannelAction::ListPins => {
                Some(ActionGate::Pins)
            }
        }
    }
}

impl std::fmt::Display for ChannelAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelAction {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChannelAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ActionError::UnsupportedAction(s.to_string()))
    }
}

/// A configuration switch covering a group of related actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionGate {
    Reactions,
    Messages,
    Pins,
}

/// Target extracted from a generic `sendMessage` tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSendTarget {
    pub to: String,
}

/// Options forwarded to the send collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub account_id: Option<String>,
    pub media_url: Option<String>,
    pub reply_to_id: Option<String>,
}

/// Outcome of a successful send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub message_id: String,
    pub channel_id: String,
}

/// Result handed back to the host framework.
///
/// Failures are reported through `ActionError`, so `ok` is always `true`
/// on a returned value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    pub ok: bool,
    #[serde(flatten)]
    pub outcome: ActionOutcome,
}

impl ActionResult {
    pub fn ok(outcome: ActionOutcome) -> Self {
        Self { ok: true, outcome }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Action-specific result fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionOutcome {
    Sent(SendResult),
    ReactionAdded {
        added: String,
    },
    ReactionRemoved {
        removed: bool,
        emoji: String,
    },
    Reactions {
        #[serde(rename = "messageId")]
        message_id: String,
        reactions: Vec<NormalizedReaction>,
    },
    Messages {
        #[serde(rename = "channelId")]
        channel_id: String,
        messages: Vec<NormalizedMessage>,
    },
    Edited {
        #[serde(rename = "messageId")]
        message_id: String,
        message: String,
    },
    Deleted {
        #[serde(rename = "messageId")]
        message_id: String,
        deleted: bool,
    },
    Pinned {
        #[serde(rename = "messageId")]
        message_id: String,
        pinned: bool,
    },
    Unpinned {
        #[serde(rename = "messageId")]
        message_id: String,
        unpinned: bool,
    },
    Pins {
        #[serde(rename = "channelId")]
        channel_id: String,
        pins: Vec<NormalizedPin>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_parse() {
        for action in ChannelAction::ALL {
            assert_eq!(action.as_str().parse::<ChannelAction>().unwrap(), action);
        }
        assert_eq!(ChannelAction::ListPins.to_string(), "list-pins");
    }

    #[test]
    fn unknown_action_is_unsupported() {
        let err = "poll".parse::<ChannelAction>().unwrap_err();
        assert!(matches!(err, ActionError::UnsupportedAction(ref name) if name == "poll"));
    }

    #[test]
    fn serde_name_matches_display() {
        let json = serde_json::to_string(&ChannelAction::ListPins).unwrap();
        assert_eq!(json, "\"list-pins\"");
    }

    #[test]
    fn gate_membership() {
        assert_eq!(ChannelAction::Send.gate(), None);
        assert_eq!(ChannelAction::Reactions.gate(), Some(ActionGate::Reactions));
        assert_eq!(ChannelAction::Delete.gate(), Some(ActionGate::Messages));
        assert_eq!(ChannelAction::ListPins.gate(), Some(ActionGate::Pins));
    }

    #[test]
    fn result_serializes_flat() {
        let result = ActionResult::ok(ActionOutcome::ReactionRemoved {
            removed: true,
            emoji: "thumbsup".to_string(),
        });
        assert_eq!(
            result.to_json().unwrap(),
            serde_json::json!({"ok": true, "removed": true, "emoji": "thumbsup"})
        );
    }

    #[test]
    fn send_result_uses_camel_case() {
        let result = ActionResult::ok(ActionOutcome::Sent(SendResult {
            message_id: "p1".to_string(),
            channel_id: "c1".to_string(),
        }));
        assert_eq!(
            result.to_json().unwrap(),
            serde_json::json!({"ok": true, "messageId": "p1", "channelId": "c1"})
        );
    }
}
