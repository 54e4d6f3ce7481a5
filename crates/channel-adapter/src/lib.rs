//! Mattermost message actions for agent hosts.
//!
//! Exposes a fixed set of chat operations (send, react, reactions, read,
//! edit, delete, pin, unpin, list-pins) through a uniform dispatch
//! contract, translates them into Mattermost v4 REST calls, and
//! normalizes the server's payloads into a platform-agnostic shape.
//!
//! - `list_actions` advertises what the configuration permits
//! - `MattermostActions::handle_action` validates and executes one action
//! - `extract_tool_send` recognizes generic `sendMessage` tool calls

pub mod accounts;
pub mod config;
pub mod error;
pub mod normalize;
pub mod params;
pub mod traits;
pub mod types;

pub mod adapters;

// Re-export core types
pub use accounts::{list_enabled_accounts, resolve_account, ResolvedAccount, DEFAULT_ACCOUNT_ID};
pub use adapters::mattermost::api::MattermostApiClient;
pub use adapters::mattermost::send::RestMessageSender;
pub use adapters::mattermost::{extract_tool_send, list_actions, MattermostActions};
pub use config::{load_config, AccountConfig, ActionGates, MattermostConfig};
pub use error::ActionError;
pub use traits::MessageSender;
pub use types::{
    ActionGate, ActionOutcome, ActionResult, ChannelAction, SendOptions, SendResult,
    ToolSendTarget,
};

/// Build a client handle for an endpoint and bot token.
///
/// Trailing slashes are stripped from `base_url`; the API base is
/// `{base_url}/api/v4`.
pub fn create_client(base_url: &str, token: &str) -> Result<MattermostApiClient, ActionError> {
    MattermostApiClient::new(base_url, token)
}
