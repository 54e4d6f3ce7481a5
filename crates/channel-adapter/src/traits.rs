use async_trait::async_trait;

use crate::config::MattermostConfig;
use crate::error::ActionError;
use crate::types::{SendOptions, SendResult};

/// Delivers an outbound message for the `send` action.
///
/// Account resolution happens inside the implementation, so the
/// dispatcher only forwards the configuration and the caller's options.
/// The adapter ships with a REST implementation; hosts with their own
/// outbound pipeline provide theirs.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(
        &self,
        config: &MattermostConfig,
        to: &str,
        text: &str,
        options: SendOptions,
    ) -> Result<SendResult, ActionError>;
}
