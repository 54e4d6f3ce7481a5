//! Outbound delivery over the Mattermost REST API.

use async_trait::async_trait;

use crate::accounts::resolve_account;
use crate::config::MattermostConfig;
use crate::error::ActionError;
use crate::traits::MessageSender;
use crate::types::{SendOptions, SendResult};

use super::api::{CreatePostRequest, MattermostApiClient};
use super::target::{parse_target, SendTarget};

/// Default [`MessageSender`]: resolves the account, opens a direct channel
/// for user targets, uploads media, then creates the post.
#[derive(Debug, Clone, Default)]
pub struct RestMessageSender;

#[async_trait]
impl MessageSender for RestMessageSender {
    async fn send_message(
        &self,
        config: &MattermostConfig,
        to: &str,
        text: &str,
        options: SendOptions,
    ) -> Result<SendResult, ActionError> {
        let target = parse_target(to)?;
        let media_url = options
            .media_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty());
        if text.trim().is_empty() && media_url.is_none() {
            return Err(ActionError::Validation(
                "message or mediaUrl required".to_string(),
            ));
        }

        let account = resolve_account(config, options.account_id.as_deref())?;
        let client = MattermostApiClient::for_account(&account)?;

        let channel_id = match target {
            SendTarget::Channel(id) => id,
            SendTarget::User(user_id) => direct_channel(&client, &user_id).await?,
            SendTarget::Username(username) => {
                let user = client.get_user_by_username(&username).await?;
                direct_channel(&client, &user.id).await?
            }
        };

        let file_ids = match media_url {
            Some(url) => {
                let media = client.fetch_media(url).await?;
                client.upload_file(&channel_id, media).await?
            }
            None => Vec::new(),
        };

        let post = client
            .create_post(&CreatePostRequest {
                channel_id: channel_id.clone(),
                message: text.to_string(),
                root_id: options.reply_to_id.filter(|id| !id.trim().is_empty()),
                file_ids,
            })
            .await?;

        tracing::info!(
            account = %account.account_id,
            channel_id = %channel_id,
            post_id = %post.id,
            "Mattermost message sent"
        );

        Ok(SendResult {
            message_id: post.id,
            channel_id: if post.channel_id.is_empty() {
                channel_id
            } else {
                post.channel_id
            },
        })
    }
}

async fn direct_channel(client: &MattermostApiClient, user_id: &str) -> Result<String, ActionError> {
    let me = client.get_me().await?;
    let channel = client.create_direct_channel(&me.id, user_id).await?;
    Ok(channel.id)
}
