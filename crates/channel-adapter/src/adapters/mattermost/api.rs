//! Mattermost REST API client.
//!
//! Thin typed wrappers over the v4 endpoints used by the message actions.
//! Every call is authenticated with the bot token; non-2xx responses are
//! surfaced as `ActionError::RemoteApi` without retrying.

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::accounts::ResolvedAccount;
use crate::error::ActionError;
use crate::normalize::{RemotePost, RemotePostList, RemoteReaction};

const API_PATH: &str = "/api/v4";

/// Mattermost API client bound to one account.
#[derive(Clone)]
pub struct MattermostApiClient {
    client: reqwest::Client,
    base_url: String,
    api_base_url: String,
    token: String,
}

/// Response from `GET /api/v4/users/me` and `GET /api/v4/users/username/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteChannel {
    pub id: String,
}

/// Request body for `POST /api/v4/posts`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreatePostRequest {
    pub channel_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PatchPostRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct ReactionRequest<'a> {
    user_id: &'a str,
    post_id: &'a str,
    emoji_name: &'a str,
}

/// Paging parameters for `GET /api/v4/channels/{id}/posts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelPostsQuery {
    pub per_page: Option<u32>,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Response from `POST /api/v4/files`.
#[derive(Debug, Deserialize)]
struct UploadFilesResponse {
    #[serde(default)]
    file_infos: Vec<FileInfo>,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    id: String,
}

/// Error body returned by the Mattermost API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// A downloaded attachment ready for upload.
#[derive(Debug, Clone)]
pub struct MediaPayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: Option<String>,
}

impl MattermostApiClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self, ActionError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ActionError::Config(
                "Mattermost base_url cannot be empty".to_string(),
            ));
        }
        if token.trim().is_empty() {
            return Err(ActionError::Config(
                "Mattermost bot_token cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| ActionError::Config(format!("HTTP client init: {}", e)))?;

        Ok(Self {
            client,
            api_base_url: format!("{}{}", base_url, API_PATH),
            base_url,
            token: token.trim().to_string(),
        })
    }

    /// Build a client for a resolved account, rejecting disabled or
    /// incomplete accounts.
    pub fn for_account(account: &ResolvedAccount) -> Result<Self, ActionError> {
        if !account.enabled {
            return Err(ActionError::Config(format!(
                "Mattermost account '{}' is disabled",
                account.account_id
            )));
        }
        if account.bot_token.is_empty() {
            return Err(ActionError::Config(format!(
                "Mattermost bot_token missing for account '{}'",
                account.account_id
            )));
        }
        if account.base_url.is_empty() {
            return Err(ActionError::Config(format!(
                "Mattermost base_url missing for account '{}'",
                account.account_id
            )));
        }
        Self::new(&account.base_url, &account.bot_token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Start an authenticated request against a path under `/api/v4`.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_base_url, path))
            .bearer_auth(&self.token)
    }

    /// `GET /api/v4/users/me`
    pub async fn get_me(&self) -> Result<RemoteUser, ActionError> {
        let req = self.request(Method::GET, "/users/me");
        send_json(req, "users/me").await
    }

    /// `GET /api/v4/users/username/{username}`
    pub async fn get_user_by_username(&self, username: &str) -> Result<RemoteUser, ActionError> {
        let path = format!("/users/username/{}", urlencoding::encode(username));
        send_json(self.request(Method::GET, &path), "users/username").await
    }

    /// `POST /api/v4/channels/direct`
    pub async fn create_direct_channel(
        &self,
        user_id: &str,
        other_user_id: &str,
    ) -> Result<RemoteChannel, ActionError> {
        let req = self
            .request(Method::POST, "/channels/direct")
            .json(&[user_id, other_user_id]);
        send_json(req, "channels/direct").await
    }

    /// `POST /api/v4/posts`
    pub async fn create_post(&self, body: &CreatePostRequest) -> Result<RemotePost, ActionError> {
        let req = self.request(Method::POST, "/posts").json(body);
        send_json(req, "create_post").await
    }

    /// `GET /api/v4/posts/{post_id}`
    pub async fn get_post(&self, post_id: &str) -> Result<RemotePost, ActionError> {
        let path = format!("/posts/{}", urlencoding::encode(post_id));
        send_json(self.request(Method::GET, &path), "get_post").await
    }

    /// `PUT /api/v4/posts/{post_id}/patch`
    pub async fn patch_post(&self, post_id: &str, message: &str) -> Result<RemotePost, ActionError> {
        let path = format!("/posts/{}/patch", urlencoding::encode(post_id));
        let req = self
            .request(Method::PUT, &path)
            .json(&PatchPostRequest { message });
        send_json(req, "patch_post").await
    }

    /// `DELETE /api/v4/posts/{post_id}`
    pub async fn delete_post(&self, post_id: &str) -> Result<(), ActionError> {
        let path = format!("/posts/{}", urlencoding::encode(post_id));
        send_empty(self.request(Method::DELETE, &path), "delete_post").await
    }

    /// `POST /api/v4/reactions`
    pub async fn add_reaction(
        &self,
        user_id: &str,
        post_id: &str,
        emoji_name: &str,
    ) -> Result<RemoteReaction, ActionError> {
        let req = self.request(Method::POST, "/reactions").json(&ReactionRequest {
            user_id,
            post_id,
            emoji_name,
        });
        send_json(req, "add_reaction").await
    }

    /// `DELETE /api/v4/users/{user_id}/posts/{post_id}/reactions/{emoji_name}`
    pub async fn remove_reaction(
        &self,
        user_id: &str,
        post_id: &str,
        emoji_name: &str,
    ) -> Result<(), ActionError> {
        let path = format!(
            "/users/{}/posts/{}/reactions/{}",
            urlencoding::encode(user_id),
            urlencoding::encode(post_id),
            urlencoding::encode(emoji_name)
        );
        send_empty(self.request(Method::DELETE, &path), "remove_reaction").await
    }

    /// `GET /api/v4/posts/{post_id}/reactions`. The server answers `null`
    /// for a post without reactions.
    pub async fn list_reactions(&self, post_id: &str) -> Result<Vec<RemoteReaction>, ActionError> {
        let path = format!("/posts/{}/reactions", urlencoding::encode(post_id));
        let reactions: Option<Vec<RemoteReaction>> =
            send_json(self.request(Method::GET, &path), "list_reactions").await?;
        Ok(reactions.unwrap_or_default())
    }

    /// `POST /api/v4/posts/{post_id}/pin`
    pub async fn pin_post(&self, post_id: &str) -> Result<(), ActionError> {
        let path = format!("/posts/{}/pin", urlencoding::encode(post_id));
        send_empty(self.request(Method::POST, &path), "pin_post").await
    }

    /// `POST /api/v4/posts/{post_id}/unpin`
    pub async fn unpin_post(&self, post_id: &str) -> Result<(), ActionError> {
        let path = format!("/posts/{}/unpin", urlencoding::encode(post_id));
        send_empty(self.request(Method::POST, &path), "unpin_post").await
    }

    /// `GET /api/v4/channels/{channel_id}/pinned`
    pub async fn list_pinned_posts(&self, channel_id: &str) -> Result<RemotePostList, ActionError> {
        let path = format!("/channels/{}/pinned", urlencoding::encode(channel_id));
        send_json(self.request(Method::GET, &path), "list_pinned_posts").await
    }

    /// `GET /api/v4/channels/{channel_id}/posts`
    pub async fn list_channel_posts(
        &self,
        channel_id: &str,
        query: &ChannelPostsQuery,
    ) -> Result<RemotePostList, ActionError> {
        let path = format!("/channels/{}/posts", urlencoding::encode(channel_id));
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(per_page) = query.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        if let Some(ref before) = query.before {
            pairs.push(("before", before.clone()));
        }
        if let Some(ref after) = query.after {
            pairs.push(("after", after.clone()));
        }
        let req = self.request(Method::GET, &path).query(&pairs);
        send_json(req, "list_channel_posts").await
    }

    /// `POST /api/v4/files` (multipart). Returns the uploaded file ids.
    pub async fn upload_file(
        &self,
        channel_id: &str,
        media: MediaPayload,
    ) -> Result<Vec<String>, ActionError> {
        let mut part = reqwest::multipart::Part::bytes(media.bytes).file_name(media.file_name);
        if let Some(ref content_type) = media.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| ActionError::Validation(format!("invalid media type: {}", e)))?;
        }
        let form = reqwest::multipart::Form::new()
            .text("channel_id", channel_id.to_string())
            .part("files", part);

        let req = self.request(Method::POST, "/files").multipart(form);
        let uploaded: UploadFilesResponse = send_json(req, "upload_file").await?;
        Ok(uploaded.file_infos.into_iter().map(|info| info.id).collect())
    }

    /// Download an attachment from an arbitrary URL. No bot credentials are sent.
    pub async fn fetch_media(&self, url: &str) -> Result<MediaPayload, ActionError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| ActionError::Validation(format!("invalid mediaUrl: {}", e)))?;
        let file_name = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or("upload")
            .to_string();

        let resp = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| ActionError::transport("fetch_media", e))?;
        let resp = check_status(resp, "fetch_media").await?;
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ActionError::transport("fetch_media", e))?;

        Ok(MediaPayload {
            bytes: bytes.to_vec(),
            file_name,
            content_type,
        })
    }
}

async fn send_json<T: DeserializeOwned>(req: RequestBuilder, op: &str) -> Result<T, ActionError> {
    let resp = req
        .send()
        .await
        .map_err(|e| ActionError::transport(op, e))?;
    let resp = check_status(resp, op).await?;
    resp.json::<T>()
        .await
        .map_err(|e| ActionError::decode(op, e))
}

async fn send_empty(req: RequestBuilder, op: &str) -> Result<(), ActionError> {
    let resp = req
        .send()
        .await
        .map_err(|e| ActionError::transport(op, e))?;
    check_status(resp, op).await?;
    Ok(())
}

async fn check_status(resp: Response, op: &str) -> Result<Response, ActionError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or(body);
    tracing::warn!(op, status = status.as_u16(), "Mattermost API call rejected");

    Err(ActionError::RemoteApi {
        status: Some(status.as_u16()),
        message: format!("{} failed ({}): {}", op, status, detail),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn empty_base_url_rejected() {
        assert!(MattermostApiClient::new("", "token-123").is_err());
        assert!(MattermostApiClient::new("///", "token-123").is_err());
    }

    #[test]
    fn empty_bot_token_rejected() {
        let result = MattermostApiClient::new("https://mm.example.com", " ");
        assert!(matches!(result, Err(ActionError::Config(_))));
    }

    #[test]
    fn trailing_slashes_stripped() {
        let client = MattermostApiClient::new("https://mm.example.com//", "token-123").unwrap();
        assert_eq!(client.base_url(), "https://mm.example.com");
        assert_eq!(client.api_base_url(), "https://mm.example.com/api/v4");
        assert_eq!(client.token(), "token-123");
    }

    #[test]
    fn disabled_account_rejected() {
        let account = ResolvedAccount {
            account_id: "ops".to_string(),
            name: None,
            bot_token: "t".to_string(),
            base_url: "https://h".to_string(),
            enabled: false,
            config: Default::default(),
        };
        let err = MattermostApiClient::for_account(&account).err().unwrap();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn me_response_deserialization() {
        let json = r#"{"id":"user-123","username":"ops-bot","first_name":"Ops"}"#;
        let resp: RemoteUser = serde_json::from_str(json).unwrap();
        assert_eq!(resp.id, "user-123");
        assert_eq!(resp.username.as_deref(), Some("ops-bot"));
    }

    #[tokio::test]
    async fn requests_carry_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/users/me"))
            .and(header("authorization", "Bearer token-123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "bot-1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = MattermostApiClient::new(&server.uri(), "token-123").unwrap();
        assert_eq!(client.get_me().await.unwrap().id, "bot-1");
    }

    #[tokio::test]
    async fn error_body_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v4/posts/p1"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "id": "api.context.permissions.app_error",
                "message": "You do not have the appropriate permissions."
            })))
            .mount(&server)
            .await;

        let client = MattermostApiClient::new(&server.uri(), "t").unwrap();
        let err = client.delete_post("p1").await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert!(err.to_string().contains("appropriate permissions"));
    }

    #[tokio::test]
    async fn null_reactions_are_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/posts/p1/reactions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let client = MattermostApiClient::new(&server.uri(), "t").unwrap();
        assert!(client.list_reactions("p1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn channel_posts_paging_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/channels/c1/posts"))
            .and(query_param("per_page", "5"))
            .and(query_param("before", "p9"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"order": [], "posts": {}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = MattermostApiClient::new(&server.uri(), "t").unwrap();
        let query = ChannelPostsQuery {
            per_page: Some(5),
            before: Some("p9".to_string()),
            after: None,
        };
        let list = client.list_channel_posts("c1", &query).await.unwrap();
        assert!(list.order.is_empty());
    }

    #[tokio::test]
    async fn create_post_omits_empty_optionals() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/posts"))
            .and(body_json(serde_json::json!({"channel_id": "c1", "message": "hi"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "p1", "channel_id": "c1", "message": "hi"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = MattermostApiClient::new(&server.uri(), "t").unwrap();
        let post = client
            .create_post(&CreatePostRequest {
                channel_id: "c1".to_string(),
                message: "hi".to_string(),
                ..CreatePostRequest::default()
            })
            .await
            .unwrap();
        assert_eq!(post.id, "p1");
    }

    #[tokio::test]
    async fn transport_failure_is_remote_error_without_status() {
        // Nothing listens on port 9 of localhost.
        let client = MattermostApiClient::new("http://127.0.0.1:9", "t").unwrap();
        let err = client.get_me().await.unwrap_err();
        assert!(matches!(err, ActionError::RemoteApi { status: None, .. }));
    }
}
