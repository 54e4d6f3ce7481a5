//! Mapping of Mattermost payloads into the host's result shape.
//!
//! List responses carry an `order` array alongside a `posts` map; output
//! always follows `order`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A post as returned by the Mattermost v4 API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemotePost {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub create_at: i64,
    #[serde(default)]
    pub root_id: Option<String>,
    #[serde(default)]
    pub file_ids: Option<Vec<String>>,
}

/// A reaction as returned by the Mattermost v4 API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteReaction {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub emoji_name: String,
    #[serde(default)]
    pub create_at: i64,
}

/// `PostList` payload used by channel history and pinned-post endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemotePostList {
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default)]
    pub posts: HashMap<String, RemotePost>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMessage {
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPin {
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedReaction {
    pub user_id: String,
    pub emoji: String,
    pub created_at: i64,
}

pub fn normalize_message(post: &RemotePost) -> NormalizedMessage {
    NormalizedMessage {
        id: post.id.clone(),
        user_id: post.user_id.clone(),
        message: post.message.clone(),
        created_at: post.create_at,
        root_id: post.root_id.clone().filter(|id| !id.is_empty()),
        file_ids: post.file_ids.clone().filter(|ids| !ids.is_empty()),
    }
}

pub fn normalize_pin(post: &RemotePost) -> NormalizedPin {
    NormalizedPin {
        id: post.id.clone(),
        user_id: post.user_id.clone(),
        message: post.message.clone(),
        created_at: post.create_at,
    }
}

pub fn normalize_reaction(reaction: &RemoteReaction) -> NormalizedReaction {
    NormalizedReaction {
        user_id: reaction.user_id.clone(),
        emoji: reaction.emoji_name.clone(),
        created_at: reaction.create_at,
    }
}

/// Posts of a list response in server order. Ids without a post are skipped.
pub fn ordered_posts(list: &RemotePostList) -> impl Iterator<Item = &RemotePost> {
    list.order.iter().filter_map(|id| list.posts.get(id))
}

pub fn normalize_messages(list: &RemotePostList) -> Vec<NormalizedMessage> {
    ordered_posts(list).map(normalize_message).collect()
}

pub fn normalize_pins(list: &RemotePostList) -> Vec<NormalizedPin> {
    ordered_posts(list).map(normalize_pin).collect()
}

pub fn normalize_reactions(reactions: &[RemoteReaction]) -> Vec<NormalizedReaction> {
    reactions.iter().map(normalize_reaction).collect()
}
