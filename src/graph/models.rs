//! Typed projections of Graph API responses
//!
//! Only the fields this service reads are modelled. Counts the provider
//! omits stay `None` here and are treated as 0 by the aggregator.

use serde::{Deserialize, Serialize};

/// Fields requested for media listings
pub const MEDIA_FIELDS: &str =
    "id,caption,media_type,media_url,thumbnail_url,like_count,comments_count,timestamp";

/// Fields requested for the business account profile
pub const PROFILE_FIELDS: &str =
    "username,biography,profile_picture_url,followers_count,follows_count";

/// Fields requested for comment threads
pub const COMMENT_FIELDS: &str = "id,text,timestamp,like_count,replies{id,text,timestamp}";

/// Facebook Page managed by the token holder
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    /// Page-scoped token, distinct from the user token
    pub access_token: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET me/accounts`
#[derive(Debug, Clone, Deserialize)]
pub struct PageList {
    #[serde(default)]
    pub data: Vec<Page>,
}

/// `GET <page>?fields=instagram_business_account`
#[derive(Debug, Clone, Deserialize)]
pub struct PageAccountLink {
    #[serde(default)]
    pub instagram_business_account: Option<NodeRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeRef {
    pub id: String,
}

/// Instagram business account profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub followers_count: Option<u64>,
    #[serde(default)]
    pub follows_count: Option<u64>,
}

/// A post on the business account
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Display image, derived by [`MediaItem::with_display_image`]
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl MediaItem {
    /// Likes plus comments, missing counts as 0
    pub fn engagement(&self) -> u64 {
        self.like_count
            .unwrap_or(0)
            .saturating_add(self.comments_count.unwrap_or(0))
    }

    /// Videos and reels show their thumbnail when there is one
    pub fn display_image(&self) -> Option<&str> {
        let prefers_thumbnail = matches!(self.media_type.as_deref(), Some("VIDEO" | "REEL"));
        if prefers_thumbnail {
            self.thumbnail_url.as_deref().or(self.media_url.as_deref())
        } else {
            self.media_url.as_deref()
        }
    }

    pub fn with_display_image(mut self) -> Self {
        self.image = self.display_image().map(ToOwned::to_owned);
        self
    }
}

/// `GET <ig-user>/media`
#[derive(Debug, Clone, Deserialize)]
pub struct MediaList {
    #[serde(default)]
    pub data: Vec<MediaItem>,
}

/// Comment on a media item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub replies: Option<ReplyList>,
}

impl Comment {
    pub fn reply_ids(&self) -> impl Iterator<Item = &str> {
        self.replies
            .iter()
            .flat_map(|list| list.data.iter())
            .map(|reply| reply.id.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReplyList {
    #[serde(default)]
    pub data: Vec<Reply>,
}

/// Reply nested under a comment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub like_count: Option<u64>,
}

/// `GET <media>/comments`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentList {
    #[serde(default)]
    pub data: Vec<Comment>,
}

/// `GET oauth/access_token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}
