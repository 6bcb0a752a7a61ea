//! Dashboard aggregation
//!
//! Pure functions over data already fetched. No I/O.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::graph::{MediaItem, Profile};

/// Number of posts kept in `topPosts`
pub const TOP_POSTS: usize = 3;

/// Derived statistics, never stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_posts: usize,
    pub total_likes: u64,
    pub total_comments: u64,
    /// (likes + comments) / followers, two decimals
    pub engagement_rate: String,
    pub top_posts: Vec<MediaItem>,
}

/// Profile block of the dashboard response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileView {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub followers_count: Option<u64>,
    pub follows_count: Option<u64>,
}

impl From<&Profile> for ProfileView {
    fn from(profile: &Profile) -> Self {
        Self {
            username: profile.username.clone(),
            bio: profile.biography.clone(),
            profile_picture: profile.profile_picture_url.clone(),
            followers_count: profile.followers_count,
            follows_count: profile.follows_count,
        }
    }
}

/// Compute dashboard statistics for a profile and its media
pub fn aggregate(profile: &Profile, media: &[MediaItem]) -> DashboardStats {
    let total_likes = media
        .iter()
        .fold(0u64, |acc, m| acc.saturating_add(m.like_count.unwrap_or(0)));
    let total_comments = media
        .iter()
        .fold(0u64, |acc, m| acc.saturating_add(m.comments_count.unwrap_or(0)));

    // sort_by_key is stable: equal engagement keeps listing order
    let mut top_posts = media.to_vec();
    top_posts.sort_by_key(|m| Reverse(m.engagement()));
    top_posts.truncate(TOP_POSTS);

    DashboardStats {
        total_posts: media.len(),
        total_likes,
        total_comments,
        engagement_rate: engagement_rate(
            total_likes.saturating_add(total_comments),
            profile.followers_count.unwrap_or(0),
        ),
        top_posts,
    }
}

/// Ratio rounded half-up to two decimals; "0.00" without followers
pub fn engagement_rate(interactions: u64, followers: u64) -> String {
    if followers == 0 {
        return "0.00".to_string();
    }

    let followers = u128::from(followers);
    let hundredths = (u128::from(interactions) * 200 + followers) / (2 * followers);
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}
