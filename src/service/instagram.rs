//! Reads and writes against the resolved business account

use crate::graph::{
    self, COMMENT_FIELDS, GraphApi, GraphError, MEDIA_FIELDS, MediaItem, MediaList,
    PROFILE_FIELDS, Profile,
};

/// Media on the business account, with display images derived
pub async fn fetch_media(
    graph: &dyn GraphApi,
    ig_user_id: &str,
    user_token: &str,
) -> Result<Vec<MediaItem>, GraphError> {
    let list: MediaList = graph::get_as(
        graph,
        &graph::node_path(ig_user_id, Some("media")),
        &[("fields", MEDIA_FIELDS), ("access_token", user_token)],
    )
    .await?;

    Ok(list
        .data
        .into_iter()
        .map(MediaItem::with_display_image)
        .collect())
}

pub async fn fetch_profile(
    graph: &dyn GraphApi,
    ig_user_id: &str,
    user_token: &str,
) -> Result<Profile, GraphError> {
    graph::get_as(
        graph,
        &graph::node_path(ig_user_id, None),
        &[("fields", PROFILE_FIELDS), ("access_token", user_token)],
    )
    .await
}

/// Comment thread of a media item, as the provider returned it
pub async fn fetch_comments(
    graph: &dyn GraphApi,
    media_id: &str,
    page_token: &str,
) -> Result<serde_json::Value, GraphError> {
    graph
        .get(
            &graph::node_path(media_id, Some("comments")),
            &[("access_token", page_token), ("fields", COMMENT_FIELDS)],
        )
        .await
}

/// Post a reply under a comment; returns the provider's body (`{id}`)
pub async fn reply_to_comment(
    graph: &dyn GraphApi,
    user_token: &str,
    comment_id: &str,
    message: &str,
) -> Result<serde_json::Value, GraphError> {
    graph
        .post(
            &graph::node_path(comment_id, Some("replies")),
            &[("access_token", user_token), ("message", message)],
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fake::FakeGraph;
    use serde_json::json;

    #[tokio::test]
    async fn media_requests_field_set_and_derives_images() {
        let graph = FakeGraph::new().respond(json!({"data": [
            {"id": "m1", "media_type": "VIDEO", "media_url": "v.mp4", "thumbnail_url": "t.jpg"},
            {"id": "m2", "media_type": "IMAGE", "media_url": "i.jpg"}
        ]}));

        let media = fetch_media(&graph, "ig-1", "user-token").await.unwrap();

        assert_eq!(media[0].image.as_deref(), Some("t.jpg"));
        assert_eq!(media[1].image.as_deref(), Some("i.jpg"));

        let call = &graph.calls()[0];
        assert_eq!(call.path, "ig-1/media");
        assert_eq!(call.param("fields"), Some(MEDIA_FIELDS));
        assert_eq!(call.param("access_token"), Some("user-token"));
    }

    #[tokio::test]
    async fn comments_are_passed_through() {
        let payload = json!({
            "data": [{"id": "c1", "text": "hi", "unknown_field": true}],
            "paging": {"cursors": {"before": "a", "after": "b"}}
        });
        let graph = FakeGraph::new().respond(payload.clone());

        let comments = fetch_comments(&graph, "m1", "page-token").await.unwrap();

        assert_eq!(comments, payload);
        let call = &graph.calls()[0];
        assert_eq!(call.path, "m1/comments");
        assert_eq!(call.param("access_token"), Some("page-token"));
    }

    #[tokio::test]
    async fn reply_posts_message_to_comment() {
        let graph = FakeGraph::new().respond(json!({"id": "r9"}));

        let created = reply_to_comment(&graph, "user-token", "c1", "thanks!")
            .await
            .unwrap();

        assert_eq!(created["id"], "r9");
        let call = &graph.calls()[0];
        assert_eq!(call.method, "POST");
        assert_eq!(call.path, "c1/replies");
        assert_eq!(call.param("message"), Some("thanks!"));
    }
}
