/// Data models for gallery-service
///
/// Post and Comment mirror the records stored in the posts and comments
/// tables; the serde renames keep the wire format the mobile clients already
/// speak (`PostID`, `CommentCount`, ...).
use serde::{Deserialize, Serialize};

/// Visibility state of a post. Listing only ever returns `Ok` posts;
/// `Hidden` is the soft-delete path (posts are never hard-deleted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "hidden")]
    Hidden,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Ok => "ok",
            PostStatus::Hidden => "hidden",
        }
    }
}

/// A post record. `comment_count` is denormalized and kept in sync with the
/// comments table through the version-guarded counter protocol; `version`
/// advances by exactly 1 on every accepted conditional write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "PostID")]
    pub post_id: String,
    /// Creation time in epoch seconds, immutable.
    #[serde(rename = "Timestamp")]
    pub timestamp: i64,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "Status")]
    pub status: PostStatus,
    #[serde(rename = "CommentCount")]
    pub comment_count: i64,
    #[serde(rename = "Version")]
    pub version: i64,
}

/// A comment record. `post_id` is a weak back-reference used for lookup
/// only; deleting a post does not cascade here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "CommentID")]
    pub comment_id: String,
    #[serde(rename = "PostID")]
    pub post_id: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: i64,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Body")]
    pub body: String,
}

/// One enriched entry of a feed page: the post record plus its two most
/// recent comments and the base64-encoded image attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    #[serde(flatten)]
    pub post: Post,
    #[serde(rename = "LastComments")]
    pub last_comments: Vec<Comment>,
    #[serde(rename = "Image")]
    pub image: String,
}

/// A page of the feed. `next_page` is an opaque cursor; `None` means the
/// scan reached the end of the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    #[serde(rename = "nextPage")]
    pub next_page: Option<String>,
    pub posts: Vec<FeedItem>,
}
