/// DynamoDB-backed posts and comments tables
///
/// The posts table is keyed by `PostID` and carries a `Status`+`Timestamp`
/// secondary index for the feed scan; the comments table is keyed by
/// (`CommentID`, `Timestamp`) with a `PostID`+`Timestamp` index for the
/// per-post preview query. Conditional writes use a `Version` condition
/// expression; the conditional-check-failed class maps to
/// `StoreError::ConditionFailed` and everything else passes through as a
/// service error.
use crate::models::{Comment, Post, PostStatus};
use crate::store::{coerce_int, CommentStore, FeedPosition, PostStore, StoreError};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use std::sync::Arc;

type Item = HashMap<String, AttributeValue>;

pub struct DynamoPostStore {
    client: Arc<Client>,
    table: String,
    feed_index: String,
}

impl DynamoPostStore {
    pub fn new(client: Arc<Client>, table: String, feed_index: String) -> Self {
        Self {
            client,
            table,
            feed_index,
        }
    }
}

#[async_trait]
impl PostStore for DynamoPostStore {
    async fn get_post(&self, post_id: &str) -> Result<Option<Post>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("PostID", AttributeValue::S(post_id.to_string()))
            .send()
            .await
            .map_err(|err| StoreError::Service(err.to_string()))?;

        output.item().map(post_from_item).transpose()
    }

    async fn put_post(&self, post: &Post) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(post_to_item(post)))
            .send()
            .await
            .map_err(|err| StoreError::Service(err.to_string()))?;

        Ok(())
    }

    async fn put_post_if_version(
        &self,
        post: &Post,
        expected_version: i64,
    ) -> Result<(), StoreError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(post_to_item(post)))
            .condition_expression("Version = :expected")
            .expression_attribute_values(
                ":expected",
                AttributeValue::N(expected_version.to_string()),
            )
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let service = err.into_service_error();
                if service.is_conditional_check_failed_exception() {
                    Err(StoreError::ConditionFailed)
                } else {
                    Err(StoreError::Service(service.to_string()))
                }
            }
        }
    }

    async fn query_feed(
        &self,
        limit: i64,
        start_after: Option<FeedPosition>,
    ) -> Result<(Vec<Post>, Option<FeedPosition>), StoreError> {
        let mut query = self
            .client
            .query()
            .table_name(&self.table)
            .index_name(&self.feed_index)
            .key_condition_expression("#status = :ok")
            .expression_attribute_names("#status", "Status")
            .expression_attribute_values(":ok", AttributeValue::S("ok".to_string()))
            .scan_index_forward(false)
            .limit(limit as i32);

        if let Some(position) = start_after {
            query = query.set_exclusive_start_key(Some(position_to_key(&position)));
        }

        let output = query
            .send()
            .await
            .map_err(|err| StoreError::Service(err.to_string()))?;

        let posts = output
            .items()
            .iter()
            .map(post_from_item)
            .collect::<Result<Vec<_>, _>>()?;

        let next = output
            .last_evaluated_key()
            .map(position_from_key)
            .transpose()?;

        Ok((posts, next))
    }
}

pub struct DynamoCommentStore {
    client: Arc<Client>,
    table: String,
    post_index: String,
}

impl DynamoCommentStore {
    pub fn new(client: Arc<Client>, table: String, post_index: String) -> Self {
        Self {
            client,
            table,
            post_index,
        }
    }
}

#[async_trait]
impl CommentStore for DynamoCommentStore {
    async fn get_comment(&self, comment_id: &str) -> Result<Option<Comment>, StoreError> {
        // The table key is (CommentID, Timestamp); a point lookup by id alone
        // has to go through a single-item query on the partition key.
        let output = self
            .client
            .query()
            .table_name(&self.table)
            .key_condition_expression("CommentID = :id")
            .expression_attribute_values(":id", AttributeValue::S(comment_id.to_string()))
            .limit(1)
            .send()
            .await
            .map_err(|err| StoreError::Service(err.to_string()))?;

        output.items().first().map(comment_from_item).transpose()
    }

    async fn put_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(comment_to_item(comment)))
            .send()
            .await
            .map_err(|err| StoreError::Service(err.to_string()))?;

        Ok(())
    }

    async fn delete_comment(&self, comment_id: &str, timestamp: i64) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key("CommentID", AttributeValue::S(comment_id.to_string()))
            .key("Timestamp", AttributeValue::N(timestamp.to_string()))
            .send()
            .await
            .map_err(|err| StoreError::Service(err.to_string()))?;

        Ok(())
    }

    async fn latest_comments(
        &self,
        post_id: &str,
        limit: i64,
    ) -> Result<Vec<Comment>, StoreError> {
        let output = self
            .client
            .query()
            .table_name(&self.table)
            .index_name(&self.post_index)
            .key_condition_expression("PostID = :post")
            .expression_attribute_values(":post", AttributeValue::S(post_id.to_string()))
            .scan_index_forward(false)
            .limit(limit as i32)
            .send()
            .await
            .map_err(|err| StoreError::Service(err.to_string()))?;

        output.items().iter().map(comment_from_item).collect()
    }
}

fn s_attr(item: &Item, name: &str) -> Result<String, StoreError> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| StoreError::Malformed(format!("missing string attribute {name}")))
}

fn n_attr(item: &Item, name: &str) -> Result<i64, StoreError> {
    let raw = item
        .get(name)
        .and_then(|value| value.as_n().ok())
        .ok_or_else(|| StoreError::Malformed(format!("missing numeric attribute {name}")))?;
    coerce_int(raw)
}

fn post_from_item(item: &Item) -> Result<Post, StoreError> {
    let status = match s_attr(item, "Status")?.as_str() {
        "ok" => PostStatus::Ok,
        "hidden" => PostStatus::Hidden,
        other => {
            return Err(StoreError::Malformed(format!("unknown post status {other}")));
        }
    };

    Ok(Post {
        post_id: s_attr(item, "PostID")?,
        timestamp: n_attr(item, "Timestamp")?,
        author: s_attr(item, "Author")?,
        body: s_attr(item, "Body")?,
        status,
        comment_count: n_attr(item, "CommentCount")?,
        version: n_attr(item, "Version")?,
    })
}

fn post_to_item(post: &Post) -> Item {
    HashMap::from([
        (
            "PostID".to_string(),
            AttributeValue::S(post.post_id.clone()),
        ),
        (
            "Timestamp".to_string(),
            AttributeValue::N(post.timestamp.to_string()),
        ),
        ("Author".to_string(), AttributeValue::S(post.author.clone())),
        ("Body".to_string(), AttributeValue::S(post.body.clone())),
        (
            "Status".to_string(),
            AttributeValue::S(post.status.as_str().to_string()),
        ),
        (
            "CommentCount".to_string(),
            AttributeValue::N(post.comment_count.to_string()),
        ),
        (
            "Version".to_string(),
            AttributeValue::N(post.version.to_string()),
        ),
    ])
}

fn comment_from_item(item: &Item) -> Result<Comment, StoreError> {
    Ok(Comment {
        comment_id: s_attr(item, "CommentID")?,
        post_id: s_attr(item, "PostID")?,
        timestamp: n_attr(item, "Timestamp")?,
        author: s_attr(item, "Author")?,
        body: s_attr(item, "Body")?,
    })
}

fn comment_to_item(comment: &Comment) -> Item {
    HashMap::from([
        (
            "CommentID".to_string(),
            AttributeValue::S(comment.comment_id.clone()),
        ),
        (
            "PostID".to_string(),
            AttributeValue::S(comment.post_id.clone()),
        ),
        (
            "Timestamp".to_string(),
            AttributeValue::N(comment.timestamp.to_string()),
        ),
        (
            "Author".to_string(),
            AttributeValue::S(comment.author.clone()),
        ),
        ("Body".to_string(), AttributeValue::S(comment.body.clone())),
    ])
}

/// The resume position is exactly the key shape DynamoDB hands back in
/// `LastEvaluatedKey` for the feed index: table key plus index keys.
fn position_from_key(key: &Item) -> Result<FeedPosition, StoreError> {
    Ok(FeedPosition {
        post_id: s_attr(key, "PostID")?,
        status: s_attr(key, "Status")?,
        timestamp: n_attr(key, "Timestamp")?,
    })
}

fn position_to_key(position: &FeedPosition) -> Item {
    HashMap::from([
        (
            "PostID".to_string(),
            AttributeValue::S(position.post_id.clone()),
        ),
        (
            "Status".to_string(),
            AttributeValue::S(position.status.clone()),
        ),
        (
            "Timestamp".to_string(),
            AttributeValue::N(position.timestamp.to_string()),
        ),
    ])
}
