use crate::collection::{Document, RecordId};
use crate::common::{
    Value, COMMENTS_COLLECTION, COMMENTS_PER_PAGE, FIELD_CREATED_AT, FIELD_FOLLOWER_COUNT,
    FIELD_FOLLOWING_COUNT, FIELD_POST_ID, FOLLOWS_COLLECTION, LIKES_COLLECTION, POSTS_COLLECTION,
    USERS_COLLECTION,
};
use crate::db::JotDb;
use crate::errors::{ErrorKind, JotError, JotResult};
use crate::social::{attach_author, paginate, PagedComments, Posts};
use crate::{doc, pred};

/// Likes, comments, and follows.
///
/// Every interaction keeps the denormalized counters on the affected post or
/// user records in step, mirroring what readers expect to see without a join.
#[derive(Clone)]
pub struct Interactions {
    db: JotDb,
    posts: Posts,
}

impl Interactions {
    pub fn new(db: &JotDb) -> Self {
        Interactions {
            db: db.clone(),
            posts: Posts::new(db),
        }
    }

    /// Likes the post if the user has not liked it yet, otherwise removes the
    /// like. Returns `Ok(true)` when the post ends up liked.
    pub fn toggle_like(&self, user_id: &RecordId, post_id: &RecordId) -> JotResult<bool> {
        let likes = self.db.collection(LIKES_COLLECTION)?;
        let existing = likes.find_one(&pred! {
            user_id: (user_id.as_str()),
            post_id: (post_id.as_str()),
        })?;

        match existing {
            Some(like) => {
                likes.delete(&like.id()?)?;
                self.posts.decrement_like_count(post_id)?;
                Ok(false)
            }
            None => {
                likes.insert(doc! {
                    user_id: (user_id.as_str()),
                    post_id: (post_id.as_str()),
                })?;
                self.posts.increment_like_count(post_id)?;
                Ok(true)
            }
        }
    }

    /// Returns whether the user currently likes the post.
    pub fn is_liked(&self, user_id: &RecordId, post_id: &RecordId) -> JotResult<bool> {
        let likes = self.db.collection(LIKES_COLLECTION)?;
        Ok(likes
            .find_one(&pred! {
                user_id: (user_id.as_str()),
                post_id: (post_id.as_str()),
            })?
            .is_some())
    }

    /// Adds a comment to a post and bumps the post's comment counter.
    ///
    /// # Errors
    ///
    /// * [ErrorKind::ValidationError] if the comment content is blank
    /// * [ErrorKind::NotFound] if the post does not exist
    pub fn add_comment(
        &self,
        user_id: &RecordId,
        post_id: &RecordId,
        content: &str,
    ) -> JotResult<RecordId> {
        let content = content.trim();
        if content.is_empty() {
            log::error!("Rejected comment: content is required");
            return Err(JotError::new(
                "Comment content is required",
                ErrorKind::ValidationError,
            ));
        }

        if self
            .db
            .collection(POSTS_COLLECTION)?
            .get_by_id(post_id)?
            .is_none()
        {
            log::error!("Cannot comment on missing post {}", post_id);
            return Err(JotError::new(
                "Post not found",
                ErrorKind::NotFound,
            ));
        }

        let comments = self.db.collection(COMMENTS_COLLECTION)?;
        let comment_id = comments.insert(doc! {
            user_id: (user_id.as_str()),
            post_id: (post_id.as_str()),
            content: content,
        })?;
        self.posts.increment_comment_count(post_id)?;
        Ok(comment_id)
    }

    /// Returns one page of a post's comments, oldest first, author-joined.
    pub fn post_comments(&self, post_id: &RecordId, page: usize) -> JotResult<PagedComments> {
        let comments = self.db.collection(COMMENTS_COLLECTION)?;
        let users = self.db.collection(USERS_COLLECTION)?.get_all()?;

        let mut matched: Vec<Document> = comments
            .find(&pred! { post_id: (post_id.as_str()) })?
            .into_values()
            .collect();
        matched.sort_by(|a, b| {
            a.get(FIELD_CREATED_AT)
                .as_str()
                .unwrap_or_default()
                .cmp(b.get(FIELD_CREATED_AT).as_str().unwrap_or_default())
        });
        for comment in &mut matched {
            attach_author(&users, comment);
        }

        let (comments, total, page, pages) = paginate(matched, page, COMMENTS_PER_PAGE);
        Ok(PagedComments {
            comments,
            total,
            page,
            pages,
        })
    }

    /// Hard-deletes a comment and decrements the post's comment counter.
    /// Returns `Ok(false)` if no such comment exists.
    pub fn delete_comment(&self, comment_id: &RecordId) -> JotResult<bool> {
        let comments = self.db.collection(COMMENTS_COLLECTION)?;
        let comment = match comments.get_by_id(comment_id)? {
            Some(comment) => comment,
            None => return Ok(false),
        };

        if !comments.delete(comment_id)? {
            return Ok(false);
        }

        if let Value::String(post_id) = comment.get(FIELD_POST_ID) {
            if let Ok(post_id) = RecordId::parse(&post_id) {
                self.posts.decrement_comment_count(&post_id)?;
            }
        }
        Ok(true)
    }

    /// Follows the user if not yet followed, otherwise unfollows. Adjusts the
    /// follower/following counters on both user records. Returns `Ok(true)`
    /// when the relationship ends up active.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::ValidationError] on an attempt to follow oneself.
    pub fn toggle_follow(
        &self,
        follower_id: &RecordId,
        following_id: &RecordId,
    ) -> JotResult<bool> {
        if follower_id == following_id {
            log::error!("User {} cannot follow themselves", follower_id);
            return Err(JotError::new(
                "Users cannot follow themselves",
                ErrorKind::ValidationError,
            ));
        }

        let follows = self.db.collection(FOLLOWS_COLLECTION)?;
        let existing = follows.find_one(&pred! {
            follower_id: (follower_id.as_str()),
            following_id: (following_id.as_str()),
        })?;

        match existing {
            Some(follow) => {
                follows.delete(&follow.id()?)?;
                self.adjust_user_counter(follower_id, FIELD_FOLLOWING_COUNT, -1)?;
                self.adjust_user_counter(following_id, FIELD_FOLLOWER_COUNT, -1)?;
                Ok(false)
            }
            None => {
                follows.insert(doc! {
                    follower_id: (follower_id.as_str()),
                    following_id: (following_id.as_str()),
                })?;
                self.adjust_user_counter(follower_id, FIELD_FOLLOWING_COUNT, 1)?;
                self.adjust_user_counter(following_id, FIELD_FOLLOWER_COUNT, 1)?;
                Ok(true)
            }
        }
    }

    /// Returns whether `follower_id` currently follows `following_id`.
    pub fn is_following(
        &self,
        follower_id: &RecordId,
        following_id: &RecordId,
    ) -> JotResult<bool> {
        let follows = self.db.collection(FOLLOWS_COLLECTION)?;
        Ok(follows
            .find_one(&pred! {
                follower_id: (follower_id.as_str()),
                following_id: (following_id.as_str()),
            })?
            .is_some())
    }

    fn adjust_user_counter(&self, user_id: &RecordId, field: &str, delta: i64) -> JotResult<bool> {
        let users = self.db.collection(USERS_COLLECTION)?;
        let user = match users.get_by_id(user_id)? {
            Some(user) => user,
            None => return Ok(false),
        };

        let current = user.get(field).as_i64().unwrap_or(0);
        let next = (current + delta).max(0);

        let mut changes = Document::new();
        changes.put(field, next)?;
        users.update(user_id, &changes)
    }
}
