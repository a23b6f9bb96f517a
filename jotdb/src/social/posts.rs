use crate::collection::{Document, RecordId};
use crate::common::{
    timestamp_days_ago, Value, FIELD_COMMENT_COUNT, FIELD_CREATED_AT, FIELD_DOWNLOAD_COUNT,
    FIELD_ENGAGEMENT_SCORE, FIELD_IS_ACTIVE, FIELD_LIKE_COUNT, FIELD_MEDIA_PATH, FIELD_MEDIA_TYPE,
    FIELD_THUMBNAIL_PATH, FIELD_TRIGGER_QUESTIONS, POSTS_COLLECTION, POSTS_PER_PAGE,
    USERS_COLLECTION,
};
use crate::db::JotDb;
use crate::errors::{ErrorKind, JotError, JotResult};
use crate::social::{attach_author, paginate, PagedPosts};
use crate::{doc, pred};

/// How far back the trending window reaches, in days.
const TRENDING_WINDOW_DAYS: i64 = 7;

/// Comments weigh double likes when ranking trending posts.
const TRENDING_COMMENT_WEIGHT: i64 = 2;

/// Media attached to a post at creation time.
#[derive(Debug, Clone)]
pub struct Media {
    pub media_type: String,
    pub media_path: String,
    pub thumbnail_path: Option<String>,
}

/// Post lifecycle operations: create, fetch, feeds, soft delete, and
/// engagement counters.
///
/// Deleting through this facade is always a soft delete (`is_active: false`);
/// records and their media stay on disk until an
/// [Admin](crate::social::Admin) purge.
#[derive(Clone)]
pub struct Posts {
    db: JotDb,
}

impl Posts {
    pub fn new(db: &JotDb) -> Self {
        Posts { db: db.clone() }
    }

    /// Creates a post and returns its record id.
    ///
    /// The post starts active with all engagement counters at zero.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::ValidationError] if the title is blank.
    pub fn create(
        &self,
        user_id: &RecordId,
        title: &str,
        content: &str,
        trigger_questions: Vec<String>,
        media: Option<Media>,
    ) -> JotResult<RecordId> {
        let title = title.trim();
        if title.is_empty() {
            log::error!("Rejected post creation: title is required");
            return Err(JotError::new(
                "Post title is required",
                ErrorKind::ValidationError,
            ));
        }

        let mut post = doc! {
            user_id: (user_id.as_str()),
            title: title,
            content: content,
            is_active: true,
            like_count: 0,
            comment_count: 0,
            download_count: 0,
        };
        post.put(
            FIELD_TRIGGER_QUESTIONS,
            Value::Array(trigger_questions.into_iter().map(Value::from).collect()),
        )?;

        if let Some(media) = media {
            post.put(FIELD_MEDIA_TYPE, media.media_type)?;
            post.put(FIELD_MEDIA_PATH, media.media_path)?;
            if let Some(thumbnail_path) = media.thumbnail_path {
                post.put(FIELD_THUMBNAIL_PATH, thumbnail_path)?;
            }
        }

        self.db.collection(POSTS_COLLECTION)?.insert(post)
    }

    /// Returns the post with the given id, joined with the author's public
    /// fields. Missing and soft-deleted posts both yield `None`.
    pub fn get(&self, id: &RecordId) -> JotResult<Option<Document>> {
        let post = match self.db.collection(POSTS_COLLECTION)?.get_by_id(id)? {
            Some(post) => post,
            None => return Ok(None),
        };
        if !is_active(&post) {
            return Ok(None);
        }

        let users = self.db.collection(USERS_COLLECTION)?.get_all()?;
        let mut post = post;
        attach_author(&users, &mut post);
        Ok(Some(post))
    }

    /// Returns one page of the site-wide feed: active posts, newest first,
    /// author-joined.
    pub fn feed(&self, page: usize) -> JotResult<PagedPosts> {
        self.paged_active_posts(&pred! { is_active: true }, page)
    }

    /// Returns one page of a single user's active posts, newest first.
    pub fn user_posts(&self, user_id: &RecordId, page: usize) -> JotResult<PagedPosts> {
        self.paged_active_posts(
            &pred! { user_id: user_id.as_str(), is_active: true },
            page,
        )
    }

    /// Deactivates a post. Returns `Ok(false)` if no such post exists.
    pub fn soft_delete(&self, id: &RecordId) -> JotResult<bool> {
        self.db
            .collection(POSTS_COLLECTION)?
            .update(id, &doc! { is_active: false })
    }

    /// Adds one to the post's like counter.
    pub fn increment_like_count(&self, id: &RecordId) -> JotResult<bool> {
        self.adjust_counter(id, FIELD_LIKE_COUNT, 1)
    }

    /// Subtracts one from the post's like counter, never going below zero.
    pub fn decrement_like_count(&self, id: &RecordId) -> JotResult<bool> {
        self.adjust_counter(id, FIELD_LIKE_COUNT, -1)
    }

    /// Adds one to the post's comment counter.
    pub fn increment_comment_count(&self, id: &RecordId) -> JotResult<bool> {
        self.adjust_counter(id, FIELD_COMMENT_COUNT, 1)
    }

    /// Subtracts one from the post's comment counter, never going below zero.
    pub fn decrement_comment_count(&self, id: &RecordId) -> JotResult<bool> {
        self.adjust_counter(id, FIELD_COMMENT_COUNT, -1)
    }

    /// Adds one to the post's download counter.
    pub fn increment_download_count(&self, id: &RecordId) -> JotResult<bool> {
        self.adjust_counter(id, FIELD_DOWNLOAD_COUNT, 1)
    }

    /// Returns up to `limit` active posts from the last seven days, ranked by
    /// engagement (`like_count + 2 * comment_count`, descending). Each post
    /// carries its computed `engagement_score` and the author's public fields.
    pub fn trending(&self, limit: usize) -> JotResult<Vec<Document>> {
        let cutoff = timestamp_days_ago(TRENDING_WINDOW_DAYS);
        let posts = self.db.collection(POSTS_COLLECTION)?;
        let users = self.db.collection(USERS_COLLECTION)?.get_all()?;

        let mut scored: Vec<(i64, Document)> = Vec::new();
        for (_, post) in posts.get_all()? {
            if !is_active(&post) {
                continue;
            }
            // record timestamps sort lexicographically
            let recent = match post.get(FIELD_CREATED_AT) {
                Value::String(created_at) => created_at.as_str() >= cutoff.as_str(),
                _ => false,
            };
            if !recent {
                continue;
            }

            let likes = post.get(FIELD_LIKE_COUNT).as_i64().unwrap_or(0);
            let comments = post.get(FIELD_COMMENT_COUNT).as_i64().unwrap_or(0);
            scored.push((likes + TRENDING_COMMENT_WEIGHT * comments, post));
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, mut post)| {
                post.put_unchecked(FIELD_ENGAGEMENT_SCORE, score);
                attach_author(&users, &mut post);
                post
            })
            .collect())
    }

    fn paged_active_posts(
        &self,
        predicate: &crate::query::Predicate,
        page: usize,
    ) -> JotResult<PagedPosts> {
        let posts = self.db.collection(POSTS_COLLECTION)?;
        let users = self.db.collection(USERS_COLLECTION)?.get_all()?;

        let mut matched: Vec<Document> = posts.find(predicate)?.into_values().collect();
        // newest first; insertion order breaks ties
        matched.sort_by(|a, b| {
            b.get(FIELD_CREATED_AT)
                .as_str()
                .unwrap_or_default()
                .cmp(a.get(FIELD_CREATED_AT).as_str().unwrap_or_default())
        });
        for post in &mut matched {
            attach_author(&users, post);
        }

        let (posts, total, page, pages) = paginate(matched, page, POSTS_PER_PAGE);
        Ok(PagedPosts {
            posts,
            total,
            page,
            pages,
        })
    }

    fn adjust_counter(&self, id: &RecordId, field: &str, delta: i64) -> JotResult<bool> {
        let posts = self.db.collection(POSTS_COLLECTION)?;
        let post = match posts.get_by_id(id)? {
            Some(post) => post,
            None => return Ok(false),
        };

        let current = post.get(field).as_i64().unwrap_or(0);
        let next = (current + delta).max(0);

        let mut changes = Document::new();
        changes.put(field, next)?;
        posts.update(id, &changes)
    }
}

fn is_active(post: &Document) -> bool {
    post.get(FIELD_IS_ACTIVE).as_bool().unwrap_or(false)
}
