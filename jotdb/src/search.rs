//! Multi-tier relevance-ranked search over posts.
//!
//! Posts are scored against the query with additive rules; matches scoring at
//! least [SCORE_TRIGGER_MATCH] form a prioritized tier that is always served
//! before ordinary matches, regardless of the ordinary tier's scores.

use crate::collection::Document;
use crate::common::{
    Value, FIELD_CONTENT, FIELD_IS_ACTIVE, FIELD_RELEVANCE_SCORE, FIELD_TITLE,
    FIELD_TRIGGER_QUESTIONS, POSTS_COLLECTION, SEARCH_RESULTS_LIMIT, USERS_COLLECTION,
};
use crate::db::JotDb;
use crate::errors::{ErrorKind, JotError, JotResult};
use crate::social::{attach_author, paginate};
use itertools::Itertools;

/// Score for a query hitting one of a post's FAQ trigger questions. A post
/// reaching this score lands in the prioritized tier.
pub const SCORE_TRIGGER_MATCH: i64 = 100;
/// Score for the query appearing in the title.
pub const SCORE_TITLE_MATCH: i64 = 50;
/// Additional score when the query equals the whole title.
pub const SCORE_TITLE_EXACT_BONUS: i64 = 30;
/// Score for the query appearing in the content.
pub const SCORE_CONTENT_MATCH: i64 = 20;
/// Score per query token found in the title.
pub const SCORE_TITLE_TOKEN: i64 = 10;
/// Score per query token found in the content.
pub const SCORE_CONTENT_TOKEN: i64 = 5;

/// Queries shorter than this (after trimming) are rejected.
pub const MIN_QUERY_LEN: usize = 2;

/// Tokens must be longer than this to contribute to the score.
const MIN_TOKEN_LEN: usize = 2;

/// A page of ranked search results.
#[derive(Debug, Clone)]
pub struct SearchResults {
    /// Matched posts for the requested page, best first, each carrying a
    /// `relevance_score` field and the author's public fields.
    pub posts: Vec<Document>,
    /// Total number of matched posts across all pages.
    pub total: usize,
    /// The served page (1-based).
    pub page: usize,
    /// Total number of pages.
    pub pages: usize,
    /// The normalized query the results were ranked against.
    pub query: String,
}

/// Relevance-ranked post search over a [JotDb] database.
///
/// # Examples
///
/// ```ignore
/// let engine = SearchEngine::new(&db);
/// let results = engine.search("how to cook", 1, 20)?;
/// for post in &results.posts {
///     println!("{}: {}", post.get("relevance_score"), post.get("title"));
/// }
/// ```
#[derive(Clone)]
pub struct SearchEngine {
    db: JotDb,
}

impl SearchEngine {
    pub fn new(db: &JotDb) -> Self {
        SearchEngine { db: db.clone() }
    }

    /// Searches active posts for the query and returns one page of ranked
    /// results.
    ///
    /// The query is trimmed and lowercased before matching. Scoring is
    /// additive over trigger-question, title, content, and per-token rules;
    /// posts hitting a trigger question are served before all other matches.
    /// Ties keep collection insertion order.
    ///
    /// # Arguments
    ///
    /// * `query` - The raw user query.
    /// * `page` - 1-based page number; values below 1 are treated as 1.
    /// * `page_size` - Results per page, clamped to the search results limit.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::ValidationError] if the trimmed query is shorter
    /// than [MIN_QUERY_LEN] characters.
    pub fn search(&self, query: &str, page: usize, page_size: usize) -> JotResult<SearchResults> {
        let normalized = query.trim().to_lowercase();
        if normalized.chars().count() < MIN_QUERY_LEN {
            log::error!("Rejected search query {:?}: too short", query);
            return Err(JotError::new(
                "Search query is too short",
                ErrorKind::ValidationError,
            ));
        }

        let tokens: Vec<&str> = normalized
            .split_whitespace()
            .filter(|token| token.chars().count() > MIN_TOKEN_LEN)
            .collect();

        let posts = self.db.collection(POSTS_COLLECTION)?;
        let users = self.db.collection(USERS_COLLECTION)?.get_all()?;

        let mut prioritized: Vec<(i64, Document)> = Vec::new();
        let mut standard: Vec<(i64, Document)> = Vec::new();

        for (_, post) in posts.get_all()? {
            if !is_active(&post) {
                continue;
            }
            let score = score_post(&post, &normalized, &tokens);
            if score >= SCORE_TRIGGER_MATCH {
                prioritized.push((score, post));
            } else if score > 0 {
                standard.push((score, post));
            }
        }

        // sorted_by is stable, so equal scores keep snapshot order
        let matched: Vec<Document> = prioritized
            .into_iter()
            .sorted_by(|a, b| b.0.cmp(&a.0))
            .chain(standard.into_iter().sorted_by(|a, b| b.0.cmp(&a.0)))
            .map(|(score, mut post)| {
                post.put_unchecked(FIELD_RELEVANCE_SCORE, score);
                attach_author(&users, &mut post);
                post
            })
            .collect();

        let page_size = page_size.clamp(1, SEARCH_RESULTS_LIMIT);
        let (posts, total, page, pages) = paginate(matched, page, page_size);

        Ok(SearchResults {
            posts,
            total,
            page,
            pages,
            query: normalized,
        })
    }
}

fn is_active(post: &Document) -> bool {
    post.get(FIELD_IS_ACTIVE).as_bool().unwrap_or(false)
}

fn score_post(post: &Document, query: &str, tokens: &[&str]) -> i64 {
    let title = post
        .get(FIELD_TITLE)
        .as_str()
        .map(str::to_lowercase)
        .unwrap_or_default();
    let content = post
        .get(FIELD_CONTENT)
        .as_str()
        .map(str::to_lowercase)
        .unwrap_or_default();

    let mut score = 0;

    if let Value::Array(questions) = post.get(FIELD_TRIGGER_QUESTIONS) {
        for question in &questions {
            if let Some(question) = question.as_str() {
                let question = question.to_lowercase();
                if !question.is_empty() && question.contains(query) {
                    score += SCORE_TRIGGER_MATCH;
                }
            }
        }
    }

    if !title.is_empty() && title.contains(query) {
        score += SCORE_TITLE_MATCH;
        if title == query {
            score += SCORE_TITLE_EXACT_BONUS;
        }
    }

    if !content.is_empty() && content.contains(query) {
        score += SCORE_CONTENT_MATCH;
    }

    for token in tokens {
        if title.contains(token) {
            score += SCORE_TITLE_TOKEN;
        }
        if content.contains(token) {
            score += SCORE_CONTENT_TOKEN;
        }
    }

    score
}
