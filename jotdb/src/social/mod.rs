//! Social content layer built on top of the document store.
//!
//! Three facades cover the write paths of a small content site:
//!
//! - [Posts] - post lifecycle: create, fetch, feed, soft delete, counters.
//! - [Interactions] - likes, comments, and follows.
//! - [Admin] - moderation: hard deletes, IP bans, backups.

mod admin;
mod interactions;
mod posts;

pub use admin::*;
pub use interactions::*;
pub use posts::*;

use crate::collection::{Document, RecordId};
use crate::common::{FIELD_DISPLAY_NAME, FIELD_PROFILE_IMAGE, FIELD_USERNAME, FIELD_USER_ID};
use indexmap::IndexMap;

/// A page of posts with pagination bookkeeping.
#[derive(Debug, Clone)]
pub struct PagedPosts {
    pub posts: Vec<Document>,
    pub total: usize,
    pub page: usize,
    pub pages: usize,
}

/// A page of comments with pagination bookkeeping.
#[derive(Debug, Clone)]
pub struct PagedComments {
    pub comments: Vec<Document>,
    pub total: usize,
    pub page: usize,
    pub pages: usize,
}

/// Slices one 1-based page out of `items` and returns
/// `(page_items, total, page, pages)`.
pub(crate) fn paginate(
    items: Vec<Document>,
    page: usize,
    page_size: usize,
) -> (Vec<Document>, usize, usize, usize) {
    let total = items.len();
    let page = page.max(1);
    let pages = total.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size);
    let page_items = if start >= total {
        Vec::new()
    } else {
        items
            .into_iter()
            .skip(start)
            .take(page_size)
            .collect()
    };
    (page_items, total, page, pages)
}

/// Copies the author's public fields (`username`, `display_name`,
/// `profile_image`) onto a record carrying a `user_id`. Records with a
/// missing or unknown author are left untouched.
pub(crate) fn attach_author(users: &IndexMap<RecordId, Document>, record: &mut Document) {
    let user_id = match record.get(FIELD_USER_ID) {
        crate::common::Value::String(id) => id,
        _ => return,
    };
    let author = match RecordId::parse(&user_id).ok().and_then(|id| users.get(&id)) {
        Some(author) => author,
        None => return,
    };

    for field in [FIELD_USERNAME, FIELD_DISPLAY_NAME, FIELD_PROFILE_IMAGE] {
        if author.has_field(field) {
            record.put_unchecked(field, author.get(field));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_paginate_slices_pages() {
        let items: Vec<Document> = (0..5).map(|n| doc! { n: n }).collect();
        let (page_items, total, page, pages) = paginate(items, 2, 2);
        assert_eq!(total, 5);
        assert_eq!(page, 2);
        assert_eq!(pages, 3);
        assert_eq!(page_items.len(), 2);
        assert_eq!(page_items[0].get("n"), crate::common::Value::I64(2));
    }

    #[test]
    fn test_paginate_page_zero_is_page_one() {
        let items: Vec<Document> = (0..3).map(|n| doc! { n: n }).collect();
        let (page_items, _, page, _) = paginate(items, 0, 2);
        assert_eq!(page, 1);
        assert_eq!(page_items.len(), 2);
    }

    #[test]
    fn test_paginate_past_end_is_empty() {
        let items: Vec<Document> = (0..3).map(|n| doc! { n: n }).collect();
        let (page_items, total, _, pages) = paginate(items, 9, 2);
        assert!(page_items.is_empty());
        assert_eq!(total, 3);
        assert_eq!(pages, 2);
    }

    #[test]
    fn test_paginate_empty() {
        let (page_items, total, page, pages) = paginate(Vec::new(), 1, 20);
        assert!(page_items.is_empty());
        assert_eq!(total, 0);
        assert_eq!(page, 1);
        assert_eq!(pages, 0);
    }
}
