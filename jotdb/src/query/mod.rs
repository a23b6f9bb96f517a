//! Predicate-based querying for collections.
//!
//! Queries are expressed as conjunctive field-equality predicates, built with
//! the fluent [Predicate] API or the [pred!](crate::pred) macro:
//!
//! ```ignore
//! use jotdb::pred;
//!
//! let active_posts = posts.find(&pred!{ user_id: id, is_active: true })?;
//! ```

mod predicate;

pub use predicate::*;
