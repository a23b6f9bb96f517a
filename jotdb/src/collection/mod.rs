//! Collections and documents for schemaless data storage.
//!
//! This module provides the core storage abstraction in jotdb. A collection
//! stores unstructured documents in a single JSON file and supports insert,
//! update, delete, and predicate queries.
//!
//! # Documents
//!
//! A `Document` is a key-value map where keys are strings and values are
//! `Value` objects.
//!
//! ```rust,ignore
//! use jotdb::doc;
//!
//! let doc = doc!{ title: "hello", like_count: 0 };
//! ```
//!
//! # Record IDs
//!
//! Each record has a unique `id` field containing a `RecordId`, generated at
//! insert time from the creation timestamp plus random entropy.
//!
//! # Reserved Fields
//!
//! The following fields are reserved and managed by the store:
//! - `id` - Record ID
//! - `created_at` - Insert timestamp
//! - `updated_at` - Last modification timestamp

mod document;
mod file_collection;
mod record_id;
pub(crate) mod uniqid;

pub use document::*;
pub use file_collection::*;
pub use record_id::RecordId;
pub use uniqid::UniqidGenerator;
