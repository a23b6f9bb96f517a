//! # jotdb - Embedded Flat-File JSON Document Store
//!
//! jotdb is a lightweight embedded document store that keeps each collection
//! in a single human-readable JSON file. It provides schemaless documents,
//! predicate queries, a relevance-ranked search engine, and a small social
//! content layer on top.
//!
//! ## Key Features
//!
//! - **Embedded**: No separate server process required
//! - **Flat files**: One inspectable JSON file per collection
//! - **Crash safe**: Atomic temp-file + rename on every write
//! - **Schemaless**: Documents are free-form key-value maps
//! - **Querying**: Conjunctive field predicates with loose equality
//! - **Search**: Multi-tier relevance ranking over posts
//! - **Clean API**: PIMPL pattern provides stable, encapsulated interface
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jotdb::{doc, pred, JotDb};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Open a database
//! let db = JotDb::builder().base_dir("./data").open_or_create()?;
//!
//! // Get or create a collection
//! let posts = db.collection("posts")?;
//!
//! // Insert a document
//! let id = posts.insert(doc!{ title: "hello world", is_active: true })?;
//!
//! // Query it back
//! let results = posts.find(&pred!{ is_active: true })?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents, record ids, and the file-backed collection store
//! - [`common`] - Common types, constants, and utilities
//! - [`db`] - Core database handle
//! - [`db_builder`] - Database builder for initialization
//! - [`db_config`] - Database configuration
//! - [`errors`] - Error types and result definitions
//! - [`query`] - Field-equality predicates
//! - [`search`] - Relevance-ranked post search
//! - [`social`] - Posts, interactions, and moderation facades

pub mod collection;
pub mod common;
pub mod db;
pub mod db_builder;
pub mod db_config;
pub mod errors;
pub mod query;
pub mod search;
pub mod social;

pub use crate::common::JOTDB_VERSION;
pub use crate::db::JotDb;
pub use crate::db_builder::JotDbBuilder;
pub use crate::db_config::JotDbConfig;
