use crate::collection::FileCollection;
use crate::common::COLLECTION_FILE_EXT;
use crate::db_builder::JotDbBuilder;
use crate::db_config::JotDbConfig;
use crate::errors::{ErrorKind, JotError, JotResult};
use crate::JOTDB_VERSION;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fs;
use std::sync::Arc;

/// An embedded flat-file JSON document database.
///
/// `JotDb` is the entry point of the crate. It owns the data directory and
/// hands out [FileCollection] handles; each collection name maps to exactly
/// one cached handle, so every caller sees the same in-memory state.
///
/// The handle is cheap to clone and safe to share across threads.
///
/// # Examples
///
/// ```rust,ignore
/// use jotdb::{JotDb, doc};
///
/// let db = JotDb::builder().base_dir("./data").open_or_create()?;
/// let posts = db.collection("posts")?;
/// let id = posts.insert(doc!{ title: "hello world" })?;
/// ```
#[derive(Clone)]
pub struct JotDb {
    /// The pointer to implementation. Uses Arc for cheap cloning and thread safety.
    inner: Arc<JotDbInner>,
}

struct JotDbInner {
    config: JotDbConfig,
    collections: DashMap<String, FileCollection>,
}

impl JotDb {
    /// Returns a builder for configuring and opening a database.
    pub fn builder() -> JotDbBuilder {
        JotDbBuilder::new()
    }

    pub(crate) fn new(config: JotDbConfig) -> Self {
        JotDb {
            inner: Arc::new(JotDbInner {
                config,
                collections: DashMap::new(),
            }),
        }
    }

    /// Creates the data directory and freezes the configuration.
    pub(crate) fn initialize(&self) -> JotResult<()> {
        let base_dir = self.inner.config.base_dir();
        fs::create_dir_all(&base_dir).map_err(|err| {
            log::error!("Failed to create data directory {:?}", base_dir);
            JotError::io("Failed to create data directory", err)
        })?;
        self.inner.config.mark_configured();
        log::info!("jotdb {} opened at {:?}", JOTDB_VERSION, base_dir);
        Ok(())
    }

    /// Returns the collection with the given name, opening it on first
    /// access. Repeated calls with the same name return the same handle.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::ValidationError] if the name is empty or contains
    /// path separators.
    pub fn collection(&self, name: &str) -> JotResult<FileCollection> {
        validate_collection_name(name)?;

        match self.inner.collections.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let collection = FileCollection::open(name, self.inner.config.clone())?;
                entry.insert(collection.clone());
                Ok(collection)
            }
        }
    }

    /// Returns true if a collection file with the given name exists on disk
    /// or the collection is already open.
    pub fn has_collection(&self, name: &str) -> bool {
        if self.inner.collections.contains_key(name) {
            return true;
        }
        self.inner
            .config
            .base_dir()
            .join(format!("{}.{}", name, COLLECTION_FILE_EXT))
            .exists()
    }

    /// Lists the names of all collections present in the data directory.
    pub fn collection_names(&self) -> JotResult<Vec<String>> {
        let base_dir = self.inner.config.base_dir();
        let entries = fs::read_dir(&base_dir).map_err(|err| {
            log::error!("Failed to read data directory {:?}", base_dir);
            JotError::io("Failed to read data directory", err)
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| {
                log::error!("Failed to read data directory entry in {:?}", base_dir);
                JotError::io("Failed to read data directory entry", err)
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(COLLECTION_FILE_EXT) {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Returns the database configuration.
    pub fn config(&self) -> &JotDbConfig {
        &self.inner.config
    }
}

fn validate_collection_name(name: &str) -> JotResult<()> {
    if name.is_empty() {
        log::error!("Collection name cannot be empty");
        return Err(JotError::new(
            "Collection name cannot be empty",
            ErrorKind::ValidationError,
        ));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        log::error!("Invalid collection name: {}", name);
        return Err(JotError::new(
            &format!("Invalid collection name: {}", name),
            ErrorKind::ValidationError,
        ));
    }
    Ok(())
}
