use crate::collection::uniqid::ID_GENERATOR;
use crate::collection::{Document, RecordId};
use crate::common::{
    now_timestamp, COLLECTION_FILE_EXT, FIELD_CREATED_AT, FIELD_ID, FIELD_UPDATED_AT,
    TEMP_FILE_SUFFIX,
};
use crate::db_config::JotDbConfig;
use crate::errors::{ErrorKind, JotError, JotResult};
use crate::query::Predicate;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type RecordMap = IndexMap<RecordId, Document>;

/// A named collection of documents backed by a single JSON file.
///
/// A `FileCollection` keeps its records in memory as an insertion-ordered map
/// and persists the whole map to disk on every mutation. The write path is
/// atomic: data is written to a temp file in the same directory, flushed and
/// synced, then renamed over the real file, so a crash mid-write never leaves
/// a partially written collection behind.
///
/// The handle is cheap to clone; all clones share the same underlying state.
///
/// # Examples
///
/// ```ignore
/// let posts = db.collection("posts")?;
/// let id = posts.insert(doc!{ title: "hello" })?;
/// let found = posts.get_by_id(&id)?;
/// ```
#[derive(Clone)]
pub struct FileCollection {
    inner: Arc<FileCollectionInner>,
}

struct FileCollectionInner {
    name: String,
    path: PathBuf,
    config: JotDbConfig,
    data: RwLock<RecordMap>,
}

impl FileCollection {
    /// Opens the collection with the given name under the database base
    /// directory, creating its backing file if it does not exist yet.
    pub(crate) fn open(name: &str, config: JotDbConfig) -> JotResult<FileCollection> {
        let path = config
            .base_dir()
            .join(format!("{}.{}", name, COLLECTION_FILE_EXT));

        let collection = FileCollection {
            inner: Arc::new(FileCollectionInner {
                name: name.to_string(),
                path,
                config,
                data: RwLock::new(RecordMap::new()),
            }),
        };

        if collection.inner.path.exists() {
            let records = load_records(&collection.inner.path);
            *collection.inner.data.write() = records;
        } else {
            // materialize the backing file right away so the data directory
            // reflects every collection ever opened
            let data = collection.inner.data.write();
            collection.persist(&data)?;
        }

        log::debug!(
            "Opened collection '{}' with {} records",
            collection.inner.name,
            collection.inner.data.read().len()
        );
        Ok(collection)
    }

    /// Returns the collection name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Returns a snapshot of all records in insertion order.
    ///
    /// The snapshot is detached; later mutations of the collection do not
    /// affect it.
    pub fn get_all(&self) -> JotResult<RecordMap> {
        self.refresh()?;
        Ok(self.inner.data.read().clone())
    }

    /// Returns the record with the given id, if present.
    pub fn get_by_id(&self, id: &RecordId) -> JotResult<Option<Document>> {
        self.refresh()?;
        Ok(self.inner.data.read().get(id).cloned())
    }

    /// Inserts a document and returns its freshly assigned record id.
    ///
    /// The store stamps the reserved fields: a new `id`, and `created_at` /
    /// `updated_at` set to the current time. The collection file is persisted
    /// before this method returns.
    ///
    /// # Errors
    ///
    /// * [ErrorKind::InvalidOperation] if the document already carries an `id`
    /// * [ErrorKind::IoError] / [ErrorKind::EncodingError] if persisting fails;
    ///   the in-memory state is rolled back
    pub fn insert(&self, document: Document) -> JotResult<RecordId> {
        if !document.get(FIELD_ID).is_null() {
            log::error!(
                "Cannot insert a document with a pre-assigned id into '{}'",
                self.inner.name
            );
            return Err(JotError::new(
                "Record id is assigned by the store and cannot be supplied on insert",
                ErrorKind::InvalidOperation,
            ));
        }

        let id = ID_GENERATOR.generate();
        let now = now_timestamp();

        let mut document = document;
        document.put_unchecked(FIELD_ID, id.as_str());
        document.put_unchecked(FIELD_CREATED_AT, now.clone());
        document.put_unchecked(FIELD_UPDATED_AT, now);

        let mut data = self.inner.data.write();
        self.sync_for_write(&mut data);
        data.insert(id.clone(), document);

        if let Err(err) = self.persist(&data) {
            data.shift_remove(&id);
            return Err(err);
        }
        Ok(id)
    }

    /// Applies a shallow merge of `changes` onto the record with the given id.
    ///
    /// Returns `Ok(false)` if no such record exists. On success the record's
    /// `updated_at` timestamp is refreshed and the collection is persisted.
    pub fn update(&self, id: &RecordId, changes: &Document) -> JotResult<bool> {
        let mut data = self.inner.data.write();
        self.sync_for_write(&mut data);

        let previous = match data.get(id) {
            Some(existing) => existing.clone(),
            None => return Ok(false),
        };

        let mut updated = previous.clone();
        updated.merge(changes);
        updated.put_unchecked(FIELD_UPDATED_AT, now_timestamp());

        // IndexMap keeps the original position on overwrite
        data.insert(id.clone(), updated);

        if let Err(err) = self.persist(&data) {
            data.insert(id.clone(), previous);
            return Err(err);
        }
        Ok(true)
    }

    /// Removes the record with the given id.
    ///
    /// Returns `Ok(false)` if no such record exists.
    pub fn delete(&self, id: &RecordId) -> JotResult<bool> {
        let mut data = self.inner.data.write();
        self.sync_for_write(&mut data);

        let (index, key, previous) = match data.shift_remove_full(id) {
            Some(entry) => entry,
            None => return Ok(false),
        };

        if let Err(err) = self.persist(&data) {
            data.shift_insert(index, key, previous);
            return Err(err);
        }
        Ok(true)
    }

    /// Returns all records matching the predicate, in insertion order.
    pub fn find(&self, predicate: &Predicate) -> JotResult<RecordMap> {
        predicate.validate()?;
        self.refresh()?;

        let data = self.inner.data.read();
        Ok(data
            .iter()
            .filter(|(_, doc)| predicate.matches(doc))
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect())
    }

    /// Returns the first record matching the predicate, if any.
    pub fn find_one(&self, predicate: &Predicate) -> JotResult<Option<Document>> {
        predicate.validate()?;
        self.refresh()?;

        let data = self.inner.data.read();
        Ok(data
            .values()
            .find(|doc| predicate.matches(doc))
            .cloned())
    }

    /// Counts records, optionally restricted to those matching a predicate.
    pub fn count(&self, predicate: Option<&Predicate>) -> JotResult<usize> {
        self.refresh()?;

        let data = self.inner.data.read();
        match predicate {
            Some(predicate) => {
                predicate.validate()?;
                Ok(data.values().filter(|doc| predicate.matches(doc)).count())
            }
            None => Ok(data.len()),
        }
    }

    /// Returns the id of the most recently inserted record, if any.
    pub fn last_insert_id(&self) -> JotResult<Option<RecordId>> {
        self.refresh()?;
        Ok(self.inner.data.read().keys().last().cloned())
    }

    /// Copies the collection file into `dest_dir` under a timestamped name
    /// and returns the path of the copy.
    pub fn backup(&self, dest_dir: &Path) -> JotResult<PathBuf> {
        fs::create_dir_all(dest_dir).map_err(|err| {
            log::error!("Failed to create backup directory {:?}", dest_dir);
            JotError::io("Failed to create backup directory", err)
        })?;

        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S%.6f");
        let dest = dest_dir.join(format!(
            "{}-{}.{}",
            self.inner.name, stamp, COLLECTION_FILE_EXT
        ));

        // hold the write lock so no rename lands mid-copy
        let _data = self.inner.data.write();
        fs::copy(&self.inner.path, &dest).map_err(|err| {
            log::error!("Failed to back up collection '{}'", self.inner.name);
            JotError::io("Failed to back up collection file", err)
        })?;
        Ok(dest)
    }

    /// Returns the size of the backing file in bytes.
    pub fn size(&self) -> JotResult<u64> {
        let metadata = fs::metadata(&self.inner.path).map_err(|err| {
            log::error!("Failed to stat collection file {:?}", self.inner.path);
            JotError::io("Failed to read collection file metadata", err)
        })?;
        Ok(metadata.len())
    }

    /// Reloads the in-memory map from disk when the database is configured
    /// for multiple writer processes.
    fn refresh(&self) -> JotResult<()> {
        if self.inner.config.single_writer() {
            return Ok(());
        }
        self.reload(&mut self.inner.data.write());
        Ok(())
    }

    /// Replaces `data` with the on-disk state. Callers hold the write lock.
    fn reload(&self, data: &mut RecordMap) {
        if self.inner.path.exists() {
            *data = load_records(&self.inner.path);
        }
    }

    /// Brings `data` up to date with other writer processes before a
    /// mutation. Without this, a stale map would be written back whole,
    /// clobbering records another process persisted in the meantime.
    fn sync_for_write(&self, data: &mut RecordMap) {
        if !self.inner.config.single_writer() {
            self.reload(data);
        }
    }

    /// Serializes the whole map and atomically replaces the backing file.
    /// Callers must hold the write lock for the duration.
    fn persist(&self, data: &RecordMap) -> JotResult<()> {
        let encoded = if self.inner.config.pretty_print() {
            serde_json::to_vec_pretty(data)
        } else {
            serde_json::to_vec(data)
        }
        .map_err(|err| {
            log::error!("Failed to encode collection '{}'", self.inner.name);
            JotError::encoding("Failed to encode collection", err)
        })?;

        let temp_path = {
            let mut os_string = self.inner.path.clone().into_os_string();
            os_string.push(TEMP_FILE_SUFFIX);
            PathBuf::from(os_string)
        };

        self.write_temp_file(&temp_path, &encoded).map_err(|err| {
            log::error!(
                "Failed to write temp file for collection '{}'",
                self.inner.name
            );
            JotError::io("Failed to write collection temp file", err)
        })?;

        if let Err(err) = fs::rename(&temp_path, &self.inner.path) {
            log::error!(
                "Failed to replace collection file for '{}'",
                self.inner.name
            );
            if let Err(cleanup_err) = fs::remove_file(&temp_path) {
                log::warn!("Failed to remove stray temp file: {}", cleanup_err);
            }
            return Err(JotError::io("Failed to replace collection file", err));
        }
        Ok(())
    }

    fn write_temp_file(&self, temp_path: &Path, encoded: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(temp_path)?;
        file.write_all(encoded)?;
        file.flush()?;
        file.sync_all()
    }
}

/// Reads and decodes a collection file. A file that cannot be read or parsed
/// yields an empty collection rather than an error, so one corrupt file never
/// takes the database down.
fn load_records(path: &Path) -> RecordMap {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!(
                "Failed to read collection file {:?}, starting empty: {}",
                path,
                err
            );
            return RecordMap::new();
        }
    };

    match serde_json::from_slice::<RecordMap>(&bytes) {
        Ok(records) => records,
        Err(err) => {
            log::warn!(
                "Malformed collection file {:?}, starting empty: {}",
                path,
                err
            );
            RecordMap::new()
        }
    }
}

impl std::fmt::Debug for FileCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCollection")
            .field("name", &self.inner.name)
            .field("path", &self.inner.path)
            .finish()
    }
}
