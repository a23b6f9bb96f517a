//! Configuration management for a jotdb database.

use crate::errors::{ErrorKind, JotError, JotResult};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const DEFAULT_BASE_DIR: &str = "data";

/// Public interface for jotdb database configuration.
///
/// Settings are applied through [JotDbBuilder](crate::db_builder::JotDbBuilder)
/// and frozen when the database is opened.
///
/// # Examples
///
/// ```rust,ignore
/// use jotdb::JotDbBuilder;
///
/// let db = JotDbBuilder::new()
///     .base_dir("./data")
///     .pretty_print(false)
///     .open_or_create()?;
/// ```
#[derive(Clone)]
pub struct JotDbConfig {
    /// The pointer to implementation. Uses Arc for cheap cloning and thread safety.
    inner: Arc<JotDbConfigInner>,
}

struct JotDbConfigInner {
    base_dir: RwLock<PathBuf>,
    pretty_print: AtomicBool,
    single_writer: AtomicBool,
    configured: AtomicBool,
}

impl Default for JotDbConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl JotDbConfig {
    /// Creates a new configuration instance with default values: base
    /// directory `./data`, pretty printed files, single writer process.
    pub fn new() -> Self {
        JotDbConfig {
            inner: Arc::new(JotDbConfigInner {
                base_dir: RwLock::new(PathBuf::from(DEFAULT_BASE_DIR)),
                pretty_print: AtomicBool::new(true),
                single_writer: AtomicBool::new(true),
                configured: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the directory holding the collection files.
    pub fn base_dir(&self) -> PathBuf {
        self.inner.base_dir.read().clone()
    }

    /// Sets the directory holding the collection files.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or the database is already open.
    pub fn set_base_dir(&self, base_dir: &Path) -> JotResult<()> {
        self.ensure_not_configured()?;
        if base_dir.as_os_str().is_empty() {
            log::error!("Base directory cannot be empty");
            return Err(JotError::new(
                "Base directory cannot be empty",
                ErrorKind::ValidationError,
            ));
        }
        *self.inner.base_dir.write() = base_dir.to_path_buf();
        Ok(())
    }

    /// Returns whether collection files are written with pretty printing.
    pub fn pretty_print(&self) -> bool {
        self.inner.pretty_print.load(Ordering::Relaxed)
    }

    /// Sets whether collection files are written with pretty printing.
    pub fn set_pretty_print(&self, pretty_print: bool) -> JotResult<()> {
        self.ensure_not_configured()?;
        self.inner.pretty_print.store(pretty_print, Ordering::Relaxed);
        Ok(())
    }

    /// Returns whether this process is assumed to be the only writer.
    ///
    /// When `false`, every read reloads the backing file first, so changes
    /// made by other processes become visible at the cost of throughput.
    pub fn single_writer(&self) -> bool {
        self.inner.single_writer.load(Ordering::Relaxed)
    }

    /// Sets the single-writer assumption.
    pub fn set_single_writer(&self, single_writer: bool) -> JotResult<()> {
        self.ensure_not_configured()?;
        self.inner
            .single_writer
            .store(single_writer, Ordering::Relaxed);
        Ok(())
    }

    /// Freezes the configuration. Called once when the database opens.
    pub(crate) fn mark_configured(&self) {
        self.inner.configured.store(true, Ordering::Release);
    }

    fn ensure_not_configured(&self) -> JotResult<()> {
        if self.inner.configured.load(Ordering::Acquire) {
            log::error!("Configuration cannot change after the database is opened");
            return Err(JotError::new(
                "Configuration cannot change after the database is opened",
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }
}
