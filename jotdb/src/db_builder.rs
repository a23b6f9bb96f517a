use crate::db::JotDb;
use crate::db_config::JotDbConfig;
use crate::errors::{JotError, JotResult};
use std::path::Path;

/// Builder for creating and configuring a jotdb database instance.
///
/// `JotDbBuilder` provides a fluent API for configuring options before opening
/// the database. Configuration errors are captured during chaining and
/// propagated when the database is opened.
///
/// # Examples
///
/// ```rust,ignore
/// use jotdb::JotDb;
///
/// let db = JotDb::builder()
///     .base_dir("./data")
///     .pretty_print(false)
///     .open_or_create()?;
/// ```
#[derive(Default)]
pub struct JotDbBuilder {
    error: Option<JotError>,
    config: JotDbConfig,
}

impl JotDbBuilder {
    /// Creates a new `JotDbBuilder` with default configuration.
    pub fn new() -> Self {
        JotDbBuilder {
            error: None,
            config: JotDbConfig::new(),
        }
    }

    /// Sets the directory where collection files are stored.
    ///
    /// The directory is created when the database is opened if it does not
    /// exist. An empty path is captured as an error and returned from
    /// `open_or_create()`.
    pub fn base_dir(mut self, base_dir: impl AsRef<Path>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_base_dir(base_dir.as_ref()) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets whether collection files are written pretty printed (default) or
    /// compact.
    pub fn pretty_print(mut self, pretty_print: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_pretty_print(pretty_print) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets whether this process is assumed to be the only writer (default
    /// `true`). With `false`, reads reload collection files from disk first.
    pub fn single_writer(mut self, single_writer: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_single_writer(single_writer) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Opens or creates a database with the configured settings.
    ///
    /// Any error captured during configuration is returned here.
    pub fn open_or_create(self) -> JotResult<JotDb> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let db = JotDb::new(self.config);
        db.initialize()?;
        Ok(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn random_dir() -> PathBuf {
        env::temp_dir().join(format!("jotdb-builder-test-{:x}", rand::random::<u64>()))
    }

    #[test]
    fn test_defaults() {
        let builder = JotDbBuilder::new();
        assert!(builder.error.is_none());
        assert_eq!(builder.config.base_dir(), PathBuf::from("data"));
    }

    #[test]
    fn test_open_or_create_makes_base_dir() {
        let dir = random_dir();
        let db = JotDbBuilder::new().base_dir(&dir).open_or_create().unwrap();
        assert!(dir.is_dir());
        assert_eq!(db.config().base_dir(), dir);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_base_dir_error_propagation() {
        let result = JotDbBuilder::new().base_dir("").open_or_create();
        assert!(result.is_err());
    }

    #[test]
    fn test_error_once_set_is_not_overwritten() {
        let builder = JotDbBuilder::new().base_dir("");
        let original = builder.error.as_ref().unwrap().message().to_string();

        let builder = builder.pretty_print(false).single_writer(false);
        assert_eq!(builder.error.as_ref().unwrap().message(), original);
    }

    #[test]
    fn test_settings_applied() {
        let builder = JotDbBuilder::new().pretty_print(false).single_writer(false);
        assert!(!builder.config.pretty_print());
        assert!(!builder.config.single_writer());
    }
}
